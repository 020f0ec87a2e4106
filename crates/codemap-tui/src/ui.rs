use crate::app::{ActivePanel, App, ServiceHealth};
use codemap_core::{DiagramMarkup, Phase, WorkflowController};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation},
    Frame,
};

const MAX_FUNCTION_ROWS: u16 = 10;

pub fn ui(f: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, main_layout[0]);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_layout[1]);

    let controller = app.session.controller();
    if controller.shows_function_selector() {
        let rows = (controller.functions().len() as u16).min(MAX_FUNCTION_ROWS) + 2;
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(rows)])
            .split(content_layout[0]);
        render_source_editor(f, app, left[0]);
        render_function_selector(f, app, left[1]);
    } else {
        render_source_editor(f, app, content_layout[0]);
    }

    if app.session.controller().shows_diagram_panel() {
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(content_layout[1]);
        render_report(f, app, right[0]);
        render_diagram(f, app, right[1]);
    } else {
        render_report(f, app, content_layout[1]);
    }

    render_footer(f, main_layout[2]);
}

fn panel_block(app: &App, panel: ActivePanel, title: String) -> Block<'static> {
    let border_style = if app.active_panel == panel {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn phase_span(phase: &Phase) -> Span<'static> {
    match phase {
        Phase::Idle => Span::styled("idle", Style::default().fg(Color::DarkGray)),
        Phase::Analyzing(mode) => {
            Span::styled(format!("analyzing {mode}…"), Style::default().fg(Color::Yellow))
        }
        Phase::Ready => Span::styled("ready", Style::default().fg(Color::Green)),
        Phase::Error => Span::styled("error", Style::default().fg(Color::Red)),
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" CodeMap - Code Analysis ")
        .borders(Borders::ALL);

    let health = match &app.health {
        ServiceHealth::Unknown => Span::styled("checking…", Style::default().fg(Color::DarkGray)),
        ServiceHealth::Online(message) => {
            Span::styled(message.clone(), Style::default().fg(Color::Green))
        }
        ServiceHealth::Offline(_) => Span::styled("unreachable", Style::default().fg(Color::Red)),
    };

    let line = Line::from(vec![
        Span::styled(app.api_url.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        health,
        Span::raw(" | "),
        phase_span(app.session.controller().phase()),
    ]);
    let paragraph = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_source_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let block = panel_block(app, ActivePanel::Source, ActivePanel::Source.to_string());
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    let (row, col) = app.editor.cursor();

    let vertical = row.saturating_sub(inner_height.saturating_sub(1));
    let horizontal = col.saturating_sub(inner_width.saturating_sub(1));

    let text: Vec<Line> = app
        .editor
        .lines()
        .iter()
        .map(|line| Line::from(line.as_str()))
        .collect();
    let paragraph = Paragraph::new(text)
        .block(block)
        .scroll((vertical as u16, horizontal as u16));
    f.render_widget(paragraph, area);

    if app.active_panel == ActivePanel::Source {
        f.set_cursor_position((
            area.x + 1 + (col - horizontal) as u16,
            area.y + 1 + (row - vertical) as u16,
        ));
    }
}

fn render_function_selector(f: &mut Frame, app: &mut App, area: Rect) {
    let controller = app.session.controller();
    let title = format!(
        "{} ({})",
        ActivePanel::Functions,
        controller.function_count()
    );
    let block = panel_block(app, ActivePanel::Functions, title);

    let selected = controller.selected_function();
    let items: Vec<ListItem> = controller
        .functions()
        .iter()
        .map(|name| {
            let marker = if Some(name.as_str()) == selected {
                Span::styled("[●] ", Style::default().fg(Color::Green))
            } else {
                Span::raw("[ ] ")
            };
            ListItem::new(Line::from(vec![marker, Span::raw(name.clone())]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, area, &mut app.function_state);
}

/// Body of the report panel: the error message, the pretty-printed report,
/// or a hint for the current phase.
pub fn report_text(controller: &WorkflowController) -> Text<'static> {
    if let Some(error) = controller.error() {
        return Text::from(Line::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    match (controller.report(), controller.phase()) {
        (Some(report), _) => {
            let mut lines = Vec::new();
            if let Some(service_error) = report.service_error() {
                lines.push(Line::styled(
                    format!("Service error: {service_error}"),
                    Style::default().fg(Color::Red),
                ));
                lines.push(Line::raw(""));
            }
            lines.extend(report.pretty().lines().map(|l| Line::raw(l.to_string())));
            Text::from(lines)
        }
        (None, Phase::Analyzing(mode)) => Text::from(format!("Analyzing {mode}…")),
        (None, _) => Text::from("> Press Ctrl+R to analyze the source."),
    }
}

/// Body of the diagram panel.
pub fn diagram_text(controller: &WorkflowController) -> Text<'static> {
    match controller.diagram() {
        DiagramMarkup::Empty if controller.is_rendering() => Text::from("Rendering…"),
        DiagramMarkup::Empty => Text::default(),
        DiagramMarkup::Rendered(markup) => Text::from(markup.clone()),
        invalid @ DiagramMarkup::Invalid => Text::from(Line::styled(
            invalid.text().to_string(),
            Style::default().fg(Color::Red),
        )),
    }
}

fn render_scrollable(
    f: &mut Frame,
    area: Rect,
    block: Block<'static>,
    text: Text<'static>,
    scroll: u16,
    scroll_state: &mut ratatui::widgets::ScrollbarState,
) {
    let content_height = text.height();
    let paragraph = Paragraph::new(text).block(block).scroll((scroll, 0));
    f.render_widget(paragraph, area);

    *scroll_state = scroll_state
        .content_length(content_height)
        .position(scroll as usize);
    f.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        scroll_state,
    );
}

fn render_report(f: &mut Frame, app: &mut App, area: Rect) {
    let block = panel_block(app, ActivePanel::Report, ActivePanel::Report.to_string());
    let text = report_text(app.session.controller());
    render_scrollable(
        f,
        area,
        block,
        text,
        app.report_scroll,
        &mut app.report_scroll_state,
    );
}

fn render_diagram(f: &mut Frame, app: &mut App, area: Rect) {
    let controller = app.session.controller();
    let title = match controller.selected_function() {
        Some(name) => format!("{} - {name}", ActivePanel::Diagram),
        None => ActivePanel::Diagram.to_string(),
    };
    let block = panel_block(app, ActivePanel::Diagram, title);
    let text = diagram_text(controller);
    render_scrollable(
        f,
        area,
        block,
        text,
        app.diagram_scroll,
        &mut app.diagram_scroll_state,
    );
}

fn render_footer(f: &mut Frame, area: Rect) {
    let controls = Line::from(vec![
        Span::styled("[Ctrl+R/F5]", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Analyze | "),
        Span::styled("[Tab]", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Panel | "),
        Span::styled("[Enter]", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Select | "),
        Span::styled("[Del]", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Clear | "),
        Span::styled("[Esc]", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Leave editor / Quit | "),
        Span::styled("[Ctrl+C]", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Quit"),
    ])
    .alignment(Alignment::Center);
    f.render_widget(Paragraph::new(controls), area);
}
