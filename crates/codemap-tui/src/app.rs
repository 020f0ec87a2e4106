use crate::editor::SourceEditor;
use codemap_core::{AnalysisError, Session};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::{ListState, ScrollbarState};
use std::sync::mpsc::{self, Receiver, Sender};
use strum::{Display, EnumIter, FromRepr};
use tracing::{debug, info};

#[derive(Default, Clone, Copy, Debug, Display, FromRepr, EnumIter, PartialEq, Eq)]
pub enum ActivePanel {
    #[default]
    #[strum(to_string = "A: Source")]
    Source,
    #[strum(to_string = "B: Functions")]
    Functions,
    #[strum(to_string = "C: Analysis Report")]
    Report,
    #[strum(to_string = "D: Flowchart")]
    Diagram,
}

impl ActivePanel {
    pub fn next(self) -> Self {
        Self::from_repr(self as usize + 1).unwrap_or(ActivePanel::Source)
    }
}

/// Reachability of the analysis service as shown in the header.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ServiceHealth {
    #[default]
    Unknown,
    Online(String),
    Offline(String),
}

/// Events produced outside the workflow session.
pub enum AppEvent {
    HealthChecked(Result<String, AnalysisError>),
}

pub struct App {
    pub should_quit: bool,
    pub active_panel: ActivePanel,
    pub api_url: String,
    pub health: ServiceHealth,
    pub session: Session,
    pub editor: SourceEditor,
    pub function_state: ListState,
    pub report_scroll: u16,
    pub report_scroll_state: ScrollbarState,
    pub diagram_scroll: u16,
    pub diagram_scroll_state: ScrollbarState,
    pub event_sender: Sender<AppEvent>,
    pub event_receiver: Receiver<AppEvent>,
}

impl App {
    pub fn new(session: Session, api_url: impl Into<String>) -> Self {
        let (event_sender, event_receiver) = mpsc::channel();
        Self {
            should_quit: false,
            active_panel: ActivePanel::Source,
            api_url: api_url.into(),
            health: ServiceHealth::Unknown,
            session,
            editor: SourceEditor::default(),
            function_state: ListState::default(),
            report_scroll: 0,
            report_scroll_state: ScrollbarState::default(),
            diagram_scroll: 0,
            diagram_scroll_state: ScrollbarState::default(),
            event_sender,
            event_receiver,
        }
    }

    /// Replaces the editor contents, e.g. with a file given on the command line.
    pub fn load_source(&mut self, text: &str) {
        self.editor = SourceEditor::from_text(text);
        self.on_source_edited();
    }

    /// Applies finished background work. Called once per frame.
    pub fn update(&mut self) {
        let applied = self.session.pump();
        if applied > 0 {
            debug!("Applied {} workflow event(s)", applied);
        }

        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_app_event(event);
        }
        self.sync_view_state();
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::HealthChecked(Ok(message)) => {
                info!("Analysis service online: {}", message);
                self.health = ServiceHealth::Online(message);
            }
            AppEvent::HealthChecked(Err(e)) => {
                info!("Analysis service unreachable: {}", e);
                self.health = ServiceHealth::Offline(e.to_string());
            }
        }
    }

    /// Keeps list highlight and focus consistent with the workflow state.
    fn sync_view_state(&mut self) {
        let controller = self.session.controller();
        let functions = controller.functions();

        if functions.is_empty() {
            self.function_state.select(None);
        } else if let Some(index) = controller
            .selected_function()
            .and_then(|name| functions.iter().position(|f| f == name))
        {
            if self.function_state.selected().is_none() {
                self.function_state.select(Some(index));
            }
        } else if self
            .function_state
            .selected()
            .map_or(true, |i| i >= functions.len())
        {
            self.function_state.select(Some(0));
        }

        if !self.visible_panels().contains(&self.active_panel) {
            self.active_panel = ActivePanel::Source;
        }
    }

    /// Panels currently on screen, in focus order.
    pub fn visible_panels(&self) -> Vec<ActivePanel> {
        let controller = self.session.controller();
        let mut panels = vec![ActivePanel::Source];
        if controller.shows_function_selector() {
            panels.push(ActivePanel::Functions);
        }
        panels.push(ActivePanel::Report);
        if controller.shows_diagram_panel() {
            panels.push(ActivePanel::Diagram);
        }
        panels
    }

    pub fn on_tab(&mut self) {
        let visible = self.visible_panels();
        let mut next = self.active_panel.next();
        while !visible.contains(&next) {
            next = next.next();
        }
        self.active_panel = next;
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('r') if ctrl => {
                self.on_run();
                return;
            }
            KeyCode::F(5) => {
                self.on_run();
                return;
            }
            _ => {}
        }

        match self.active_panel {
            ActivePanel::Source => self.on_editor_key(key),
            ActivePanel::Functions => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.on_up(),
                KeyCode::Down | KeyCode::Char('j') => self.on_down(),
                KeyCode::Enter => self.on_select(),
                KeyCode::Backspace | KeyCode::Delete => self.on_clear_selection(),
                KeyCode::Tab => self.on_tab(),
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            ActivePanel::Report => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.scroll_report_up(),
                KeyCode::Down | KeyCode::Char('j') => self.scroll_report_down(),
                KeyCode::Tab => self.on_tab(),
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
            ActivePanel::Diagram => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.scroll_diagram_up(),
                KeyCode::Down | KeyCode::Char('j') => self.scroll_diagram_down(),
                KeyCode::Tab => self.on_tab(),
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
        }
    }

    fn on_editor_key(&mut self, key: KeyEvent) {
        let edited = match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.editor.insert_char(c);
                true
            }
            KeyCode::Enter => {
                self.editor.insert_newline();
                true
            }
            KeyCode::Tab => {
                self.editor.insert_str("    ");
                true
            }
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => {
                self.editor.move_left();
                false
            }
            KeyCode::Right => {
                self.editor.move_right();
                false
            }
            KeyCode::Up => {
                self.editor.move_up();
                false
            }
            KeyCode::Down => {
                self.editor.move_down();
                false
            }
            KeyCode::Home => {
                self.editor.home();
                false
            }
            KeyCode::End => {
                self.editor.end();
                false
            }
            KeyCode::Esc => {
                self.on_tab();
                false
            }
            _ => false,
        };

        if edited {
            self.on_source_edited();
        }
    }

    fn on_source_edited(&mut self) {
        self.session.set_source_text(self.editor.text());
        self.function_state.select(None);
        self.reset_scroll();
    }

    pub fn on_run(&mut self) {
        self.session.run_analysis();
        self.function_state.select(None);
        self.reset_scroll();
    }

    pub fn on_up(&mut self) {
        let len = self.session.controller().functions().len();
        if len == 0 {
            return;
        }
        let i = self
            .function_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.function_state.select(Some(i));
    }

    pub fn on_down(&mut self) {
        let len = self.session.controller().functions().len();
        if len == 0 {
            return;
        }
        let i = self
            .function_state
            .selected()
            .map_or(0, |i| if i + 1 >= len { 0 } else { i + 1 });
        self.function_state.select(Some(i));
    }

    /// Commits the highlighted function as the selection.
    pub fn on_select(&mut self) {
        let name = self
            .function_state
            .selected()
            .and_then(|i| self.session.controller().functions().get(i).cloned());
        if let Some(name) = name {
            self.session.select_function(Some(name));
            self.reset_scroll();
        }
    }

    pub fn on_clear_selection(&mut self) {
        self.session.select_function(None);
        self.diagram_scroll = 0;
    }

    fn reset_scroll(&mut self) {
        self.report_scroll = 0;
        self.diagram_scroll = 0;
    }

    pub fn scroll_report_up(&mut self) {
        self.report_scroll = self.report_scroll.saturating_sub(1);
    }

    pub fn scroll_report_down(&mut self) {
        let content_height = self
            .session
            .controller()
            .report()
            .map_or(0, |r| r.pretty().lines().count()) as u16;
        self.report_scroll = self.report_scroll.saturating_add(1).min(content_height);
    }

    pub fn scroll_diagram_up(&mut self) {
        self.diagram_scroll = self.diagram_scroll.saturating_sub(1);
    }

    pub fn scroll_diagram_down(&mut self) {
        let content_height = self.session.controller().diagram().text().lines().count() as u16;
        self.diagram_scroll = self.diagram_scroll.saturating_add(1).min(content_height);
    }
}
