//! # TUI App Tests
//!
//! Drives `App` through key events against a scripted analysis client,
//! without a terminal.

use async_trait::async_trait;
use clap::Parser;
use codemap_core::workflow::{ANALYSIS_ERROR_MESSAGE, INPUT_ERROR_MESSAGE};
use codemap_core::{
    AnalysisClient, AnalysisError, AnalysisReport, AnalysisRequest, AnalysisResult,
    DiagramRenderer, Session,
};
use codemap_tui::ui::{diagram_text, report_text};
use codemap_tui::{ActivePanel, App, AppEvent, Cli, ServiceHealth};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;
use tokio::runtime::Runtime;

#[derive(Default)]
struct ScriptedClient {
    requests: Mutex<Vec<AnalysisRequest>>,
    fail: bool,
}

#[async_trait]
impl AnalysisClient for ScriptedClient {
    async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<AnalysisReport> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(AnalysisError::transport("connection refused"));
        }
        let flowchart = request.target_function.as_ref().map(|name| {
            format!("flowchart TD\nN0((\"Function: {name}()\"))\nN1[\"return 1\"]\nN0 --> N1")
        });
        AnalysisReport::from_value(json!({
            "functions": {"count": 2, "names": ["f", "g"]},
            "flowchart": flowchart
        }))
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn app_with(client: Arc<ScriptedClient>, runtime: &Runtime) -> App {
    let session = Session::new(client, DiagramRenderer::default(), runtime.handle().clone());
    App::new(session, "http://127.0.0.1:8000")
}

/// Pumps the app until the workflow has nothing in flight.
fn settle(app: &mut App) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        app.update();
        if !app.session.controller().is_busy() {
            return;
        }
        assert!(Instant::now() < deadline, "workflow did not settle");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        match c {
            '\n' => app.on_key(key(KeyCode::Enter)),
            c => app.on_key(key(KeyCode::Char(c))),
        }
    }
}

#[test]
fn test_panel_cycle_order() {
    let panels: Vec<_> = ActivePanel::iter().collect();
    assert_eq!(panels.len(), 4);
    assert_eq!(ActivePanel::Source.next(), ActivePanel::Functions);
    assert_eq!(ActivePanel::Diagram.next(), ActivePanel::Source);
    assert_eq!(ActivePanel::Report.to_string(), "C: Analysis Report");
}

#[test]
fn test_typing_updates_source_and_q_is_text() {
    let runtime = Runtime::new().unwrap();
    let mut app = app_with(Arc::new(ScriptedClient::default()), &runtime);

    type_text(&mut app, "def q():\n");
    app.on_key(key(KeyCode::Tab));

    assert!(!app.should_quit);
    assert_eq!(app.session.controller().source_text(), "def q():\n    ");
}

#[test]
fn test_run_with_empty_editor_shows_input_error() {
    let runtime = Runtime::new().unwrap();
    let client = Arc::new(ScriptedClient::default());
    let mut app = app_with(client.clone(), &runtime);

    app.on_key(ctrl('r'));
    settle(&mut app);

    assert_eq!(app.session.controller().error(), Some(INPUT_ERROR_MESSAGE));
    assert!(client.requests.lock().unwrap().is_empty());
    assert_eq!(
        report_text(app.session.controller()).lines[0].to_string(),
        INPUT_ERROR_MESSAGE
    );
}

#[test]
fn test_analyze_select_and_render() {
    let runtime = Runtime::new().unwrap();
    let client = Arc::new(ScriptedClient::default());
    let mut app = app_with(client.clone(), &runtime);

    app.load_source("def f():\n    return 1\n");
    app.on_key(key(KeyCode::F(5)));
    settle(&mut app);

    assert_eq!(
        app.visible_panels(),
        [ActivePanel::Source, ActivePanel::Functions, ActivePanel::Report]
    );
    assert_eq!(app.function_state.selected(), Some(0));

    app.on_key(key(KeyCode::Esc));
    assert_eq!(app.active_panel, ActivePanel::Functions);
    app.on_key(key(KeyCode::Enter));
    settle(&mut app);

    let controller = app.session.controller();
    assert_eq!(controller.selected_function(), Some("f"));
    assert!(app.visible_panels().contains(&ActivePanel::Diagram));
    let diagram = diagram_text(controller);
    assert_eq!(diagram.lines[0].to_string(), " flowchart TD ↓");
    assert_eq!(diagram.lines[1].to_string(), " ├─ N0 (( Function: f() ))");

    let requests = client.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].target_function.as_deref(), Some("f"));
}

#[test]
fn test_clearing_selection_hides_diagram_and_refocuses() {
    let runtime = Runtime::new().unwrap();
    let mut app = app_with(Arc::new(ScriptedClient::default()), &runtime);

    app.load_source("def f():\n    return 1\n");
    app.on_run();
    settle(&mut app);
    app.active_panel = ActivePanel::Functions;
    app.on_key(key(KeyCode::Down));
    app.on_key(key(KeyCode::Enter));
    settle(&mut app);
    assert_eq!(app.session.controller().selected_function(), Some("g"));

    app.active_panel = ActivePanel::Diagram;
    app.on_key(key(KeyCode::Tab));
    assert_eq!(app.active_panel, ActivePanel::Source);

    app.active_panel = ActivePanel::Functions;
    app.on_key(key(KeyCode::Delete));
    app.update();
    assert_eq!(app.session.controller().selected_function(), None);
    assert!(!app.visible_panels().contains(&ActivePanel::Diagram));
}

#[test]
fn test_editing_after_analysis_resets_view() {
    let runtime = Runtime::new().unwrap();
    let mut app = app_with(Arc::new(ScriptedClient::default()), &runtime);

    app.load_source("def f():\n    return 1\n");
    app.on_run();
    settle(&mut app);
    app.active_panel = ActivePanel::Source;
    type_text(&mut app, "#");
    app.update();

    assert!(app.session.controller().functions().is_empty());
    assert_eq!(app.function_state.selected(), None);
    assert_eq!(app.visible_panels(), [ActivePanel::Source, ActivePanel::Report]);
}

#[test]
fn test_network_failure_shows_fixed_message() {
    let runtime = Runtime::new().unwrap();
    let client = Arc::new(ScriptedClient {
        fail: true,
        ..ScriptedClient::default()
    });
    let mut app = app_with(client, &runtime);

    app.load_source("def f(): return 1");
    app.on_run();
    settle(&mut app);

    let text = report_text(app.session.controller());
    assert_eq!(text.lines.len(), 1);
    assert_eq!(text.lines[0].to_string(), ANALYSIS_ERROR_MESSAGE);
}

#[test]
fn test_health_events_update_header_state() {
    let runtime = Runtime::new().unwrap();
    let mut app = app_with(Arc::new(ScriptedClient::default()), &runtime);
    assert_eq!(app.health, ServiceHealth::Unknown);

    app.event_sender
        .send(AppEvent::HealthChecked(Ok("CodeMap API running".to_string())))
        .unwrap();
    app.update();
    assert_eq!(app.health, ServiceHealth::Online("CodeMap API running".to_string()));

    app.handle_app_event(AppEvent::HealthChecked(Err(AnalysisError::transport("refused"))));
    assert!(matches!(app.health, ServiceHealth::Offline(_)));
}

#[test]
fn test_quit_keys() {
    let runtime = Runtime::new().unwrap();
    let mut app = app_with(Arc::new(ScriptedClient::default()), &runtime);

    app.on_key(key(KeyCode::Esc));
    assert_eq!(app.active_panel, ActivePanel::Report);
    assert!(!app.should_quit);
    app.on_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);

    let mut app = app_with(Arc::new(ScriptedClient::default()), &runtime);
    app.on_key(ctrl('c'));
    assert!(app.should_quit);
}

#[test]
fn test_cli_overrides() {
    let cli = Cli::try_parse_from([
        "codemap-tui",
        "--api-url",
        "http://analysis.local:9000",
        "--timeout-secs",
        "7",
        "--log-file",
        "/tmp/codemap.log",
    ])
    .unwrap();

    let config = cli.client_config();
    assert_eq!(config.base_url, "http://analysis.local:9000");
    assert_eq!(config.timeout, Duration::from_secs(7));
    assert_eq!(cli.log_path(), std::path::PathBuf::from("/tmp/codemap.log"));
}
