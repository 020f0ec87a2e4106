use anyhow::{Context, Result};
use clap::Parser;
use codemap_core::{AnalysisClient, DiagramRenderer, HttpAnalysisClient, Session};
use codemap_tui::{event::handle_events, tui::Tui, ui::ui, App, AppEvent, Cli};
use std::{fs::File, path::Path, sync::Arc};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sends the diagnostic log to a file; the terminal belongs to the UI.
fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,codemap_core=debug,codemap_tui=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_path())?;

    let config = cli.client_config();
    info!("Using analysis service at {}", config.base_url);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let client = Arc::new(HttpAnalysisClient::new(config.clone())?);
    let session = Session::new(
        Arc::clone(&client) as Arc<dyn AnalysisClient>,
        DiagramRenderer::default(),
        runtime.handle().clone(),
    );

    let mut app = App::new(session, config.base_url.clone());
    if let Some(path) = &cli.file {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        app.load_source(&source);
    }

    let sender = app.event_sender.clone();
    runtime.spawn(async move {
        let result = client.health().await;
        let _ = sender.send(AppEvent::HealthChecked(result));
    });

    let mut tui = Tui::new()?;
    while !app.should_quit {
        tui.terminal().draw(|f| ui(f, &mut app))?;
        handle_events(&mut app)?;
    }

    info!("Shutting down");
    Ok(())
}
