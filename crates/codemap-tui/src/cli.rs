use clap::Parser;
use codemap_core::ClientConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOG_FILE: &str = "codemap-tui.log";

/// Terminal client for the CodeMap analysis service.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the analysis service (overrides CODEMAP_API_URL).
    #[arg(long)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (overrides CODEMAP_TIMEOUT_SECS).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Source file to load into the editor on startup.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// File receiving the diagnostic log (overrides CODEMAP_LOG_FILE).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs.filter(|secs| *secs > 0) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            std::env::var("CODEMAP_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE))
        })
    }
}
