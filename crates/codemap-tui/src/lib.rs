//! # CodeMap TUI Library
//!
//! Terminal front end for the CodeMap analysis workflow: a source editor,
//! the function selector, the analysis report and the flowchart panel.

pub mod app;
pub mod cli;
pub mod editor;
pub mod event;
pub mod tui;
pub mod ui;

pub use app::{ActivePanel, App, AppEvent, ServiceHealth};
pub use cli::Cli;
