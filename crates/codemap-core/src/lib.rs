//! # CodeMap Core
//!
//! Client-side workflow for the CodeMap analysis service: submitting source
//! text, tracking the selected function, and rendering the flowchart the
//! service returns for it.

pub mod client;
pub mod config;
pub mod diagram;
pub mod dispatch;
pub mod error;
pub mod types;
pub mod workflow;

pub use client::{AnalysisClient, HttpAnalysisClient};
pub use config::ClientConfig;
pub use diagram::{DiagramEngine, DiagramMarkup, DiagramRenderer, TextFlowchartEngine};
pub use dispatch::{Dispatcher, Session};
pub use error::{AnalysisError, AnalysisResult, RenderError};
pub use types::{AnalysisMode, AnalysisReport, AnalysisRequest, Ticket};
pub use workflow::{Effect, Phase, WorkflowController, WorkflowEvent};
