//! # Diagram Rendering
//!
//! Turns a diagram description returned by the analysis service into
//! displayable markup. Rendering failures never escape this module: they
//! become [`DiagramMarkup::Invalid`] so the report panel is unaffected.

pub mod flowchart;
pub mod layout;

use crate::error::RenderError;
use async_trait::async_trait;
use flowchart::Flowchart;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Text shown in place of a diagram the engine rejected.
pub const INVALID_DIAGRAM_TEXT: &str = "Diagram description invalid.";

/// A diagram engine: description in, markup out.
#[async_trait]
pub trait DiagramEngine: Send + Sync {
    async fn render(&self, description: &str, container_id: &str) -> Result<String, RenderError>;
}

/// Engine for the service's flowchart dialect, laid out as plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFlowchartEngine;

#[async_trait]
impl DiagramEngine for TextFlowchartEngine {
    async fn render(&self, description: &str, container_id: &str) -> Result<String, RenderError> {
        let chart = Flowchart::parse(description)?;
        debug!(
            container_id,
            nodes = chart.nodes.len(),
            edges = chart.edges.len(),
            "Parsed flowchart"
        );
        layout::render_text(&chart)
    }
}

/// Rendered state of the current diagram description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiagramMarkup {
    /// Nothing rendered yet, or nothing to render
    #[default]
    Empty,
    Rendered(String),
    /// The engine rejected the description
    Invalid,
}

impl DiagramMarkup {
    pub fn is_empty(&self) -> bool {
        matches!(self, DiagramMarkup::Empty)
    }

    /// Text to display for this markup.
    pub fn text(&self) -> &str {
        match self {
            DiagramMarkup::Empty => "",
            DiagramMarkup::Rendered(markup) => markup,
            DiagramMarkup::Invalid => INVALID_DIAGRAM_TEXT,
        }
    }
}

/// Wraps a [`DiagramEngine`] with the empty-input and fallback policy.
#[derive(Clone)]
pub struct DiagramRenderer {
    engine: Arc<dyn DiagramEngine>,
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new(Arc::new(TextFlowchartEngine))
    }
}

impl DiagramRenderer {
    pub fn new(engine: Arc<dyn DiagramEngine>) -> Self {
        Self { engine }
    }

    /// Renders `description` into markup.
    ///
    /// A missing or blank description yields [`DiagramMarkup::Empty`] without
    /// calling the engine.
    #[instrument(skip(self, description))]
    pub async fn render(&self, description: Option<&str>, container_id: &str) -> DiagramMarkup {
        let Some(description) = description.filter(|d| !d.trim().is_empty()) else {
            return DiagramMarkup::Empty;
        };

        match self.engine.render(description, container_id).await {
            Ok(markup) => DiagramMarkup::Rendered(markup),
            Err(e) => {
                warn!("Diagram engine rejected description: {}", e);
                DiagramMarkup::Invalid
            }
        }
    }
}
