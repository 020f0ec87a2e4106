//! # Workflow Controller
//!
//! Owns every piece of client-side state and sequences the two analysis
//! modes. The controller never performs I/O itself: commands return the
//! [`Effect`]s to execute, and completions come back through
//! [`WorkflowController::handle_event`]. Each effect carries a [`Ticket`];
//! a completion is applied only when its ticket is the latest one issued
//! for that kind of operation, so late results can never overwrite newer
//! state.

use crate::diagram::DiagramMarkup;
use crate::error::AnalysisResult;
use crate::types::{AnalysisMode, AnalysisReport, AnalysisRequest, Ticket, TicketCounter};
use tracing::{debug, error, info, warn};

/// Shown when analysis is requested without any source text.
pub const INPUT_ERROR_MESSAGE: &str = "Please supply source text.";
/// Shown when the analysis call fails for any reason.
pub const ANALYSIS_ERROR_MESSAGE: &str = "Failed to analyze code.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Analyzing(AnalysisMode),
    Ready,
    Error,
}

/// Asynchronous work requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Analyze {
        ticket: Ticket,
        request: AnalysisRequest,
    },
    Render {
        ticket: Ticket,
        description: String,
    },
}

/// Completion of an [`Effect`].
#[derive(Debug)]
pub enum WorkflowEvent {
    AnalysisFinished {
        ticket: Ticket,
        result: AnalysisResult<AnalysisReport>,
    },
    RenderFinished {
        ticket: Ticket,
        markup: DiagramMarkup,
    },
}

#[derive(Debug, Default)]
pub struct WorkflowController {
    source_text: String,
    functions: Vec<String>,
    function_count: usize,
    selected_function: Option<String>,
    report: Option<AnalysisReport>,
    diagram_description: Option<String>,
    diagram: DiagramMarkup,
    error: Option<String>,
    phase: Phase,
    tickets: TicketCounter,
    pending_analysis: Option<(Ticket, AnalysisMode)>,
    pending_render: Option<Ticket>,
}

impl WorkflowController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the source text and returns to [`Phase::Idle`].
    ///
    /// Everything derived from the previous text is dropped, including
    /// results still in flight.
    pub fn set_source_text(&mut self, text: impl Into<String>) {
        self.source_text = text.into();
        self.functions.clear();
        self.function_count = 0;
        self.selected_function = None;
        self.error = None;
        self.pending_analysis = None;
        self.clear_outcome();
        self.phase = Phase::Idle;
    }

    /// Starts a whole-program analysis.
    pub fn run_analysis(&mut self) -> Vec<Effect> {
        if !self.has_source() {
            return self.reject_blank_source();
        }

        self.functions.clear();
        self.function_count = 0;
        self.selected_function = None;
        self.issue_analysis(None)
    }

    /// Commits a selection and runs the selection reaction.
    ///
    /// `None` or an empty name clears the selection.
    pub fn select_function(&mut self, name: Option<String>) -> Vec<Effect> {
        self.selected_function = name.filter(|name| !name.is_empty());
        self.on_selection_changed()
    }

    /// Reaction to a committed selection change.
    ///
    /// Runs on every commit, so selecting the same function again re-runs
    /// the per-function analysis.
    fn on_selection_changed(&mut self) -> Vec<Effect> {
        let Some(name) = self.selected_function.clone() else {
            // an in-flight per-function analysis still lands, without its diagram
            self.clear_diagram();
            return Vec::new();
        };

        if !self.functions.contains(&name) {
            warn!("Selected function '{}' is not in the current function list", name);
        }
        if !self.has_source() {
            return self.reject_blank_source();
        }
        self.issue_analysis(Some(name))
    }

    /// Applies the completion of an earlier effect.
    pub fn handle_event(&mut self, event: WorkflowEvent) -> Vec<Effect> {
        match event {
            WorkflowEvent::AnalysisFinished { ticket, result } => {
                self.apply_analysis(ticket, result)
            }
            WorkflowEvent::RenderFinished { ticket, markup } => {
                self.apply_render(ticket, markup);
                Vec::new()
            }
        }
    }

    fn apply_analysis(
        &mut self,
        ticket: Ticket,
        result: AnalysisResult<AnalysisReport>,
    ) -> Vec<Effect> {
        let mode = match &self.pending_analysis {
            Some((pending, mode)) if *pending == ticket => mode.clone(),
            _ => {
                debug!(%ticket, "Discarding stale analysis result");
                return Vec::new();
            }
        };
        self.pending_analysis = None;

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                error!(%ticket, "Analysis of {} failed: {}", mode, e);
                self.clear_outcome();
                self.error = Some(ANALYSIS_ERROR_MESSAGE.to_string());
                self.phase = Phase::Error;
                return Vec::new();
            }
        };

        let refresh_functions = match mode {
            AnalysisMode::WholeProgram => true,
            AnalysisMode::PerFunction(_) => !report.function_names().is_empty(),
        };
        if refresh_functions {
            self.functions = report.function_names().to_vec();
            self.function_count = report.function_count();
        }
        if let Some(service_error) = report.service_error() {
            info!(%ticket, "Service reported: {}", service_error);
        }

        let description = match &mode {
            AnalysisMode::PerFunction(name) if self.is_selected(name) => {
                report.diagram_description().map(str::to_owned)
            }
            AnalysisMode::PerFunction(name) => {
                debug!(%ticket, "'{}' is no longer selected, skipping its diagram", name);
                None
            }
            AnalysisMode::WholeProgram => None,
        };
        self.report = Some(report);
        self.error = None;
        self.phase = Phase::Ready;

        match description {
            Some(description) => self.issue_render(description),
            None => {
                self.clear_diagram();
                Vec::new()
            }
        }
    }

    fn apply_render(&mut self, ticket: Ticket, markup: DiagramMarkup) {
        if self.pending_render != Some(ticket) {
            debug!(%ticket, "Discarding stale diagram render");
            return;
        }
        self.pending_render = None;
        self.diagram = markup;
    }

    fn issue_analysis(&mut self, target_function: Option<String>) -> Vec<Effect> {
        self.clear_outcome();
        self.error = None;

        let request = match target_function {
            Some(name) => AnalysisRequest::per_function(self.source_text.clone(), name),
            None => AnalysisRequest::whole_program(self.source_text.clone()),
        };
        let ticket = self.tickets.issue();
        let mode = request.mode();
        info!(%ticket, "Requesting analysis of {}", mode);

        self.pending_analysis = Some((ticket, mode.clone()));
        self.phase = Phase::Analyzing(mode);
        vec![Effect::Analyze { ticket, request }]
    }

    fn issue_render(&mut self, description: String) -> Vec<Effect> {
        let ticket = self.tickets.issue();
        debug!(%ticket, "Requesting diagram render");

        self.pending_render = Some(ticket);
        self.diagram_description = Some(description.clone());
        self.diagram = DiagramMarkup::Empty;
        vec![Effect::Render {
            ticket,
            description,
        }]
    }

    fn reject_blank_source(&mut self) -> Vec<Effect> {
        info!("Analysis requested without source text");
        self.pending_analysis = None;
        self.clear_outcome();
        self.error = Some(INPUT_ERROR_MESSAGE.to_string());
        self.phase = Phase::Error;
        Vec::new()
    }

    fn clear_outcome(&mut self) {
        self.report = None;
        self.clear_diagram();
    }

    fn clear_diagram(&mut self) {
        self.diagram_description = None;
        self.diagram = DiagramMarkup::Empty;
        self.pending_render = None;
    }

    pub fn has_source(&self) -> bool {
        !self.source_text.trim().is_empty()
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    pub fn function_count(&self) -> usize {
        self.function_count
    }

    pub fn selected_function(&self) -> Option<&str> {
        self.selected_function.as_deref()
    }

    fn is_selected(&self, name: &str) -> bool {
        self.selected_function.as_deref() == Some(name)
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn diagram_description(&self) -> Option<&str> {
        self.diagram_description.as_deref()
    }

    pub fn diagram(&self) -> &DiagramMarkup {
        &self.diagram
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether an analysis or render issued by the controller is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending_analysis.is_some() || self.pending_render.is_some()
    }

    pub fn is_rendering(&self) -> bool {
        self.pending_render.is_some()
    }

    pub fn shows_function_selector(&self) -> bool {
        !self.functions.is_empty()
    }

    pub fn shows_diagram_panel(&self) -> bool {
        self.diagram_description.is_some()
    }
}
