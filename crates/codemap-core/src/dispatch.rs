//! Executes controller effects on a tokio runtime and feeds completions back.

use crate::client::AnalysisClient;
use crate::diagram::{DiagramMarkup, DiagramRenderer};
use crate::error::{AnalysisError, RenderError};
use crate::workflow::{Effect, WorkflowController, WorkflowEvent};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Spawns one task per [`Effect`]; each task reports back over a channel.
pub struct Dispatcher {
    client: Arc<dyn AnalysisClient>,
    renderer: DiagramRenderer,
    runtime: Handle,
    events: Sender<WorkflowEvent>,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn AnalysisClient>,
        renderer: DiagramRenderer,
        runtime: Handle,
        events: Sender<WorkflowEvent>,
    ) -> Self {
        Self {
            client,
            renderer,
            runtime,
            events,
        }
    }

    pub fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.spawn(effect);
        }
    }

    fn spawn(&self, effect: Effect) {
        let events = self.events.clone();
        match effect {
            Effect::Analyze { ticket, request } => {
                let client = Arc::clone(&self.client);
                self.runtime.spawn(async move {
                    let task = tokio::spawn(async move { client.analyze(&request).await });
                    let result = task.await.unwrap_or_else(|e| {
                        Err(AnalysisError::transport(format!("task failed: {e}")))
                    });
                    if events
                        .send(WorkflowEvent::AnalysisFinished { ticket, result })
                        .is_err()
                    {
                        debug!(%ticket, "Workflow closed before analysis finished");
                    }
                });
            }
            Effect::Render {
                ticket,
                description,
            } => {
                let renderer = self.renderer.clone();
                self.runtime.spawn(async move {
                    let container_id = format!("flowchart-{}", ticket.value());
                    let task = tokio::spawn(async move {
                        renderer.render(Some(&description), &container_id).await
                    });
                    let markup = task.await.unwrap_or_else(|e| {
                        warn!("{}", RenderError::Engine(e.to_string()));
                        DiagramMarkup::Invalid
                    });
                    if events
                        .send(WorkflowEvent::RenderFinished { ticket, markup })
                        .is_err()
                    {
                        debug!(%ticket, "Workflow closed before render finished");
                    }
                });
            }
        }
    }
}

/// A controller wired to a dispatcher: the surface the front end talks to.
pub struct Session {
    controller: WorkflowController,
    dispatcher: Dispatcher,
    events: Receiver<WorkflowEvent>,
}

impl Session {
    pub fn new(
        client: Arc<dyn AnalysisClient>,
        renderer: DiagramRenderer,
        runtime: Handle,
    ) -> Self {
        let (sender, events) = mpsc::channel();
        Self {
            controller: WorkflowController::new(),
            dispatcher: Dispatcher::new(client, renderer, runtime, sender),
            events,
        }
    }

    /// Read-only view of the workflow state.
    pub fn controller(&self) -> &WorkflowController {
        &self.controller
    }

    pub fn set_source_text(&mut self, text: impl Into<String>) {
        self.controller.set_source_text(text);
    }

    pub fn run_analysis(&mut self) {
        let effects = self.controller.run_analysis();
        self.dispatcher.dispatch(effects);
    }

    pub fn select_function(&mut self, name: Option<String>) {
        let effects = self.controller.select_function(name);
        self.dispatcher.dispatch(effects);
    }

    /// Applies every completion that is already waiting. Never blocks.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Blocks until nothing the controller tracks is in flight.
    ///
    /// Returns `false` when `timeout` elapses first.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.controller.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) => self.apply(event),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
        true
    }

    fn apply(&mut self, event: WorkflowEvent) {
        let effects = self.controller.handle_event(event);
        self.dispatcher.dispatch(effects);
    }
}
