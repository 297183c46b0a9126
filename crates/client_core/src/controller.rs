//! Submission lifecycle: validate, classify, normalize, record.

use std::sync::Arc;

use shared::{error::FailureKind, protocol::PredictRequest};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    classifier::Classifier,
    error::WorkflowError,
    history::HistoryList,
    normalizer::{normalize, Prediction},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Error {
        kind: FailureKind,
        message: String,
    },
    Result,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Error { .. } => "error",
            Phase::Result => "result",
        }
    }
}

/// Observable controller state. The last successful result stays visible
/// through later error phases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    pub phase: Phase,
    pub current_result: Option<Arc<Prediction>>,
    pub history: HistoryList,
}

impl WorkflowState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    fn with_phase(&self, phase: Phase) -> Self {
        Self {
            phase,
            current_result: self.current_result.clone(),
            history: self.history.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    StateChanged(WorkflowState),
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Completed(Arc<Prediction>),
    Failed(WorkflowError),
    /// A later submission or a clear took over before this response arrived.
    Superseded,
}

struct ControllerInner {
    state: WorkflowState,
    latest_token: u64,
}

pub struct WorkflowController {
    classifier: Arc<dyn Classifier>,
    inner: Mutex<ControllerInner>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl WorkflowController {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            classifier,
            inner: Mutex::new(ControllerInner {
                state: WorkflowState::default(),
                latest_token: 0,
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> WorkflowState {
        self.inner.lock().await.state.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.state.is_loading()
    }

    pub async fn submit(&self, text: &str, title: Option<&str>) -> SubmitOutcome {
        if text.trim().is_empty() {
            let error = WorkflowError::EmptyArticle;
            // Issues no call, so a request already in flight stays current.
            let mut guard = self.inner.lock().await;
            let next = guard.state.with_phase(Phase::Error {
                kind: error.kind(),
                message: error.user_message(),
            });
            self.commit(&mut guard, next);
            debug!("rejected empty article before classification");
            return SubmitOutcome::Failed(error);
        }

        let request = PredictRequest::compose(text, title);
        let token = {
            let mut guard = self.inner.lock().await;
            guard.latest_token += 1;
            let next = guard.state.with_phase(Phase::Loading);
            self.commit(&mut guard, next);
            guard.latest_token
        };
        info!(token, "submitting article for classification");

        let outcome = self
            .classifier
            .classify(&request)
            .await
            .and_then(|raw| normalize(&raw, text));

        let mut guard = self.inner.lock().await;
        if guard.latest_token != token {
            debug!(
                token,
                latest = guard.latest_token,
                "discarding superseded classifier response"
            );
            return SubmitOutcome::Superseded;
        }

        match outcome {
            Ok(prediction) => {
                let prediction = Arc::new(prediction);
                let next = WorkflowState {
                    phase: Phase::Result,
                    current_result: Some(prediction.clone()),
                    history: guard.state.history.append(prediction.clone()),
                };
                self.commit(&mut guard, next);
                info!(
                    token,
                    id = %prediction.id,
                    label = %prediction.label,
                    confidence = prediction.confidence,
                    "classification completed"
                );
                SubmitOutcome::Completed(prediction)
            }
            Err(err) => {
                let error = WorkflowError::from(err);
                warn!(token, kind = ?error.kind(), "classification failed: {error}");
                let next = guard.state.with_phase(Phase::Error {
                    kind: error.kind(),
                    message: error.user_message(),
                });
                self.commit(&mut guard, next);
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Drops the current result, error, and history. Any response still in
    /// flight is discarded when it lands.
    pub async fn clear(&self) {
        let mut guard = self.inner.lock().await;
        guard.latest_token += 1;
        let next = WorkflowState {
            phase: Phase::Idle,
            current_result: None,
            history: guard.state.history.clear(),
        };
        self.commit(&mut guard, next);
        info!("cleared prediction history");
    }

    fn commit(&self, inner: &mut ControllerInner, next: WorkflowState) {
        debug!(
            from = inner.state.phase.name(),
            to = next.phase.name(),
            "workflow transition"
        );
        inner.state = next;
        let _ = self
            .events
            .send(WorkflowEvent::StateChanged(inner.state.clone()));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
