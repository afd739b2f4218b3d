//! The consumer side of a generation: one assistant popover accumulating a
//! streamed response.

use super::action::AiAction;
use super::parser::AIResponseSegments;
use super::service::AiService;
use futures::StreamExt;
use log::{debug, warn};

/// Where the session is in its current request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Streaming,
    Finished,
    Cancelled,
    /// The client failed; the text received before the failure is kept
    Failed(String),
}

/// State of one assistant popover.
///
/// At most one request runs per session: `run` takes `&mut self` and clears
/// the previous response before anything else. Cancelling goes through a
/// clone of the service handle, see [`AssistantSession::service`].
pub struct AssistantSession {
    service: AiService,
    action: AiAction,
    response: String,
    phase: SessionPhase,
}

impl AssistantSession {
    pub fn new(service: AiService, action: AiAction) -> Self {
        Self {
            service,
            action,
            response: String::new(),
            phase: SessionPhase::Idle,
        }
    }

    pub fn action(&self) -> AiAction {
        self.action
    }

    /// Switch mode, e.g. from generate to explain. Clears the response.
    pub fn set_action(&mut self, action: AiAction) {
        self.action = action;
        self.response.clear();
        self.phase = SessionPhase::Idle;
    }

    /// Service handle; clone it to cancel from elsewhere while `run` awaits.
    pub fn service(&self) -> &AiService {
        &self.service
    }

    pub fn cancel(&self) {
        self.service.cancel();
    }

    /// Send a request and append tokens until the stream ends, is cancelled
    /// or fails.
    pub async fn run(&mut self, input: &str, context: &str) -> &SessionPhase {
        self.response.clear();
        self.phase = SessionPhase::Streaming;

        let (ticket, mut tokens) = self.service.start(self.action, input, context);

        while let Some(token) = tokens.next().await {
            match token {
                Ok(token) => self.response.push_str(&token),
                Err(e) => {
                    warn!("Assistant request failed: {}", e);
                    self.phase = SessionPhase::Failed(e.user_message());
                    return &self.phase;
                }
            }
        }

        self.phase = if self.service.current_generation() == ticket {
            SessionPhase::Finished
        } else {
            SessionPhase::Cancelled
        };
        debug!(
            "Assistant request ended: {:?} ({} chars)",
            self.phase,
            self.response.len()
        );
        &self.phase
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_streaming(&self) -> bool {
        self.phase == SessionPhase::Streaming
    }

    /// Raw accumulated text.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// The response split for display. Prose-only actions never look for a
    /// formula.
    pub fn segments(&self) -> AIResponseSegments {
        if self.action.expects_formula() {
            AIResponseSegments::parse(&self.response)
        } else {
            AIResponseSegments {
                formula: None,
                explanation: self.response.clone(),
            }
        }
    }
}
