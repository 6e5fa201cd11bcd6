use tracing::{debug, warn};

use crate::ai::InferenceEndpoint;
use crate::error::{ApiFailure, CREDENTIAL_REQUIRED};
use crate::pipeline::RequestPipeline;
use crate::state::ChatMessage;

/// Whatever renders the conversation. The session only calls into it.
pub trait DisplaySurface {
    fn append_message(&mut self, message: ChatMessage);
    fn show_typing_indicator(&mut self);
    fn clear_typing_indicator(&mut self);
    fn set_input_enabled(&mut self, enabled: bool);
}

/// What a call to [`ChatSession::submit`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// No API key: the user was told, the endpoint was not called.
    CredentialMissing,
    Answered,
    Failed(ApiFailure),
}

/// One chat, bound to an endpoint and a display surface.
///
/// `submit` takes `&mut self`, so a session can never have two requests in
/// flight at once.
pub struct ChatSession<E, D> {
    pipeline: RequestPipeline<E>,
    display: D,
}

impl<E: InferenceEndpoint, D: DisplaySurface> ChatSession<E, D> {
    pub fn new(pipeline: RequestPipeline<E>, display: D) -> Self {
        Self { pipeline, display }
    }

    pub fn pipeline(&self) -> &RequestPipeline<E> {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut RequestPipeline<E> {
        &mut self.pipeline
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        let message = input.trim();
        if message.is_empty() {
            return SubmitOutcome::Ignored;
        }

        if !self.pipeline.has_credential() {
            debug!("session.credential_missing");
            self.display
                .append_message(ChatMessage::error(CREDENTIAL_REQUIRED));
            return SubmitOutcome::CredentialMissing;
        }

        self.display.append_message(ChatMessage::user(message));
        self.display.set_input_enabled(false);
        self.display.show_typing_indicator();

        let result = self.pipeline.send(message).await;

        self.display.clear_typing_indicator();
        let outcome = match result {
            Ok(reply) => {
                self.display.append_message(ChatMessage::bot(&reply));
                SubmitOutcome::Answered
            }
            Err(failure) => {
                warn!(error = %failure, "session.send_failed");
                self.display
                    .append_message(ChatMessage::error(failure.user_message()));
                SubmitOutcome::Failed(failure)
            }
        };
        self.display.set_input_enabled(true);
        outcome
    }
}
