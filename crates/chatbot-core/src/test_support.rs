//! In-memory fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use crate::ai::{EndpointResponse, InferenceEndpoint};
use crate::error::ApiFailure;
use crate::request::GenerateContentRequest;
use crate::session::DisplaySurface;
use crate::state::ChatMessage;

/// Replays canned replies in order and records every request it receives.
#[derive(Clone, Default)]
pub struct ScriptedEndpoint {
    replies: Arc<Mutex<VecDeque<Result<EndpointResponse, ApiFailure>>>>,
    calls: Arc<Mutex<Vec<(Instant, GenerateContentRequest)>>>,
    missing_credential: bool,
}

impl ScriptedEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_credential() -> Self {
        Self {
            missing_credential: true,
            ..Self::default()
        }
    }

    pub fn reply(self, status: u16, body: &str) -> Self {
        self.push(Ok(EndpointResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn text(self, text: &str) -> Self {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        });
        self.reply(200, &body.to_string())
    }

    pub fn fail(self, failure: ApiFailure) -> Self {
        self.push(Err(failure))
    }

    fn push(self, reply: Result<EndpointResponse, ApiFailure>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<(Instant, GenerateContentRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl InferenceEndpoint for ScriptedEndpoint {
    fn has_credential(&self) -> bool {
        !self.missing_credential
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<EndpointResponse, ApiFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted endpoint ran out of replies")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Append(ChatMessage),
    ShowTyping,
    ClearTyping,
    InputEnabled(bool),
}

/// Display surface that just remembers what it was asked to do.
#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn messages(&self) -> Vec<&ChatMessage> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Append(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl DisplaySurface for RecordingSurface {
    fn append_message(&mut self, message: ChatMessage) {
        self.calls.push(SurfaceCall::Append(message));
    }

    fn show_typing_indicator(&mut self) {
        self.calls.push(SurfaceCall::ShowTyping);
    }

    fn clear_typing_indicator(&mut self) {
        self.calls.push(SurfaceCall::ClearTyping);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::InputEnabled(enabled));
    }
}
