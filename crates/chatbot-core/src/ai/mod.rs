pub mod gemini;

use std::future::Future;

use crate::error::ApiFailure;
use crate::request::GenerateContentRequest;

pub use gemini::GeminiClient;

/// Raw reply from the inference endpoint, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: String,
}

impl EndpointResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The remote inference endpoint, as seen by the request pipeline.
///
/// Implementations perform exactly one HTTP call per `generate_content` and
/// report transport errors as [`ApiFailure::Network`]. Status codes are left
/// for the pipeline to judge.
pub trait InferenceEndpoint {
    fn has_credential(&self) -> bool;

    fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> impl Future<Output = Result<EndpointResponse, ApiFailure>> + Send;
}
