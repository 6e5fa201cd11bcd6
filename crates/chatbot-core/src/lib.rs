pub mod ai;
pub mod error;
pub mod markup;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod retry;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use ai::{EndpointResponse, GeminiClient, InferenceEndpoint};
pub use error::{ApiFailure, CREDENTIAL_REQUIRED};
pub use markup::format;
pub use pipeline::RequestPipeline;
pub use request::{build_request, BlockThreshold, GenerateContentRequest, HarmCategory, RequestConfig};
pub use response::{Completion, SAFETY_GUIDANCE};
pub use retry::RetryPolicy;
pub use session::{ChatSession, DisplaySurface, SubmitOutcome};
pub use state::{ChatMessage, Sender};
