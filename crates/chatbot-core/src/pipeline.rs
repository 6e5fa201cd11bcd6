use tracing::{debug, info, warn};

use crate::ai::InferenceEndpoint;
use crate::error::ApiFailure;
use crate::request::{build_request, GenerateContentRequest, RequestConfig};
use crate::response::{error_message, interpret, Completion, SAFETY_GUIDANCE};
use crate::retry::RetryPolicy;

/// Sends single-turn messages to an inference endpoint, retrying overloads.
pub struct RequestPipeline<E> {
    endpoint: E,
    config: RequestConfig,
    retry: RetryPolicy,
}

impl<E: InferenceEndpoint> RequestPipeline<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            config: RequestConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }

    pub fn has_credential(&self) -> bool {
        self.endpoint.has_credential()
    }

    /// Send `message` and return the text to show.
    ///
    /// A safety block is not a failure: it yields [`SAFETY_GUIDANCE`].
    /// Callers must not pass empty input.
    pub async fn send(&self, message: &str) -> Result<String, ApiFailure> {
        let request = build_request(message, &self.config);
        match self.execute(&request).await? {
            Completion::Text(text) => Ok(text),
            Completion::SafetyBlocked => {
                info!("gemini.safety_blocked");
                Ok(SAFETY_GUIDANCE.to_string())
            }
        }
    }

    async fn execute(&self, request: &GenerateContentRequest) -> Result<Completion, ApiFailure> {
        let mut attempt = 1;
        loop {
            debug!(attempt, max_attempts = self.retry.max_attempts(), "gemini.attempt");
            let response = self
                .endpoint
                .generate_content(request)
                .await
                .inspect_err(|err| warn!(attempt, error = %err, "gemini.transport_failed"))?;

            if response.is_success() {
                return interpret(&response.body)
                    .inspect_err(|_| warn!(attempt, status = response.status, "gemini.invalid_response"));
            }

            let failure = ApiFailure::HttpStatus {
                status: response.status,
                message: error_message(&response.body),
            };
            if !failure.is_transient() {
                warn!(attempt, error = %failure, "gemini.request_failed");
                return Err(failure);
            }
            if !self.retry.allows_retry_after(attempt) {
                warn!(attempts = attempt, "gemini.retries_exhausted");
                return Err(ApiFailure::RetriesExhausted { attempts: attempt });
            }

            let delay = self.retry.delay_after(attempt);
            warn!(attempt, ?delay, "gemini.overloaded; retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
