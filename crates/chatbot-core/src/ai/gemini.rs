use reqwest::Client;
use tracing::debug;

use crate::ai::{EndpointResponse, InferenceEndpoint};
use crate::error::ApiFailure;
use crate::request::GenerateContentRequest;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.trim().to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = api_key.trim().to_string();
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl InferenceEndpoint for GeminiClient {
    fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<EndpointResponse, ApiFailure> {
        debug!(model = %self.model, "gemini.generate_content");

        // The key travels in the query string, so reqwest errors must not carry the URL.
        let response = self
            .client
            .post(self.endpoint_url())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|err| ApiFailure::Network(err.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| ApiFailure::Network(err.without_url().to_string()))?;

        Ok(EndpointResponse { status, body })
    }
}
