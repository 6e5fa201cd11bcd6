use serde::Deserialize;

use crate::error::ApiFailure;

/// Returned in place of generated text when the reply was blocked for safety.
pub const SAFETY_GUIDANCE: &str = "I can't provide a response to that request due to safety guidelines. Please try rephrasing your question.";

const SAFETY_FINISH_REASON: &str = "SAFETY";

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Terminal outcome of a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    SafetyBlocked,
}

/// Interpret a 2xx body from `generateContent`.
pub fn interpret(body: &str) -> Result<Completion, ApiFailure> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|_| ApiFailure::InvalidFormat)?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ApiFailure::InvalidFormat)?;

    if let Some(content) = candidate.content {
        let texts: Vec<String> = content.parts.into_iter().filter_map(|p| p.text).collect();
        if !texts.is_empty() {
            return Ok(Completion::Text(texts.concat()));
        }
    }

    if candidate.finish_reason.as_deref() == Some(SAFETY_FINISH_REASON) {
        return Ok(Completion::SafetyBlocked);
    }

    Err(ApiFailure::InvalidFormat)
}

/// Pull `error.message` out of a non-2xx body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| "Unknown error".to_string())
}
