//! Request payload for the `generateContent` endpoint.
//!
//! Building the payload is pure: the same message and config always produce
//! the same request, which the pipeline reuses across retry attempts.

use std::collections::BTreeMap;

use serde::Serialize;

/// Harm categories the endpoint filters on.
///
/// Declaration order is the order the settings are sent in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

impl HarmCategory {
    pub fn all() -> Vec<HarmCategory> {
        vec![
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

/// Generation parameters sent with every request. Constant for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
    pub safety_thresholds: BTreeMap<HarmCategory, BlockThreshold>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
            safety_thresholds: HarmCategory::all()
                .into_iter()
                .map(|category| (category, BlockThreshold::BlockMediumAndAbove))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

/// Embed `message` as the single content part of a single-turn request.
pub fn build_request(message: &str, config: &RequestConfig) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: message.to_string(),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        },
        safety_settings: config
            .safety_thresholds
            .iter()
            .map(|(category, threshold)| SafetySetting {
                category: *category,
                threshold: *threshold,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_is_embedded_verbatim() {
        let message = "  keep *this* exactly\nas typed ";
        let request = build_request(message, &RequestConfig::default());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], message);
        assert_eq!(value["contents"].as_array().unwrap().len(), 1);
        assert_eq!(value["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_default_payload_shape() {
        let request = build_request("hi", &RequestConfig::default());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{ "parts": [{ "text": "hi" }] }],
                "generationConfig": {
                    "temperature": 0.7,
                    "topK": 40,
                    "topP": 0.95,
                    "maxOutputTokens": 1024
                },
                "safetySettings": [
                    { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                    { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                    { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                    { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" }
                ]
            })
        );
    }

    #[test]
    fn test_custom_threshold_is_sent() {
        let mut config = RequestConfig::default();
        config
            .safety_thresholds
            .insert(HarmCategory::HateSpeech, BlockThreshold::BlockLowAndAbove);
        let request = build_request("hi", &config);
        assert_eq!(request.safety_settings.len(), 4);
        assert_eq!(request.safety_settings[1].category, HarmCategory::HateSpeech);
        assert_eq!(request.safety_settings[1].threshold, BlockThreshold::BlockLowAndAbove);
    }
}
