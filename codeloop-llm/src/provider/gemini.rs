//! Google Gemini provider implementation
//!
//! Talks to the Generative Language REST API:
//! `POST {base}/models/{model}:generateContent`

use super::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = config.http_client(120)?;
        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or("https://generativelanguage.googleapis.com/v1beta")
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn models(&self) -> Vec<String> {
        vec![
            "gemini-1.5-pro-latest".into(),
            "gemini-1.5-flash-latest".into(),
            "gemini-2.0-flash".into(),
            "gemini-2.5-pro".into(),
        ]
    }

    fn default_model(&self) -> &str {
        self.config.default_model.as_deref().unwrap_or("gemini-1.5-pro-latest")
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let model = request.model.as_deref().unwrap_or(self.default_model()).to_string();
        let api_request = GeminiRequest::from(&request);

        let api_key = self.config.api_key.as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::AuthenticationFailed)?;

        let mut req = self.client
            .post(format!("{}/models/{}:generateContent", self.base_url(), model))
            .header("x-goog-api-key", api_key)
            .json(&api_request);

        for (key, value) in &self.config.headers {
            req = req.header(key, value);
        }

        let response = req.send().await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after = retry_after_secs(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, text, retry_after));
        }

        let api_response: GeminiResponse = response.json().await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        api_response.into_completion(model)
    }
}

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl From<&CompletionRequest> for GeminiRequest {
    fn from(request: &CompletionRequest) -> Self {
        let contents = request
            .dialogue()
            .map(|m| GeminiContent {
                role: Some(match m.role {
                    Role::Assistant => "model".into(),
                    Role::User | Role::System => "user".into(),
                }),
                parts: vec![GeminiPart { text: Some(m.content.clone()) }],
            })
            .collect();

        let system_instruction = request.system_prompt().map(|s| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: Some(s.to_string()) }],
        });

        let generation_config = if request.temperature.is_some()
            || request.max_tokens.is_some()
            || request.stop.is_some()
        {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                stop_sequences: request.stop.clone(),
            })
        } else {
            None
        };

        Self {
            contents,
            system_instruction,
            generation_config,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    response_id: Option<String>,
    model_version: Option<String>,
}

impl GeminiResponse {
    fn into_completion(self, requested_model: String) -> Result<CompletionResponse, ProviderError> {
        let candidate = self.candidates.into_iter().next()
            .ok_or_else(|| ProviderError::Other("No candidates in response (prompt blocked?)".into()))?;

        // A candidate with no text parts is an empty reply, not a missing one
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => FinishReason::ContentFilter,
            _ => FinishReason::Unknown,
        };

        let usage = self.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }).unwrap_or_default();

        Ok(CompletionResponse {
            id: self.response_id.unwrap_or_default(),
            model: self.model_version.unwrap_or(requested_model),
            content: Some(text),
            finish_reason,
            usage,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
    #[serde(default)]
    total_token_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("You are a Python coder."),
            ChatMessage::user("write a function that adds two numbers"),
            ChatMessage::assistant("def add(a, b): return a + b"),
        ])
        .with_max_tokens(256);

        let body = serde_json::to_value(GeminiRequest::from(&request)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a Python coder.");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn test_plain_prompt_has_no_generation_config() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]);
        let body = serde_json::to_value(GeminiRequest::from(&request)).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "```python\n"}, {"text": "print(4)\n```"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 6, "totalTokenCount": 15},
            "modelVersion": "gemini-1.5-pro-002"
        }"#;

        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        let completion = response.into_completion("gemini-1.5-pro-latest".into()).unwrap();
        assert_eq!(completion.content.as_deref(), Some("```python\nprint(4)\n```"));
        assert_eq!(completion.model, "gemini-1.5-pro-002");
        assert_eq!(completion.usage.total_tokens, 15);
        assert_eq!(completion.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn test_empty_candidate_is_empty_reply() {
        let raw = r#"{
            "candidates": [{"content": {"role": "model", "parts": []}, "finishReason": "STOP"}]
        }"#;

        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        let completion = response.into_completion("gemini-1.5-pro-latest".into()).unwrap();
        assert_eq!(completion.content.as_deref(), Some(""));
        assert_eq!(completion.model, "gemini-1.5-pro-latest");
    }

    #[test]
    fn test_safety_stop_maps_to_content_filter() {
        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        let completion = response.into_completion("gemini".into()).unwrap();
        assert_eq!(completion.finish_reason, FinishReason::ContentFilter);
    }

    #[test]
    fn test_blocked_prompt() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert!(response.into_completion("gemini".into()).is_err());
    }

    #[tokio::test]
    async fn test_missing_key() {
        let provider = GeminiProvider::new(ProviderConfig::for_type(ProviderType::Gemini, None)).unwrap();
        tokio_test::assert_err!(provider.prompt("hi").await);
    }
}
