//! Gemini API client struct, request building, and stream decoding.

use tracing::debug;

use crate::streaming::{parse_sse_stream, SseEvent};
use crate::{AiError, Role, Turn};

use super::config::GeminiConfig;

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        // No overall timeout: a reply stream may legitimately run for minutes.
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub(crate) fn stream_url(&self) -> String {
        format!(
            "{}/{}:streamGenerateContent?alt=sse",
            self.config.base_url, self.config.model
        )
    }

    /// Build the JSON request body for one streamed turn.
    ///
    /// `history` is the conversation so far; `user_text` is appended as the
    /// final user turn. Turns with empty text are left out because the API
    /// rejects empty parts.
    pub(crate) fn build_request_body(
        &self,
        system_instruction: Option<&str>,
        history: &[Turn],
        user_text: &str,
    ) -> serde_json::Value {
        let user_turn = Turn::user(user_text);
        let contents: Vec<_> = history
            .iter()
            .filter(|turn| !turn.text.is_empty())
            .chain(std::iter::once(&user_turn))
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": turn.text }]
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        });

        if let Some(system) = system_instruction.filter(|s| !s.is_empty()) {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system }]
            });
        }

        body
    }

    /// POST `body` to the streaming endpoint, calling `on_fragment` with each
    /// non-empty text fragment. Returns the full concatenated reply.
    pub(crate) async fn stream_generate(
        &self,
        body: serde_json::Value,
        mut on_fragment: impl FnMut(String),
    ) -> Result<String, AiError> {
        debug!(model = %self.config.model, "Gemini API streaming request");

        let response = self
            .http
            .post(self.stream_url())
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        let mut full_content = String::new();
        parse_sse_stream(response, |event: SseEvent| {
            let chunk = extract_fragment(&event.data)?;
            if !chunk.is_empty() {
                full_content.push_str(&chunk);
                on_fragment(chunk);
            }
            Ok(())
        })
        .await?;

        Ok(full_content)
    }
}

/// Pull the text out of one streamed `GenerateContentResponse` payload.
///
/// An `error` object in the payload ends the stream with `ApiError`.
pub(crate) fn extract_fragment(data: &str) -> Result<String, AiError> {
    let json: serde_json::Value =
        serde_json::from_str(data).map_err(|e| AiError::ParseError(e.to_string()))?;

    if let Some(error) = json.get("error") {
        let message = error["message"].as_str().unwrap_or("unknown error");
        return Err(AiError::ApiError(message.to_string()));
    }

    let mut chunk = String::new();
    if let Some(candidates) = json["candidates"].as_array() {
        for candidate in candidates {
            if let Some(parts) = candidate["content"]["parts"].as_array() {
                for text in parts.iter().filter_map(|p| p["text"].as_str()) {
                    chunk.push_str(text);
                }
            }
        }
    }
    Ok(chunk)
}
