//! Live adapter for the `LlmClient` port using an OpenAI-compatible
//! chat-completions endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::ports::llm::{
    CompletionFuture, CompletionRequest, CompletionResponse, LlmClient, LlmError,
};

/// Live LLM client that posts to the configured AI service.
pub struct LiveLlmClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl LiveLlmClient {
    /// Creates a live client from AI service settings.
    ///
    /// # Errors
    ///
    /// Returns an error string if the HTTP client cannot be constructed.
    pub fn new(config: &AiConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self { client, url: config.url.clone(), api_key: config.api_key.clone() })
    }
}

/// Request body sent to the chat-completions endpoint.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

/// A single message in the chat request.
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Top-level response from the chat-completions endpoint.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Token usage reported by the service.
#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Error envelope returned by OpenAI-compatible services.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl LlmClient for LiveLlmClient {
    fn endpoint(&self) -> String {
        self.url.clone()
    }

    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        let request = request.clone();

        Box::pin(async move {
            let body = ChatRequest {
                model: &request.model,
                max_tokens: request.max_tokens,
                messages: vec![ChatMessage { role: "user", content: &request.prompt }],
                stream: false,
            };

            let mut builder = self.client.post(&self.url).json(&body);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            let response = builder.send().await.map_err(|e| -> LlmError {
                format!("AI service request failed: {e}").into()
            })?;

            let status = response.status();
            let response_text = response.text().await.map_err(|e| -> LlmError {
                format!("failed to read AI service response: {e}").into()
            })?;

            if !status.is_success() {
                let msg = serde_json::from_str::<ErrorEnvelope>(&response_text)
                    .map(|e| e.error.message)
                    .unwrap_or(response_text);
                return Err(format!("AI service error ({}): {msg}", status.as_u16()).into());
            }

            parse_chat_response(&response_text)
        })
    }
}

fn parse_chat_response(body: &str) -> Result<CompletionResponse, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body).map_err(|e| -> LlmError {
        format!("failed to parse AI service response: {e}").into()
    })?;

    let text = parsed
        .choices
        .into_iter()
        .filter_map(|choice| choice.message.content)
        .collect::<String>();
    let (prompt_tokens, completion_tokens) =
        parsed.usage.map_or((0, 0), |u| (u.prompt_tokens, u.completion_tokens));

    Ok(CompletionResponse { text, prompt_tokens, completion_tokens })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_choice_content_and_usage() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "{\"risks\": []}"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }"#;
        let response = parse_chat_response(body).unwrap();
        assert_eq!(response.text, r#"{"risks": []}"#);
        assert_eq!(response.prompt_tokens, 12);
        assert_eq!(response.completion_tokens, 3);
    }

    #[test]
    fn missing_usage_defaults_to_zero() {
        let body = r#"{"choices": [{"message": {"content": "ok"}}]}"#;
        let response = parse_chat_response(body).unwrap();
        assert_eq!(response.text, "ok");
        assert_eq!(response.prompt_tokens, 0);
    }

    #[test]
    fn malformed_body_is_an_error() {
        let err = parse_chat_response("<html>bad gateway</html>").unwrap_err();
        assert!(err.to_string().contains("failed to parse AI service response"));
    }

    #[test]
    fn endpoint_reports_configured_url() {
        let config =
            AiConfig { url: "http://127.0.0.1:9/v1/chat/completions".into(), ..AiConfig::default() };
        let client = LiveLlmClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let config = AiConfig {
            url: "http://127.0.0.1:9/v1/chat/completions".into(),
            timeout: std::time::Duration::from_secs(2),
            ..AiConfig::default()
        };
        let client = LiveLlmClient::new(&config).unwrap();
        let request = CompletionRequest { model: "m".into(), prompt: "hi".into(), max_tokens: 8 };
        let err = client.complete(&request).await.unwrap_err();
        assert!(err.to_string().contains("AI service request failed"));
    }
}
