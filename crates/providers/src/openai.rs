//! OpenAI-compatible chat-completions boundary. Works against
//! api.openai.com or any server speaking the same protocol via
//! `with_base_url`.

use log::debug;
use serde::Deserialize;
use serde_json::json;

use sema_core::{BoundaryError, Content, Message, ModelBoundary, ModelParams, Part};

/// Default API root.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when the caller's params leave it empty.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A synchronous chat-completions client.
pub struct OpenAiBoundary {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
}

impl OpenAiBoundary {
    pub fn new(api_key: impl Into<String>) -> Self {
        OpenAiBoundary {
            agent: ureq::Agent::new_with_defaults(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    /// Points the client at an OpenAI-compatible server, e.g. a local
    /// llama.cpp or vLLM endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl ModelBoundary for OpenAiBoundary {
    fn invoke(&self, messages: &[Message], params: &ModelParams) -> Result<String, BoundaryError> {
        let body = build_request_body(messages, params);
        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {url} ({} messages)", messages.len());

        let response = self
            .agent
            .post(&url)
            .header("authorization", &format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .send_json(&body)
            .map_err(|e| BoundaryError::Transport {
                message: format!("request failed: {}", e),
            })?;

        let parsed: ChatResponse =
            response
                .into_body()
                .read_json()
                .map_err(|e| BoundaryError::Payload {
                    message: format!("failed to parse response: {}", e),
                })?;

        reply_text(parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ── Request construction ─────────────────────────────────────────────────────

fn build_request_body(messages: &[Message], params: &ModelParams) -> serde_json::Value {
    let model = if params.model.is_empty() {
        DEFAULT_MODEL
    } else {
        params.model.as_str()
    };
    let wire: Vec<serde_json::Value> = messages.iter().map(wire_message).collect();
    let mut body = json!({
        "model": model,
        "messages": wire,
    });
    if let Some(temperature) = params.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = params.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    for (key, value) in &params.extra {
        body[key.as_str()] = value.clone();
    }
    body
}

fn wire_message(message: &Message) -> serde_json::Value {
    let content = match &message.content {
        Content::Text(text) => json!(text),
        Content::Parts(parts) => json!(parts.iter().map(wire_part).collect::<Vec<_>>()),
    };
    json!({ "role": message.role.as_str(), "content": content })
}

/// Media parts become `image_url` entries with the detail hint. Video
/// values ride the same shape; the core never transcodes them.
fn wire_part(part: &Part) -> serde_json::Value {
    match part {
        Part::Text { text } => json!({ "type": "text", "text": text }),
        Part::Media { media } => json!({
            "type": "image_url",
            "image_url": { "url": media.as_url(), "detail": media.detail.as_str() },
        }),
    }
}

// ── Response parsing ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn reply_text(response: ChatResponse) -> Result<String, BoundaryError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| BoundaryError::Payload {
            message: "response contained no text content".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_core::{MediaDetail, MediaValue};

    // ── Request construction tests ───────────────────────────────────────────

    #[test]
    fn test_body_carries_roles_and_text() {
        let messages = vec![
            Message::system("be terse"),
            Message::user("count to three"),
        ];
        let body = build_request_body(&messages, &ModelParams::new("gpt-4o-mini"));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be terse");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "count to three");
    }

    #[test]
    fn test_empty_model_falls_back_to_default() {
        let body = build_request_body(&[Message::user("hi")], &ModelParams::default());
        assert_eq!(body["model"], DEFAULT_MODEL);
    }

    #[test]
    fn test_optional_params_and_extras_are_merged() {
        let params = ModelParams::new("gpt-4o-mini")
            .with_temperature(0.2)
            .with_max_tokens(256)
            .with_extra("seed", json!(7));
        let body = build_request_body(&[Message::user("hi")], &params);
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["seed"], 7);

        let bare = build_request_body(&[Message::user("hi")], &ModelParams::new("m"));
        assert!(bare.get("temperature").is_none());
        assert!(bare.get("max_tokens").is_none());
    }

    #[test]
    fn test_media_parts_become_image_url_entries() {
        let media = MediaValue::from_bytes(sema_core::MediaKind::Image, "png", b"\x89PNG")
            .with_detail(MediaDetail::High);
        let messages = vec![Message::parts(
            sema_core::Role::User,
            vec![Part::text("look at this"), Part::media(media)],
        )];
        let body = build_request_body(&messages, &ModelParams::new("gpt-4o-mini"));
        let parts = &body["messages"][0]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "look at this");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["detail"], "high");
        let url = parts[1]["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"), "{url}");
    }

    // ── Response parsing tests ───────────────────────────────────────────────

    #[test]
    fn test_reply_text_takes_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"pong"}}]}"#,
        )
        .unwrap();
        assert_eq!(reply_text(response).unwrap(), "pong");
    }

    #[test]
    fn test_reply_without_content_is_a_payload_error() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(matches!(
            reply_text(response),
            Err(BoundaryError::Payload { .. })
        ));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            reply_text(empty),
            Err(BoundaryError::Payload { .. })
        ));
    }

    // ── Integration test (requires API key, skipped in CI) ───────────────────

    #[test]
    #[ignore]
    fn test_openai_integration() {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let boundary = OpenAiBoundary::new(api_key);
        let reply = boundary
            .invoke(
                &[Message::user("Reply with the single word: pong")],
                &ModelParams::new("gpt-4o-mini"),
            )
            .unwrap();
        assert!(!reply.is_empty());
    }
}
