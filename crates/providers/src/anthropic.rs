//! Anthropic Messages API boundary.
//!
//! The Messages API keeps the system text outside the message list and
//! rejects consecutive turns from the same role, so a leading
//! system-role message is folded into the `system` field, remaining
//! system turns are demoted to user turns, and adjacent same-role turns
//! are re-coalesced before serialization.

use log::debug;
use serde::Deserialize;
use serde_json::json;

use sema_core::message::coalesce;
use sema_core::{
    BoundaryError, Content, MediaKind, MediaSource, Message, ModelBoundary, ModelParams, Part,
    Role,
};

/// Default API root.
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Required API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model used when the caller's params leave it empty.
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// The API requires max_tokens; this is the fallback when params omit it.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A synchronous Messages API client.
pub struct AnthropicBoundary {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
}

impl AnthropicBoundary {
    pub fn new(api_key: impl Into<String>) -> Self {
        AnthropicBoundary {
            agent: ureq::Agent::new_with_defaults(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl ModelBoundary for AnthropicBoundary {
    fn invoke(&self, messages: &[Message], params: &ModelParams) -> Result<String, BoundaryError> {
        let body = build_request_body(messages, params)?;
        let url = format!("{}/v1/messages", self.base_url);
        debug!("POST {url} ({} messages)", messages.len());

        let response = self
            .agent
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .send_json(&body)
            .map_err(|e| BoundaryError::Transport {
                message: format!("request failed: {}", e),
            })?;

        let parsed: MessagesResponse =
            response
                .into_body()
                .read_json()
                .map_err(|e| BoundaryError::Payload {
                    message: format!("failed to parse response: {}", e),
                })?;

        reply_text(parsed)
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

// ── Request construction ─────────────────────────────────────────────────────

fn build_request_body(
    messages: &[Message],
    params: &ModelParams,
) -> Result<serde_json::Value, BoundaryError> {
    let model = if params.model.is_empty() {
        DEFAULT_MODEL
    } else {
        params.model.as_str()
    };
    let (system, rest) = split_system(messages);
    let wire = rest
        .iter()
        .map(wire_message)
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = json!({
        "model": model,
        "max_tokens": params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "messages": wire,
    });
    if let Some(system) = system {
        body["system"] = json!(system);
    }
    if let Some(temperature) = params.temperature {
        body["temperature"] = json!(temperature);
    }
    for (key, value) in &params.extra {
        body[key.as_str()] = value.clone();
    }
    Ok(body)
}

/// Folds a leading system message into the `system` field and demotes
/// any remaining system turns to user turns, re-merging neighbors.
fn split_system(messages: &[Message]) -> (Option<String>, Vec<Message>) {
    let (system, rest) = match messages.split_first() {
        Some((first, rest)) if first.role == Role::System => {
            (Some(first.content.flat_text()), rest)
        }
        _ => (None, messages),
    };
    let demoted = rest
        .iter()
        .cloned()
        .map(|mut message| {
            if message.role == Role::System {
                message.role = Role::User;
            }
            message
        })
        .collect();
    (system, coalesce(demoted))
}

fn wire_message(message: &Message) -> Result<serde_json::Value, BoundaryError> {
    let content = match &message.content {
        Content::Text(text) => json!(text),
        Content::Parts(parts) => {
            let blocks = parts
                .iter()
                .map(wire_part)
                .collect::<Result<Vec<_>, _>>()?;
            json!(blocks)
        }
    };
    Ok(json!({ "role": message.role.as_str(), "content": content }))
}

fn wire_part(part: &Part) -> Result<serde_json::Value, BoundaryError> {
    match part {
        Part::Text { text } => Ok(json!({ "type": "text", "text": text })),
        Part::Media { media } => match (&media.kind, &media.source) {
            (MediaKind::Image, MediaSource::Inline { mime, data }) => Ok(json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": format!("image/{mime}"),
                    "data": data,
                },
            })),
            (MediaKind::Image, MediaSource::Url(url)) => Ok(json!({
                "type": "image",
                "source": { "type": "url", "url": url },
            })),
            (MediaKind::Video, _) => Err(BoundaryError::Payload {
                message: "the messages api has no video content block".to_string(),
            }),
        },
    }
}

// ── Response parsing ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[allow(dead_code)]
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

fn reply_text(response: MessagesResponse) -> Result<String, BoundaryError> {
    response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .ok_or_else(|| BoundaryError::Payload {
            message: "response contained no text content".to_string(),
        })
}
