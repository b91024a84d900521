//! The model invocation boundary.
//!
//! [`ModelBoundary`] is the single seam between the engine and any
//! concrete provider: one blocking call in, one raw reply out. The
//! engine adds no timeout, concurrency, or batching on top.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::message::Message;

// ──────────────────────────────────────────────
// BoundaryError
// ──────────────────────────────────────────────

/// Errors a boundary implementation can surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// The request never produced a reply (connection, HTTP status,
    /// auth).
    Transport { message: String },
    /// A reply arrived but its payload could not be read.
    Payload { message: String },
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryError::Transport { message } => write!(f, "transport failure: {message}"),
            BoundaryError::Payload { message } => {
                write!(f, "malformed provider payload: {message}")
            }
        }
    }
}

impl std::error::Error for BoundaryError {}

// ──────────────────────────────────────────────
// ModelParams
// ──────────────────────────────────────────────

/// Provider-facing request parameters. `extra` is merged verbatim into
/// the provider payload, last to win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ModelParams {
    pub fn new(model: impl Into<String>) -> Self {
        ModelParams {
            model: model.into(),
            ..ModelParams::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

// ──────────────────────────────────────────────
// ModelBoundary trait
// ──────────────────────────────────────────────

/// One blocking model invocation: coalesced messages in, raw reply text
/// out.
pub trait ModelBoundary {
    fn invoke(&self, messages: &[Message], params: &ModelParams)
        -> Result<String, BoundaryError>;

    /// Short provider identifier used in errors and logs.
    fn name(&self) -> &str;
}

// ──────────────────────────────────────────────
// ScriptedBoundary
// ──────────────────────────────────────────────

/// One recorded [`ModelBoundary::invoke`] call.
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    pub messages: Vec<Message>,
    pub params: ModelParams,
}

/// A boundary that replays canned replies in order and records every
/// invocation. Used by tests and by offline CLI runs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBoundary {
    replies: Arc<Mutex<VecDeque<String>>>,
    invocations: Arc<Mutex<Vec<RecordedInvocation>>>,
}

impl ScriptedBoundary {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedBoundary {
            replies: Arc::new(Mutex::new(replies.into_iter().map(Into::into).collect())),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply.into());
    }

    /// Every invocation seen so far, in order.
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl ModelBoundary for ScriptedBoundary {
    fn invoke(
        &self,
        messages: &[Message],
        params: &ModelParams,
    ) -> Result<String, BoundaryError> {
        self.invocations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedInvocation {
                messages: messages.to_vec(),
                params: params.clone(),
            });
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| BoundaryError::Transport {
                message: "no scripted reply remaining".to_string(),
            })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
