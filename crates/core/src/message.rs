//! Role-tagged messages and the coalescing pass that merges adjacent
//! same-role blocks into provider-friendly turns.

use serde::{Deserialize, Serialize};

use crate::types::media::MediaValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One element of a multimodal content list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
    Media { media: MediaValue },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Part {
        Part::Text { text: text.into() }
    }

    pub fn media(media: MediaValue) -> Part {
        Part::Media { media }
    }
}

/// Message content: plain text, or an ordered list of text/media parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<Part>),
}

impl Content {
    pub fn into_parts(self) -> Vec<Part> {
        match self {
            Content::Text(text) => vec![Part::text(text)],
            Content::Parts(parts) => parts,
        }
    }

    /// All text in this content, media parts skipped, text parts joined
    /// with newlines.
    pub fn flat_text(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    Part::Text { text } => Some(text.as_str()),
                    Part::Media { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn merge(&mut self, other: Content) {
        match (&mut *self, other) {
            (Content::Text(a), Content::Text(b)) => {
                a.push('\n');
                a.push_str(&b);
            }
            (Content::Parts(a), Content::Parts(mut b)) => a.append(&mut b),
            (this, other) => {
                let mut parts =
                    std::mem::replace(this, Content::Text(String::new())).into_parts();
                parts.extend(other.into_parts());
                *this = Content::Parts(parts);
            }
        }
    }
}

/// A role-tagged message in the order it will reach the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Content,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Message {
        Message {
            role: Role::System,
            content: Content::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Message {
        Message {
            role: Role::User,
            content: Content::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Message {
        Message {
            role: Role::Assistant,
            content: Content::Text(text.into()),
        }
    }

    pub fn parts(role: Role, parts: Vec<Part>) -> Message {
        Message {
            role,
            content: Content::Parts(parts),
        }
    }
}

/// Merges consecutive same-role messages, preserving order. Text merges
/// with text by newline join; part lists extend; a text/parts mix is
/// normalized to parts first.
pub fn coalesce(messages: Vec<Message>) -> Vec<Message> {
    let mut out: Vec<Message> = Vec::new();
    for msg in messages {
        match out.last_mut() {
            Some(prev) if prev.role == msg.role => prev.content.merge(msg.content),
            _ => out.push(msg),
        }
    }
    out
}
