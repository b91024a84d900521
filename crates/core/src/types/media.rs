//! Media payloads: images and video clips attached to informations.
//!
//! The engine never transcodes bytes. Callers hand over either a URL or
//! an already-encoded payload; `from_bytes` merely base64-encodes a
//! buffer the caller read themselves.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Whether a payload is a still image or a video clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
        }
    }
}

/// Where the payload lives: a remote URL, or inline base64 data with its
/// MIME subtype (`png`, `jpeg`, `mp4`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSource {
    Url(String),
    Inline { mime: String, data: String },
}

/// Fidelity hint passed through to providers that understand it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaDetail {
    Low,
    High,
    Auto,
}

impl MediaDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaDetail::Low => "low",
            MediaDetail::High => "high",
            MediaDetail::Auto => "auto",
        }
    }
}

/// An image or video payload ready to be placed into a message part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaValue {
    pub kind: MediaKind,
    pub source: MediaSource,
    pub detail: MediaDetail,
}

impl MediaValue {
    pub fn image_url(url: impl Into<String>) -> Self {
        MediaValue {
            kind: MediaKind::Image,
            source: MediaSource::Url(url.into()),
            detail: MediaDetail::Auto,
        }
    }

    pub fn video_url(url: impl Into<String>) -> Self {
        MediaValue {
            kind: MediaKind::Video,
            source: MediaSource::Url(url.into()),
            detail: MediaDetail::Auto,
        }
    }

    /// Encodes a caller-supplied buffer as an inline payload. `mime` is
    /// the subtype only, e.g. `png` or `mp4`.
    pub fn from_bytes(kind: MediaKind, mime: impl Into<String>, bytes: &[u8]) -> Self {
        MediaValue {
            kind,
            source: MediaSource::Inline {
                mime: mime.into(),
                data: BASE64.encode(bytes),
            },
            detail: MediaDetail::Auto,
        }
    }

    pub fn with_detail(mut self, detail: MediaDetail) -> Self {
        self.detail = detail;
        self
    }

    /// The URL a provider should reference: remote URLs pass through,
    /// inline payloads become `data:` URLs.
    pub fn as_url(&self) -> String {
        match (&self.kind, &self.source) {
            (_, MediaSource::Url(url)) => url.clone(),
            (MediaKind::Image, MediaSource::Inline { mime, data }) => {
                format!("data:image/{mime};base64,{data}")
            }
            (MediaKind::Video, MediaSource::Inline { mime, data }) => {
                format!("data:video/{mime};base64,{data}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_encodes_inline_payload() {
        let media = MediaValue::from_bytes(MediaKind::Image, "png", b"abc");
        match &media.source {
            MediaSource::Inline { mime, data } => {
                assert_eq!(mime, "png");
                assert_eq!(data, "YWJj");
            }
            other => panic!("expected inline source, got {other:?}"),
        }
        assert_eq!(media.as_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn url_sources_pass_through() {
        let media = MediaValue::image_url("https://example.com/cat.png");
        assert_eq!(media.as_url(), "https://example.com/cat.png");
        assert_eq!(media.detail, MediaDetail::Auto);

        let clip = MediaValue::video_url("https://example.com/clip.mp4").with_detail(MediaDetail::Low);
        assert_eq!(clip.kind, MediaKind::Video);
        assert_eq!(clip.detail.as_str(), "low");
    }
}
