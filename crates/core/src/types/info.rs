//! Prompt-facing request entities: informations, the output hint, and
//! tool specifications, each with its rendered line format.
//!
//! Rendering is load-bearing: the model is instructed against these
//! exact shapes, so tests pin them character for character.

use super::media::MediaValue;
use super::tag::TypeTag;
use super::value::Value;

// ──────────────────────────────────────────────
// Information
// ──────────────────────────────────────────────

/// A named, typed value given to the model: an input argument or an
/// auxiliary fact. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Information {
    pub name: String,
    pub value: Value,
    pub meaning: Option<String>,
}

impl Information {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Information {
            name: name.into(),
            value,
            meaning: None,
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    /// The tag this information carries into the prompt, inferred from
    /// its value.
    pub fn tag(&self) -> TypeTag {
        self.value.tag()
    }

    /// The media payload, when the value is one.
    pub fn media(&self) -> Option<&MediaValue> {
        match &self.value {
            Value::Media(m) => Some(m),
            _ => None,
        }
    }

    /// `- {meaning} ({name}) ({tag}) = {literal}`, meaning segment
    /// omitted when absent.
    pub fn render_line(&self) -> String {
        match &self.meaning {
            Some(meaning) => format!(
                "- {meaning} ({}) ({}) = {}",
                self.name,
                self.tag(),
                self.value.render()
            ),
            None => format!("- ({}) ({}) = {}", self.name, self.tag(), self.value.render()),
        }
    }

    /// The text that precedes a media payload when this information is
    /// rendered as message parts.
    pub fn render_media_intro(&self) -> String {
        match &self.meaning {
            Some(meaning) => format!("- {meaning} ({}) ({}) = ", self.name, self.tag()),
            None => format!("- ({}) ({}) = ", self.name, self.tag()),
        }
    }
}

// ──────────────────────────────────────────────
// Output hint
// ──────────────────────────────────────────────

/// The declared return type of the operation, with an optional meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputHint {
    pub tag: TypeTag,
    pub meaning: Option<String>,
}

impl OutputHint {
    pub fn new(tag: TypeTag) -> Self {
        OutputHint { tag, meaning: None }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    /// `- {meaning} ({tag})`, meaning segment omitted when absent.
    pub fn render_line(&self) -> String {
        match &self.meaning {
            Some(meaning) => format!("- {meaning} ({})", self.tag),
            None => format!("- ({})", self.tag),
        }
    }
}

// ──────────────────────────────────────────────
// Tool specifications
// ──────────────────────────────────────────────

/// One parameter of an advertised tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParam {
    pub name: String,
    pub tag: TypeTag,
    pub meaning: Option<String>,
}

impl ToolParam {
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        ToolParam {
            name: name.into(),
            tag,
            meaning: None,
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    fn render(&self) -> String {
        match &self.meaning {
            Some(meaning) => format!("{}: {} - \"{meaning}\"", self.name, self.tag),
            None => format!("{}: {}", self.name, self.tag),
        }
    }
}

/// A tool advertised to the model. Advertised only; the engine never
/// invokes one.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub meaning: Option<String>,
    pub params: Vec<ToolParam>,
    pub returns: TypeTag,
    pub returns_meaning: Option<String>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, returns: TypeTag) -> Self {
        ToolSpec {
            name: name.into(),
            meaning: None,
            params: Vec::new(),
            returns,
            returns_meaning: None,
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    pub fn param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_returns_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.returns_meaning = Some(meaning.into());
        self
    }

    /// `- {meaning} ({name}) -> name(param: tag - "meaning", …) returns tag`,
    /// meaning segments omitted when absent.
    pub fn render_line(&self) -> String {
        let params = self
            .params
            .iter()
            .map(ToolParam::render)
            .collect::<Vec<_>>()
            .join(", ");
        let head = match &self.meaning {
            Some(meaning) => format!("- {meaning} ({})", self.name),
            None => format!("- ({})", self.name),
        };
        let ret = match &self.returns_meaning {
            Some(meaning) => format!("{} - \"{meaning}\"", self.returns),
            None => self.returns.to_string(),
        };
        format!("{head} -> {}({params}) returns {ret}", self.name)
    }
}
