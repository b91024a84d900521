//! The model capability set: role description, per-purpose system
//! messages, section headings, and method instruction templates.
//!
//! A [`Dialect`] ships with defaults; callers override fields to tune
//! phrasing per model family without touching the assembly logic.

use std::collections::BTreeMap;

/// Prompting method: which intermediate sections the model is asked to
/// emit before the final `output` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    Normal,
    Reason,
    ChainOfThought,
    Reflection,
    ReAct,
    Planner,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Normal => "Normal",
            Method::Reason => "Reason",
            Method::ChainOfThought => "ChainOfThought",
            Method::Reflection => "Reflection",
            Method::ReAct => "ReAct",
            Method::Planner => "Planner",
        }
    }

    /// Accepts the common spellings, case-insensitively.
    pub fn parse(text: &str) -> Option<Method> {
        match text.to_ascii_lowercase().as_str() {
            "normal" => Some(Method::Normal),
            "reason" => Some(Method::Reason),
            "cot" | "chain-of-thought" | "chainofthought" => Some(Method::ChainOfThought),
            "reflection" => Some(Method::Reflection),
            "react" => Some(Method::ReAct),
            "planner" => Some(Method::Planner),
            _ => None,
        }
    }
}

/// Named prompt blocks that carry a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Action,
    Inputs,
    Informations,
    Context,
    TypeExplanations,
    ReturnHint,
    Tools,
    ModelOutput,
    PreviousOutput,
    Error,
}

// ──────────────────────────────────────────────
// Default texts
// ──────────────────────────────────────────────

const NORMAL: &str = "Follow this template to provide the answer.\n\n\
```output\nProvide the output in the desired output type.\n```";

const REASON: &str = "Follow this template to provide the answer.\n\n\
```reasoning\nReason about how to achieve the goal in this section.\n```\n\
```output\nProvide the output in the desired output type.\n```";

const CHAIN_OF_THOUGHT: &str = "Follow this template to provide the answer.\n\n\
```chain-of-thoughts\nThink step by step to achieve the goal.\n```\n\
```output\nProvide the output in the desired output type.\n```";

const REFLECTION: &str = "Follow this template to provide the answer.\n\n\
```chain-of-thoughts\nThink step by step to achieve the goal.\n```\n\
```intermediate-output\nProvide a first attempt at the output in the desired output type.\n```\n\
```reflection\nReflect on the thought process and the intermediate output, and check their validity.\n```\n\
```output\nProvide the output in the desired output type.\n```";

const REACT: &str = "Work towards the goal one step at a time. \
In each reply, provide exactly one thought and one tool usage, following this template.\n\n\
```thought\nState what you need to find out next.\n```\n\
```tool-usage\nCall one of the available tools, written as a single call expression.\n```\n\
Once the goal is achieved, reply instead with:\n\n\
```output\nProvide the output in the desired output type.\n```";

const PLANNER: &str = "Follow this template to provide the answer.\n\n\
```plan\nA step by step plan to achieve the goal. (No code.)\n```\n\
Execute the plan as follows, one section per step i:\n\
```step_i\nExecution of the step.\n```\n\
Finally,\n\
```output\nProvide the output in the desired output type.\n```";

const EXTRACT_INSTRUCTION: &str = "The output above is not in the desired output format.\n\
Follow this template to provide the answer.\n\n\
```output\nOnly provide the output in this section, in the desired output type.\n```";

const FIX_INSTRUCTION: &str = "The error above was encountered when evaluating the model output.\n\
Follow this template to provide the answer.\n\n\
```debug\nDebug the error and fix the output.\n```\n\
```output\nProvide the output in the desired output type.\n```";

const EXTRACT_SYSTEM: &str = "You are an expert in extracting outputs in the desired format.";

const FIX_SYSTEM: &str = "You are an expert in debugging structured outputs.";

// ──────────────────────────────────────────────
// Dialect
// ──────────────────────────────────────────────

/// Everything about prompt phrasing that may vary per model family.
#[derive(Debug, Clone)]
pub struct Dialect {
    /// Optional leading system message describing the assistant's role.
    pub role_description: Option<String>,
    /// System message opening the auxiliary extraction request.
    pub extract_system: String,
    /// System message opening a fix request.
    pub fix_system: String,
    /// Trailing instruction of the auxiliary extraction request.
    pub extract_instruction: String,
    /// Trailing instruction of a fix request.
    pub fix_instruction: String,
    pub headings: BTreeMap<Section, String>,
    pub templates: BTreeMap<Method, String>,
}

impl Default for Dialect {
    fn default() -> Self {
        let headings = [
            (Section::Action, "# Goal:"),
            (Section::Inputs, "## Inputs"),
            (Section::Informations, "## Additional Information"),
            (Section::Context, "## Context"),
            (Section::TypeExplanations, "## Type Definitions"),
            (Section::ReturnHint, "## Output Type Definition"),
            (Section::Tools, "## Tools"),
            (Section::ModelOutput, "## Model Output"),
            (Section::PreviousOutput, "## Previous Output"),
            (Section::Error, "## Error Encountered"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

        let templates = [
            (Method::Normal, NORMAL),
            (Method::Reason, REASON),
            (Method::ChainOfThought, CHAIN_OF_THOUGHT),
            (Method::Reflection, REFLECTION),
            (Method::ReAct, REACT),
            (Method::Planner, PLANNER),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

        Dialect {
            role_description: None,
            extract_system: EXTRACT_SYSTEM.to_string(),
            fix_system: FIX_SYSTEM.to_string(),
            extract_instruction: EXTRACT_INSTRUCTION.to_string(),
            fix_instruction: FIX_INSTRUCTION.to_string(),
            headings,
            templates,
        }
    }
}

impl Dialect {
    pub fn heading(&self, section: Section) -> &str {
        self.headings.get(&section).map(String::as_str).unwrap_or("")
    }

    pub fn template(&self, method: Method) -> &str {
        self.templates.get(&method).map(String::as_str).unwrap_or("")
    }
}
