//! Prompt assembly: turns a request context into the ordered,
//! role-tagged message sequence a model boundary consumes.
//!
//! Block order is fixed and load-bearing; the method instruction
//! template is always the final message.

use crate::catalog::TypeExplanation;
use crate::dialect::{Dialect, Method, Section};
use crate::message::{coalesce, Content, Message, Part, Role};
use crate::types::info::{Information, OutputHint, ToolSpec};

/// The complete immutable context of one request.
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub action: String,
    pub context: Option<String>,
    pub informations: Vec<Information>,
    pub input_informations: Vec<Information>,
    pub tools: Vec<ToolSpec>,
    pub return_hint: OutputHint,
    pub type_explanations: Vec<TypeExplanation>,
}

impl PromptInfo {
    pub fn new(action: impl Into<String>, return_hint: OutputHint) -> Self {
        PromptInfo {
            action: action.into(),
            context: None,
            informations: Vec::new(),
            input_informations: Vec::new(),
            tools: Vec::new(),
            return_hint,
            type_explanations: Vec::new(),
        }
    }

    /// Assembles the primary request. Order: role description, action,
    /// inputs, additional informations, context, type definitions,
    /// output hint, tools, then the method template, coalesced.
    pub fn messages(&self, dialect: &Dialect, method: Method) -> Vec<Message> {
        let mut messages = Vec::new();
        if let Some(role_description) = &dialect.role_description {
            messages.push(Message::system(role_description.clone()));
        }
        messages.push(Message::system(format!(
            "{} {}",
            dialect.heading(Section::Action),
            self.action
        )));
        if !self.input_informations.is_empty() {
            messages.push(information_block(
                dialect.heading(Section::Inputs),
                &self.input_informations,
                Role::User,
            ));
        }
        if !self.informations.is_empty() {
            messages.push(information_block(
                dialect.heading(Section::Informations),
                &self.informations,
                Role::User,
            ));
        }
        if let Some(context) = &self.context {
            messages.push(heading_block(
                dialect.heading(Section::Context),
                std::slice::from_ref(context),
                Role::System,
            ));
        }
        if !self.type_explanations.is_empty() {
            messages.push(catalog_block(dialect, &self.type_explanations));
        }
        messages.push(heading_block(
            dialect.heading(Section::ReturnHint),
            &[self.return_hint.render_line()],
            Role::System,
        ));
        if !self.tools.is_empty() {
            let lines: Vec<String> = self.tools.iter().map(ToolSpec::render_line).collect();
            messages.push(heading_block(
                dialect.heading(Section::Tools),
                &lines,
                Role::System,
            ));
        }
        messages.push(Message::user(dialect.template(method)));
        coalesce(messages)
    }
}

// ── Auxiliary request builders ───────────────────────────────────────────────

/// The one-shot extraction request: the raw reply under a Model Output
/// heading, plus enough typing context to recognize the answer.
pub fn build_extract_messages(
    dialect: &Dialect,
    return_hint: &OutputHint,
    type_explanations: &[TypeExplanation],
    raw_output: &str,
) -> Vec<Message> {
    let mut messages = vec![Message::system(dialect.extract_system.clone())];
    messages.push(heading_block(
        dialect.heading(Section::ReturnHint),
        &[return_hint.render_line()],
        Role::System,
    ));
    if !type_explanations.is_empty() {
        messages.push(catalog_block(dialect, type_explanations));
    }
    messages.push(heading_block(
        dialect.heading(Section::ModelOutput),
        &[raw_output.to_string()],
        Role::User,
    ));
    messages.push(Message::user(dialect.extract_instruction.clone()));
    coalesce(messages)
}

/// A self-healing fix request: the malformed text and the coercion error,
/// with the same typing context as the primary request.
pub fn build_fix_messages(
    dialect: &Dialect,
    return_hint: &OutputHint,
    type_explanations: &[TypeExplanation],
    previous_output: &str,
    error: &str,
) -> Vec<Message> {
    let mut messages = vec![Message::system(dialect.fix_system.clone())];
    messages.push(heading_block(
        dialect.heading(Section::ReturnHint),
        &[return_hint.render_line()],
        Role::System,
    ));
    if !type_explanations.is_empty() {
        messages.push(catalog_block(dialect, type_explanations));
    }
    messages.push(heading_block(
        dialect.heading(Section::PreviousOutput),
        &[previous_output.to_string()],
        Role::User,
    ));
    messages.push(heading_block(
        dialect.heading(Section::Error),
        &[error.to_string()],
        Role::User,
    ));
    messages.push(Message::user(dialect.fix_instruction.clone()));
    coalesce(messages)
}

// ── Block rendering ──────────────────────────────────────────────────────────

fn heading_block<S: AsRef<str>>(heading: &str, lines: &[S], role: Role) -> Message {
    let mut text = heading.to_string();
    for line in lines {
        text.push('\n');
        text.push_str(line.as_ref());
    }
    Message {
        role,
        content: Content::Text(text),
    }
}

fn catalog_block(dialect: &Dialect, type_explanations: &[TypeExplanation]) -> Message {
    let lines: Vec<String> = type_explanations
        .iter()
        .map(TypeExplanation::render_line)
        .collect();
    heading_block(
        dialect.heading(Section::TypeExplanations),
        &lines,
        Role::System,
    )
}

/// An informations block flattens to text unless any entry carries a
/// media payload, in which case the whole block becomes interleaved
/// text/media parts.
fn information_block(heading: &str, informations: &[Information], role: Role) -> Message {
    let has_media = informations.iter().any(|i| i.media().is_some());
    if !has_media {
        let lines: Vec<String> = informations.iter().map(Information::render_line).collect();
        return heading_block(heading, &lines, role);
    }
    let mut parts = vec![Part::text(heading)];
    for info in informations {
        match info.media() {
            Some(media) => {
                parts.push(Part::text(info.render_media_intro()));
                parts.push(Part::media(media.clone()));
            }
            None => parts.push(Part::text(info.render_line())),
        }
    }
    Message::parts(role, parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::scope::{FieldDef, Scope};
    use crate::types::media::MediaValue;
    use crate::types::tag::TypeTag;
    use crate::types::value::Value;

    fn full_prompt_info() -> PromptInfo {
        let mut scope = Scope::new();
        scope.define_record(
            "Person",
            Some("a person"),
            vec![FieldDef::new("name", TypeTag::Str)],
        );
        let type_explanations =
            build_catalog(&[TypeTag::Custom("Person".to_string())], &scope).unwrap();
        PromptInfo {
            action: "Summarize the profile".to_string(),
            context: Some("Profiles come from the intake form.".to_string()),
            informations: vec![Information::new("hint", Value::Str("be brief".to_string()))],
            input_informations: vec![
                Information::new("age", Value::Int(36)).with_meaning("age in years")
            ],
            tools: vec![ToolSpec::new("lookup", TypeTag::Str).with_meaning("search the index")],
            return_hint: OutputHint::new(TypeTag::Custom("Person".to_string())),
            type_explanations,
        }
    }

    #[test]
    fn assembles_in_fixed_order() {
        let info = full_prompt_info();
        let messages = info.messages(&Dialect::default(), Method::Normal);

        // action+... coalesce to: system, user(inputs+aux), system(context..tools), user(method)
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::System, Role::User]);

        let first = messages[0].content.flat_text();
        assert!(first.starts_with("# Goal: Summarize the profile"), "{first}");

        let user = messages[1].content.flat_text();
        let inputs_at = user.find("## Inputs").unwrap();
        let aux_at = user.find("## Additional Information").unwrap();
        assert!(inputs_at < aux_at);
        assert!(user.contains("- age in years (age) (int) = 36"));

        let system = messages[2].content.flat_text();
        let ctx_at = system.find("## Context").unwrap();
        let types_at = system.find("## Type Definitions").unwrap();
        let hint_at = system.find("## Output Type Definition").unwrap();
        let tools_at = system.find("## Tools").unwrap();
        assert!(ctx_at < types_at && types_at < hint_at && hint_at < tools_at);
        assert!(system.contains("- (Person)"));
    }

    #[test]
    fn final_message_is_exactly_the_method_template() {
        let info = full_prompt_info();
        let dialect = Dialect::default();
        for method in [
            Method::Normal,
            Method::Reason,
            Method::ChainOfThought,
            Method::Reflection,
            Method::ReAct,
            Method::Planner,
        ] {
            let messages = info.messages(&dialect, method);
            let last = messages.last().unwrap();
            assert_eq!(last.role, Role::User);
            assert_eq!(last.content, Content::Text(dialect.template(method).to_string()));
        }
    }

    #[test]
    fn empty_blocks_are_skipped() {
        let info = PromptInfo::new("Count to three", OutputHint::new(TypeTag::Int));
        let messages = info.messages(&Dialect::default(), Method::Normal);
        let all: String = messages
            .iter()
            .map(|m| m.content.flat_text())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(!all.contains("## Inputs"));
        assert!(!all.contains("## Additional Information"));
        assert!(!all.contains("## Context"));
        assert!(!all.contains("## Type Definitions"));
        assert!(!all.contains("## Tools"));
        assert!(all.contains("## Output Type Definition"));
    }

    #[test]
    fn media_inputs_become_parts() {
        let mut info = PromptInfo::new("Describe the photo", OutputHint::new(TypeTag::Str));
        info.input_informations = vec![
            Information::new("caption", Value::Str("holiday".to_string())),
            Information::new(
                "photo",
                Value::Media(MediaValue::image_url("https://example.com/x.png")),
            ),
        ];
        let messages = info.messages(&Dialect::default(), Method::Normal);
        let inputs = messages
            .iter()
            .find(|m| m.content.flat_text().contains("## Inputs"))
            .unwrap();
        match &inputs.content {
            Content::Parts(parts) => {
                assert!(matches!(&parts[0], Part::Text { text } if text == "## Inputs"));
                assert!(parts.iter().any(|p| matches!(p, Part::Media { .. })));
            }
            other => panic!("expected parts, got {other:?}"),
        }
    }

    #[test]
    fn extract_prompt_shape() {
        let dialect = Dialect::default();
        let hint = OutputHint::new(TypeTag::Int);
        let messages = build_extract_messages(&dialect, &hint, &[], "the answer is 3");
        assert_eq!(messages[0].role, Role::System);
        let system = messages[0].content.flat_text();
        assert!(system.contains(&dialect.extract_system));
        assert!(system.contains("## Output Type Definition"));

        let user = messages.last().unwrap().content.flat_text();
        let output_at = user.find("## Model Output").unwrap();
        let instruction_at = user.find("Only provide the output").unwrap();
        assert!(output_at < instruction_at);
        assert!(user.contains("the answer is 3"));
    }

    #[test]
    fn fix_prompt_carries_previous_output_then_error() {
        let dialect = Dialect::default();
        let hint = OutputHint::new(TypeTag::Int);
        let messages = build_fix_messages(&dialect, &hint, &[], "three", "expected an int literal");
        let user = messages.last().unwrap().content.flat_text();
        let prev_at = user.find("## Previous Output").unwrap();
        let err_at = user.find("## Error Encountered").unwrap();
        let instruction_at = user.find("```debug").unwrap();
        assert!(prev_at < err_at && err_at < instruction_at);
        assert!(user.contains("three"));
        assert!(user.contains("expected an int literal"));
    }
}
