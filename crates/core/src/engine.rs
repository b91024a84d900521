//! The resolution engine: assembles the prompt, invokes the boundary,
//! and drives the two bounded retry loops.
//!
//! The inner loop repairs a malformed output by feeding the coercion
//! error back to the model (`max_fix_retries`). The outer loop restarts
//! the whole exchange from the original prompt (`operation_retries`).
//! Both counters are independent; nothing is cached across attempts.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::boundary::{ModelBoundary, ModelParams};
use crate::catalog::{build_catalog, TypeExplanation};
use crate::coerce::coerce;
use crate::dialect::Dialect;
use crate::error::SemaError;
use crate::message::Message;
use crate::op::Operation;
use crate::prompt::{build_extract_messages, build_fix_messages, PromptInfo};
use crate::scope::Scope;
use crate::segment::Segments;
use crate::types::info::OutputHint;
use crate::types::value::Value;

const DEFAULT_MAX_FIX_RETRIES: u32 = 3;
const DEFAULT_OPERATION_RETRIES: u32 = 2;

/// A successful resolution with every captured section, keyed by
/// section name. `output` holds the final extracted text.
#[derive(Debug, Clone)]
pub struct ResolvedOutput {
    pub value: Value,
    pub sections: BTreeMap<String, String>,
}

/// Drives operations end to end against one model boundary.
pub struct Engine {
    boundary: Box<dyn ModelBoundary>,
    dialect: Dialect,
    params: ModelParams,
    max_fix_retries: u32,
    operation_retries: u32,
}

impl Engine {
    pub fn new(boundary: Box<dyn ModelBoundary>) -> Self {
        Engine {
            boundary,
            dialect: Dialect::default(),
            params: ModelParams::default(),
            max_fix_retries: DEFAULT_MAX_FIX_RETRIES,
            operation_retries: DEFAULT_OPERATION_RETRIES,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// How many fix requests one attempt may issue after its first
    /// failed coercion.
    pub fn with_max_fix_retries(mut self, max_fix_retries: u32) -> Self {
        self.max_fix_retries = max_fix_retries;
        self
    }

    /// How many times the whole exchange restarts after a failed
    /// attempt.
    pub fn with_operation_retries(mut self, operation_retries: u32) -> Self {
        self.operation_retries = operation_retries;
        self
    }

    /// Resolves the operation to its bare typed value.
    pub fn call(
        &self,
        op: &Operation,
        scope: &Scope,
        args: &[(&str, Value)],
    ) -> Result<Value, SemaError> {
        self.call_detailed(op, scope, args).map(|r| r.value)
    }

    /// Resolves the operation, also returning every captured section
    /// from the successful attempt.
    pub fn call_detailed(
        &self,
        op: &Operation,
        scope: &Scope,
        args: &[(&str, Value)],
    ) -> Result<ResolvedOutput, SemaError> {
        let hint = op.check_args(args)?;
        let catalog = build_catalog(&op.seed_tags(args), scope)?;
        let prompt_info = PromptInfo {
            action: op.meaning.clone(),
            context: op.context.clone(),
            informations: op.informations.clone(),
            input_informations: op.input_informations(args),
            tools: op.tools.clone(),
            return_hint: hint.clone(),
            type_explanations: catalog.clone(),
        };
        let messages = prompt_info.messages(&self.dialect, op.method);
        debug!(
            "operation '{}': assembled {} messages, {} catalog entries",
            op.name,
            messages.len(),
            catalog.len()
        );

        let attempts = self.operation_retries + 1;
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match self.attempt(&messages, hint, scope, &catalog) {
                Ok(resolved) => {
                    debug!("operation '{}': resolved on attempt {attempt}", op.name);
                    return Ok(resolved);
                }
                Err(err) if err.consumes_attempt() => {
                    warn!(
                        "operation '{}': attempt {attempt}/{attempts} failed: {err}",
                        op.name
                    );
                    last_error = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }
        Err(SemaError::OperationExhausted {
            attempts,
            last_error,
        })
    }

    /// One full attempt: primary request, extraction fallback, then the
    /// self-healing loop. All text gathered here is discarded when the
    /// attempt fails.
    fn attempt(
        &self,
        messages: &[Message],
        hint: &OutputHint,
        scope: &Scope,
        catalog: &[TypeExplanation],
    ) -> Result<ResolvedOutput, SemaError> {
        let reply = self.invoke(messages)?;
        debug!("primary reply: {} chars", reply.len());

        let primary = Segments::scan(&reply);
        let found = primary.output().map(str::to_string);
        let mut sections = primary.into_map();
        let mut current = match found {
            Some(text) => text,
            None => {
                debug!("no output section in primary reply; requesting extraction");
                let extract_messages =
                    build_extract_messages(&self.dialect, hint, catalog, &reply);
                let extract_reply = self.invoke(&extract_messages)?;
                let extracted = Segments::scan(&extract_reply);
                let found = extracted.output().map(str::to_string);
                for (name, content) in extracted.into_map() {
                    sections.insert(name, content);
                }
                found.ok_or(SemaError::Extraction)?
            }
        };

        let evaluations = self.max_fix_retries + 1;
        let mut last_error = String::new();
        for evaluation in 1..=evaluations {
            match coerce(&current, hint, scope, catalog) {
                Ok(value) => {
                    sections.insert("output".to_string(), current);
                    return Ok(ResolvedOutput { value, sections });
                }
                Err(err) => {
                    last_error = err.message.clone();
                    if evaluation == evaluations {
                        break;
                    }
                    let final_fix = evaluation + 1 == evaluations;
                    let error_text = if final_fix {
                        err.full_report()
                    } else {
                        err.message
                    };
                    debug!(
                        "coercion failed (evaluation {evaluation}/{evaluations}): {last_error}; requesting fix"
                    );
                    let fix_messages =
                        build_fix_messages(&self.dialect, hint, catalog, &current, &error_text);
                    let fix_reply = self.invoke(&fix_messages)?;
                    let fixed = Segments::scan(&fix_reply);
                    let found = fixed.output().map(str::to_string);
                    for (name, content) in fixed.into_map() {
                        sections.insert(name, content);
                    }
                    // A fix reply without an output section is taken
                    // whole, trimmed.
                    current = found.unwrap_or_else(|| fix_reply.trim().to_string());
                }
            }
        }
        Err(SemaError::CoercionExhausted {
            attempts: evaluations,
            last_error,
        })
    }

    fn invoke(&self, messages: &[Message]) -> Result<String, SemaError> {
        self.boundary
            .invoke(messages, &self.params)
            .map_err(|err| SemaError::Boundary {
                provider: self.boundary.name().to_string(),
                message: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::ScriptedBoundary;
    use crate::op::ParamSpec;
    use crate::types::tag::TypeTag;

    fn int_op() -> Operation {
        Operation::new("count_words", "Count the words in the text")
            .param(ParamSpec::new("text", TypeTag::Str))
            .returns(TypeTag::Int)
    }

    #[test]
    fn resolves_a_fenced_integer() {
        let boundary = ScriptedBoundary::new(["```output\n3\n```"]);
        let engine = Engine::new(Box::new(boundary.clone()));
        let value = engine
            .call(
                &int_op(),
                &Scope::new(),
                &[("text", Value::Str("one two three".to_string()))],
            )
            .unwrap();
        assert_eq!(value, Value::Int(3));
        assert_eq!(boundary.calls(), 1);
    }

    #[test]
    fn detailed_calls_keep_every_section() {
        let boundary = ScriptedBoundary::new([
            "```reasoning\nthree words\n```\n```output\n3\n```",
        ]);
        let engine = Engine::new(Box::new(boundary));
        let resolved = engine
            .call_detailed(
                &int_op(),
                &Scope::new(),
                &[("text", Value::Str("one two three".to_string()))],
            )
            .unwrap();
        assert_eq!(resolved.value, Value::Int(3));
        assert_eq!(resolved.sections["reasoning"], "three words");
        assert_eq!(resolved.sections["output"], "3");
    }

    #[test]
    fn string_hints_take_the_section_verbatim() {
        let op = Operation::new("greet", "Write a greeting").returns(TypeTag::Str);
        let boundary = ScriptedBoundary::new(["```output\nHello, { \"world\" }!\n```"]);
        let engine = Engine::new(Box::new(boundary));
        let value = engine.call(&op, &Scope::new(), &[]).unwrap();
        assert_eq!(value, Value::Str("Hello, { \"world\" }!".to_string()));
    }

    #[test]
    fn configuration_errors_reach_no_boundary() {
        let boundary = ScriptedBoundary::new(["```output\n1\n```"]);
        let engine = Engine::new(Box::new(boundary.clone()));
        let op = Operation::new("no_return", "does nothing");
        let err = engine.call(&op, &Scope::new(), &[]).unwrap_err();
        assert!(matches!(err, SemaError::Configuration(_)));
        assert_eq!(boundary.calls(), 0);
    }

    #[test]
    fn type_lookup_errors_reach_no_boundary() {
        let boundary = ScriptedBoundary::new(["```output\n1\n```"]);
        let engine = Engine::new(Box::new(boundary.clone()));
        let op = Operation::new("classify", "Classify the input")
            .returns(TypeTag::Custom("Missing".to_string()));
        let err = engine.call(&op, &Scope::new(), &[]).unwrap_err();
        assert!(matches!(err, SemaError::TypeLookup { .. }));
        assert_eq!(boundary.calls(), 0);
    }
}
