//! Coercion of extracted text into the declared output type.

use crate::catalog::TypeExplanation;
use crate::error::CoerceError;
use crate::literal::parse_literal;
use crate::scope::Scope;
use crate::types::info::OutputHint;
use crate::types::value::Value;

/// Coerces extracted text against the output hint. A `str` hint returns
/// the text unchanged, whatever it contains. Every other hint parses
/// the text with the restricted literal grammar and conforms the result
/// to the declared tag.
///
/// Failures carry a short message for ordinary fix requests and a long
/// diagnostic (with the offending text) for the final one.
pub fn coerce(
    text: &str,
    hint: &OutputHint,
    scope: &Scope,
    catalog: &[TypeExplanation],
) -> Result<Value, CoerceError> {
    if hint.tag.is_str() {
        return Ok(Value::Str(text.to_string()));
    }
    let parsed = parse_literal(text, scope, catalog)
        .map_err(|message| CoerceError::with_diagnostic(message, offending(text)))?;
    parsed
        .conform(&hint.tag)
        .map_err(|message| CoerceError::with_diagnostic(message, offending(text)))
}

fn offending(text: &str) -> String {
    format!("offending text:\n{text}")
}
