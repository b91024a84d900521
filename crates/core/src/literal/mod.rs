//! Restricted literal notation: a lexer and recursive-descent parser
//! for the value syntax the engine asks models to produce. Nothing in
//! here evaluates code; unknown call shapes and identifiers are
//! rejected with positioned errors.

pub(crate) mod lexer;
mod parser;

pub use parser::parse_literal;
