//! sema-core: meaning-typed prompting engine.
//!
//! Turns a declared operation (meaning, typed parameters, typed return)
//! into a structured prompt, sends it across a model boundary, and
//! resolves the reply into a runtime [`Value`] of the declared type.
//! Malformed replies are repaired through a bounded fix loop before the
//! whole exchange is retried from scratch.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Engine`] -- prompt assembly, boundary invocation, retry loops
//! - [`Operation`] -- a declared semantic operation
//! - [`Scope`] -- user-defined record/enum types and named bindings
//! - [`Value`] / [`TypeTag`] -- runtime values and their type notation
//! - [`ModelBoundary`] -- the one trait a provider implements
//! - [`SemaError`] -- resolution error type
//!
//! Prompt-side pieces ([`PromptInfo`], [`Dialect`], [`Segments`]) are
//! exported for callers that assemble or inspect exchanges directly.

pub mod boundary;
pub mod catalog;
pub mod coerce;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod literal;
pub mod message;
pub mod op;
pub mod prompt;
pub mod scope;
pub mod segment;
pub mod types;

// ── Convenience re-exports: key types ────────────────────────────────

pub use boundary::{BoundaryError, ModelBoundary, ModelParams, ScriptedBoundary};
pub use catalog::{build_catalog, TypeExplanation};
pub use dialect::{Dialect, Method, Section};
pub use engine::{Engine, ResolvedOutput};
pub use error::{CoerceError, SemaError};
pub use message::{Content, Message, Part, Role};
pub use op::{Operation, ParamSpec};
pub use prompt::PromptInfo;
pub use scope::{FieldDef, Scope, TypeDef};
pub use segment::Segments;
pub use types::{
    Information, MediaDetail, MediaKind, MediaSource, MediaValue, OutputHint, ToolParam,
    ToolSpec, TypeTag, Value,
};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use coerce::coerce;
pub use literal::parse_literal;
