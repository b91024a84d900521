//! sema-providers: concrete [`ModelBoundary`] implementations.
//!
//! Two HTTP clients, both synchronous over `ureq`:
//!
//! - [`OpenAiBoundary`] -- chat-completions against api.openai.com or
//!   any OpenAI-compatible server via a custom base URL
//! - [`AnthropicBoundary`] -- the Anthropic Messages API
//!
//! Both translate the engine's role-tagged messages into the provider's
//! wire shape and hand back the reply text untouched; everything else
//! (extraction, coercion, retries) stays in `sema-core`.
//!
//! [`ModelBoundary`]: sema_core::ModelBoundary

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicBoundary;
pub use openai::OpenAiBoundary;
