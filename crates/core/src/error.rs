//! Error taxonomy for the resolution pipeline.
//!
//! Two layers: [`SemaError`] is what callers see; [`CoerceError`] is the
//! internal coercion failure that circulates inside the self-healing loop
//! and only surfaces folded into a `SemaError` variant.

/// All errors the engine can surface to a caller.
#[derive(Debug, thiserror::Error)]
pub enum SemaError {
    /// The operation declaration is unusable. Raised before any model
    /// traffic and never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A referenced custom type could not be resolved in the evaluation
    /// scope. Raised during catalog construction, never retried.
    #[error("type lookup failed: no definition for '{name}' in scope")]
    TypeLookup { name: String },

    /// The model reply carried no `output` section, even after the one
    /// auxiliary extraction request.
    #[error("no output section found in model reply (after one extraction request)")]
    Extraction,

    /// The self-healing budget was spent without producing a coercible
    /// output section.
    #[error("coercion failed after {attempts} attempts: {last_error}")]
    CoercionExhausted { attempts: u32, last_error: String },

    /// A model-boundary implementation failed to deliver a reply
    /// (transport, authentication, payload shape). Consumes one operation
    /// attempt.
    #[error("model boundary '{provider}' failed: {message}")]
    Boundary { provider: String, message: String },

    /// Every operation attempt failed. Terminal and user-visible.
    #[error("operation failed after {attempts} attempts; last error: {last_error}")]
    OperationExhausted { attempts: u32, last_error: String },
}

impl SemaError {
    /// True for errors the operation retry controller may absorb by
    /// restarting the exchange from the original prompt.
    pub fn consumes_attempt(&self) -> bool {
        matches!(
            self,
            SemaError::Extraction | SemaError::CoercionExhausted { .. } | SemaError::Boundary { .. }
        )
    }
}

// ──────────────────────────────────────────────
// CoerceError
// ──────────────────────────────────────────────

/// A single coercion failure: the short message goes into ordinary fix
/// requests, the long diagnostic into the final allowed fix request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoerceError {
    pub message: String,
    pub diagnostic: Option<String>,
}

impl CoerceError {
    pub fn new(message: impl Into<String>) -> Self {
        CoerceError {
            message: message.into(),
            diagnostic: None,
        }
    }

    pub fn with_diagnostic(message: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        CoerceError {
            message: message.into(),
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// The fullest available description of the failure: message plus
    /// diagnostic when one was captured.
    pub fn full_report(&self) -> String {
        match &self.diagnostic {
            Some(d) => format!("{}\n{}", self.message, d),
            None => self.message.clone(),
        }
    }
}

impl std::fmt::Display for CoerceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CoerceError {}
