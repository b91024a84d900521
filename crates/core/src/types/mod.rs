//! Runtime values, type tags, and the prompt-facing descriptions built
//! from them.

pub mod info;
pub mod media;
pub mod tag;
pub mod value;

pub use info::{Information, OutputHint, ToolParam, ToolSpec};
pub use media::{MediaDetail, MediaKind, MediaSource, MediaValue};
pub use tag::TypeTag;
pub use value::Value;
