//! Rendering context files for reuse as a conversation primer
//!
//! Three encodings share one layout: metadata, optional summary, optional
//! key points, the selected conversation, and a closing instruction.

mod options;
mod render;

pub use options::{FormatOptions, FormatOverrides, OutputFormat};
pub use render::{
    Rendered, StructuredContext, StructuredMetadata, estimate_tokens, exceeds_budget,
    format_context, format_date,
};
