//! Shared source-location types used by the tokenizer, evaluator and logging

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
