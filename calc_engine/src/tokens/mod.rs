//! Token system for arithmetic expressions
//!
//! The lexical analyzer produces a [`TokenStream`]: numbers, the four
//! operators and parentheses, each with its source span, terminated by `Eof`.
//! Whitespace is skipped during lexing and never becomes a token.

pub mod token;
pub mod token_stream;

pub use token::{classify_symbol, is_number_char, Token, TokenClass, TokenKind};
pub use token_stream::{SpannedToken, TokenStream, TokenStreamBuilder, TokenStreamError};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
