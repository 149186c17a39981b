//! Lexical analysis for arithmetic expressions
//!
//! Turns a raw expression string into a [`TokenStream`]. Pure apart from
//! logging; a failed tokenization never yields a partial stream.

pub mod analyzer;

use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::tokens::{Token, TokenStream};

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize with default preferences
pub fn tokenize(raw: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(raw)
}

/// Tokenize with custom runtime preferences (limits remain compile-time)
pub fn tokenize_with_preferences(
    raw: &str,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::with_preferences(preferences).tokenize(raw)
}

/// Startup check that lexical error codes are registered and limits are usable
pub fn validate_tokenization() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::INVALID_CHARACTER,
        crate::logging::codes::lexical::MALFORMED_NUMBER,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
    ];

    for code in &lexical_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    if MAX_TOKEN_COUNT == 0 {
        return Err("MAX_TOKEN_COUNT cannot be zero".to_string());
    }
    if MAX_EXPRESSION_LENGTH == 0 {
        return Err("MAX_EXPRESSION_LENGTH cannot be zero".to_string());
    }

    crate::log_debug!("Lexical limits validated",
        "max_token_count" => MAX_TOKEN_COUNT,
        "max_expression_length" => MAX_EXPRESSION_LENGTH
    );

    Ok(())
}

/// Token distribution of a stream, excluding `Eof`
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TokenCounts {
    pub total: usize,
    pub numbers: usize,
    pub operators: usize,
    pub open_parens: usize,
    pub close_parens: usize,
}

impl TokenCounts {
    /// Quick pre-parse balance hint; the evaluator does the real check
    pub fn parens_balanced(&self) -> bool {
        self.open_parens == self.close_parens
    }
}

pub fn get_token_counts(token_stream: &TokenStream) -> TokenCounts {
    let mut counts = TokenCounts::default();

    for token in token_stream.iter() {
        counts.total += 1;
        match token.value {
            Token::Number(_) => counts.numbers += 1,
            Token::LParen => counts.open_parens += 1,
            Token::RParen => counts.close_parens += 1,
            Token::Eof => {}
            _ => counts.operators += 1,
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tokenization() {
        assert!(validate_tokenization().is_ok());
    }

    #[test]
    fn test_token_counts() {
        let stream = tokenize("(2 + 3) * -4").unwrap();
        let counts = get_token_counts(&stream);
        assert_eq!(
            counts,
            TokenCounts {
                total: 8,
                numbers: 3,
                operators: 3,
                open_parens: 1,
                close_parens: 1,
            }
        );
        assert!(counts.parens_balanced());
    }

    #[test]
    fn test_tokenize_with_preferences() {
        let preferences = LexicalPreferences {
            collect_detailed_metrics: false,
            include_position_in_errors: false,
        };
        let stream = tokenize_with_preferences("1+1", preferences).unwrap();
        assert_eq!(stream.len(), 3);
    }
}
