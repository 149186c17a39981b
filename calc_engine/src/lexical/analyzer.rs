//! Core lexical analyzer for arithmetic expressions
//!
//! Single pass over `char_indices()`. Whitespace is skipped, operator and
//! grouping characters map to one token each, and numeric lexemes are the
//! maximal run of digits and decimal points. The first invalid lexeme aborts
//! tokenization; no partial stream is ever returned.

use crate::config::constants::alphabet;
use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{classify_symbol, is_number_char, Token, TokenClass, TokenStream};
use crate::utils::{Position, SourceMap, Span, Spanned};
use crate::{log_debug, log_error, log_success};

type CharStream<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

/// Lexical analysis errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at line {}, column {}", position.line, position.column)]
    InvalidCharacter { character: char, position: Position },

    #[error("Malformed number '{text}' at line {}, column {}", position.line, position.column)]
    MalformedNumber { text: String, position: Position },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::MalformedNumber { .. } => codes::lexical::MALFORMED_NUMBER,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Source position of the offending lexeme, when there is one
    pub fn position(&self) -> Option<Position> {
        match self {
            LexerError::InvalidCharacter { position, .. }
            | LexerError::MalformedNumber { position, .. } => Some(*position),
            LexerError::TooManyTokens { .. } => None,
        }
    }

    /// Span of the offending lexeme for caret rendering
    pub fn span(&self) -> Option<Span> {
        match self {
            LexerError::InvalidCharacter {
                character,
                position,
            } => Some(Span::single(*position, *character)),
            LexerError::MalformedNumber { text, position } => {
                Some(Span::new(*position, position.advance_str(text)))
            }
            LexerError::TooManyTokens { .. } => None,
        }
    }
}

/// Token counts gathered during one tokenization
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub number_tokens: usize,
    pub operator_tokens: usize,
    pub paren_tokens: usize,
    pub whitespace_chars: usize,
    pub longest_number: usize,
    pub invalid_chars: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        if !preferences.collect_detailed_metrics {
            return;
        }

        match token.class() {
            TokenClass::Literal => self.number_tokens += 1,
            TokenClass::Operator => self.operator_tokens += 1,
            TokenClass::Grouping => self.paren_tokens += 1,
            TokenClass::Special => {}
        }
    }

    pub(crate) fn record_number_length(&mut self, length: usize) {
        self.longest_number = self.longest_number.max(length);
    }

    pub(crate) fn record_whitespace(&mut self) {
        self.whitespace_chars += 1;
    }

    pub(crate) fn record_invalid_char(&mut self) {
        self.invalid_chars += 1;
    }
}

/// Lexical analyzer with metrics and runtime preferences
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Tokenize a raw expression into a stream terminated by `Eof`
    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        log_debug!("Starting lexical analysis",
            "char_count" => source.chars().count(),
            "byte_count" => source.len(),
            "max_tokens_allowed" => MAX_TOKEN_COUNT
        );

        let mut tokens: Vec<Spanned<Token>> = Vec::new();
        let mut chars = source.char_indices().peekable();
        let mut current_pos = Position::start();

        while let Some((byte_offset, ch)) = chars.next() {
            current_pos = Position::new(byte_offset, current_pos.line, current_pos.column);

            if alphabet::is_ignored_whitespace(ch) {
                self.metrics.record_whitespace();
                current_pos = current_pos.advance(ch);
                continue;
            }

            // Leave room for the Eof marker
            if tokens.len() >= MAX_TOKEN_COUNT {
                let error = LexerError::TooManyTokens {
                    count: tokens.len() + 1,
                };
                log_error!(error.error_code(), "Token limit exceeded",
                    span = Span::point(current_pos),
                    "token_count" => tokens.len(),
                    "limit" => MAX_TOKEN_COUNT
                );
                return Err(error);
            }

            let result = if let Some(token) = classify_symbol(ch) {
                Ok((token, Span::single(current_pos, ch)))
            } else if is_number_char(ch) {
                self.parse_number(byte_offset, source, &mut chars, current_pos)
            } else {
                self.metrics.record_invalid_char();
                Err(LexerError::InvalidCharacter {
                    character: ch,
                    position: current_pos,
                })
            };

            match result {
                Ok((token, span)) => {
                    self.metrics.record_token(&token, &self.preferences);
                    tokens.push(Spanned::new(token, span));
                    current_pos = span.end;
                }
                Err(error) => {
                    self.log_failure(&error, current_pos, tokens.len());
                    return Err(error);
                }
            }
        }

        let eof = Spanned::new(Token::Eof, Span::point(current_pos));
        tokens.push(eof);

        let token_stream = TokenStream::with_source_map(tokens, SourceMap::new(source));

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed successfully",
            "token_count" => token_stream.len(),
            "numbers" => self.metrics.number_tokens,
            "operators" => self.metrics.operator_tokens,
            "parens" => self.metrics.paren_tokens,
            "longest_number" => self.metrics.longest_number
        );

        Ok(token_stream)
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn log_failure(&self, error: &LexerError, position: Position, tokens_processed: usize) {
        let message = if self.preferences.include_position_in_errors {
            format!(
                "Lexical analysis failed at line {}, column {}",
                position.line, position.column
            )
        } else {
            "Lexical analysis failed".to_string()
        };

        log_error!(error.error_code(), &message,
            span = error.span().unwrap_or_else(|| Span::point(position)),
            "detail" => error,
            "tokens_processed" => tokens_processed
        );
    }

    /// Consume the maximal run of digits and decimal points starting at
    /// `start_offset`. The sign is never part of the lexeme.
    fn parse_number(
        &mut self,
        start_offset: usize,
        source: &str,
        chars: &mut CharStream<'_>,
        start_pos: Position,
    ) -> Result<(Token, Span), LexerError> {
        let mut end_offset = source.len();
        while let Some(&(offset, ch)) = chars.peek() {
            if !is_number_char(ch) {
                end_offset = offset;
                break;
            }
            chars.next();
        }

        let text = &source[start_offset..end_offset];
        let span = Span::new(start_pos, start_pos.advance_str(text));
        self.metrics.record_number_length(text.len());

        let malformed = || LexerError::MalformedNumber {
            text: text.to_string(),
            position: start_pos,
        };

        if text.matches(alphabet::DECIMAL_POINT).count() > 1 {
            return Err(malformed());
        }

        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok((Token::Number(value), span)),
            _ => Err(malformed()),
        }
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
