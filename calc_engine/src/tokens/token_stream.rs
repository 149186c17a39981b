//! Span-accurate token stream consumed by the evaluator
//!
//! A stream always ends with exactly one `Eof` token; the cursor never moves
//! past it.

use crate::tokens::token::{Token, TokenKind};
use crate::utils::{Position, SourceMap, Span, Spanned};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    /// Build a stream, appending an `Eof` token if the input lacks one
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        let needs_eof = !matches!(tokens.last(), Some(last) if last.value == Token::Eof);
        if needs_eof {
            let end = tokens
                .last()
                .map(|t| t.span.end)
                .unwrap_or_else(Position::start);
            tokens.push(SpannedToken::new(Token::Eof, Span::point(end)));
        }

        Self {
            tokens,
            position: 0,
            source_map: None,
        }
    }

    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        Self {
            source_map: Some(source_map),
            ..Self::new(tokens)
        }
    }

    // === NAVIGATION ===

    /// Current token; `Eof` once the input is exhausted
    pub fn current(&self) -> &SpannedToken {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    pub fn current_token(&self) -> &Token {
        &self.current().value
    }

    pub fn current_span(&self) -> Span {
        self.current().span
    }

    pub fn peek(&self) -> &SpannedToken {
        self.peek_ahead(1)
    }

    /// Token `n` positions ahead, saturating at `Eof`
    pub fn peek_ahead(&self, n: usize) -> &SpannedToken {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    /// Move to the next token and return the one that was current
    pub fn advance(&mut self) -> SpannedToken {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub fn is_at_end(&self) -> bool {
        self.current().value == Token::Eof
    }

    /// Number of tokens excluding the `Eof` marker
    pub fn len(&self) -> usize {
        self.tokens.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_token().kind() == kind
    }

    /// Consume the current token if it satisfies `predicate`
    pub fn consume_if<F>(&mut self, predicate: F) -> Option<SpannedToken>
    where
        F: FnOnce(&Token) -> bool,
    {
        if predicate(self.current_token()) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub fn expect_token(&mut self, expected: TokenKind) -> Result<SpannedToken, TokenStreamError> {
        let current = self.current();
        if current.value.kind() == expected {
            Ok(self.advance())
        } else if current.value == Token::Eof {
            Err(TokenStreamError::UnexpectedEndOfStream {
                expected,
                span: current.span,
            })
        } else {
            Err(TokenStreamError::UnexpectedToken {
                expected,
                found: current.value,
                span: current.span,
            })
        }
    }

    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.tokens.len() - 1);
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining_count(&self) -> usize {
        self.len().saturating_sub(self.position)
    }

    // === ITERATION ===

    /// All tokens including the trailing `Eof`
    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }

    /// Tokens without the trailing `Eof`
    pub fn iter(&self) -> impl Iterator<Item = &SpannedToken> {
        self.tokens[..self.len()].iter()
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.iter().map(|t| t.value.kind()).collect()
    }

    pub fn eof_span(&self) -> Span {
        self.tokens[self.tokens.len() - 1].span
    }

    // === ERROR REPORTING ===

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Format an error with caret context when the source is available
    pub fn format_error(&self, span: Span, message: &str) -> String {
        match &self.source_map {
            Some(source_map) => source_map.format_error(&span, message),
            None => format!("error at {}: {}", span, message),
        }
    }

    pub fn source_text(&self, span: &Span) -> Option<&str> {
        self.source_map.as_ref().map(|sm| sm.span_text(span))
    }

    pub fn diagnostic(&self) -> String {
        let current = self.current();
        format!(
            "TokenStream(pos: {}/{}, current: '{}' at {})",
            self.position,
            self.len(),
            current.value,
            current.span
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenStreamError {
    #[error("Expected {expected}, found '{found}' at {span}")]
    UnexpectedToken {
        expected: TokenKind,
        found: Token,
        span: Span,
    },

    #[error("Expected {expected}, but reached end of input")]
    UnexpectedEndOfStream { expected: TokenKind, span: Span },
}

/// Builds streams from `(token, text)` pairs, computing spans as it goes
#[derive(Debug)]
pub struct TokenStreamBuilder {
    tokens: Vec<SpannedToken>,
    current_position: Position,
}

impl TokenStreamBuilder {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            current_position: Position::start(),
        }
    }

    pub fn push_token(mut self, token: Token, text: &str) -> Self {
        let start = self.current_position;
        let end = start.advance_str(text);
        self.tokens.push(SpannedToken::new(token, Span::new(start, end)));
        self.current_position = end;
        self
    }

    /// Skip over source text that produces no token (whitespace)
    pub fn skip(mut self, text: &str) -> Self {
        self.current_position = self.current_position.advance_str(text);
        self
    }

    pub fn build(self) -> TokenStream {
        TokenStream::new(self.tokens)
    }

    pub fn build_with_source(self, source: impl Into<String>) -> TokenStream {
        TokenStream::with_source_map(self.tokens, SourceMap::new(source))
    }
}

impl Default for TokenStreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample() -> TokenStream {
        TokenStreamBuilder::new()
            .push_token(Token::Number(2.0), "2")
            .skip(" ")
            .push_token(Token::Plus, "+")
            .skip(" ")
            .push_token(Token::Number(3.0), "3")
            .build_with_source("2 + 3")
    }

    #[test]
    fn test_eof_is_appended_once() {
        let stream = sample();
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.tokens().len(), 4);
        assert_eq!(stream.tokens()[3].value, Token::Eof);
        assert_eq!(stream.eof_span().start.column, 6);

        let again = TokenStream::new(stream.tokens().to_vec());
        assert_eq!(again.tokens().len(), 4);
    }

    #[test]
    fn test_empty_stream() {
        let stream = TokenStream::new(Vec::new());
        assert!(stream.is_empty());
        assert!(stream.is_at_end());
        assert_eq!(stream.eof_span(), Span::point(Position::start()));
    }

    #[test]
    fn test_navigation_saturates_at_eof() {
        let mut stream = sample();
        assert_eq!(stream.advance().value, Token::Number(2.0));
        assert_eq!(stream.peek().value, Token::Number(3.0));
        stream.advance();
        stream.advance();
        assert!(stream.is_at_end());
        assert_eq!(stream.advance().value, Token::Eof);
        assert_eq!(stream.peek_ahead(5).value, Token::Eof);
    }

    #[test]
    fn test_save_and_restore() {
        let mut stream = sample();
        let saved = stream.save_position();
        stream.advance();
        stream.advance();
        assert_eq!(stream.remaining_count(), 1);
        stream.restore_position(saved);
        assert!(stream.check(TokenKind::Number));
    }

    #[test]
    fn test_expect_token() {
        let mut stream = sample();
        assert!(stream.expect_token(TokenKind::Number).is_ok());
        assert_matches!(
            stream.expect_token(TokenKind::RParen),
            Err(TokenStreamError::UnexpectedToken { found: Token::Plus, .. })
        );

        stream.advance();
        stream.advance();
        assert_matches!(
            stream.expect_token(TokenKind::RParen),
            Err(TokenStreamError::UnexpectedEndOfStream { .. })
        );
    }

    #[test]
    fn test_consume_if() {
        let mut stream = sample();
        assert!(stream.consume_if(|t| t.is_additive()).is_none());
        assert!(stream.consume_if(|t| t.as_number().is_some()).is_some());
        assert!(stream.consume_if(|t| t.is_additive()).is_some());
    }

    #[test]
    fn test_error_formatting_uses_source() {
        let stream = sample();
        let span = stream.tokens()[1].span;
        let rendered = stream.format_error(span, "Unexpected token");
        assert!(rendered.contains("1 | 2 + 3"));
        assert_eq!(stream.source_text(&span), Some("+"));
        assert!(stream.diagnostic().starts_with("TokenStream(pos: 0/3"));
    }
}
