//! Token definitions for arithmetic expressions
use crate::config::constants::alphabet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// Numeric literal; never carries a sign
    Number(f64),
    Plus,
    Minus,
    /// `*` or `×`
    Star,
    /// `/` or `÷`
    Slash,
    LParen,
    RParen,
    /// End of input marker, always the last token of a stream
    Eof,
}

/// Payload-free token discriminant, used for matching and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Number,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Eof,
}

/// Coarse grouping of tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenClass {
    Literal,
    Operator,
    Grouping,
    Special,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Number(_) => TokenKind::Number,
            Self::Plus => TokenKind::Plus,
            Self::Minus => TokenKind::Minus,
            Self::Star => TokenKind::Star,
            Self::Slash => TokenKind::Slash,
            Self::LParen => TokenKind::LParen,
            Self::RParen => TokenKind::RParen,
            Self::Eof => TokenKind::Eof,
        }
    }

    pub fn class(&self) -> TokenClass {
        match self {
            Self::Number(_) => TokenClass::Literal,
            Self::Plus | Self::Minus | Self::Star | Self::Slash => TokenClass::Operator,
            Self::LParen | Self::RParen => TokenClass::Grouping,
            Self::Eof => TokenClass::Special,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// `+` or `-`
    pub fn is_additive(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus)
    }

    /// `*` or `/`
    pub fn is_multiplicative(&self) -> bool {
        matches!(self, Self::Star | Self::Slash)
    }

    pub fn is_operator(&self) -> bool {
        self.class() == TokenClass::Operator
    }

    /// Token that can begin an operand (number, sign or group)
    pub fn starts_operand(&self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::Plus | Self::Minus | Self::LParen
        )
    }

    /// Canonical ASCII rendering, used in error messages
    pub fn as_source_string(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_source_string())
    }
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a single operator or grouping character to its token.
/// `×` and `÷` are folded into `Star` and `Slash`.
pub fn classify_symbol(ch: char) -> Option<Token> {
    match ch {
        '+' => Some(Token::Plus),
        '-' => Some(Token::Minus),
        '*' | alphabet::MULTIPLICATION_SIGN => Some(Token::Star),
        '/' | alphabet::DIVISION_SIGN => Some(Token::Slash),
        '(' => Some(Token::LParen),
        ')' => Some(Token::RParen),
        _ => None,
    }
}

/// Characters that may appear inside a numeric lexeme
pub fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == alphabet::DECIMAL_POINT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_classification() {
        assert_eq!(classify_symbol('+'), Some(Token::Plus));
        assert_eq!(classify_symbol('\u{00D7}'), Some(Token::Star));
        assert_eq!(classify_symbol('\u{00F7}'), Some(Token::Slash));
        assert_eq!(classify_symbol(')'), Some(Token::RParen));
        assert_eq!(classify_symbol('%'), None);
        assert_eq!(classify_symbol('x'), None);
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(Token::Number(1.5).class(), TokenClass::Literal);
        assert_eq!(Token::Slash.class(), TokenClass::Operator);
        assert_eq!(Token::LParen.class(), TokenClass::Grouping);
        assert_eq!(Token::Eof.class(), TokenClass::Special);

        assert!(Token::Minus.is_additive());
        assert!(Token::Star.is_multiplicative());
        assert!(Token::Minus.starts_operand());
        assert!(!Token::Star.starts_operand());
        assert!(!Token::RParen.starts_operand());
    }

    #[test]
    fn test_rendering() {
        assert_eq!(Token::Number(2.5).to_string(), "2.5");
        assert_eq!(Token::Number(3.0).to_string(), "3");
        assert_eq!(Token::Star.to_string(), "*");
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }

    #[test]
    fn test_number_chars() {
        assert!(is_number_char('7'));
        assert!(is_number_char('.'));
        assert!(!is_number_char('e'));
        assert!(!is_number_char('-'));
    }
}
