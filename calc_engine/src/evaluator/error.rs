//! Evaluation errors with error code mapping and source spans

use crate::config::constants::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::logging::{codes, Code};
use crate::tokens::{Token, TokenStreamError};
use crate::utils::Span;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Unbalanced parentheses at {span}")]
    UnbalancedParentheses { span: Span },

    #[error("Incomplete expression at {span}")]
    IncompleteExpression { span: Span },

    #[error("Unexpected token '{found}' at {span}")]
    UnexpectedToken { found: Token, span: Span },

    #[error("Division by zero at {span}")]
    DivisionByZero { span: Span },

    #[error("{reason}: {function}({value})")]
    DomainError {
        function: String,
        value: f64,
        reason: String,
    },

    #[error("Result is not a finite number: {value}")]
    NonFiniteResult { value: f64 },

    #[error("Nesting depth {depth} exceeds maximum {MAX_PARSE_DEPTH} at {span}")]
    NestingTooDeep { depth: usize, span: Span },
}

impl EvalError {
    pub fn unbalanced(span: Span) -> Self {
        Self::UnbalancedParentheses { span }
    }

    pub fn incomplete(span: Span) -> Self {
        Self::IncompleteExpression { span }
    }

    pub fn unexpected(found: Token, span: Span) -> Self {
        Self::UnexpectedToken { found, span }
    }

    pub fn domain(function: &str, value: f64, reason: &str) -> Self {
        Self::DomainError {
            function: function.to_string(),
            value,
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnbalancedParentheses { .. } => codes::evaluation::UNBALANCED_PARENTHESES,
            Self::IncompleteExpression { .. } => codes::evaluation::INCOMPLETE_EXPRESSION,
            Self::UnexpectedToken { .. } => codes::evaluation::UNEXPECTED_TOKEN,
            Self::DivisionByZero { .. } => codes::evaluation::DIVISION_BY_ZERO,
            Self::DomainError { .. } => codes::scientific::DOMAIN_ERROR,
            Self::NonFiniteResult { .. } => codes::evaluation::NON_FINITE_RESULT,
            Self::NestingTooDeep { .. } => codes::evaluation::MAX_NESTING_DEPTH,
        }
    }

    /// Source span for errors raised on a token
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnbalancedParentheses { span }
            | Self::IncompleteExpression { span }
            | Self::UnexpectedToken { span, .. }
            | Self::DivisionByZero { span }
            | Self::NestingTooDeep { span, .. } => Some(*span),
            Self::DomainError { .. } | Self::NonFiniteResult { .. } => None,
        }
    }
}

impl From<TokenStreamError> for EvalError {
    fn from(error: TokenStreamError) -> Self {
        match error {
            TokenStreamError::UnexpectedToken { found, span, .. } => Self::unexpected(found, span),
            TokenStreamError::UnexpectedEndOfStream { span, .. } => Self::incomplete(span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;
    use crate::utils::Position;

    #[test]
    fn test_error_codes() {
        let span = Span::dummy();
        assert_eq!(
            EvalError::DivisionByZero { span }.error_code().as_str(),
            "E060"
        );
        assert_eq!(EvalError::unbalanced(span).error_code().as_str(), "E040");
        assert_eq!(
            EvalError::domain("sqrt", -1.0, "Square root of negative number")
                .error_code()
                .as_str(),
            "E100"
        );
    }

    #[test]
    fn test_display() {
        let error = EvalError::domain("sqrt", -1.0, "Square root of negative number");
        assert_eq!(error.to_string(), "Square root of negative number: sqrt(-1)");

        let span = Span::single(Position::new(1, 1, 2), '/');
        assert_eq!(
            EvalError::DivisionByZero { span }.to_string(),
            "Division by zero at 1:2-3"
        );
    }

    #[test]
    fn test_from_token_stream_error() {
        let span = Span::dummy();
        let converted: EvalError = TokenStreamError::UnexpectedEndOfStream {
            expected: TokenKind::RParen,
            span,
        }
        .into();
        assert_eq!(converted, EvalError::incomplete(span));
    }

    #[test]
    fn test_spans() {
        assert!(EvalError::NonFiniteResult { value: f64::INFINITY }
            .span()
            .is_none());
        assert!(EvalError::incomplete(Span::dummy()).span().is_some());
    }
}
