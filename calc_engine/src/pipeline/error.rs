use crate::config::constants::compile_time::lexical::MAX_EXPRESSION_LENGTH;
use crate::evaluator::EvalError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::scientific::ScientificError;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure classification shared by every stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidCharacter,
    MalformedNumber,
    UnbalancedParentheses,
    IncompleteExpression,
    UnexpectedToken,
    DivisionByZero,
    DomainError,
    NonFiniteResult,
    LimitExceeded,
    UnknownFunction,
    ValueOutOfRange,
    InvalidRequest,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCharacter => "InvalidCharacter",
            Self::MalformedNumber => "MalformedNumber",
            Self::UnbalancedParentheses => "UnbalancedParentheses",
            Self::IncompleteExpression => "IncompleteExpression",
            Self::UnexpectedToken => "UnexpectedToken",
            Self::DivisionByZero => "DivisionByZero",
            Self::DomainError => "DomainError",
            Self::NonFiniteResult => "NonFiniteResult",
            Self::LimitExceeded => "LimitExceeded",
            Self::UnknownFunction => "UnknownFunction",
            Self::ValueOutOfRange => "ValueOutOfRange",
            Self::InvalidRequest => "InvalidRequest",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LexerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LexerError::InvalidCharacter { .. } => ErrorKind::InvalidCharacter,
            LexerError::MalformedNumber { .. } => ErrorKind::MalformedNumber,
            LexerError::TooManyTokens { .. } => ErrorKind::LimitExceeded,
        }
    }
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UnbalancedParentheses { .. } => ErrorKind::UnbalancedParentheses,
            EvalError::IncompleteExpression { .. } => ErrorKind::IncompleteExpression,
            EvalError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            EvalError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            EvalError::DomainError { .. } => ErrorKind::DomainError,
            EvalError::NonFiniteResult { .. } => ErrorKind::NonFiniteResult,
            EvalError::NestingTooDeep { .. } => ErrorKind::LimitExceeded,
        }
    }
}

impl ScientificError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScientificError::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            ScientificError::ValueOutOfRange { .. } => ErrorKind::ValueOutOfRange,
            ScientificError::Evaluation(inner) => inner.kind(),
        }
    }
}

/// Errors at the request boundary
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Expression too long: {length} characters (max {max})")]
    ExpressionTooLong { length: usize, max: usize },

    #[error("Expression cannot be empty")]
    EmptyExpression { span: Span },

    #[error("Lexical analysis failed: {0}")]
    Lexical(#[from] LexerError),

    #[error("Evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    #[error("Scientific function failed: {0}")]
    Scientific(#[from] ScientificError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PipelineError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExpressionTooLong { .. } => ErrorKind::LimitExceeded,
            Self::EmptyExpression { .. } => ErrorKind::IncompleteExpression,
            Self::Lexical(error) => error.kind(),
            Self::Evaluation(error) => error.kind(),
            Self::Scientific(error) => error.kind(),
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::ExpressionTooLong { .. } => codes::request::EXPRESSION_TOO_LONG,
            Self::EmptyExpression { .. } => codes::evaluation::INCOMPLETE_EXPRESSION,
            Self::Lexical(error) => error.error_code(),
            Self::Evaluation(error) => error.error_code(),
            Self::Scientific(error) => error.error_code(),
            Self::InvalidRequest { .. } => codes::request::INVALID_REQUEST,
            Self::Internal { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Response status a transport should use: every client mistake is a
    /// 400, anything else a 500
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Internal { .. } => 500,
            _ => 400,
        }
    }

    /// Source span of the failure, when it points into the expression
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::EmptyExpression { span } => Some(*span),
            Self::Lexical(error) => error.span(),
            Self::Evaluation(error) => error.span(),
            _ => None,
        }
    }

    /// Client-facing message. Stable wording; detail stays in logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::ExpressionTooLong { .. } => format!(
                "Expression too long (max {} characters)",
                MAX_EXPRESSION_LENGTH
            ),
            Self::EmptyExpression { .. } => "Expression cannot be empty".to_string(),
            Self::Lexical(LexerError::InvalidCharacter { .. }) => {
                "Invalid characters in expression".to_string()
            }
            Self::Lexical(_) => "Invalid expression".to_string(),
            Self::Evaluation(error) => eval_message(error),
            Self::Scientific(ScientificError::UnknownFunction { .. }) => {
                "Unknown function".to_string()
            }
            Self::Scientific(ScientificError::ValueOutOfRange { .. }) => {
                "Value too large".to_string()
            }
            Self::Scientific(ScientificError::Evaluation(error)) => eval_message(error),
            Self::InvalidRequest { message } => message.clone(),
            Self::Internal { .. } => "Calculation error".to_string(),
        }
    }
}

fn eval_message(error: &EvalError) -> String {
    match error {
        EvalError::DivisionByZero { .. } => "Division by zero".to_string(),
        EvalError::DomainError { reason, .. } => reason.clone(),
        EvalError::NonFiniteResult { value } if value.is_nan() => "Not a number".to_string(),
        EvalError::NonFiniteResult { .. } => "Infinity".to_string(),
        _ => "Invalid expression".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_kinds_follow_stage_errors() {
        let span = Span::dummy();
        assert_eq!(
            PipelineError::from(EvalError::DivisionByZero { span }).kind(),
            ErrorKind::DivisionByZero
        );
        assert_eq!(
            PipelineError::from(ScientificError::from(EvalError::domain(
                "sqrt",
                -1.0,
                "Square root of negative number"
            )))
            .kind(),
            ErrorKind::DomainError
        );
        assert_eq!(
            PipelineError::from(LexerError::InvalidCharacter {
                character: 'a',
                position: Position::start()
            })
            .kind(),
            ErrorKind::InvalidCharacter
        );
        assert_eq!(
            PipelineError::EmptyExpression { span }.kind(),
            ErrorKind::IncompleteExpression
        );
    }

    #[test]
    fn test_user_messages() {
        let span = Span::dummy();
        assert_eq!(
            PipelineError::from(EvalError::DivisionByZero { span }).user_message(),
            "Division by zero"
        );
        assert_eq!(
            PipelineError::from(EvalError::incomplete(span)).user_message(),
            "Invalid expression"
        );
        assert_eq!(
            PipelineError::from(EvalError::NonFiniteResult {
                value: f64::INFINITY
            })
            .user_message(),
            "Infinity"
        );
        assert_eq!(
            PipelineError::from(ScientificError::UnknownFunction {
                name: "cbrt".to_string()
            })
            .user_message(),
            "Unknown function"
        );
        assert_eq!(
            PipelineError::from(ScientificError::out_of_range(1e12)).user_message(),
            "Value too large"
        );
        assert_eq!(
            PipelineError::ExpressionTooLong {
                length: 2000,
                max: MAX_EXPRESSION_LENGTH
            }
            .user_message(),
            format!(
                "Expression too long (max {} characters)",
                MAX_EXPRESSION_LENGTH
            )
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PipelineError::invalid_request("bad").status_code(), 400);
        assert_eq!(PipelineError::internal("boom").status_code(), 500);
        assert_eq!(
            PipelineError::internal("boom").error_code(),
            codes::system::INTERNAL_ERROR
        );
    }
}
