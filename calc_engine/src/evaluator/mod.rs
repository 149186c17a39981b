//! Expression evaluation - TokenStream to rounded f64
//!
//! Balance of parentheses is validated first, then a recursive-descent pass
//! computes the value with standard precedence. The result is rounded to
//! `RESULT_DECIMAL_PLACES` places before it is returned.

mod error;
mod parser;
mod rounding;

pub use error::{EvalError, EvalResult};
pub use parser::{check_balance, Parser};
pub use rounding::{format_result, round_result};

use crate::config::runtime::EvaluatorPreferences;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_error, log_success};

/// Evaluate a token stream with default preferences
pub fn evaluate(tokens: TokenStream) -> EvalResult<f64> {
    evaluate_with_preferences(tokens, EvaluatorPreferences::default())
}

pub fn evaluate_with_preferences(
    tokens: TokenStream,
    preferences: EvaluatorPreferences,
) -> EvalResult<f64> {
    let token_count = tokens.len();
    let source = match (preferences.include_expression_in_logs, tokens.source_map()) {
        (true, Some(source_map)) => source_map.source.clone(),
        _ => String::new(),
    };

    if let Err(error) = check_balance(&tokens) {
        log_failure(&error, &source);
        return Err(error);
    }

    let mut parser = Parser::with_preferences(tokens, preferences);
    let value = match parser.parse() {
        Ok(value) => round_result(value),
        Err(error) => {
            log_failure(&error, &source);
            return Err(error);
        }
    };

    log_success!(codes::success::EVALUATION_COMPLETE,
        "Expression evaluated",
        "tokens" => token_count,
        "operations" => parser.operations(),
        "max_depth" => parser.max_depth_seen(),
        "result" => value
    );

    Ok(value)
}

fn log_failure(error: &EvalError, source: &str) {
    match error.span() {
        Some(span) => log_error!(error.error_code(), &error.to_string(),
            span = span,
            "expression" => source
        ),
        None => log_error!(error.error_code(), &error.to_string(),
            "expression" => source
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use assert_matches::assert_matches;

    fn eval(source: &str) -> EvalResult<f64> {
        evaluate(tokenize(source).unwrap())
    }

    #[test]
    fn test_results_are_rounded() {
        assert_eq!(eval("0.1+0.2"), Ok(0.3));
        assert_eq!(format_result(eval("0.1+0.2").unwrap()), "0.3");
        assert_eq!(format_result(eval("1/3").unwrap()), "0.3333333333");
    }

    #[test]
    fn test_unicode_operators_evaluate_like_ascii() {
        assert_eq!(eval("6\u{00D7}7"), eval("6*7"));
        assert_eq!(eval("9\u{00F7}4"), Ok(2.25));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let first = eval("(1.5 + 2.25) * -4 / 3");
        for _ in 0..10 {
            assert_eq!(eval("(1.5 + 2.25) * -4 / 3"), first);
        }
        assert_eq!(first, Ok(-5.0));
    }

    #[test]
    fn test_error_kinds() {
        assert_matches!(eval("5/0"), Err(EvalError::DivisionByZero { .. }));
        assert_matches!(eval("(2+3"), Err(EvalError::UnbalancedParentheses { .. }));
        assert_matches!(eval("2+"), Err(EvalError::IncompleteExpression { .. }));
    }

    #[test]
    fn test_with_preferences() {
        let preferences = EvaluatorPreferences {
            trace_operations: true,
            include_expression_in_logs: false,
        };
        let tokens = tokenize("2 * 3 + 1").unwrap();
        assert_eq!(evaluate_with_preferences(tokens, preferences), Ok(7.0));
    }
}
