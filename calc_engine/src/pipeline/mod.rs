//! Request boundary: raw expression or function call in, rounded result or
//! classified error out
//!
//! `expression -> length guard -> lexical -> evaluator -> rounded f64`
//! `function, value -> scientific dispatch -> rounded f64`

mod error;
mod info;
pub mod output;
mod result;
mod validation;

pub use error::{ErrorKind, PipelineError};
pub use info::{get_pipeline_info, PipelineInfo};
pub use output::{
    ArithmeticRequest, CalculationOutput, CalculationRequest, CalculationResponse,
    ScientificRequest,
};
pub use result::{CalculationInput, PipelineResult};
pub use validation::validate_pipeline;

use crate::config::constants::compile_time::lexical::MAX_EXPRESSION_LENGTH;
use crate::config::runtime::RuntimeConfig;
use crate::utils::{Position, Span};
use std::time::Instant;

/// Tokenize and evaluate one expression with the input-length guard applied
pub fn evaluate_expression(raw: &str) -> Result<f64, PipelineError> {
    evaluate_counted(raw, &RuntimeConfig::default()).map(|(value, _)| value)
}

fn evaluate_counted(raw: &str, config: &RuntimeConfig) -> Result<(f64, usize), PipelineError> {
    let length = raw.chars().count();
    if length > MAX_EXPRESSION_LENGTH {
        return Err(PipelineError::ExpressionTooLong {
            length,
            max: MAX_EXPRESSION_LENGTH,
        });
    }

    if raw.trim().is_empty() {
        return Err(PipelineError::EmptyExpression {
            span: Span::point(Position::start()),
        });
    }

    let tokens = crate::lexical::tokenize_with_preferences(raw, config.lexical.clone())?;
    let token_count = tokens.len();
    let value = crate::evaluator::evaluate_with_preferences(tokens, config.evaluator.clone())?;

    Ok((value, token_count))
}

/// Arithmetic request with default runtime preferences
pub fn calculate(request: &ArithmeticRequest) -> Result<PipelineResult, PipelineError> {
    calculate_with_config(request, &RuntimeConfig::default())
}

pub fn calculate_with_config(
    request: &ArithmeticRequest,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    crate::log_debug!("Starting calculation",
        "length" => request.expression.chars().count()
    );

    let outcome = evaluate_counted(&request.expression, config);
    let (value, token_count) = match outcome {
        Ok(pair) => pair,
        Err(error) => {
            log_rejection(&error);
            return Err(error);
        }
    };

    let result = PipelineResult::new(
        CalculationInput::Expression {
            expression: request.expression.clone(),
        },
        value,
        token_count,
        start_time.elapsed(),
    );
    result.log_success();

    Ok(result)
}

/// Scientific request with default runtime preferences
pub fn scientific(request: &ScientificRequest) -> Result<PipelineResult, PipelineError> {
    scientific_with_config(request, &RuntimeConfig::default())
}

pub fn scientific_with_config(
    request: &ScientificRequest,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    let value = crate::scientific::dispatch_with_preferences(
        &request.function,
        request.value,
        &config.scientific,
    )
    .map_err(PipelineError::from)?;

    let result = PipelineResult::new(
        CalculationInput::Function {
            function: request.function.clone(),
            value: request.value,
        },
        value,
        0,
        start_time.elapsed(),
    );
    result.log_success();

    Ok(result)
}

/// Route either request shape
pub fn process_request(
    request: &CalculationRequest,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    match request {
        CalculationRequest::Arithmetic(arithmetic) => calculate_with_config(arithmetic, config),
        CalculationRequest::Scientific(scientific) => scientific_with_config(scientific, config),
    }
}

/// Handle a JSON request body end to end. Malformed bodies become a 400
/// with an `{"error": ..}` body like any other client error.
pub fn handle_json_request(body: &str, config: &RuntimeConfig) -> CalculationResponse {
    let outcome = serde_json::from_str::<CalculationRequest>(body)
        .map_err(|e| {
            crate::log_warning!(code = crate::logging::codes::request::INVALID_REQUEST,
                "Rejected request body",
                "reason" => e
            );
            PipelineError::invalid_request("Invalid request body")
        })
        .and_then(|request| process_request(&request, config));

    CalculationResponse::from(&outcome)
}

// Stage errors are already logged with spans; this records the boundary view.
fn log_rejection(error: &PipelineError) {
    match error {
        PipelineError::ExpressionTooLong { length, max } => {
            crate::log_error!(error.error_code(), "Expression rejected",
                "length" => length,
                "max" => max
            );
        }
        PipelineError::EmptyExpression { .. } => {
            crate::log_error!(error.error_code(), "Expression cannot be empty");
        }
        _ => {
            crate::log_debug!("Calculation failed",
                "kind" => error.kind(),
                "code" => error.error_code()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvalError;
    use crate::lexical::LexerError;
    use crate::scientific::ScientificError;
    use assert_matches::assert_matches;

    fn calc(expression: &str) -> Result<PipelineResult, PipelineError> {
        calculate(&ArithmeticRequest {
            expression: expression.to_string(),
        })
    }

    fn rendered(expression: &str) -> String {
        calc(expression).unwrap().rendered
    }

    #[test]
    fn test_core_properties() {
        assert_eq!(rendered("2+3*4"), "14");
        assert_eq!(rendered("(2+3)*4"), "20");
        assert_eq!(rendered("10-2-3"), "5");
        assert_eq!(rendered("0.1+0.2"), "0.3");
        assert_eq!(rendered("-5+3"), "-2");
        assert_eq!(rendered("3*-2"), "-6");
    }

    #[test]
    fn test_core_failures() {
        assert_matches!(
            evaluate_expression("5/0"),
            Err(PipelineError::Evaluation(EvalError::DivisionByZero { .. }))
        );
        assert_matches!(
            evaluate_expression("(2+3"),
            Err(PipelineError::Evaluation(EvalError::UnbalancedParentheses { .. }))
        );
        assert_matches!(
            evaluate_expression("2+3)"),
            Err(PipelineError::Evaluation(EvalError::UnbalancedParentheses { .. }))
        );
        assert_matches!(
            evaluate_expression("2+a"),
            Err(PipelineError::Lexical(LexerError::InvalidCharacter { .. }))
        );
        assert_matches!(
            evaluate_expression("2+"),
            Err(PipelineError::Evaluation(EvalError::IncompleteExpression { .. }))
        );
        let empty = evaluate_expression("").unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::IncompleteExpression);
        assert_eq!(empty.user_message(), "Expression cannot be empty");
    }

    #[test]
    fn test_length_guard() {
        let long = "1+".repeat(MAX_EXPRESSION_LENGTH / 2) + "1";
        assert_matches!(
            evaluate_expression(&long),
            Err(PipelineError::ExpressionTooLong { .. })
        );

        let at_limit = " ".repeat(MAX_EXPRESSION_LENGTH - 1) + "1";
        assert!(evaluate_expression(&at_limit).is_ok());
    }

    #[test]
    fn test_scientific_requests() {
        let result = scientific(&ScientificRequest {
            function: "sin".to_string(),
            value: 30.0,
        })
        .unwrap();
        assert_eq!(result.rendered, "0.5");

        assert_matches!(
            scientific(&ScientificRequest {
                function: "sqrt".to_string(),
                value: -1.0,
            }),
            Err(PipelineError::Scientific(ScientificError::Evaluation(
                EvalError::DomainError { .. }
            )))
        );
    }

    #[test]
    fn test_output_bodies() {
        let output = CalculationOutput::from(calc("2+3*4"));
        assert_eq!(output.to_json(false).unwrap(), r#"{"result":"14"}"#);

        let output = CalculationOutput::from(calc("5/0"));
        assert_eq!(
            output.to_json(false).unwrap(),
            r#"{"error":"Division by zero"}"#
        );
    }

    #[test]
    fn test_json_requests() {
        let config = RuntimeConfig::default();

        let response = handle_json_request(r#"{"expression": "1/3"}"#, &config);
        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            CalculationOutput::Success {
                result: "0.3333333333".to_string()
            }
        );

        let response = handle_json_request(r#"{"function": "factorial", "value": 2.5}"#, &config);
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            CalculationOutput::Failure {
                error: "Invalid factorial input".to_string()
            }
        );

        let response = handle_json_request("not json", &config);
        assert_eq!(response.status, 400);
        assert!(!response.body.is_success());
    }

    #[test]
    fn test_idempotence() {
        let first = rendered("(7.5 - 2.25) / 3");
        for _ in 0..5 {
            assert_eq!(rendered("(7.5 - 2.25) / 3"), first);
        }
        assert_eq!(first, "1.75");
    }
}
