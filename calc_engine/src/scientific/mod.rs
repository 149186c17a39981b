//! Scientific function dispatch
//!
//! Functions are looked up by name in a fixed table and applied to a single
//! value. They are never parsed as part of an expression.

mod error;
mod function;

pub use error::ScientificError;
pub use function::ScientificFunction;

use crate::config::constants::compile_time::scientific::MAX_INPUT_MAGNITUDE;
use crate::config::runtime::ScientificPreferences;
use crate::evaluator::round_result;
use crate::logging::codes;
use crate::{log_error, log_success, log_warning};

/// Dispatch `function` on `value` with default preferences.
/// Checks run in order: name, input magnitude, function domain.
pub fn dispatch(function: &str, value: f64) -> Result<f64, ScientificError> {
    dispatch_with_preferences(function, value, &ScientificPreferences::default())
}

pub fn dispatch_with_preferences(
    function: &str,
    value: f64,
    preferences: &ScientificPreferences,
) -> Result<f64, ScientificError> {
    let result = function
        .parse::<ScientificFunction>()
        .and_then(|f| checked_apply(f, value));

    match &result {
        Ok(output) => {
            log_success!(codes::success::SCIENTIFIC_FUNCTION_COMPLETE,
                "Scientific function evaluated",
                "function" => function,
                "value" => value,
                "result" => output
            );
        }
        Err(error) => {
            if error.is_domain_error() && preferences.log_domain_violations {
                log_warning!(code = codes::scientific::DOMAIN_ERROR, "Rejected input outside function domain",
                    "function" => function,
                    "value" => value
                );
            }
            log_error!(error.error_code(), &error.to_string(),
                "function" => function,
                "value" => value
            );
        }
    }

    result
}

fn checked_apply(function: ScientificFunction, value: f64) -> Result<f64, ScientificError> {
    if !value.is_finite() || value.abs() > MAX_INPUT_MAGNITUDE {
        return Err(ScientificError::out_of_range(value));
    }

    let output = function.apply(value)?;
    Ok(round_result(output))
}

/// Names accepted by [`dispatch`], in table order
pub fn function_names() -> Vec<&'static str> {
    ScientificFunction::ALL.iter().map(|f| f.as_str()).collect()
}
