use crate::evaluator::format_result;
use crate::logging::codes;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// What was calculated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CalculationInput {
    Expression { expression: String },
    Function { function: String, value: f64 },
}

impl fmt::Display for CalculationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression { expression } => f.write_str(expression),
            Self::Function { function, value } => write!(f, "{}({})", function, value),
        }
    }
}

/// Successful calculation with its rendered text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub input: CalculationInput,
    pub value: f64,
    pub rendered: String,
    pub token_count: usize,
    #[serde(skip)]
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        input: CalculationInput,
        value: f64,
        token_count: usize,
        processing_duration: Duration,
    ) -> Self {
        Self {
            input,
            value,
            rendered: format_result(value),
            token_count,
            processing_duration,
        }
    }

    pub fn log_success(&self) {
        crate::log_performance!(
            codes::success::CALCULATION_COMPLETE,
            "Calculation completed",
            duration = self.processing_duration,
            "input" => &self.input,
            "result" => &self.rendered,
            "tokens" => self.token_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering_on_construction() {
        let result = PipelineResult::new(
            CalculationInput::Expression {
                expression: "0.1+0.2".to_string(),
            },
            0.1 + 0.2,
            3,
            Duration::from_micros(5),
        );
        assert_eq!(result.rendered, "0.3");
        result.log_success();
    }

    #[test]
    fn test_input_display() {
        let input = CalculationInput::Function {
            function: "sqrt".to_string(),
            value: 16.0,
        };
        assert_eq!(input.to_string(), "sqrt(16)");
    }
}
