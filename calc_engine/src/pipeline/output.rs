//! Request and response bodies of the calculator service

use crate::pipeline::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// `{"expression": "2+3*4"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticRequest {
    pub expression: String,
}

/// `{"function": "sin", "value": 30}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScientificRequest {
    pub function: String,
    #[serde(default)]
    pub value: f64,
}

/// Either request shape; scientific bodies are recognised by `function`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculationRequest {
    Scientific(ScientificRequest),
    Arithmetic(ArithmeticRequest),
}

/// `{"result": "14"}` or `{"error": "Division by zero"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculationOutput {
    Success { result: String },
    Failure { error: String },
}

impl CalculationOutput {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl From<&Result<PipelineResult, PipelineError>> for CalculationOutput {
    fn from(outcome: &Result<PipelineResult, PipelineError>) -> Self {
        match outcome {
            Ok(result) => Self::Success {
                result: result.rendered.clone(),
            },
            Err(error) => Self::Failure {
                error: error.user_message(),
            },
        }
    }
}

impl From<Result<PipelineResult, PipelineError>> for CalculationOutput {
    fn from(outcome: Result<PipelineResult, PipelineError>) -> Self {
        Self::from(&outcome)
    }
}

/// Status code plus body, ready for any transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResponse {
    pub status: u16,
    pub body: CalculationOutput,
}

impl From<&Result<PipelineResult, PipelineError>> for CalculationResponse {
    fn from(outcome: &Result<PipelineResult, PipelineError>) -> Self {
        let status = match outcome {
            Ok(_) => 200,
            Err(error) => error.status_code(),
        };
        Self {
            status,
            body: CalculationOutput::from(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_json_shapes() {
        let success = CalculationOutput::Success {
            result: "14".to_string(),
        };
        assert_eq!(success.to_json(false).unwrap(), r#"{"result":"14"}"#);

        let failure = CalculationOutput::Failure {
            error: "Division by zero".to_string(),
        };
        assert_eq!(
            failure.to_json(false).unwrap(),
            r#"{"error":"Division by zero"}"#
        );
        assert!(!failure.is_success());
    }

    #[test]
    fn test_request_shapes() {
        let request: CalculationRequest =
            serde_json::from_str(r#"{"function": "sin", "value": 30}"#).unwrap();
        assert_eq!(
            request,
            CalculationRequest::Scientific(ScientificRequest {
                function: "sin".to_string(),
                value: 30.0
            })
        );

        let request: CalculationRequest =
            serde_json::from_str(r#"{"expression": "2+3"}"#).unwrap();
        assert_eq!(
            request,
            CalculationRequest::Arithmetic(ArithmeticRequest {
                expression: "2+3".to_string()
            })
        );

        assert!(serde_json::from_str::<CalculationRequest>(r#"{"value": 1}"#).is_err());
    }
}
