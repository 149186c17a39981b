use crate::config::constants::compile_time::scientific::MAX_INPUT_MAGNITUDE;
use crate::evaluator::EvalError;
use crate::logging::{codes, Code};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScientificError {
    #[error("Unknown function: '{name}'")]
    UnknownFunction { name: String },

    #[error("Value {value} out of range (max magnitude {limit})")]
    ValueOutOfRange { value: f64, limit: f64 },

    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

impl ScientificError {
    pub fn out_of_range(value: f64) -> Self {
        Self::ValueOutOfRange {
            value,
            limit: MAX_INPUT_MAGNITUDE,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownFunction { .. } => codes::scientific::UNKNOWN_FUNCTION,
            Self::ValueOutOfRange { .. } => codes::scientific::VALUE_OUT_OF_RANGE,
            Self::Evaluation(inner) => inner.error_code(),
        }
    }

    pub fn is_domain_error(&self) -> bool {
        matches!(self, Self::Evaluation(EvalError::DomainError { .. }))
    }
}
