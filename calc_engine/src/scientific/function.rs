//! The fixed table of single-argument scientific functions

use crate::config::constants::compile_time::scientific::MAX_FACTORIAL_INPUT;
use crate::evaluator::{EvalError, EvalResult};
use crate::scientific::error::ScientificError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScientificFunction {
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
    Sqrt,
    Pow,
    Factorial,
    Abs,
    Negate,
}

impl ScientificFunction {
    pub const ALL: [ScientificFunction; 10] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Log,
        Self::Ln,
        Self::Sqrt,
        Self::Pow,
        Self::Factorial,
        Self::Abs,
        Self::Negate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Log => "log",
            Self::Ln => "ln",
            Self::Sqrt => "sqrt",
            Self::Pow => "pow",
            Self::Factorial => "factorial",
            Self::Abs => "abs",
            Self::Negate => "negate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Sin => "Sine (degrees)",
            Self::Cos => "Cosine (degrees)",
            Self::Tan => "Tangent (degrees)",
            Self::Log => "Base-10 logarithm",
            Self::Ln => "Natural logarithm",
            Self::Sqrt => "Square root",
            Self::Pow => "Square (x\u{00B2})",
            Self::Factorial => "Factorial",
            Self::Abs => "Absolute value",
            Self::Negate => "Negate value",
        }
    }

    /// Domain check for `value`; `Err` carries the reason text
    pub fn check_domain(&self, value: f64) -> Result<(), &'static str> {
        match self {
            Self::Sqrt if value < 0.0 => Err("Square root of negative number"),
            Self::Log if value <= 0.0 => Err("Logarithm of non-positive number"),
            Self::Ln if value <= 0.0 => Err("Natural log of non-positive number"),
            Self::Factorial
                if value < 0.0
                    || value.fract() != 0.0
                    || value > f64::from(MAX_FACTORIAL_INPUT) =>
            {
                Err("Invalid factorial input")
            }
            // tan has poles at 90 + 180k degrees
            Self::Tan if (value - 90.0).rem_euclid(180.0) == 0.0 => {
                Err("Tangent undefined at this angle")
            }
            _ => Ok(()),
        }
    }

    /// Apply the function after its domain check. Trig inputs are degrees.
    pub fn apply(&self, value: f64) -> EvalResult<f64> {
        self.check_domain(value)
            .map_err(|reason| EvalError::domain(self.as_str(), value, reason))?;

        let result = match self {
            Self::Sin => value.to_radians().sin(),
            Self::Cos => value.to_radians().cos(),
            Self::Tan => value.to_radians().tan(),
            Self::Log => value.log10(),
            Self::Ln => value.ln(),
            Self::Sqrt => value.sqrt(),
            Self::Pow => value * value,
            Self::Factorial => factorial(value as u32),
            Self::Abs => value.abs(),
            Self::Negate => -value,
        };

        if result.is_finite() {
            Ok(result)
        } else {
            Err(EvalError::NonFiniteResult { value: result })
        }
    }
}

fn factorial(n: u32) -> f64 {
    (2..=n).fold(1.0, |acc, k| acc * f64::from(k))
}

impl FromStr for ScientificFunction {
    type Err = ScientificError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|function| function.as_str() == name)
            .ok_or_else(|| ScientificError::UnknownFunction {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for ScientificFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_names_round_trip() {
        for function in ScientificFunction::ALL {
            assert_eq!(function.as_str().parse::<ScientificFunction>(), Ok(function));
        }
        assert_matches!(
            "SIN".parse::<ScientificFunction>(),
            Err(ScientificError::UnknownFunction { .. })
        );
    }

    #[test]
    fn test_domains() {
        assert!(ScientificFunction::Sqrt.check_domain(-1.0).is_err());
        assert!(ScientificFunction::Sqrt.check_domain(0.0).is_ok());
        assert!(ScientificFunction::Log.check_domain(0.0).is_err());
        assert!(ScientificFunction::Ln.check_domain(-3.0).is_err());
        assert!(ScientificFunction::Factorial.check_domain(-1.0).is_err());
        assert!(ScientificFunction::Factorial.check_domain(2.5).is_err());
        assert!(ScientificFunction::Factorial.check_domain(171.0).is_err());
        assert!(ScientificFunction::Factorial.check_domain(170.0).is_ok());
        assert!(ScientificFunction::Tan.check_domain(90.0).is_err());
        assert!(ScientificFunction::Tan.check_domain(-90.0).is_err());
        assert!(ScientificFunction::Tan.check_domain(270.0).is_err());
        assert!(ScientificFunction::Tan.check_domain(180.0).is_ok());
    }

    #[test]
    fn test_apply_reports_domain_error() {
        assert_matches!(
            ScientificFunction::Sqrt.apply(-1.0),
            Err(EvalError::DomainError { ref function, value, .. }) if function == "sqrt" && value == -1.0
        );
    }

    #[test]
    fn test_factorial() {
        assert_eq!(ScientificFunction::Factorial.apply(0.0), Ok(1.0));
        assert_eq!(ScientificFunction::Factorial.apply(5.0), Ok(120.0));
        assert!(ScientificFunction::Factorial.apply(170.0).unwrap().is_finite());
    }

    #[test]
    fn test_simple_functions() {
        assert_eq!(ScientificFunction::Pow.apply(-3.0), Ok(9.0));
        assert_eq!(ScientificFunction::Abs.apply(-2.5), Ok(2.5));
        assert_eq!(ScientificFunction::Negate.apply(4.0), Ok(-4.0));
        assert_eq!(ScientificFunction::Sqrt.apply(16.0), Ok(4.0));
    }
}
