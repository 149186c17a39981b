//! Consolidated error codes and classification system
//!
//! Single source of truth for every error and success code emitted by the
//! engine, together with the metadata the logging layer uses to classify them.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// Request validation error codes
pub mod request {
    use super::Code;

    pub const EXPRESSION_TOO_LONG: Code = Code::new("E005");
    pub const INVALID_REQUEST: Code = Code::new("E006");
    pub const IO_ERROR: Code = Code::new("E007");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const MALFORMED_NUMBER: Code = Code::new("E022");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Expression evaluation error codes
pub mod evaluation {
    use super::Code;

    pub const UNBALANCED_PARENTHESES: Code = Code::new("E040");
    pub const INCOMPLETE_EXPRESSION: Code = Code::new("E041");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const DIVISION_BY_ZERO: Code = Code::new("E060");
    pub const NON_FINITE_RESULT: Code = Code::new("E061");
    pub const MAX_NESTING_DEPTH: Code = Code::new("E087");
}

/// Scientific function error codes
pub mod scientific {
    use super::Code;

    pub const DOMAIN_ERROR: Code = Code::new("E100");
    pub const UNKNOWN_FUNCTION: Code = Code::new("E101");
    pub const VALUE_OUT_OF_RANGE: Code = Code::new("E102");
}

/// Interactive session error codes
pub mod session {
    use super::Code;

    pub const DISPLAY_OVERFLOW: Code = Code::new("E120");
}

/// Batch evaluation error codes
pub mod batch {
    use super::Code;

    pub const SOURCE_NOT_FOUND: Code = Code::new("E140");
    pub const TOO_MANY_EXPRESSIONS: Code = Code::new("E141");
    pub const WORKER_FAILURE: Code = Code::new("E142");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const EVALUATION_COMPLETE: Code = Code::new("I040");
    pub const SCIENTIFIC_FUNCTION_COMPLETE: Code = Code::new("I050");
    pub const CALCULATION_COMPLETE: Code = Code::new("I060");
    pub const SESSION_ACTION_APPLIED: Code = Code::new("I070");
    pub const BATCH_COMPLETE: Code = Code::new("I080");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut reg = |code: Code,
                       category: &'static str,
                       severity: Severity,
                       recoverable: bool,
                       requires_halt: bool,
                       description: &'static str,
                       action: &'static str| {
            registry.insert(
                code.as_str(),
                ErrorMetadata::new(
                    code.as_str(),
                    category,
                    severity,
                    recoverable,
                    requires_halt,
                    description,
                    action,
                ),
            );
        };

        // System errors
        reg(
            system::INTERNAL_ERROR,
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal engine error",
            "File a bug report with the failing expression",
        );
        reg(
            system::INITIALIZATION_FAILURE,
            "System",
            Severity::Critical,
            false,
            true,
            "Engine initialization failure",
            "Check logging and configuration setup",
        );
        reg(
            system::CONFIGURATION_ERROR,
            "System",
            Severity::High,
            false,
            true,
            "Runtime configuration could not be loaded",
            "Fix the configuration file or unset the offending CALC_* variable",
        );

        // Request errors
        reg(
            request::EXPRESSION_TOO_LONG,
            "Request",
            Severity::Medium,
            true,
            false,
            "Expression exceeds maximum length",
            "Shorten the expression to 1000 characters or less",
        );
        reg(
            request::INVALID_REQUEST,
            "Request",
            Severity::Low,
            true,
            false,
            "Request is missing a required field or is malformed",
            "Provide an expression or a function name with a numeric value",
        );
        reg(
            request::IO_ERROR,
            "Request",
            Severity::Medium,
            false,
            true,
            "I/O error while reading input",
            "Check file permissions and path",
        );

        // Lexical errors
        reg(
            lexical::INVALID_CHARACTER,
            "Lexical",
            Severity::Medium,
            true,
            false,
            "Character outside the calculator alphabet",
            "Use only digits, '.', whitespace, + - * / x and parentheses",
        );
        reg(
            lexical::MALFORMED_NUMBER,
            "Lexical",
            Severity::Low,
            true,
            false,
            "Number literal is malformed",
            "Remove extra decimal points",
        );
        reg(
            lexical::TOO_MANY_TOKENS,
            "Lexical",
            Severity::High,
            false,
            true,
            "Expression produced too many tokens",
            "Split the computation into smaller expressions",
        );

        // Evaluation errors
        reg(
            evaluation::UNBALANCED_PARENTHESES,
            "Evaluation",
            Severity::Medium,
            true,
            false,
            "Parentheses are not balanced",
            "Match every '(' with a ')'",
        );
        reg(
            evaluation::INCOMPLETE_EXPRESSION,
            "Evaluation",
            Severity::Medium,
            true,
            false,
            "Expression ended where an operand was required",
            "Complete the expression with a number or parenthesized group",
        );
        reg(
            evaluation::UNEXPECTED_TOKEN,
            "Evaluation",
            Severity::Medium,
            true,
            false,
            "Unexpected token during evaluation",
            "Insert an explicit operator between operands",
        );
        reg(
            evaluation::DIVISION_BY_ZERO,
            "Evaluation",
            Severity::Medium,
            true,
            false,
            "Division by zero",
            "Change the divisor",
        );
        reg(
            evaluation::NON_FINITE_RESULT,
            "Evaluation",
            Severity::Medium,
            true,
            false,
            "Computation produced infinity or NaN",
            "Reduce operand magnitudes",
        );
        reg(
            evaluation::MAX_NESTING_DEPTH,
            "Evaluation",
            Severity::High,
            false,
            true,
            "Maximum nesting depth exceeded",
            "Reduce parenthesis or sign nesting",
        );

        // Scientific errors
        reg(
            scientific::DOMAIN_ERROR,
            "Scientific",
            Severity::Low,
            true,
            false,
            "Input outside the mathematical domain of the function",
            "Choose a value inside the function's domain",
        );
        reg(
            scientific::UNKNOWN_FUNCTION,
            "Scientific",
            Severity::Low,
            true,
            false,
            "Function name is not supported",
            "Use one of sin, cos, tan, log, ln, sqrt, pow, factorial, abs, negate",
        );
        reg(
            scientific::VALUE_OUT_OF_RANGE,
            "Scientific",
            Severity::Low,
            true,
            false,
            "Input magnitude exceeds the accepted range",
            "Use a value with magnitude of at most 1e10",
        );

        // Session errors
        reg(
            session::DISPLAY_OVERFLOW,
            "Session",
            Severity::Low,
            true,
            false,
            "Display text reached its maximum length",
            "Evaluate or clear before entering more input",
        );

        // Batch errors
        reg(
            batch::SOURCE_NOT_FOUND,
            "Batch",
            Severity::Medium,
            false,
            true,
            "Batch source file not found",
            "Check the batch file path",
        );
        reg(
            batch::TOO_MANY_EXPRESSIONS,
            "Batch",
            Severity::High,
            false,
            true,
            "Batch file contains too many expressions",
            "Split the batch into smaller files",
        );
        reg(
            batch::WORKER_FAILURE,
            "Batch",
            Severity::Critical,
            false,
            true,
            "Batch worker thread failed",
            "Retry with --sequential and report the failure",
        );

        // Success codes
        reg(
            success::SYSTEM_INITIALIZATION_COMPLETED,
            "System",
            Severity::Low,
            true,
            false,
            "Engine initialization completed successfully",
            "Continue normal operation",
        );
        reg(
            success::CALCULATION_COMPLETE,
            "Calculation",
            Severity::Low,
            true,
            false,
            "Calculation completed successfully",
            "Continue normal operation",
        );
        reg(
            success::BATCH_COMPLETE,
            "Batch",
            Severity::Low,
            true,
            false,
            "Batch evaluation completed",
            "Review per-expression results",
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_metadata() {
        let meta = get_error_metadata(evaluation::DIVISION_BY_ZERO.as_str()).unwrap();
        assert_eq!(meta.category, "Evaluation");
        assert!(meta.recoverable);
        assert!(!meta.requires_halt);

        assert_eq!(get_category(scientific::DOMAIN_ERROR.as_str()), "Scientific");
        assert_eq!(get_severity(system::INTERNAL_ERROR.as_str()), Severity::Critical);
        assert!(requires_halt(evaluation::MAX_NESTING_DEPTH.as_str()));
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
        assert_eq!(get_severity("E999"), Severity::Medium);
        assert!(is_recoverable("E999"));
        assert!(!requires_halt("E999"));
    }

    #[test]
    fn test_severity_round_trip() {
        for severity in [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ] {
            assert_eq!(Severity::from_str(severity.as_str()), Some(severity));
        }
    }
}
