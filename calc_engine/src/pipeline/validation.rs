use crate::logging::codes;

/// Startup self-check: registered codes, sane limits and a smoke calculation
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating calculation pipeline");

    crate::lexical::validate_tokenization()?;

    let stage_codes = [
        codes::request::EXPRESSION_TOO_LONG,
        codes::evaluation::UNBALANCED_PARENTHESES,
        codes::evaluation::INCOMPLETE_EXPRESSION,
        codes::evaluation::UNEXPECTED_TOKEN,
        codes::evaluation::DIVISION_BY_ZERO,
        codes::evaluation::NON_FINITE_RESULT,
        codes::evaluation::MAX_NESTING_DEPTH,
        codes::scientific::DOMAIN_ERROR,
        codes::scientific::UNKNOWN_FUNCTION,
        codes::scientific::VALUE_OUT_OF_RANGE,
    ];
    for code in &stage_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Error code {} has no registered metadata", code));
        }
    }

    match super::evaluate_expression("2+3*4") {
        Ok(value) if value == 14.0 => {}
        Ok(value) => return Err(format!("Smoke calculation returned {}", value)),
        Err(e) => return Err(format!("Smoke calculation failed: {}", e)),
    }

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Calculation pipeline validation succeeded",
        "codes_checked" => stage_codes.len()
    );

    Ok(())
}
