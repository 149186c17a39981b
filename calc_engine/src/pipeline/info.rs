use crate::config::constants::compile_time::{evaluation, lexical, scientific, syntax};

/// Capabilities and limits of the calculation pipeline
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub pipeline_stages: usize,
    pub operators: Vec<&'static str>,
    pub scientific_functions: Vec<&'static str>,
    pub max_expression_length: usize,
    pub max_token_count: usize,
    pub max_parse_depth: usize,
    pub result_decimal_places: u32,
    pub max_function_input: f64,
    pub max_factorial_input: u32,
    pub config_source: String,
    pub global_logging_enabled: bool,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "Calculator Pipeline:\n\
             - Pipeline Stages: {}\n\
             - Operators: {}\n\
             - Scientific Functions: {}\n\
             - Max Expression Length: {} characters\n\
             - Max Token Count: {}\n\
             - Max Nesting Depth: {}\n\
             - Result Precision: {} decimal places\n\
             - Max Function Input: {:e}\n\
             - Max Factorial Input: {}\n\
             - Limits: {}\n\
             - Global Logging: {}",
            self.pipeline_stages,
            self.operators.join(" "),
            self.scientific_functions.join(", "),
            self.max_expression_length,
            self.max_token_count,
            self.max_parse_depth,
            self.result_decimal_places,
            self.max_function_input,
            self.max_factorial_input,
            self.config_source,
            self.global_logging_enabled,
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-stage calculator with {} scientific functions, {} decimal places",
            self.pipeline_stages,
            self.scientific_functions.len(),
            self.result_decimal_places
        )
    }
}

pub fn get_pipeline_info() -> PipelineInfo {
    PipelineInfo {
        pipeline_stages: 3,
        operators: vec!["+", "-", "*", "/", "\u{00D7}", "\u{00F7}", "(", ")"],
        scientific_functions: crate::scientific::function_names(),
        max_expression_length: lexical::MAX_EXPRESSION_LENGTH,
        max_token_count: lexical::MAX_TOKEN_COUNT,
        max_parse_depth: syntax::MAX_PARSE_DEPTH,
        result_decimal_places: evaluation::RESULT_DECIMAL_PLACES,
        max_function_input: scientific::MAX_INPUT_MAGNITUDE,
        max_factorial_input: scientific::MAX_FACTORIAL_INPUT,
        config_source: crate::config::build_info::source_info(),
        global_logging_enabled: crate::logging::is_initialized(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_info() {
        let info = get_pipeline_info();
        assert_eq!(info.scientific_functions.len(), 10);
        assert!(info.report().contains("Scientific Functions: sin, cos, tan"));
        assert!(info.summary().starts_with("3-stage calculator"));
    }
}
