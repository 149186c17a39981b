// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    evaluation: EvaluationLimits,
    scientific: ScientificLimits,
    batch_processing: BatchProcessingLimits,
    session: SessionLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_expression_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
}

#[derive(serde::Deserialize)]
struct EvaluationLimits {
    result_decimal_places: u32,
}

#[derive(serde::Deserialize)]
struct ScientificLimits {
    max_input_magnitude: f64,
    max_factorial_input: u32,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_expressions_per_batch: usize,
    max_batch_line_length: usize,
}

#[derive(serde::Deserialize)]
struct SessionLimits {
    max_display_length: usize,
    max_history_entries: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_source: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CALC_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=CALC_CONFIG_DIR");

    let profile = env::var("CALC_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("CALC_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the calc_engine directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_security_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_security_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_EXPRESSION_LENGTH: usize = 100_000;
    const ABSOLUTE_MAX_PARSE_DEPTH: usize = 1_000;
    const ABSOLUTE_MAX_WORKER_THREADS: usize = 256;
    // 171! overflows f64
    const ABSOLUTE_MAX_FACTORIAL_INPUT: u32 = 170;

    if config.lexical.max_expression_length > ABSOLUTE_MAX_EXPRESSION_LENGTH {
        panic!("SECURITY: max_expression_length exceeds absolute maximum");
    }

    if config.lexical.max_token_count == 0 {
        panic!("SECURITY: max_token_count must be positive");
    }

    if config.syntax.max_parse_depth == 0 || config.syntax.max_parse_depth > ABSOLUTE_MAX_PARSE_DEPTH
    {
        panic!(
            "SECURITY: max_parse_depth must be within 1..={}",
            ABSOLUTE_MAX_PARSE_DEPTH
        );
    }

    if config.evaluation.result_decimal_places > 15 {
        panic!("CONFIG: result_decimal_places beyond f64 precision (max: 15)");
    }

    if !(config.scientific.max_input_magnitude.is_finite()
        && config.scientific.max_input_magnitude > 0.0)
    {
        panic!("CONFIG: max_input_magnitude must be a positive finite number");
    }

    if config.scientific.max_factorial_input > ABSOLUTE_MAX_FACTORIAL_INPUT {
        panic!("CONFIG: max_factorial_input exceeds f64 range (max: 170)");
    }

    if config.batch_processing.max_worker_threads == 0
        || config.batch_processing.max_worker_threads > ABSOLUTE_MAX_WORKER_THREADS
    {
        panic!("SECURITY: max_worker_threads out of range");
    }

    if config.session.max_history_entries == 0 {
        panic!("CONFIG: max_history_entries must be positive");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if config.logging.max_log_events_per_source > config.logging.log_buffer_size {
        panic!("CONFIG: max_log_events_per_source exceeds log_buffer_size");
    }

    if profile == "production" {
        if config.lexical.max_expression_length > 10_000 {
            panic!("PRODUCTION: max_expression_length too high for production");
        }
        if config.syntax.max_parse_depth > 200 {
            panic!("PRODUCTION: max_parse_depth too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_EXPRESSION_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_PARSE_DEPTH: usize = {};
    }}

    pub mod evaluation {{
        pub const RESULT_DECIMAL_PLACES: u32 = {};
    }}

    pub mod scientific {{
        pub const MAX_INPUT_MAGNITUDE: f64 = {:?};
        pub const MAX_FACTORIAL_INPUT: u32 = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_EXPRESSIONS_PER_BATCH: usize = {};
        pub const MAX_BATCH_LINE_LENGTH: usize = {};
    }}

    pub mod session {{
        pub const MAX_DISPLAY_LENGTH: usize = {};
        pub const MAX_HISTORY_ENTRIES: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_SOURCE: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        // Lexical
        config.lexical.max_expression_length,
        config.lexical.max_token_count,
        // Syntax
        config.syntax.max_parse_depth,
        // Evaluation
        config.evaluation.result_decimal_places,
        // Scientific
        config.scientific.max_input_magnitude,
        config.scientific.max_factorial_input,
        // Batch Processing
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_expressions_per_batch,
        config.batch_processing.max_batch_line_length,
        // Session
        config.session.max_display_length,
        config.session.max_history_entries,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_source,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
