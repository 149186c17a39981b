// RUNTIME PREFERENCES (User Experience)
//
// Preferences default from CALC_* environment variables and may be loaded
// from a TOML file. They tune reporting only; they never change evaluation
// results or widen compile-time limits.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to collect per-kind token counts
    pub collect_detailed_metrics: bool,

    /// Whether to show position information in error log messages
    pub include_position_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            include_position_in_errors: env_or(env_vars::LEXICAL_INCLUDE_POSITIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorPreferences {
    /// Emit a debug event for every reduced binary operation
    pub trace_operations: bool,

    /// Attach the raw expression text to evaluation log events
    pub include_expression_in_logs: bool,
}

impl Default for EvaluatorPreferences {
    fn default() -> Self {
        Self {
            trace_operations: env_or(env_vars::EVALUATOR_TRACE_OPERATIONS, false),
            include_expression_in_logs: env_or(env_vars::EVALUATOR_INCLUDE_EXPRESSION, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScientificPreferences {
    /// Log rejected inputs at warning level in addition to the error event
    pub log_domain_violations: bool,
}

impl Default for ScientificPreferences {
    fn default() -> Self {
        Self {
            log_domain_violations: env_or(env_vars::SCIENTIFIC_LOG_DOMAIN_VIOLATIONS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads for parallel batches (0 = available parallelism)
    pub max_threads: usize,

    /// Stop at the first failing expression
    pub fail_fast: bool,

    /// Print per-expression progress lines
    pub progress_reporting: bool,

    /// Treat lines starting with `#` as comments
    pub skip_comment_lines: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            max_threads: env_or(env_vars::BATCH_MAX_THREADS, 0),
            fail_fast: env_or(env_vars::BATCH_FAIL_FAST, false),
            progress_reporting: env_or(env_vars::BATCH_PROGRESS, false),
            skip_comment_lines: env_or(env_vars::BATCH_SKIP_COMMENTS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPreferences {
    /// Print `{"result": ..}` / `{"error": ..}` bodies instead of plain text
    pub json_output: bool,

    pub pretty_json: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            json_output: env_or(env_vars::OUTPUT_JSON, false),
            pretty_json: env_or(env_vars::OUTPUT_PRETTY_JSON, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level (within security constraints)
    pub min_log_level: LogLevel,

    /// Whether to include timing metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to tag events with the expression source (batch line, CLI argument)
    pub include_source_context: bool,

    /// Optional file receiving a copy of every logged event
    pub log_file: Option<String>,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env_or(env_vars::LOGGING_LOG_PERFORMANCE, true),
            enable_cargo_style_output: env_or(env_vars::LOGGING_CARGO_STYLE, true),
            include_source_context: env_or(env_vars::LOGGING_INCLUDE_SOURCE_CONTEXT, true),
            log_file: env::var(env_vars::LOGGING_FILE)
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.trim().to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors raised while loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid runtime configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize runtime configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::system::CONFIGURATION_ERROR
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub evaluator: EvaluatorPreferences,
    pub scientific: ScientificPreferences,
    pub batch: BatchPreferences,
    pub output: OutputPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML text. Missing sections and keys fall back
    /// to their environment-derived defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "CALC_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "CALC_LEXICAL_INCLUDE_POSITIONS";

    // Evaluator
    pub const EVALUATOR_TRACE_OPERATIONS: &str = "CALC_EVALUATOR_TRACE_OPERATIONS";
    pub const EVALUATOR_INCLUDE_EXPRESSION: &str = "CALC_EVALUATOR_INCLUDE_EXPRESSION";

    // Scientific
    pub const SCIENTIFIC_LOG_DOMAIN_VIOLATIONS: &str = "CALC_SCIENTIFIC_LOG_DOMAIN_VIOLATIONS";

    // Batch
    pub const BATCH_MAX_THREADS: &str = "CALC_BATCH_MAX_THREADS";
    pub const BATCH_FAIL_FAST: &str = "CALC_BATCH_FAIL_FAST";
    pub const BATCH_PROGRESS: &str = "CALC_BATCH_PROGRESS";
    pub const BATCH_SKIP_COMMENTS: &str = "CALC_BATCH_SKIP_COMMENTS";

    // Output
    pub const OUTPUT_JSON: &str = "CALC_OUTPUT_JSON";
    pub const OUTPUT_PRETTY_JSON: &str = "CALC_OUTPUT_PRETTY_JSON";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "CALC_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "CALC_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "CALC_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "CALC_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "CALC_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_SOURCE_CONTEXT: &str = "CALC_LOGGING_INCLUDE_SOURCE_CONTEXT";
    pub const LOGGING_FILE: &str = "CALC_LOGGING_FILE";
}
