//! Logging configuration
//!
//! Compile-time bounds come from the generated `compile_time::logging`
//! module; runtime preferences are installed once and may only narrow them.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;
type RuntimeLogLevel = crate::config::runtime::LogLevel;

// ============================================================================
// RUNTIME PREFERENCES STORAGE
// ============================================================================

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences. Only the first call takes effect.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    validate_preferences(&preferences)?;

    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

fn validate_preferences(preferences: &LoggingPreferences) -> Result<(), String> {
    if let Some(path) = &preferences.log_file {
        if path.trim().is_empty() {
            return Err("Log file path must not be blank".to_string());
        }
    }

    Ok(())
}

// ============================================================================
// CONFIGURATION ACCESS FUNCTIONS
// ============================================================================

/// Minimum level to emit. A preference quieter than the security floor is
/// raised to the floor so warnings are never suppressed.
pub fn get_min_log_level() -> EventsLogLevel {
    let user_level = get_runtime_preferences().min_log_level.to_events_log_level();
    let floor = get_security_log_level();

    if user_level < floor {
        floor
    } else {
        user_level
    }
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn log_file_path() -> Option<String> {
    get_runtime_preferences().log_file
}

/// Least verbose level the engine may be configured to
pub fn get_security_log_level() -> EventsLogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => EventsLogLevel::Error,
        1 => EventsLogLevel::Warning,
        _ => EventsLogLevel::Info,
    }
}

pub fn log_performance_events() -> bool {
    get_runtime_preferences().log_performance_events
}

pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_events_per_source() -> usize {
    MAX_LOG_EVENTS_PER_SOURCE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

pub fn use_cargo_style_output() -> bool {
    get_runtime_preferences().enable_cargo_style_output
}

pub fn include_source_context() -> bool {
    get_runtime_preferences().include_source_context
}

/// Truncate a message to the configured maximum, on a char boundary
pub fn clamp_message(message: &str) -> String {
    let max = get_max_log_message_length();
    if message.len() <= max {
        return message.to_string();
    }

    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

// ============================================================================
// CONFIGURATION VALIDATION
// ============================================================================

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE > 100_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }

    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_SOURCE > LOG_BUFFER_SIZE {
        return Err("Max log events per source exceeds total buffer size".to_string());
    }

    if let Some(preferences) = RUNTIME_PREFERENCES.get() {
        validate_preferences(preferences)?;
    }

    Ok(())
}

/// Configuration summary for `--config-info`
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Compile-time Limits ===\n\
         - Log buffer size: {}\n\
         - Max events per source: {}\n\
         - Max message length: {}\n\
         - Security min level: {}\n\
         === Runtime Preferences ===\n\
         - Min log level: {:?} (effective: {})\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Log file: {}\n\
         - Performance events: {}\n\
         - Cargo-style output: {}\n\
         - Include source context: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_SOURCE,
        MAX_LOG_MESSAGE_LENGTH,
        SECURITY_MIN_LOG_LEVEL,
        preferences.min_log_level,
        get_min_log_level().as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.log_file.as_deref().unwrap_or("(none)"),
        preferences.log_performance_events,
        preferences.enable_cargo_style_output,
        preferences.include_source_context,
    )
}

pub fn get_development_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: false,
        enable_console_logging: true,
        min_log_level: RuntimeLogLevel::Debug,
        log_performance_events: true,
        enable_cargo_style_output: true,
        include_source_context: true,
        log_file: None,
    }
}

pub fn get_production_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: true,
        enable_console_logging: false,
        min_log_level: RuntimeLogLevel::Warning,
        log_performance_events: false,
        enable_cargo_style_output: false,
        include_source_context: false,
        log_file: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_security_floor() {
        let floor = get_security_log_level();
        assert!(floor <= EventsLogLevel::Info);
        assert!(get_min_log_level() >= floor);
    }

    #[test]
    fn test_blank_log_file_rejected() {
        let prefs = LoggingPreferences {
            log_file: Some("   ".to_string()),
            ..get_development_preferences()
        };
        assert!(validate_preferences(&prefs).is_err());
        assert!(validate_preferences(&get_production_preferences()).is_ok());
    }

    #[test]
    fn test_clamp_message() {
        let short = "Division by zero";
        assert_eq!(clamp_message(short), short);

        let long = "\u{00F7}".repeat(MAX_LOG_MESSAGE_LENGTH);
        let clamped = clamp_message(&long);
        assert!(clamped.ends_with("..."));
        assert!(clamped.len() <= MAX_LOG_MESSAGE_LENGTH + 3);
    }

    #[test]
    fn test_summary_mentions_limits() {
        let summary = get_config_summary();
        assert!(summary.contains(&format!("Log buffer size: {}", LOG_BUFFER_SIZE)));
    }
}
