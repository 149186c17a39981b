//! Global logging for the calculator engine
//!
//! Thread-safe global logging with per-source event collection for batch
//! runs, cargo-style error reporting, and a macro interface.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ProcessingSummary, SourceContext};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<SourceContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize the global logger from the installed runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());
    install(logging_service.clone())?;

    let required = [
        codes::system::INTERNAL_ERROR,
        codes::request::EXPRESSION_TOO_LONG,
        codes::lexical::INVALID_CHARACTER,
        codes::evaluation::DIVISION_BY_ZERO,
        codes::scientific::DOMAIN_ERROR,
    ];
    for code in required {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a custom service (tests, embedding applications)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    install(service)
}

fn install(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

// ============================================================================
// GLOBAL ACCESS
// ============================================================================

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// SOURCE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_source_context(source: impl Into<String>, source_id: usize) {
    let context = SourceContext::new(source, source_id);

    if let Some(collector) = try_get_global_error_collector() {
        collector.record_source_context(context.clone());
    }

    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_source_context() {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the source context set on the current thread
pub fn with_source_context<F, R>(source: impl Into<String>, source_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_source_context(source, source_id);
    let result = f();
    clear_source_context();
    result
}

pub fn get_current_source_context() -> Option<SourceContext> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn decorate(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if config::include_source_context() {
        if let Some(source_ctx) = get_current_source_context() {
            event = event
                .with_source(&source_ctx.source)
                .with_context("source_id", &source_ctx.source_id.to_string());
        }
    }

    event
}

fn dispatch(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

/// Backs `log_error!`. Errors are also recorded in the collector under the
/// current source.
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = decorate(LogEvent::error(code, message), context);
    if let Some(s) = span {
        event = event.with_span(s);
    }

    if let Some(source_ctx) = get_current_source_context() {
        if let Some(collector) = try_get_global_error_collector() {
            collector.record_event(&source_ctx.source, event.clone());
        }
    }

    dispatch(event);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(decorate(LogEvent::success(code, message), context));
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(decorate(LogEvent::info(message), context));
}

pub fn log_warning_with_context(code: Option<Code>, message: &str, context: Vec<(&str, &str)>) {
    let event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    let event = decorate(event, context);

    if let Some(source_ctx) = get_current_source_context() {
        if let Some(collector) = try_get_global_error_collector() {
            collector.record_event(&source_ctx.source, event.clone());
        }
    }

    dispatch(event);
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(decorate(LogEvent::debug(message), context));
}

// ============================================================================
// BATCH REPORTING
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

pub fn get_source_errors(source: &str) -> Vec<LogEvent> {
    try_get_global_error_collector()
        .map(|collector| collector.get_source_errors(source))
        .unwrap_or_default()
}

/// Cargo-style report of everything collected so far, written to stderr
pub fn print_cargo_style_summary() {
    if let Some(collector) = try_get_global_error_collector() {
        eprint!("{}", collector::format_cargo_style_errors(collector));
    }
}

pub fn clear_error_collection() {
    if let Some(collector) = try_get_global_error_collector() {
        collector.clear();
    }
}

pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));

    if let Some(collector) = try_get_global_error_collector() {
        let (current, max, fraction) = collector.get_capacity_info();
        diagnostics.push_str(&format!(
            "Capacity: {}/{} ({:.1}%)\n",
            current,
            max,
            fraction * 100.0
        ));

        let summary = collector.get_summary();
        diagnostics.push_str(&format!("Sources seen: {}\n", summary.total_sources));
        diagnostics.push_str(&format!("Total errors: {}\n", summary.total_errors));
        diagnostics.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

// ============================================================================
// SAFE FALLBACK LOGGING
// ============================================================================

/// Error logging that falls back to stderr when uninitialized
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_context_management() {
        assert!(get_current_source_context().is_none());

        set_source_context("input.txt:3", 3);
        let context = get_current_source_context().unwrap();
        assert_eq!(context.source, "input.txt:3");
        assert_eq!(context.source_id, 3);

        clear_source_context();
        assert!(get_current_source_context().is_none());
    }

    #[test]
    fn test_with_source_context() {
        let result = with_source_context("argv", 0, || {
            assert_eq!(get_current_source_context().unwrap().source, "argv");
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_source_context().is_none());
    }

    #[test]
    fn test_decorate_adds_source() {
        let event = with_source_context("batch:7", 7, || {
            decorate(LogEvent::info("x"), vec![("k", "v")])
        });

        assert_eq!(event.context.get("k"), Some(&"v".to_string()));
        if config::include_source_context() {
            assert_eq!(event.context.get("source"), Some(&"batch:7".to_string()));
        }
    }

    #[test]
    fn test_safe_logging() {
        safe_log_error(codes::system::INTERNAL_ERROR, "Test error");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Logging Configuration"));
    }
}
