//! Logging service and logger backends
//!
//! Every backend writes to stderr or a file. Stdout is reserved for
//! calculation results so that CLI output stays machine-readable.

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::utils::Span;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Main logging service with configuration awareness
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Service built from the active runtime logging preferences
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let logger: Arc<dyn Logger> = match create_configured_multi_logger() {
            Ok(multi) => Arc::new(multi),
            Err(_) => Arc::new(ConsoleLogger::new(min_level)),
        };

        Self::new(logger, min_level)
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, error_code: Code, message: &str) {
        self.log_event(LogEvent::error(error_code, message));
    }

    pub fn log_error_with_context(
        &self,
        error_code: Code,
        message: &str,
        context: Vec<(&str, &str)>,
    ) {
        let event = context
            .into_iter()
            .fold(LogEvent::error(error_code, message), |event, (k, v)| {
                event.with_context(k, v)
            });
        self.log_event(event);
    }

    pub fn log_error_with_span(&self, error_code: Code, message: &str, span: Span) {
        self.log_event(LogEvent::error(error_code, message).with_span(span));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_success(&self, success_code: Code, message: &str) {
        self.log_event(LogEvent::success(success_code, message));
    }

    pub fn log_success_with_context(
        &self,
        success_code: Code,
        message: &str,
        context: Vec<(&str, &str)>,
    ) {
        let event = context
            .into_iter()
            .fold(LogEvent::success(success_code, message), |event, (k, v)| {
                event.with_context(k, v)
            });
        self.log_event(event);
    }

    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    pub fn log_warning_with_code(&self, warning_code: Code, message: &str) {
        self.log_event(LogEvent::warning_with_code(warning_code, message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Plain text logger writing to stderr
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            eprintln!("{}", event.format());
        }
    }
}

/// JSON-lines logger writing to stderr
pub struct StructuredLogger {
    min_level: LogLevel,
}

impl StructuredLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            match event.format_json() {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", event.format()),
            }
        }
    }
}

/// Bounded in-memory logger, mostly for tests
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.lock().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn get_warnings(&self) -> Vec<LogEvent> {
        self.lock().iter().filter(|e| e.is_warning()).cloned().collect()
    }

    pub fn get_events_with_code(&self, code: Code) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.code == code)
            .cloned()
            .collect()
    }

    pub fn has_error_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_error() && e.code == code)
    }

    pub fn has_success_with_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.is_info() && e.code == code)
    }

    pub fn get_summary(&self) -> EventSummary {
        let events = self.lock();
        EventSummary {
            total_count: events.len(),
            error_count: events.iter().filter(|e| e.is_error()).count(),
            warning_count: events.iter().filter(|e| e.is_warning()).count(),
            info_count: events.iter().filter(|e| e.is_info()).count(),
            debug_count: events.iter().filter(|e| e.is_debug()).count(),
            critical_count: events
                .iter()
                .filter(|e| e.is_error() && e.requires_halt())
                .count(),
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();

        let max_events = config::get_log_buffer_size();
        if events.len() >= max_events {
            let remove_count = events.len() - max_events + 1;
            events.drain(0..remove_count);
        }

        events.push(event.clone());
    }
}

#[derive(Debug, Clone)]
pub struct EventSummary {
    pub total_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub debug_count: usize,
    pub critical_count: usize,
}

impl EventSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_critical_errors(&self) -> bool {
        self.critical_count > 0
    }
}

/// Append-only file logger
pub struct FileLogger {
    file_path: std::path::PathBuf,
    min_level: LogLevel,
    structured: bool,
}

impl FileLogger {
    pub fn new<P: AsRef<std::path::Path>>(
        file_path: P,
        min_level: LogLevel,
        structured: bool,
    ) -> Result<Self, std::io::Error> {
        let path = file_path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        Ok(Self {
            file_path: path,
            min_level,
            structured,
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            let output = if self.structured {
                event.format_json().unwrap_or_else(|_| event.format())
            } else {
                event.format()
            };

            // Write failures are dropped; reporting them would recurse
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)
            {
                let _ = writeln!(file, "{}", output);
            }
        }
    }
}

/// Fan-out logger
pub struct MultiLogger {
    loggers: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl MultiLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            loggers: Vec::new(),
            min_level,
        }
    }

    pub fn add_logger(&mut self, logger: Arc<dyn Logger>) {
        self.loggers.push(logger);
    }

    pub fn logger_count(&self) -> usize {
        self.loggers.len()
    }

    pub fn with_console(mut self, console_level: LogLevel) -> Self {
        self.add_logger(Arc::new(ConsoleLogger::new(console_level)));
        self
    }

    pub fn with_structured_console(mut self, console_level: LogLevel) -> Self {
        self.add_logger(Arc::new(StructuredLogger::new(console_level)));
        self
    }

    pub fn with_file<P: AsRef<std::path::Path>>(
        mut self,
        file_path: P,
        file_level: LogLevel,
        structured: bool,
    ) -> Result<Self, std::io::Error> {
        let file_logger = FileLogger::new(file_path, file_level, structured)?;
        self.add_logger(Arc::new(file_logger));
        Ok(self)
    }

    pub fn with_memory(mut self) -> (Self, Arc<MemoryLogger>) {
        let memory_logger = Arc::new(MemoryLogger::new());
        self.add_logger(memory_logger.clone());
        (self, memory_logger)
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LogEvent) {
        if event.level <= self.min_level {
            for logger in &self.loggers {
                logger.log(event);
            }
        }
    }
}

// ============================================================================
// CONFIGURATION-AWARE FACTORY FUNCTIONS
// ============================================================================

pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

/// Multi-logger with the console and file targets the preferences enable
pub fn create_configured_multi_logger() -> Result<MultiLogger, std::io::Error> {
    let min_level = config::get_min_log_level();
    let mut multi_logger = MultiLogger::new(min_level);

    if config::use_console_logging() {
        multi_logger = if config::use_structured_logging() {
            multi_logger.with_structured_console(min_level)
        } else {
            multi_logger.with_console(min_level)
        };
    }

    if let Some(path) = config::log_file_path() {
        multi_logger = multi_logger.with_file(path, min_level, config::use_structured_logging())?;
    }

    Ok(multi_logger)
}

pub fn create_test_logger() -> Arc<MemoryLogger> {
    Arc::new(MemoryLogger::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_memory_logger() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::info("Message 1"));
        logger.log(&LogEvent::error(
            codes::lexical::INVALID_CHARACTER,
            "Invalid character",
        ));

        assert_eq!(logger.event_count(), 2);
        assert_eq!(logger.get_errors().len(), 1);
        assert!(logger.has_error_with_code(codes::lexical::INVALID_CHARACTER));

        let summary = logger.get_summary();
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.info_count, 1);
        assert!(summary.has_errors());

        logger.clear();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_multi_logger_fans_out() {
        let multi = MultiLogger::new(LogLevel::Debug);
        let (multi, first) = multi.with_memory();
        let (multi, second) = multi.with_memory();

        multi.log(&LogEvent::info("Test message"));

        assert_eq!(multi.logger_count(), 2);
        assert_eq!(first.event_count(), 1);
        assert_eq!(second.event_count(), 1);
    }

    #[test]
    fn test_logging_service() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Debug);

        service.log_error(codes::evaluation::DIVISION_BY_ZERO, "Division by zero");
        service.log_success(codes::success::CALCULATION_COMPLETE, "Calculated");
        service.log_info("Info");

        assert_eq!(logger.event_count(), 3);
        assert!(logger.has_error_with_code(codes::evaluation::DIVISION_BY_ZERO));
        assert!(logger.has_success_with_code(codes::success::CALCULATION_COMPLETE));
    }

    #[test]
    fn test_log_level_filtering() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Error);

        service.log_debug("Debug message");
        service.log_info("Info message");
        service.log_error(codes::system::INTERNAL_ERROR, "Error message");

        assert_eq!(logger.event_count(), 1);
        assert!(logger.has_error_with_code(codes::system::INTERNAL_ERROR));
    }

    #[test]
    fn test_critical_error_detection() {
        let logger = MemoryLogger::new();

        logger.log(&LogEvent::error(codes::system::INTERNAL_ERROR, "Critical"));
        logger.log(&LogEvent::error(codes::evaluation::DIVISION_BY_ZERO, "Normal"));

        let summary = logger.get_summary();
        assert_eq!(summary.error_count, 2);
        assert_eq!(summary.critical_count, 1);
        assert!(summary.has_critical_errors());
        assert_eq!(logger.get_events_with_code(codes::system::INTERNAL_ERROR).len(), 1);
    }

    #[test]
    fn test_context_helpers() {
        let logger = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(logger.clone(), LogLevel::Debug);

        service.log_error_with_context(
            codes::request::EXPRESSION_TOO_LONG,
            "Expression too long",
            vec![("length", "1200"), ("max", "1000")],
        );
        service.log_success_with_context(
            codes::success::TOKENIZATION_COMPLETE,
            "Tokenized",
            vec![("tokens", "7")],
        );

        let events = logger.get_events();
        assert_eq!(events[0].context.get("max"), Some(&"1000".to_string()));
        assert!(events[1].context.contains_key("tokens"));
    }

    #[test]
    fn test_file_logger_appends_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("calc.log");
        let logger = FileLogger::new(&path, LogLevel::Info, true).unwrap();

        logger.log(&LogEvent::error(codes::scientific::DOMAIN_ERROR, "Domain"));
        logger.log(&LogEvent::debug("filtered"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.contains("\"code\":\"E100\""));
    }
}
