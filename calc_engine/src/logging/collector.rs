//! Error collector for batch evaluation with cargo-style output
//!
//! Events are grouped by expression source (for example `input.txt:12`) so a
//! batch run can be reported in source order once all workers finish.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Identifies the expression currently being evaluated on a thread
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub source: String,
    pub source_id: usize,
    pub start_time: Instant,
}

impl SourceContext {
    pub fn new(source: impl Into<String>, source_id: usize) -> Self {
        Self {
            source: source.into(),
            source_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_sources: usize,
    pub clean_sources: usize,
    pub failed_sources: usize,
    pub sources_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub average_source_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe event collector keyed by expression source
pub struct ErrorCollector {
    source_events: Mutex<BTreeMap<String, Vec<LogEvent>>>,
    source_contexts: Mutex<BTreeMap<String, SourceContext>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            source_events: Mutex::new(BTreeMap::new()),
            source_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<String, Vec<LogEvent>>> {
        self.source_events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn contexts(&self) -> MutexGuard<'_, BTreeMap<String, SourceContext>> {
        self.source_contexts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an event for a source. Past the per-source limit a single
    /// overflow warning is kept and further events are dropped.
    pub fn record_event(&self, source: &str, event: LogEvent) {
        let mut events = self.events();
        let source_events = events.entry(source.to_string()).or_default();

        if source_events.len() < MAX_LOG_EVENTS_PER_SOURCE {
            source_events.push(event);
        } else if source_events.len() == MAX_LOG_EVENTS_PER_SOURCE {
            source_events.push(LogEvent::warning(&format!(
                "Too many events for source (limit: {})",
                MAX_LOG_EVENTS_PER_SOURCE
            )));
        }
    }

    pub fn record_source_context(&self, context: SourceContext) {
        self.contexts().insert(context.source.clone(), context);
    }

    pub fn get_source_events(&self, source: &str) -> Vec<LogEvent> {
        self.events().get(source).cloned().unwrap_or_default()
    }

    pub fn get_source_errors(&self, source: &str) -> Vec<LogEvent> {
        self.events()
            .get(source)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all_source_events(&self) -> BTreeMap<String, Vec<LogEvent>> {
        self.events().clone()
    }

    pub fn source_has_errors(&self, source: &str) -> bool {
        self.events()
            .get(source)
            .map(|events| events.iter().any(|e| e.is_error()))
            .unwrap_or(false)
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.events();
        let contexts = self.contexts();

        let mut summary = ProcessingSummary {
            total_sources: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        let mut total_time = Duration::ZERO;
        let mut timed = 0u32;

        for (source, source_events) in events.iter() {
            let errors = source_events.iter().filter(|e| e.is_error()).count();
            let warnings = source_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_sources += 1;
            } else if warnings > 0 {
                summary.sources_with_warnings += 1;
            } else {
                summary.clean_sources += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;

            if let Some(context) = contexts.get(source) {
                total_time += context.elapsed();
                timed += 1;
            }
        }

        if timed > 0 {
            summary.average_source_time = total_time / timed;
        }

        summary
    }

    /// Errors that require halting, with their source
    pub fn get_critical_errors(&self) -> Vec<(String, LogEvent)> {
        self.events()
            .iter()
            .flat_map(|(source, events)| {
                events
                    .iter()
                    .filter(|e| e.is_error() && e.requires_halt())
                    .map(move |e| (source.clone(), e.clone()))
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events().clear();
        self.contexts().clear();
    }

    pub fn total_event_count(&self) -> usize {
        self.events().values().map(|v| v.len()).sum()
    }

    /// (current, max, fraction) against the global log buffer
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let max = LOG_BUFFER_SIZE;
        let fraction = if max > 0 {
            current as f64 / max as f64
        } else {
            0.0
        };
        (current, max, fraction)
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

fn push_context(output: &mut String, event: &LogEvent) {
    let mut keys: Vec<_> = event
        .context
        .keys()
        .filter(|k| k.as_str() != "source" && k.as_str() != "source_id")
        .collect();
    keys.sort();
    for key in keys {
        output.push_str(&format!("  = {}: {}\n", key, event.context[key]));
    }
}

/// Render collected events grouped by source, errors first
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (source, events) in &collector.get_all_source_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        for event in errors {
            let location = event
                .span
                .as_ref()
                .map(|s| format!("\n  --> {}:{}", source, s.start().column))
                .unwrap_or_else(|| format!("\n  --> {}", source));

            output.push_str(&format!(
                "error[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location
            ));
            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));
            push_context(&mut output, event);

            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warnings {
            output.push_str(&format!(
                "warning[{}]: {}\n  --> {}\n",
                event.code.as_str(),
                event.message,
                source
            ));
            push_context(&mut output, event);
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}
