//! Batch evaluation of expression files
//!
//! One expression per line. Blank lines are skipped, as are `#` comment lines
//! when enabled. Lines are evaluated sequentially or fanned out over worker
//! threads; results always come back in source order.

use crate::config::constants::compile_time::batch_processing::{
    MAX_BATCH_LINE_LENGTH, MAX_EXPRESSIONS_PER_BATCH, MAX_WORKER_THREADS,
};
use crate::config::runtime::{BatchPreferences, RuntimeConfig};
use crate::logging::{self, codes, Code};
use crate::pipeline::{self, ArithmeticRequest, CalculationOutput, PipelineError, PipelineResult};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    pub skip_comment_lines: bool,
}

impl BatchConfig {
    /// Resolve runtime preferences; `0` threads means available parallelism.
    /// The worker count never exceeds the compile-time ceiling.
    pub fn from_preferences(preferences: &BatchPreferences) -> Self {
        let requested = if preferences.max_threads == 0 {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            preferences.max_threads
        };

        Self {
            max_threads: requested.clamp(1, MAX_WORKER_THREADS),
            progress_reporting: preferences.progress_reporting,
            fail_fast: preferences.fail_fast,
            skip_comment_lines: preferences.skip_comment_lines,
        }
    }

    pub fn sequential(mut self) -> Self {
        self.max_threads = 1;
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_preferences(&BatchPreferences::default())
    }
}

/// One expression with its 1-based source line
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub line: usize,
    pub expression: String,
}

/// Batch processing results, keyed by source line
#[derive(Debug)]
pub struct BatchResults {
    pub successful: Vec<(usize, PipelineResult)>,
    pub failed: Vec<(usize, PipelineError)>,
    pub processing_duration: Duration,
    pub expressions_processed: usize,
    pub expressions_loaded: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
            processing_duration: Duration::new(0, 0),
            expressions_processed: 0,
            expressions_loaded: 0,
        }
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.expressions_processed == 0 {
            0.0
        } else {
            self.successful.len() as f64 / self.expressions_processed as f64
        }
    }

    pub fn add_success(&mut self, line: usize, result: PipelineResult) {
        self.successful.push((line, result));
        self.expressions_processed += 1;
    }

    pub fn add_failure(&mut self, line: usize, error: PipelineError) {
        self.failed.push((line, error));
        self.expressions_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful.extend(other.successful);
        self.failed.extend(other.failed);
        self.expressions_processed += other.expressions_processed;
    }

    fn sort_by_line(&mut self) {
        self.successful.sort_by_key(|(line, _)| *line);
        self.failed.sort_by_key(|(line, _)| *line);
    }

    /// Client-facing body for every processed line, in source order
    pub fn outputs(&self) -> Vec<(usize, CalculationOutput)> {
        let mut outputs: Vec<(usize, CalculationOutput)> = self
            .successful
            .iter()
            .map(|(line, result)| {
                (
                    *line,
                    CalculationOutput::Success {
                        result: result.rendered.clone(),
                    },
                )
            })
            .chain(self.failed.iter().map(|(line, error)| {
                (
                    *line,
                    CalculationOutput::Failure {
                        error: error.user_message(),
                    },
                )
            }))
            .collect();
        outputs.sort_by_key(|(line, _)| *line);
        outputs
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch completed: {} expressions evaluated, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.expressions_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

impl Default for BatchResults {
    fn default() -> Self {
        Self::new()
    }
}

/// Batch processing errors
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Batch source not found: {path}")]
    SourceNotFound { path: String },

    #[error("Too many expressions: {count} (max: {max})")]
    TooManyExpressions { count: usize, max: usize },

    #[error("Line {line} is {length} characters long (max: {max})")]
    LineTooLong {
        line: usize,
        length: usize,
        max: usize,
    },

    #[error("IO error reading {path}: {error}")]
    Io { path: String, error: String },

    #[error("Worker error: {message}")]
    WorkerFailure { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::SourceNotFound { .. } => codes::batch::SOURCE_NOT_FOUND,
            Self::TooManyExpressions { .. } | Self::LineTooLong { .. } => {
                codes::batch::TOO_MANY_EXPRESSIONS
            }
            Self::Io { .. } => codes::request::IO_ERROR,
            Self::WorkerFailure { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Split batch text into entries
pub fn parse_expressions(text: &str, config: &BatchConfig) -> Result<Vec<BatchEntry>, BatchError> {
    let mut entries = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let length = raw_line.chars().count();
        if length > MAX_BATCH_LINE_LENGTH {
            return Err(BatchError::LineTooLong {
                line,
                length,
                max: MAX_BATCH_LINE_LENGTH,
            });
        }

        let expression = raw_line.trim();
        if expression.is_empty() || (config.skip_comment_lines && expression.starts_with('#')) {
            continue;
        }

        entries.push(BatchEntry {
            line,
            expression: expression.to_string(),
        });

        if entries.len() > MAX_EXPRESSIONS_PER_BATCH {
            return Err(BatchError::TooManyExpressions {
                count: entries.len(),
                max: MAX_EXPRESSIONS_PER_BATCH,
            });
        }
    }

    Ok(entries)
}

/// Read and split a batch file
pub fn load_expressions(path: &Path, config: &BatchConfig) -> Result<Vec<BatchEntry>, BatchError> {
    if !path.is_file() {
        return Err(BatchError::SourceNotFound {
            path: path.display().to_string(),
        });
    }

    let text = fs::read_to_string(path).map_err(|e| BatchError::Io {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let entries = parse_expressions(&text, config)?;

    crate::log_debug!("Batch source loaded",
        "source" => path.display(),
        "expressions" => entries.len()
    );

    Ok(entries)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn evaluate_entry(source: &str, entry: &BatchEntry, runtime: &RuntimeConfig) -> Result<PipelineResult, PipelineError> {
    logging::with_source_context(format!("{}:{}", source, entry.line), entry.line, || {
        pipeline::calculate_with_config(
            &ArithmeticRequest {
                expression: entry.expression.clone(),
            },
            runtime,
        )
    })
}

/// Evaluate entries one after another
pub fn process_entries_sequential(
    source: &str,
    entries: &[BatchEntry],
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> BatchResults {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch",
        "source" => source,
        "expressions" => entries.len()
    );

    let mut results = BatchResults::new();
    results.expressions_loaded = entries.len();

    for (index, entry) in entries.iter().enumerate() {
        if config.progress_reporting {
            eprintln!(
                "Evaluating expression {} of {} (line {})",
                index + 1,
                entries.len(),
                entry.line
            );
        }

        match evaluate_entry(source, entry, runtime) {
            Ok(result) => results.add_success(entry.line, result),
            Err(error) => {
                results.add_failure(entry.line, error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch",
                        "line" => entry.line
                    );
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion(source, &results, 1);

    results
}

/// Evaluate entries over worker threads, chunk by chunk
pub fn process_entries_parallel(
    source: &str,
    entries: &[BatchEntry],
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting parallel batch",
        "source" => source,
        "expressions" => entries.len(),
        "max_threads" => config.max_threads
    );

    let mut results = BatchResults::new();
    results.expressions_loaded = entries.len();

    if entries.is_empty() {
        results.processing_duration = start_time.elapsed();
        return Ok(results);
    }

    let chunk_size = calculate_chunk_size(entries.len(), config.max_threads);

    crate::log_debug!("Parallel batch configuration",
        "total_expressions" => entries.len(),
        "chunk_size" => chunk_size,
        "threads" => config.max_threads
    );

    for (chunk_index, chunk) in entries.chunks(chunk_size).enumerate() {
        if config.progress_reporting {
            eprintln!(
                "Evaluating chunk {} ({} expressions)",
                chunk_index + 1,
                chunk.len()
            );
        }

        let chunk_results = process_chunk_parallel(source, chunk, config, runtime)?;
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch",
                "chunk" => chunk_index + 1
            );
            break;
        }
    }

    results.sort_by_line();
    results.processing_duration = start_time.elapsed();
    log_completion(source, &results, config.max_threads);

    Ok(results)
}

fn process_chunk_parallel(
    source: &str,
    entries: &[BatchEntry],
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));

    let mut handles = Vec::new();
    let per_thread = entries.len().div_ceil(config.max_threads);

    for thread_id in 0..config.max_threads {
        let start_idx = thread_id * per_thread;
        let end_idx = ((thread_id + 1) * per_thread).min(entries.len());

        if start_idx >= entries.len() {
            break;
        }

        let thread_entries: Vec<BatchEntry> = entries[start_idx..end_idx].to_vec();
        let thread_source = source.to_string();
        let thread_runtime = runtime.clone();
        let results_clone = Arc::clone(&results);

        let handle = thread::spawn(move || {
            for entry in &thread_entries {
                let outcome = evaluate_entry(&thread_source, entry, &thread_runtime);
                let mut guard = results_clone.lock().unwrap_or_else(|p| p.into_inner());
                match outcome {
                    Ok(result) => guard.add_success(entry.line, result),
                    Err(error) => guard.add_failure(entry.line, error),
                }
            }
        });

        handles.push(handle);
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::WorkerFailure {
            message: "Worker panicked during evaluation".to_string(),
        })?;
    }

    let final_results = Arc::try_unwrap(results)
        .map_err(|_| BatchError::WorkerFailure {
            message: "Failed to collect worker results".to_string(),
        })?
        .into_inner()
        .unwrap_or_else(|p| p.into_inner());

    Ok(final_results)
}

fn calculate_chunk_size(total: usize, max_threads: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 500;

    total
        .div_ceil(max_threads.max(1))
        .clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

fn log_completion(source: &str, results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch completed",
        "source" => source,
        "evaluated" => results.expressions_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Evaluate a batch file with preferences taken from `runtime`
pub fn process_file(path: &Path, runtime: &RuntimeConfig) -> Result<BatchResults, BatchError> {
    process_file_with_config(path, &BatchConfig::from_preferences(&runtime.batch), runtime)
}

pub fn process_file_with_config(
    path: &Path,
    config: &BatchConfig,
    runtime: &RuntimeConfig,
) -> Result<BatchResults, BatchError> {
    let entries = match load_expressions(path, config) {
        Ok(entries) => entries,
        Err(error) => {
            crate::log_error!(error.error_code(), "Batch source rejected",
                "source" => path.display(),
                "reason" => &error
            );
            return Err(error);
        }
    };

    let source = path.display().to_string();
    if config.max_threads <= 1 {
        Ok(process_entries_sequential(&source, &entries, config, runtime))
    } else {
        process_entries_parallel(&source, &entries, config, runtime)
    }
}

/// Batch processing capabilities
#[derive(Debug, Clone)]
pub struct BatchInfo {
    pub max_recommended_threads: usize,
    pub max_expressions_per_batch: usize,
    pub max_line_length: usize,
}

impl BatchInfo {
    pub fn summary(&self) -> String {
        format!(
            "Batch evaluator: up to {} threads, {} expressions per file, {} characters per line",
            self.max_recommended_threads, self.max_expressions_per_batch, self.max_line_length
        )
    }
}

pub fn get_batch_info() -> BatchInfo {
    BatchInfo {
        max_recommended_threads: BatchConfig::default().max_threads,
        max_expressions_per_batch: MAX_EXPRESSIONS_PER_BATCH,
        max_line_length: MAX_BATCH_LINE_LENGTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn config(threads: usize) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            progress_reporting: false,
            fail_fast: false,
            skip_comment_lines: true,
        }
    }

    const SAMPLE: &str = "# sample batch\n2+3*4\n\n(2+3)*4\n5/0\n  0.1+0.2  \n2+a\n10-2-3\n";

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let entries = parse_expressions(SAMPLE, &config(1)).unwrap();
        let lines: Vec<usize> = entries.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4, 5, 6, 7, 8]);
        assert_eq!(entries[3].expression, "0.1+0.2");

        let mut keep_comments = config(1);
        keep_comments.skip_comment_lines = false;
        let entries = parse_expressions(SAMPLE, &keep_comments).unwrap();
        assert_eq!(entries[0].expression, "# sample batch");
    }

    #[test]
    fn test_parse_limits() {
        let long_line = "1".repeat(MAX_BATCH_LINE_LENGTH + 1);
        assert_matches!(
            parse_expressions(&long_line, &config(1)),
            Err(BatchError::LineTooLong { line: 1, .. })
        );

        let many = "1\n".repeat(MAX_EXPRESSIONS_PER_BATCH + 1);
        let error = parse_expressions(&many, &config(1)).unwrap_err();
        assert_matches!(error, BatchError::TooManyExpressions { .. });
        assert_eq!(error.error_code(), codes::batch::TOO_MANY_EXPRESSIONS);
    }

    #[test]
    fn test_missing_source() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing.txt");
        let error = process_file(&missing, &RuntimeConfig::default()).unwrap_err();
        assert_matches!(error, BatchError::SourceNotFound { .. });
        assert_eq!(error.error_code(), codes::batch::SOURCE_NOT_FOUND);
    }

    #[test]
    fn test_sequential_batch() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("batch.txt");
        fs::write(&path, SAMPLE).unwrap();

        let results =
            process_file_with_config(&path, &config(1), &RuntimeConfig::default()).unwrap();

        assert_eq!(results.expressions_loaded, 6);
        assert_eq!(results.expressions_processed, 6);
        assert_eq!(results.success_count(), 4);
        assert_eq!(results.failure_count(), 2);

        let outputs = results.outputs();
        assert_eq!(
            outputs[0],
            (
                2,
                CalculationOutput::Success {
                    result: "14".to_string()
                }
            )
        );
        assert_eq!(
            outputs[2],
            (
                5,
                CalculationOutput::Failure {
                    error: "Division by zero".to_string()
                }
            )
        );
        assert_eq!(
            outputs[4],
            (
                7,
                CalculationOutput::Failure {
                    error: "Invalid characters in expression".to_string()
                }
            )
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let text: String = (1..=200)
            .map(|i| {
                if i % 7 == 0 {
                    format!("{}/0\n", i)
                } else {
                    format!("{}*({}+1)/3\n", i, i)
                }
            })
            .collect();
        let entries = parse_expressions(&text, &config(1)).unwrap();
        let runtime = RuntimeConfig::default();

        let sequential = process_entries_sequential("mem", &entries, &config(1), &runtime);
        let parallel = process_entries_parallel("mem", &entries, &config(4), &runtime).unwrap();

        assert_eq!(parallel.expressions_processed, 200);
        assert_eq!(sequential.outputs(), parallel.outputs());
        assert_eq!(parallel.failure_count(), 200 / 7);
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let entries = parse_expressions("1+1\n1/0\n2+2\n", &config(1)).unwrap();
        let mut fail_fast = config(1);
        fail_fast.fail_fast = true;

        let results =
            process_entries_sequential("mem", &entries, &fail_fast, &RuntimeConfig::default());
        assert_eq!(results.expressions_processed, 2);
        assert_eq!(results.failed[0].0, 2);
    }

    #[test]
    fn test_empty_parallel_batch() {
        let results =
            process_entries_parallel("mem", &[], &config(4), &RuntimeConfig::default()).unwrap();
        assert_eq!(results.expressions_processed, 0);
        assert_eq!(results.success_rate(), 0.0);
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(5000, 4), 500);
    }

    #[test]
    fn test_config_resolution() {
        let preferences = BatchPreferences {
            max_threads: 10_000,
            fail_fast: true,
            progress_reporting: false,
            skip_comment_lines: true,
        };
        let config = BatchConfig::from_preferences(&preferences);
        assert_eq!(config.max_threads, MAX_WORKER_THREADS);
        assert!(config.fail_fast);
        assert_eq!(config.sequential().max_threads, 1);
        assert!(get_batch_info().summary().contains("threads"));
    }
}
