//! Safe calculator engine
//!
//! Arithmetic expressions go through three stages: the lexical analyzer turns
//! text into a [`tokens::TokenStream`], the recursive-descent evaluator folds
//! it into a rounded `f64`, and the pipeline renders the result. Named
//! scientific functions are dispatched directly on a number. Nothing is ever
//! handed to a host-language evaluator.

pub mod batch;
pub mod config;
pub mod evaluator;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod scientific;
pub mod session;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use evaluator::{evaluate, EvalError};
pub use lexical::{tokenize, LexerError};
pub use pipeline::{
    calculate, handle_json_request, scientific as calculate_function, CalculationOutput,
    CalculationRequest, ErrorKind, PipelineError, PipelineResult,
};
pub use scientific::{dispatch, ScientificError, ScientificFunction};
pub use session::{CalculatorAction, SessionState};
