//! Configuration module for the calculator engine
//!
//! Compile-time limits are generated by build.rs from `config/<profile>.toml`;
//! runtime preferences live in [`runtime`] and never widen those limits.

// Generated at build time from the selected TOML profile
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod constants;
pub mod runtime;

pub use runtime::{ConfigError, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("CALC_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("CALC_CONFIG_DIR").unwrap_or("config")
    }

    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::lexical::MAX_EXPRESSION_LENGTH > 0);
        assert!(compile_time::syntax::MAX_PARSE_DEPTH > 0);
        assert!(compile_time::scientific::MAX_FACTORIAL_INPUT <= 170);
        assert!(compile_time::scientific::MAX_INPUT_MAGNITUDE > 0.0);
        assert!(
            compile_time::logging::MAX_LOG_EVENTS_PER_SOURCE
                <= compile_time::logging::LOG_BUFFER_SIZE
        );
    }

    #[test]
    fn test_build_info() {
        assert!(build_info::source_info().ends_with(".toml"));
    }
}
