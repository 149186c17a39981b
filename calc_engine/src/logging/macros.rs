//! Logging macros taking a `Code` plus `"key" => value` context pairs.
//! Context values may be any `Display` type.

/// Log an error, optionally with a span and context
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, None, context_refs)
        }
    };

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_error_with_context($code, $message, Some($span), context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_success_with_context($code, $message, context_refs)
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_info_with_context($message, context_refs)
        }
    };
}

/// Log a warning, optionally with a registered code
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::log_warning_with_context(None, $message, vec![])
    };

    (code = $code:expr, $message:expr) => {
        $crate::logging::log_warning_with_context(Some($code), $message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_warning_with_context(None, $message, context_refs)
        }
    };

    (code = $code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_warning_with_context(Some($code), $message, context_refs)
        }
    };
}

/// Log a debug message. Context values are not formatted unless debug is enabled.
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::log_debug_with_context($message, vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_debug_with_context($message, context_refs)
        }
    };
}

/// Success event carrying a `duration_ms` entry; skipped when performance
/// events are disabled
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr) => {
        if $crate::logging::config::log_performance_events() {
            $crate::log_success!($code, $message,
                "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0)
            );
        }
    };

    ($code:expr, $message:expr, duration = $duration:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::config::log_performance_events() {
            $crate::log_success!($code, $message,
                "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0),
                $($key => $value),+
            );
        }
    };
}
