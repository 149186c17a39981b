//! Result rounding and rendering
//!
//! Results are rounded to `RESULT_DECIMAL_PLACES` decimal places to hide
//! binary floating-point noise (`0.1 + 0.2` renders as `0.3`).

use crate::config::constants::numeric::ROUNDING_SAFE_LIMIT;
use crate::config::constants::rounding_scale;

/// `round(x * 10^places) / 10^places`. Values whose scaled form reaches
/// 2^52 already have no representable fractional noise at that scale and are
/// returned unchanged, which also keeps the multiplication from overflowing.
pub fn round_result(value: f64) -> f64 {
    let scale = rounding_scale();
    let scaled = value * scale;

    if !scaled.is_finite() || scaled.abs() >= ROUNDING_SAFE_LIMIT {
        return value;
    }

    scaled.round() / scale
}

/// Canonical text of a result: rounded, shortest round-trip decimal, no
/// trailing `.0`, and negative zero shown as `0`.
pub fn format_result(value: f64) -> String {
    let rounded = round_result(value);
    if rounded == 0.0 {
        return "0".to_string();
    }
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floating_point_noise_is_removed() {
        assert_eq!(format_result(0.1 + 0.2), "0.3");
        assert_eq!(format_result(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_result(2.0 / 3.0), "0.6666666667");
    }

    #[test]
    fn test_integral_values_have_no_fraction() {
        assert_eq!(format_result(14.0), "14");
        assert_eq!(format_result(-2.0), "-2");
        assert_eq!(format_result(1e21), "1000000000000000000000");
    }

    #[test]
    fn test_negative_zero() {
        assert_eq!(format_result(-0.0), "0");
        assert_eq!(format_result(-1e-12), "0");
    }

    #[test]
    fn test_large_values_are_untouched() {
        let big = 123_456_789_012.345_67;
        assert_eq!(round_result(big), big);
        assert_eq!(round_result(f64::MAX), f64::MAX);
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let once = round_result(0.1 + 0.2);
        assert_eq!(round_result(once), once);
    }
}
