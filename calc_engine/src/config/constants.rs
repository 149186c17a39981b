//! Fixed constants that are not profile-configurable, plus values derived
//! from the generated limits.

pub use super::compile_time;

use compile_time::evaluation::RESULT_DECIMAL_PLACES;

pub mod alphabet {
    /// Multiplication sign accepted as an alias for `*`
    pub const MULTIPLICATION_SIGN: char = '\u{00D7}';

    /// Division sign accepted as an alias for `/`
    pub const DIVISION_SIGN: char = '\u{00F7}';

    pub const DECIMAL_POINT: char = '.';

    /// Characters skipped between tokens
    pub fn is_ignored_whitespace(ch: char) -> bool {
        matches!(ch, ' ' | '\t' | '\r' | '\n')
    }
}

pub mod numeric {
    /// 2^52. At or above this magnitude every f64 is a multiple of 1/2 or
    /// coarser, so scaling and rounding cannot remove any noise.
    pub const ROUNDING_SAFE_LIMIT: f64 = 4_503_599_627_370_496.0;
}

/// Scale used by result rounding: 10^RESULT_DECIMAL_PLACES
pub fn rounding_scale() -> f64 {
    10f64.powi(RESULT_DECIMAL_PLACES as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_scale_matches_places() {
        assert_eq!(rounding_scale(), 10f64.powi(RESULT_DECIMAL_PLACES as i32));
    }

    #[test]
    fn test_whitespace_classification() {
        assert!(alphabet::is_ignored_whitespace(' '));
        assert!(alphabet::is_ignored_whitespace('\n'));
        assert!(!alphabet::is_ignored_whitespace('_'));
    }
}
