//! Guarded numeric helpers.
//!
//! Every ratio, average, percentage and ROI in the crate goes through
//! [`safe_div`], so a zero denominator yields 0 instead of NaN or infinity.

/// Divide, returning 0 when the denominator is 0 or the result is not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `value / total * 100`, guarded.
pub fn percent_of(value: f64, total: f64) -> f64 {
    safe_div(value, total) * 100.0
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    safe_div(values.iter().sum(), values.len() as f64)
}

/// Clamp a score into [0, 100]. NaN becomes 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Clamp into [0, 1]. NaN becomes 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Relative distance from an integer below which a value counts as that integer.
const INTEGER_TOLERANCE: f64 = 1e-9;

/// Ceiling that ignores floating point noise around whole numbers.
///
/// `3.0 / 0.1` is `30.000000000000004`, which must ceil to 30, while a true
/// ratio of `1.0000001` still ceils to 2.
pub fn ceil_units(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let nearest = value.round();
    if (value - nearest).abs() < INTEGER_TOLERANCE * value.max(1.0) {
        nearest as u64
    } else {
        value.ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(-5.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, 4.0), 2.5);
    }

    #[test]
    fn test_safe_div_non_finite() {
        assert_eq!(safe_div(f64::MAX, 1e-300), 0.0);
        assert_eq!(safe_div(f64::INFINITY, 2.0), 0.0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(25.0, 0.0), 0.0);
        assert!((percent_of(25.0, 200.0) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamps() {
        assert_eq!(clamp_score(150.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(f64::NAN), 0.0);
    }

    #[test]
    fn test_ceil_units_absorbs_float_noise() {
        assert_eq!(ceil_units(3.0 / 0.1), 30);
        assert_eq!(ceil_units(100.0 / 0.1), 1000);
        assert_eq!(ceil_units(10.2), 11);
        assert_eq!(ceil_units(0.0), 0);
        assert_eq!(ceil_units(-4.0), 0);
        assert_eq!(ceil_units(f64::INFINITY), 0);
    }

    #[test]
    fn test_ceil_units_keeps_small_true_fractions() {
        assert_eq!(ceil_units(1_000_000.1 / 1_000_000.0), 2);
        assert_eq!(ceil_units(1.0000001), 2);
        assert_eq!(ceil_units(0.4), 1);
    }
}
