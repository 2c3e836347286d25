//! Probability values entered as decimal strings.
//!
//! Users type probabilities with either `.` or `,` as decimal separator.
//! Everything that compares or sums probabilities goes through [`parse`].

use crate::domain::error::{DomainResult, ValidationError};

/// Tolerance applied when checking a parent's probability budget.
pub const EPSILON: f64 = 1e-6;

/// Parse a probability string, accepting `0.5` and `0,5`.
///
/// The value must be finite and within `[0, 1]`.
pub fn parse(raw: &str) -> DomainResult<f64> {
    let normalized = raw.trim().replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|_| ValidationError::InvalidProbability(raw.to_string()))?;
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::InvalidProbability(raw.to_string()).into());
    }
    Ok(value)
}

/// Round to two decimal places, as shown to users.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// True if `total` stays within the budget of 1, allowing for rounding noise.
pub fn within_budget(total: f64) -> bool {
    total <= 1.0 + EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0.5", 0.5)]
    #[case("0,5", 0.5)]
    #[case(" 0,25 ", 0.25)]
    #[case("1", 1.0)]
    #[case("0", 0.0)]
    #[case(".3", 0.3)]
    fn given_valid_input_when_parse_then_returns_value(#[case] raw: &str, #[case] expected: f64) {
        let value = parse(raw).expect("valid probability");
        assert!((value - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("0,5,1")]
    #[case("1.5")]
    #[case("-0.1")]
    #[case("NaN")]
    #[case("inf")]
    fn given_invalid_input_when_parse_then_invalid_probability(#[case] raw: &str) {
        let err = parse(raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidProbability(raw.to_string()).into()
        );
    }

    #[test]
    fn given_sum_with_float_noise_when_within_budget_then_accepted() {
        let total = 0.1 + 0.2 + 0.7;
        assert!(within_budget(total));
        assert!(!within_budget(1.01));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.999), 1.0);
        assert_eq!(round2(0.333333), 0.33);
    }
}
