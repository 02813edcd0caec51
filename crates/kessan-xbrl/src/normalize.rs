//! Text-to-number conversion for fact values.

use regex::Regex;
use std::sync::LazyLock;

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("valid numeric pattern"));

/// Converts a reported value into a number.
///
/// The text is trimmed and stripped of thousands separators, then must be a
/// plain decimal (`-1234.5`; no exponent, no leading `+`). A `scale`
/// attribute multiplies by `10^scale`. A `unitRef` containing `Millions`
/// multiplies by a further 1,000,000, on top of any scale.
///
/// Returns `None` for empty or non-numeric text and for results that are not
/// finite.
///
/// ```
/// use kessan_xbrl::normalize;
///
/// assert_eq!(normalize("1,000", Some("6"), None), Some(1_000_000_000.0));
/// assert_eq!(normalize("12.5", None, Some("JPYPerShare")), Some(12.5));
/// assert_eq!(normalize("△100", None, None), None);
/// ```
pub fn normalize(text: &str, scale: Option<&str>, unit: Option<&str>) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let digits = text.replace(',', "");
    if !NUMERIC.is_match(&digits) {
        return None;
    }

    let mut value: f64 = digits.parse().ok()?;

    if let Some(scale) = scale {
        value *= 10f64.powi(scale_exponent(scale));
    }

    // Stacks with `scale` when both are present.
    if unit.is_some_and(|unit| unit.contains("Millions")) {
        value *= 1_000_000.0;
    }

    value.is_finite().then_some(value)
}

// Non-integer scale text applies no scaling.
fn scale_exponent(scale: &str) -> i32 {
    scale.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case("1000", None, None, Some(1000.0))]
    #[case("  1000\n", None, None, Some(1000.0))]
    #[case("1,000,000", None, None, Some(1_000_000.0))]
    #[case("1,000,000", Some("6"), None, Some(1_000_000.0 * 1e6))]
    #[case("1000", Some("6"), None, Some(1_000_000_000.0))]
    #[case("-250", Some("3"), None, Some(-250_000.0))]
    #[case("5", Some("-3"), None, Some(0.005))]
    #[case("12.5", None, Some("percent"), Some(12.5))]
    #[case("3", None, Some("JPYMillions"), Some(3_000_000.0))]
    #[case("3", Some("6"), Some("JPYMillions"), Some(3e12))]
    #[case("3", None, Some("jpymillions"), Some(3.0))]
    #[case("7", Some("abc"), None, Some(7.0))]
    fn test_numeric_values(
        #[case] text: &str,
        #[case] scale: Option<&str>,
        #[case] unit: Option<&str>,
        #[case] expected: Option<f64>,
    ) {
        let value = normalize(text, scale, unit);
        assert_eq!(value.is_some(), expected.is_some());
        if let (Some(value), Some(expected)) = (value, expected) {
            assert_relative_eq!(value, expected, max_relative = 1e-12);
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not a number")]
    #[case("1e6")]
    #[case("+100")]
    #[case("12.")]
    #[case(".5")]
    #[case("1 000")]
    #[case("１２３")]
    #[case("-")]
    fn test_non_numeric_text(#[case] text: &str) {
        assert_eq!(normalize(text, Some("6"), None), None);
    }

    #[test]
    fn test_non_finite_result_is_dropped() {
        assert_eq!(normalize("1", Some("400"), None), None);
    }
}
