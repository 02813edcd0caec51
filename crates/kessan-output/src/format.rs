//! Number formatting for display.

use kessan_xbrl::MetricUnit;

/// Placeholder for a missing value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Formats a metric value with its unit suffix.
///
/// - [`MetricUnit::Millions`]: divided by one million, rounded to an integer
///   and grouped by thousands
/// - [`MetricUnit::Percent`]: the value as is
/// - [`MetricUnit::Currency`]: rounded to two decimals
///
/// ```
/// use kessan_output::format_number;
/// use kessan_xbrl::MetricUnit;
///
/// assert_eq!(format_number(Some(1_000_000_000.0), MetricUnit::Millions), "1,000百万円");
/// assert_eq!(format_number(Some(12.5), MetricUnit::Percent), "12.5%");
/// assert_eq!(format_number(Some(123.456), MetricUnit::Currency), "123.46円");
/// assert_eq!(format_number(None, MetricUnit::Millions), "N/A");
/// ```
pub fn format_number(value: Option<f64>, unit: MetricUnit) -> String {
    let Some(value) = value else {
        return NOT_AVAILABLE.to_string();
    };
    let number = match unit {
        MetricUnit::Millions => group_thousands((value / 1_000_000.0).round()),
        MetricUnit::Percent => format_decimal(value),
        MetricUnit::Currency => format_decimal((value * 100.0).round() / 100.0),
    };
    format!("{number}{}", unit.suffix())
}

/// Shortest decimal rendering that still shows a whole number as `10.0`.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 && digits != "0" {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
