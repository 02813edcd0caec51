//! Secondary ratios computed from the primary facts.
//!
//! All results are percentages rounded to two decimals. A ratio whose inputs
//! are missing, whose denominator is not positive, or whose result is not
//! finite is left out of the bucket entirely.

use crate::extract::PeriodBucket;
use crate::metrics::MetricKey;

/// Adds growth rates, operating margin and payout ratio to `current`.
///
/// `previous` is only read. The forecast bucket never takes part.
pub fn enrich(current: &mut PeriodBucket, previous: &PeriodBucket) {
    let derived = [
        (MetricKey::RevenueGrowth, revenue_growth(current, previous)),
        (MetricKey::ProfitGrowth, profit_growth(current, previous)),
        (
            MetricKey::OperatingProfitMargin,
            operating_profit_margin(current),
        ),
        (MetricKey::PayoutRatio, payout_ratio(current)),
    ];

    for (key, value) in derived {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            current.insert(key, value);
        }
    }
}

/// Year-over-year revenue growth.
pub fn revenue_growth(current: &PeriodBucket, previous: &PeriodBucket) -> Option<f64> {
    growth(current, previous, MetricKey::Revenue)
}

/// Year-over-year net profit growth.
pub fn profit_growth(current: &PeriodBucket, previous: &PeriodBucket) -> Option<f64> {
    growth(current, previous, MetricKey::NetProfit)
}

/// Operating profit as a share of revenue.
pub fn operating_profit_margin(current: &PeriodBucket) -> Option<f64> {
    match (
        current.get(&MetricKey::OperatingProfit),
        current.get(&MetricKey::Revenue),
    ) {
        (Some(&operating), Some(&revenue)) if revenue > 0.0 => {
            Some(round2(operating / revenue * 100.0))
        }
        _ => None,
    }
}

/// Dividend per share as a share of EPS.
pub fn payout_ratio(current: &PeriodBucket) -> Option<f64> {
    match (
        current.get(&MetricKey::Dividend),
        current.get(&MetricKey::Eps),
    ) {
        (Some(&dividend), Some(&eps)) if eps > 0.0 => Some(round2(dividend / eps * 100.0)),
        _ => None,
    }
}

fn growth(current: &PeriodBucket, previous: &PeriodBucket, key: MetricKey) -> Option<f64> {
    match (current.get(&key), previous.get(&key)) {
        (Some(&curr), Some(&prior)) if prior > 0.0 => Some(round2((curr - prior) / prior * 100.0)),
        _ => None,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
