//! Period classification.
//!
//! Facts are sorted into three buckets by the context they reference. The
//! fiscal-year boundaries are fixed configuration, never derived from the
//! current date.

use crate::context::Context;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// First day of the fiscal year treated as the current period.
pub const CURRENT_FISCAL_YEAR_START: NaiveDate = match NaiveDate::from_ymd_opt(2023, 4, 1) {
    Some(date) => date,
    None => panic!("invalid fiscal year start"),
};

/// First day of the fiscal year treated as the previous period.
pub const PREVIOUS_FISCAL_YEAR_START: NaiveDate = match NaiveDate::from_ymd_opt(2022, 4, 1) {
    Some(date) => date,
    None => panic!("invalid fiscal year start"),
};

/// Destination of a classified fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Current fiscal year
    Current,
    /// Prior fiscal year
    Previous,
    /// Forward-looking figures
    Forecast,
}

/// Decides which bucket, if any, a context's facts belong to.
///
/// Checks run in a fixed order and the first hit wins:
///
/// 1. a duration ending on or after `current_start` is [`Bucket::Current`];
/// 2. a duration ending in `[previous_start, current_start)` is [`Bucket::Previous`];
/// 3. a context whose id contains `Forecast` or `forecast` is [`Bucket::Forecast`].
///
/// A forecast context whose duration also ends in the current year is
/// therefore classified as current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodClassifier {
    previous_start: NaiveDate,
    current_start: NaiveDate,
}

impl Default for PeriodClassifier {
    fn default() -> Self {
        Self::new(PREVIOUS_FISCAL_YEAR_START, CURRENT_FISCAL_YEAR_START)
    }
}

impl PeriodClassifier {
    /// Creates a classifier from explicit boundaries.
    pub const fn new(previous_start: NaiveDate, current_start: NaiveDate) -> Self {
        Self {
            previous_start,
            current_start,
        }
    }

    /// Creates a classifier whose previous year starts exactly one year
    /// before `current_start`.
    ///
    /// Returns `None` when that day does not exist (February 29th).
    pub fn for_fiscal_year_starting(current_start: NaiveDate) -> Option<Self> {
        let previous_start = current_start.with_year(current_start.year() - 1)?;
        Some(Self::new(previous_start, current_start))
    }

    /// First day of the current period.
    pub const fn current_start(&self) -> NaiveDate {
        self.current_start
    }

    /// First day of the previous period.
    pub const fn previous_start(&self) -> NaiveDate {
        self.previous_start
    }

    /// True when the context is a duration ending in the current period.
    pub fn is_current(&self, context: &Context) -> bool {
        context
            .end_date()
            .is_some_and(|end| end >= self.current_start)
    }

    /// True when the context is a duration ending in the previous period.
    pub fn is_previous(&self, context: &Context) -> bool {
        context
            .end_date()
            .is_some_and(|end| end >= self.previous_start && end < self.current_start)
    }

    /// True when the context id marks a forecast.
    pub fn is_forecast(context_id: &str) -> bool {
        context_id.contains("Forecast") || context_id.contains("forecast")
    }

    /// Classifies a context; `None` means its facts are dropped.
    pub fn classify(&self, context: &Context) -> Option<Bucket> {
        if self.is_current(context) {
            Some(Bucket::Current)
        } else if self.is_previous(context) {
            Some(Bucket::Previous)
        } else if Self::is_forecast(&context.id) {
            Some(Bucket::Forecast)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextPeriod, PeriodDate};
    use rstest::rstest;

    fn duration(id: &str, start: &str, end: &str) -> Context {
        Context {
            id: id.to_string(),
            period: ContextPeriod::Duration {
                start: PeriodDate::new(start),
                end: PeriodDate::new(end),
            },
        }
    }

    fn instant(id: &str, date: &str) -> Context {
        Context {
            id: id.to_string(),
            period: ContextPeriod::Instant {
                date: PeriodDate::new(date),
            },
        }
    }

    #[rstest]
    #[case(duration("CurrentYearDuration", "2023-04-01", "2023-09-30"), Some(Bucket::Current))]
    #[case(duration("C", "2023-04-01", "2023-04-01"), Some(Bucket::Current))]
    #[case(duration("C", "2022-04-01", "2023-03-31"), Some(Bucket::Previous))]
    #[case(duration("C", "2022-04-01", "2022-04-01"), Some(Bucket::Previous))]
    #[case(duration("C", "2021-04-01", "2022-03-31"), None)]
    #[case(duration("NextYearForecast", "2024-04-01", "2025-03-31"), Some(Bucket::Current))]
    #[case(duration("forecast_2021", "2020-04-01", "2021-03-31"), Some(Bucket::Forecast))]
    #[case(duration("Broken", "2023-04-01", "garbage"), None)]
    #[case(duration("BrokenForecast", "2023-04-01", "garbage"), Some(Bucket::Forecast))]
    #[case(instant("CurrentYearInstant", "2023-09-30"), None)]
    #[case(instant("ForecastInstant", "2024-03-31"), Some(Bucket::Forecast))]
    #[case(Context { id: "Unspecified".to_string(), period: ContextPeriod::Unspecified }, None)]
    fn test_classify(#[case] context: Context, #[case] expected: Option<Bucket>) {
        assert_eq!(PeriodClassifier::default().classify(&context), expected);
    }

    #[test]
    fn test_is_forecast_is_case_sensitive_on_two_spellings() {
        assert!(PeriodClassifier::is_forecast("ForecastData"));
        assert!(PeriodClassifier::is_forecast("forecast_2024"));
        assert!(!PeriodClassifier::is_forecast("FORECAST"));
        assert!(!PeriodClassifier::is_forecast("CurrentYear"));
    }

    #[test]
    fn test_for_fiscal_year_starting() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let classifier = PeriodClassifier::for_fiscal_year_starting(start).unwrap();
        assert_eq!(classifier.current_start(), start);
        assert_eq!(
            classifier.previous_start(),
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
        );

        let context = duration("C", "2023-04-01", "2024-03-31");
        assert_eq!(classifier.classify(&context), Some(Bucket::Previous));

        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert!(PeriodClassifier::for_fiscal_year_starting(leap).is_none());
    }

    #[test]
    fn test_default_uses_named_boundaries() {
        let classifier = PeriodClassifier::default();
        assert_eq!(classifier.current_start(), CURRENT_FISCAL_YEAR_START);
        assert_eq!(classifier.previous_start(), PREVIOUS_FISCAL_YEAR_START);
    }
}
