//! Canonical metric dictionary.
//!
//! Each canonical metric lists the taxonomy element-name fragments that
//! identify it. Resolution is a substring match against the element's local
//! name, scanning [`METRICS`] before [`FORECAST_METRICS`], entries in declared
//! order, first match wins. The order of the tables is part of their meaning:
//! `RevenueGrowthRate` contains `Revenue` and therefore resolves to
//! [`MetricKey::Revenue`], not to [`MetricKey::RevenueGrowth`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical metric identifiers.
///
/// Serialized in `snake_case` (`revenue`, `operating_profit_margin`,
/// `forecast_net_profit`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    /// Net sales / operating revenue
    Revenue,
    /// Operating profit
    OperatingProfit,
    /// Ordinary profit
    OrdinaryProfit,
    /// Profit attributable to owners of parent
    NetProfit,
    /// Earnings per share
    Eps,
    /// Book value (net assets) per share
    Bps,
    /// Dividend per share
    Dividend,
    /// Return on equity
    Roe,
    /// Return on assets
    Roa,
    /// Equity-to-asset ratio
    EquityRatio,
    /// Year-over-year revenue growth, percent
    RevenueGrowth,
    /// Year-over-year net profit growth, percent
    ProfitGrowth,
    /// Operating profit over revenue, percent
    OperatingProfitMargin,
    /// Dividend over EPS, percent
    PayoutRatio,
    /// Forecast net sales
    ForecastRevenue,
    /// Forecast operating profit
    ForecastOperatingProfit,
    /// Forecast ordinary profit
    ForecastOrdinaryProfit,
    /// Forecast net profit
    ForecastNetProfit,
}

impl MetricKey {
    /// The `snake_case` identifier used in serialized output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::OperatingProfit => "operating_profit",
            Self::OrdinaryProfit => "ordinary_profit",
            Self::NetProfit => "net_profit",
            Self::Eps => "eps",
            Self::Bps => "bps",
            Self::Dividend => "dividend",
            Self::Roe => "roe",
            Self::Roa => "roa",
            Self::EquityRatio => "equity_ratio",
            Self::RevenueGrowth => "revenue_growth",
            Self::ProfitGrowth => "profit_growth",
            Self::OperatingProfitMargin => "operating_profit_margin",
            Self::PayoutRatio => "payout_ratio",
            Self::ForecastRevenue => "forecast_revenue",
            Self::ForecastOperatingProfit => "forecast_operating_profit",
            Self::ForecastOrdinaryProfit => "forecast_ordinary_profit",
            Self::ForecastNetProfit => "forecast_net_profit",
        }
    }

    /// The dictionary entry describing this metric.
    pub fn definition(&self) -> Option<&'static MetricDefinition> {
        METRICS
            .iter()
            .chain(FORECAST_METRICS)
            .chain(DERIVED_METRICS)
            .find(|def| def.key == *self)
    }

    /// Human-readable (Japanese) name, falling back to the identifier.
    pub fn display_name(&self) -> &'static str {
        self.definition()
            .map_or_else(|| self.as_str(), |def| def.display_name)
    }

    /// Display unit.
    pub fn unit(&self) -> MetricUnit {
        self.definition()
            .map_or(MetricUnit::Millions, |def| def.unit)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit a metric is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricUnit {
    /// Millions of yen (百万円)
    Millions,
    /// Yen (円), used for per-share figures
    Currency,
    /// Percent
    Percent,
}

impl MetricUnit {
    /// Suffix appended when rendering a value.
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Millions => "百万円",
            Self::Currency => "円",
            Self::Percent => "%",
        }
    }
}

/// One row of the metric dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDefinition {
    /// Canonical key
    pub key: MetricKey,
    /// Display name
    pub display_name: &'static str,
    /// Element-name fragments accepted for this metric
    pub accepted_names: &'static [&'static str],
    /// Display unit
    pub unit: MetricUnit,
}

impl MetricDefinition {
    /// Returns true if any accepted fragment occurs in `element_name`.
    pub fn matches(&self, element_name: &str) -> bool {
        self.accepted_names
            .iter()
            .any(|name| element_name.contains(name))
    }
}

/// Primary metrics, in resolution order.
pub static METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        key: MetricKey::Revenue,
        display_name: "売上高",
        accepted_names: &["NetSales", "OperatingRevenue", "Sales", "Revenue"],
        unit: MetricUnit::Millions,
    },
    MetricDefinition {
        key: MetricKey::OperatingProfit,
        display_name: "営業利益",
        accepted_names: &["OperatingProfit", "OperatingIncome"],
        unit: MetricUnit::Millions,
    },
    MetricDefinition {
        key: MetricKey::OrdinaryProfit,
        display_name: "経常利益",
        accepted_names: &["OrdinaryProfit", "OrdinaryIncome"],
        unit: MetricUnit::Millions,
    },
    MetricDefinition {
        key: MetricKey::NetProfit,
        display_name: "当期純利益",
        accepted_names: &[
            "NetIncome",
            "ProfitAttributableToOwnersOfParent",
            "NetProfitLoss",
        ],
        unit: MetricUnit::Millions,
    },
    MetricDefinition {
        key: MetricKey::Eps,
        display_name: "一株当たり当期純利益(EPS)",
        accepted_names: &["EarningsPerShare", "BasicEarningsPerShare"],
        unit: MetricUnit::Currency,
    },
    MetricDefinition {
        key: MetricKey::Bps,
        display_name: "一株当たり純資産(BPS)",
        accepted_names: &["BookValuePerShare", "NetAssetsPerShare"],
        unit: MetricUnit::Currency,
    },
    MetricDefinition {
        key: MetricKey::Dividend,
        display_name: "一株当たり配当金",
        accepted_names: &["DividendPerShare", "AnnualDividendsPerShare"],
        unit: MetricUnit::Currency,
    },
    MetricDefinition {
        key: MetricKey::Roe,
        display_name: "自己資本利益率(ROE)",
        accepted_names: &["ReturnOnEquity", "ROE"],
        unit: MetricUnit::Percent,
    },
    MetricDefinition {
        key: MetricKey::Roa,
        display_name: "総資産利益率(ROA)",
        accepted_names: &["ReturnOnAssets", "ROA"],
        unit: MetricUnit::Percent,
    },
    MetricDefinition {
        key: MetricKey::EquityRatio,
        display_name: "自己資本比率",
        accepted_names: &["EquityRatio", "EquityToAssetRatio"],
        unit: MetricUnit::Percent,
    },
    MetricDefinition {
        key: MetricKey::RevenueGrowth,
        display_name: "売上高成長率",
        accepted_names: &["RevenueGrowthRate", "SalesGrowthRate"],
        unit: MetricUnit::Percent,
    },
    MetricDefinition {
        key: MetricKey::ProfitGrowth,
        display_name: "利益成長率",
        accepted_names: &["ProfitGrowthRate", "NetIncomeGrowthRate"],
        unit: MetricUnit::Percent,
    },
];

/// Forecast metrics, consulted only when no primary metric matches.
pub static FORECAST_METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        key: MetricKey::ForecastRevenue,
        display_name: "売上高予想",
        accepted_names: &["ForecastNetSales", "ForecastOperatingRevenue"],
        unit: MetricUnit::Millions,
    },
    MetricDefinition {
        key: MetricKey::ForecastOperatingProfit,
        display_name: "営業利益予想",
        accepted_names: &["ForecastOperatingProfit", "ForecastOperatingIncome"],
        unit: MetricUnit::Millions,
    },
    MetricDefinition {
        key: MetricKey::ForecastOrdinaryProfit,
        display_name: "経常利益予想",
        accepted_names: &["ForecastOrdinaryProfit", "ForecastOrdinaryIncome"],
        unit: MetricUnit::Millions,
    },
    MetricDefinition {
        key: MetricKey::ForecastNetProfit,
        display_name: "当期純利益予想",
        accepted_names: &[
            "ForecastNetIncome",
            "ForecastProfitAttributableToOwnersOfParent",
        ],
        unit: MetricUnit::Millions,
    },
];

/// Metrics that are only ever computed, never read from a filing.
pub static DERIVED_METRICS: &[MetricDefinition] = &[
    MetricDefinition {
        key: MetricKey::OperatingProfitMargin,
        display_name: "営業利益率",
        accepted_names: &[],
        unit: MetricUnit::Percent,
    },
    MetricDefinition {
        key: MetricKey::PayoutRatio,
        display_name: "配当性向",
        accepted_names: &[],
        unit: MetricUnit::Percent,
    },
];

/// Resolves a taxonomy element name to its canonical metric.
///
/// Returns `None` for elements outside the dictionary; callers ignore those.
///
/// ```
/// use kessan_xbrl::{MetricKey, metrics::resolve};
///
/// assert_eq!(resolve("NetSalesSummary"), Some(MetricKey::Revenue));
/// assert_eq!(resolve("EntityName"), None);
/// ```
pub fn resolve(element_name: &str) -> Option<MetricKey> {
    METRICS
        .iter()
        .chain(FORECAST_METRICS)
        .find(|def| def.matches(element_name))
        .map(|def| def.key)
}
