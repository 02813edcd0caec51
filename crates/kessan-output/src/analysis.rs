//! Rule-based assessment of a company's current-period figures.
//!
//! Each category looks at a single metric and is omitted when that metric
//! was not extracted.

use crate::format::format_decimal;
use kessan_xbrl::{MetricKey, PeriodBucket};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assessment outcome. Serialized as its Japanese label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Revenue growth of 10% or more
    #[serde(rename = "高成長")]
    HighGrowth,
    /// Revenue growth between 0% and 10%
    #[serde(rename = "安定成長")]
    StableGrowth,
    /// Shrinking revenue
    #[serde(rename = "減収")]
    Declining,
    /// Operating margin of 15% or more
    #[serde(rename = "高収益")]
    HighProfitability,
    /// Operating margin between 5% and 15%
    #[serde(rename = "標準的")]
    StandardProfitability,
    /// Operating margin below 5%
    #[serde(rename = "低収益")]
    LowProfitability,
    /// ROE of 15% or more
    #[serde(rename = "優良")]
    Excellent,
    /// ROE between 8% and 15%
    #[serde(rename = "良好")]
    Good,
    /// ROE below 8%
    #[serde(rename = "要改善")]
    NeedsImprovement,
    /// Payout ratio above 30%
    #[serde(rename = "高還元")]
    HighReturn,
    /// Payout ratio above 20%
    #[serde(rename = "中還元")]
    ModerateReturn,
    /// Payout ratio of 20% or less
    #[serde(rename = "低還元")]
    LowReturn,
    /// Equity ratio above 50%
    #[serde(rename = "高安定")]
    HighStability,
    /// Equity ratio above 30%
    #[serde(rename = "中安定")]
    ModerateStability,
    /// Equity ratio of 30% or less
    #[serde(rename = "低安定")]
    LowStability,
}

impl Level {
    /// Japanese label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::HighGrowth => "高成長",
            Self::StableGrowth => "安定成長",
            Self::Declining => "減収",
            Self::HighProfitability => "高収益",
            Self::StandardProfitability => "標準的",
            Self::LowProfitability => "低収益",
            Self::Excellent => "優良",
            Self::Good => "良好",
            Self::NeedsImprovement => "要改善",
            Self::HighReturn => "高還元",
            Self::ModerateReturn => "中還元",
            Self::LowReturn => "低還元",
            Self::HighStability => "高安定",
            Self::ModerateStability => "中安定",
            Self::LowStability => "低安定",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What is being assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisCategory {
    /// Revenue growth
    Growth,
    /// Operating margin
    Profitability,
    /// Return on equity
    Roe,
    /// Payout ratio
    ShareholderReturn,
    /// Equity ratio
    Stability,
}

impl AnalysisCategory {
    /// Identifier used in summaries and serialized output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Profitability => "profitability",
            Self::Roe => "roe",
            Self::ShareholderReturn => "shareholder_return",
            Self::Stability => "stability",
        }
    }

    /// The metric this category is judged on.
    pub const fn metric(&self) -> MetricKey {
        match self {
            Self::Growth => MetricKey::RevenueGrowth,
            Self::Profitability => MetricKey::OperatingProfitMargin,
            Self::Roe => MetricKey::Roe,
            Self::ShareholderReturn => MetricKey::PayoutRatio,
            Self::Stability => MetricKey::EquityRatio,
        }
    }

    /// Short label used in comments.
    const fn comment_label(&self) -> &'static str {
        match self {
            Self::Growth => "売上高成長率",
            Self::Profitability => "営業利益率",
            Self::Roe => "ROE",
            Self::ShareholderReturn => "配当性向",
            Self::Stability => "自己資本比率",
        }
    }

    /// Grades a metric value.
    pub fn level(&self, value: f64) -> Level {
        match self {
            Self::Growth if value >= 10.0 => Level::HighGrowth,
            Self::Growth if value >= 0.0 => Level::StableGrowth,
            Self::Growth => Level::Declining,
            Self::Profitability if value >= 15.0 => Level::HighProfitability,
            Self::Profitability if value >= 5.0 => Level::StandardProfitability,
            Self::Profitability => Level::LowProfitability,
            Self::Roe if value >= 15.0 => Level::Excellent,
            Self::Roe if value >= 8.0 => Level::Good,
            Self::Roe => Level::NeedsImprovement,
            Self::ShareholderReturn if value > 30.0 => Level::HighReturn,
            Self::ShareholderReturn if value > 20.0 => Level::ModerateReturn,
            Self::ShareholderReturn => Level::LowReturn,
            Self::Stability if value > 50.0 => Level::HighStability,
            Self::Stability if value > 30.0 => Level::ModerateStability,
            Self::Stability => Level::LowStability,
        }
    }

    /// Builds the full assessment for a value.
    pub fn assess(&self, value: f64) -> Assessment {
        Assessment {
            level: self.level(value),
            comment: format!("{} {}%", self.comment_label(), format_decimal(value)),
        }
    }
}

impl fmt::Display for AnalysisCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A graded metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Grade
    pub level: Level,
    /// The metric and value that led to the grade (`売上高成長率 11.11%`)
    pub comment: String,
}

/// All assessments for one company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Revenue growth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<Assessment>,
    /// Operating margin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profitability: Option<Assessment>,
    /// Return on equity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roe: Option<Assessment>,
    /// Payout ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shareholder_return: Option<Assessment>,
    /// Equity ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<Assessment>,
}

impl Analysis {
    /// Present assessments in display order.
    pub fn iter(&self) -> impl Iterator<Item = (AnalysisCategory, &Assessment)> {
        [
            (AnalysisCategory::Growth, &self.growth),
            (AnalysisCategory::Profitability, &self.profitability),
            (AnalysisCategory::Roe, &self.roe),
            (AnalysisCategory::ShareholderReturn, &self.shareholder_return),
            (AnalysisCategory::Stability, &self.stability),
        ]
        .into_iter()
        .filter_map(|(category, assessment)| assessment.as_ref().map(|a| (category, a)))
    }

    /// Returns true if no category could be assessed.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Assesses the current-period figures of one filing.
pub fn analyze(current: &PeriodBucket) -> Analysis {
    let assess = |category: AnalysisCategory| {
        current
            .get(&category.metric())
            .map(|&value| category.assess(value))
    };

    Analysis {
        growth: assess(AnalysisCategory::Growth),
        profitability: assess(AnalysisCategory::Profitability),
        roe: assess(AnalysisCategory::Roe),
        shareholder_return: assess(AnalysisCategory::ShareholderReturn),
        stability: assess(AnalysisCategory::Stability),
    }
}
