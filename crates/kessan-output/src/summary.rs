//! Console summary of a batch run.

use crate::format::format_number;
use crate::report::AnalysisResult;
use kessan_xbrl::MetricKey;
use std::fmt;

const RULE_WIDTH: usize = 70;

/// Headline figures shown for every company, with their labels.
const HEADLINE_METRICS: [(&str, MetricKey); 3] = [
    ("売上高", MetricKey::Revenue),
    ("営業利益", MetricKey::OperatingProfit),
    ("純利益", MetricKey::NetProfit),
];

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = &self.company_info;
        writeln!(
            f,
            "【{}】({})",
            info.display_name(),
            info.sec_code.as_deref().unwrap_or("-")
        )?;
        if let Some(description) = &info.doc_description {
            writeln!(f, "  書類: {description}")?;
        }

        for (label, key) in HEADLINE_METRICS {
            if let Some(value) = self.financial_data.current(key) {
                writeln!(f, "  {label}: {}", format_number(Some(value), key.unit()))?;
            }
        }

        for (category, assessment) in self.analysis.iter() {
            writeln!(
                f,
                "  {category}: {} - {}",
                assessment.level, assessment.comment
            )?;
        }
        Ok(())
    }
}

/// Renders the end-of-run summary for `results`.
pub fn render_summary(results: &[AnalysisResult]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut output = format!("{rule}\n分析結果サマリー\n{rule}\n");
    if results.is_empty() {
        output.push_str("\n分析できた決算短信はありません\n");
    }
    for result in results {
        output.push('\n');
        output.push_str(&result.to_string());
    }
    output
}
