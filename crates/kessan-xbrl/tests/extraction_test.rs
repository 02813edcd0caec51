//! End-to-end extraction from filing archives

use approx::assert_relative_eq;
use kessan_xbrl::{ExtractError, MetricKey, XbrlExtractor};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const SAMPLE_XBRL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xbrl xmlns="http://www.xbrl.org/2003/instance"
      xmlns:xbrli="http://www.xbrl.org/2003/instance"
      xmlns:jpcrp="http://disclosure.edinet-fsa.go.jp/taxonomy/jpcrp/2023-11-01/jpcrp_cor">
  <xbrli:context id="CurrentYearInstant">
    <xbrli:entity>
      <xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E12345</xbrli:identifier>
    </xbrli:entity>
    <xbrli:period>
      <xbrli:instant>2023-09-30</xbrli:instant>
    </xbrli:period>
  </xbrli:context>
  <xbrli:context id="CurrentYearDuration">
    <xbrli:entity>
      <xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E12345</xbrli:identifier>
    </xbrli:entity>
    <xbrli:period>
      <xbrli:startDate>2023-04-01</xbrli:startDate>
      <xbrli:endDate>2023-09-30</xbrli:endDate>
    </xbrli:period>
  </xbrli:context>
  <xbrli:context id="PreviousYearDuration">
    <xbrli:entity>
      <xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E12345</xbrli:identifier>
    </xbrli:entity>
    <xbrli:period>
      <xbrli:startDate>2022-04-01</xbrli:startDate>
      <xbrli:endDate>2022-09-30</xbrli:endDate>
    </xbrli:period>
  </xbrli:context>
  <jpcrp:NetSales contextRef="CurrentYearDuration" unitRef="JPY" decimals="-6" scale="6">50000</jpcrp:NetSales>
  <jpcrp:NetSales contextRef="PreviousYearDuration" unitRef="JPY" decimals="-6" scale="6">45000</jpcrp:NetSales>
  <jpcrp:OperatingProfit contextRef="CurrentYearDuration" unitRef="JPY" decimals="-6" scale="6">5000</jpcrp:OperatingProfit>
  <jpcrp:OperatingProfit contextRef="PreviousYearDuration" unitRef="JPY" decimals="-6" scale="6">4500</jpcrp:OperatingProfit>
  <jpcrp:NetIncome contextRef="CurrentYearDuration" unitRef="JPY" decimals="-6" scale="6">3000</jpcrp:NetIncome>
  <jpcrp:NetIncome contextRef="PreviousYearDuration" unitRef="JPY" decimals="-6" scale="6">2800</jpcrp:NetIncome>
  <jpcrp:EarningsPerShare contextRef="CurrentYearDuration" unitRef="JPYPerShare" decimals="2">300</jpcrp:EarningsPerShare>
  <jpcrp:ReturnOnEquity contextRef="CurrentYearDuration" unitRef="percent" decimals="1">12.5</jpcrp:ReturnOnEquity>
</xbrl>"#;

fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn sample_archive() -> Vec<u8> {
    zip_archive(&[
        ("XBRL/AuditDoc/audit.xbrl", "<xbrl/>"),
        ("XBRL/PublicDoc/test.xbrl", SAMPLE_XBRL),
    ])
}

#[test]
fn test_extract_sample_filing() {
    let result = XbrlExtractor::new()
        .extract_archive(&sample_archive())
        .unwrap();

    let current = &result.current_period;
    assert_relative_eq!(current[&MetricKey::Revenue], 50_000_000_000.0);
    assert_relative_eq!(current[&MetricKey::OperatingProfit], 5_000_000_000.0);
    assert_relative_eq!(current[&MetricKey::NetProfit], 3_000_000_000.0);
    assert_relative_eq!(current[&MetricKey::Eps], 300.0);
    assert_relative_eq!(current[&MetricKey::Roe], 12.5);

    assert_relative_eq!(current[&MetricKey::RevenueGrowth], 11.11);
    assert_relative_eq!(current[&MetricKey::ProfitGrowth], 7.14);
    assert_relative_eq!(current[&MetricKey::OperatingProfitMargin], 10.0);
    // No dividend reported.
    assert!(!current.contains_key(&MetricKey::PayoutRatio));

    let previous = &result.previous_period;
    assert_eq!(previous.len(), 3);
    assert_relative_eq!(previous[&MetricKey::Revenue], 45_000_000_000.0);
    assert_relative_eq!(previous[&MetricKey::NetProfit], 2_800_000_000.0);

    assert!(result.forecast.is_empty());
}

#[test]
fn test_extraction_is_repeatable() {
    let extractor = XbrlExtractor::new();
    let bytes = sample_archive();
    let first = extractor.extract_archive(&bytes).unwrap();
    let second = extractor.extract_archive(&bytes).unwrap();

    assert_eq!(first.current_period, second.current_period);
    assert_eq!(first.previous_period, second.previous_period);
    assert_eq!(first.forecast, second.forecast);
}

#[test]
fn test_archive_without_xbrl_is_no_data() {
    let bytes = zip_archive(&[("PublicDoc/summary.htm", "<html/>")]);
    let err = XbrlExtractor::new().extract_archive(&bytes).unwrap_err();
    assert!(matches!(err, ExtractError::ArchiveFormat(_)));
    assert!(err.is_no_data());
}

#[test]
fn test_malformed_instance_is_reported() {
    let bytes = zip_archive(&[("PublicDoc/test.xbrl", "<invalid><xml")]);
    let err = XbrlExtractor::new().extract_archive(&bytes).unwrap_err();
    assert!(matches!(err, ExtractError::MalformedDocument(_)));
}

#[test]
fn test_unrecognised_elements_leave_buckets_empty() {
    let xml = r#"<xbrl xmlns="http://www.xbrl.org/2003/instance" xmlns:jpdei="urn:jpdei">
  <context id="CurrentYearDuration">
    <period><startDate>2023-04-01</startDate><endDate>2024-03-31</endDate></period>
  </context>
  <jpdei:FilerNameInJapaneseDEI contextRef="CurrentYearDuration">テスト株式会社</jpdei:FilerNameInJapaneseDEI>
  <jpdei:SecurityCodeDEI contextRef="CurrentYearDuration">12340</jpdei:SecurityCodeDEI>
</xbrl>"#;
    let bytes = zip_archive(&[("PublicDoc/test.xbrl", xml)]);
    let result = XbrlExtractor::new().extract_archive(&bytes).unwrap();

    assert!(!result.has_current_period_facts());
    assert!(result.previous_period.is_empty());
    assert!(result.forecast.is_empty());
}

#[test]
fn test_forecast_and_millions_units() {
    let xml = r#"<xbrl xmlns="http://www.xbrl.org/2003/instance" xmlns:tse="urn:tse">
  <context id="CurrentYearDuration">
    <period><startDate>2023-04-01</startDate><endDate>2024-03-31</endDate></period>
  </context>
  <context id="NextYearForecastInstant">
    <period><instant>2025-03-31</instant></period>
  </context>
  <tse:OrdinaryIncome contextRef="CurrentYearDuration" unitRef="JPYMillions">1,234</tse:OrdinaryIncome>
  <tse:ForecastOrdinaryIncome contextRef="NextYearForecastInstant" unitRef="JPYMillions">1,500</tse:ForecastOrdinaryIncome>
  <tse:DividendPerShare contextRef="NextYearForecastInstant" unitRef="JPYPerShare">40</tse:DividendPerShare>
</xbrl>"#;
    let result = XbrlExtractor::new().extract_document(xml.as_bytes()).unwrap();

    assert_relative_eq!(
        result.current_period[&MetricKey::OrdinaryProfit],
        1_234_000_000.0
    );
    // Forecast names are shadowed by the primary entries they contain.
    assert_relative_eq!(result.forecast[&MetricKey::OrdinaryProfit], 1_500_000_000.0);
    assert_relative_eq!(result.forecast[&MetricKey::Dividend], 40.0);
    assert!(!result.forecast.contains_key(&MetricKey::ForecastOrdinaryProfit));
}
