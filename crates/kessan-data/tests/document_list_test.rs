//! Decoding and filtering of EDINET document lists

use kessan_data::DataError;
use kessan_data::edinet::{DocumentList, filter_earnings_reports};

const SAMPLE_LIST: &str = r#"{
  "metadata": {
    "title": "提出された書類を把握するためのAPI",
    "parameter": { "date": "2023-12-01", "type": "2" },
    "resultset": { "count": 3 },
    "processDateTime": "2023-12-01 17:00",
    "status": "200",
    "message": "OK"
  },
  "results": [
    {
      "seqNumber": 1,
      "docID": "S100TEST",
      "edinetCode": "E12345",
      "secCode": "12340",
      "JCN": "1234567890123",
      "filerName": "テスト株式会社",
      "fundCode": null,
      "ordinanceCode": "010",
      "formCode": "030000",
      "docTypeCode": "120",
      "periodStart": "2023-04-01",
      "periodEnd": "2023-09-30",
      "submitDateTime": "2023-12-01 15:00",
      "docDescription": "第2四半期決算短信〔日本基準〕（連結）",
      "xbrlFlag": "1",
      "pdfFlag": "1"
    },
    {
      "seqNumber": 2,
      "docID": "S200TEST",
      "edinetCode": "E67890",
      "secCode": null,
      "filerName": "サンプル株式会社",
      "docTypeCode": "120",
      "submitDateTime": "2023-12-01 16:00",
      "docDescription": "有価証券報告書",
      "xbrlFlag": "1",
      "pdfFlag": "1"
    },
    {
      "seqNumber": 3,
      "docID": "S300TEST",
      "filerName": "例示工業株式会社",
      "docDescription": "決算短信〔日本基準〕（連結）"
    }
  ]
}"#;

#[test]
fn test_decode_sample_list() {
    let list = DocumentList::from_json(SAMPLE_LIST).unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(list.metadata.status.as_deref(), Some("200"));
    assert_eq!(list.metadata.resultset.as_ref().map(|r| r.count), Some(3));

    let first = &list.results[0];
    assert_eq!(first.doc_id, "S100TEST");
    assert_eq!(first.seq_number, Some(1));
    assert_eq!(first.sec_code.as_deref(), Some("12340"));
    assert_eq!(first.filer_name.as_deref(), Some("テスト株式会社"));
    assert_eq!(first.xbrl_flag.as_deref(), Some("1"));

    assert_eq!(list.results[1].sec_code, None);
    assert_eq!(list.results[2].edinet_code, None);
}

#[test]
fn test_filter_sample_list() {
    let list = DocumentList::from_json(SAMPLE_LIST).unwrap();
    let reports = filter_earnings_reports(&list);

    let ids: Vec<&str> = reports.iter().map(|doc| doc.doc_id.as_str()).collect();
    assert_eq!(ids, ["S100TEST", "S300TEST"]);
}

#[test]
fn test_missing_results_is_empty() {
    let list = DocumentList::from_json(r#"{"metadata": {"status": "200"}}"#).unwrap();
    assert!(list.is_empty());
    assert!(filter_earnings_reports(&list).is_empty());
}

#[test]
fn test_non_json_body_is_api_error() {
    let err = DocumentList::from_json("<html><body>Service Unavailable</body></html>").unwrap_err();
    match err {
        DataError::EdinetApi(message) => assert!(message.contains("Service Unavailable")),
        other => panic!("expected EdinetApi, got {other:?}"),
    }
}

#[test]
fn test_api_status_in_header_is_error() {
    let body = r#"{"metadata": {"status": "400", "message": "Bad Request"}}"#;
    let err = DocumentList::from_json(body).unwrap_err();
    assert!(matches!(err, DataError::EdinetApi(ref m) if m.contains("400") && m.contains("Bad Request")));
}

#[test]
fn test_wrong_shape_is_serialization_error() {
    let err = DocumentList::from_json(r#"{"results": [{"seqNumber": 1}]}"#).unwrap_err();
    assert!(matches!(err, DataError::Serialization(_)));
}
