//! Loader tests: rows in, classified matches out.

use stockday::loader::{load_from_path, parse_row};
use stockday::prelude::*;

const TABLE: &str = "\
Date,Open,High,Low,Close
31/10/2016,58.25,58.65,58.2,58.35
01/11/2016,10.00,10.00,2.00,10.00

02/11/2016,58.30,58.70,58.10,58.40
";

#[test]
fn test_load_with_header() {
    let report = load_from_str(TABLE, LoadOptions::default()).unwrap();
    assert_eq!(report.records.len(), 3);
    assert!(report.rejected.is_empty());
    assert!(report.records[1].is_hammer());
}

#[test]
fn test_load_without_header() {
    let body = TABLE.lines().skip(1).collect::<Vec<_>>().join("\n");
    let options = LoadOptions {
        has_header: false,
        ..LoadOptions::default()
    };
    let report = load_from_str(&body, options).unwrap();
    assert_eq!(report.records.len(), 3);
}

#[test]
fn test_header_parsed_as_row_fails() {
    let options = LoadOptions {
        has_header: false,
        ..LoadOptions::default()
    };
    let err = load_from_str(TABLE, options).unwrap_err();
    assert!(matches!(err, LoadError::InvalidDate { line: 1, .. }));
}

#[test]
fn test_abort_on_invalid_row() {
    let text = "Date,Open,High,Low,Close\n31/10/2016,1,1,2,1\n01/11/2016,1,2,1,2\n";
    let err = load_from_str(text, LoadOptions::default()).unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert!(matches!(err, LoadError::InvalidRecord { .. }));
}

#[test]
fn test_skip_invalid_rows() {
    let text = "\
Date,Open,High,Low,Close
31/10/2016,1,1,2,1
01/11/2016,1,2,1,2
2016-11-02,1,2,1,2
03/11/2016,1,x,1,2
04/11/2016,1,2,1
05/11/2016,10,10,2,10
";
    let options = LoadOptions {
        on_invalid: InvalidRowPolicy::Skip,
        ..LoadOptions::default()
    };
    let report = load_from_str(text, options).unwrap();
    assert_eq!(report.records.len(), 2);

    let lines: Vec<_> = report.rejected.iter().filter_map(LoadError::line).collect();
    assert_eq!(lines, vec![2, 4, 5, 6]);
}

#[test]
fn test_loaded_rows_report_in_input_format() {
    let report = load_from_str(TABLE, LoadOptions::default()).unwrap();
    let matches = Classifier::default()
        .find_matches("hammer", &report.records)
        .unwrap();
    let lines: Vec<_> = matches.iter().map(ToString::to_string).collect();
    assert_eq!(lines, vec!["hammer: 01/11/2016"]);

    // The reported date parses back with the same format
    let date = lines[0].trim_start_matches("hammer: ");
    let row = format!("{date},10,10,2,10");
    assert_eq!(parse_row(1, &row).unwrap().date(), matches[0].start_date);
}

#[test]
fn test_missing_file() {
    let err = load_from_path("/nonexistent/table.csv", LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
    assert_eq!(err.line(), None);
}

#[test]
fn test_options_deserialize() {
    let options: LoadOptions = serde_json::from_str(r#"{"on_invalid":"skip"}"#).unwrap();
    assert!(options.has_header);
    assert_eq!(options.on_invalid, InvalidRowPolicy::Skip);
}
