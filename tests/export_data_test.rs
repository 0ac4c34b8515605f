mod common;

use adaptive_source::error::SourceError;
use adaptive_source::response::ApiResponse;
use adaptive_source::streams::ExportDataStream;
use adaptive_source::types::{AdaptiveStream, RecordData};
use serde_json::json;

fn run_stream(stream: &ExportDataStream, output: &str) -> Result<Vec<RecordData>, SourceError> {
    let response = ApiResponse::parse(&common::envelope(output))?;
    let mut records = Vec::new();
    stream.generate_table_rows(&response, &mut |data| {
        records.push(data);
        Ok(())
    })?;
    Ok(records)
}

#[test]
fn projects_row_with_configured_dimension() {
    let stream = ExportDataStream::new(common::config(&["Cost Center"]));
    let output = "Account Name,Account Code,Level Name,Cost Center,Amount\nAcctName,AcctCode,L1,CC-Val,99.5\n";

    let records = run_stream(&stream, output).unwrap();

    assert_eq!(stream.mapping().columns()[3], ("cost_center".to_string(), 3));
    assert_eq!(records.len(), 1);
    let record = serde_json::Value::Object(records[0].clone());
    assert_eq!(
        record,
        json!({
            "account_name": "AcctName",
            "account_code": "AcctCode",
            "level_name": "L1",
            "cost_center": "CC-Val",
            "amount": "99.5",
            "date": "01/2022",
        })
    );
}

#[test]
fn header_row_is_not_a_record() {
    let stream = ExportDataStream::new(common::config(&[]));
    let output = "Account Name,Account Code,Level Name,Amount\nA,1,L,10\nB,2,L,20\n";

    let records = run_stream(&stream, output).unwrap();
    let names: Vec<&str> = records
        .iter()
        .map(|r| r["account_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(records[1]["amount"], "20");
}

#[test]
fn every_record_gets_the_requested_date() {
    let mut config = common::config(&["Region"]);
    config.method_obj.date_selected = "06/2023".into();
    let stream = ExportDataStream::new(config);
    let output = "h1,h2,h3,h4,h5\nA,1,L,West,1\nB,2,L,East,2\n";

    for record in run_stream(&stream, output).unwrap() {
        assert_eq!(record["date"], "06/2023");
    }
}

#[test]
fn short_row_aborts_extraction() {
    let stream = ExportDataStream::new(common::config(&["Cost Center", "Region"]));
    let output = "h1,h2,h3,h4,h5,h6\nA,1,L,CC,West,5\nB,2,L,CC\n";

    assert!(matches!(run_stream(&stream, output), Err(SourceError::Reshape(_))));
}

#[test]
fn schema_lists_dimensions_as_strings() {
    let stream = ExportDataStream::new(common::config(&["Cost Center", "Sales Region"]));
    let schema = stream.generate_table_schema();

    assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
    let properties = schema["properties"].as_object().unwrap();
    assert_eq!(properties.len(), 7);
    assert_eq!(properties["cost_center"], json!({"type": "string"}));
    assert_eq!(properties["sales_region"], json!({"type": "string"}));
    assert_eq!(properties["date"], json!({"type": "string"}));
    assert_eq!(properties["amount"], json!({"type": "number"}));
    assert_eq!(stream.generate_table_name(), "exportData_Actuals");
}

#[test]
fn payload_requests_a_single_period() {
    let mut config = common::config(&["Cost Center"]);
    config.method_obj.date_selected = "Jan-2022".into();
    config.method_obj.date_end = Some("Dec-2022".into());
    let payload = ExportDataStream::new(config).construct_payload().unwrap();

    assert!(payload.contains(r#"<timeSpan start="Jan-2022" end="Jan-2022"/>"#));
    assert!(payload.contains(r#"<dimension name="Cost Center"/>"#));
    assert!(payload.contains(r#"<credentials login="user@example.com" password="secret"/>"#));
}
