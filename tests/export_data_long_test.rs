mod common;

use adaptive_source::error::SourceError;
use adaptive_source::reshape::{handle_export_data, reshape_export, Amount, LongRecord};
use adaptive_source::response::ApiResponse;
use adaptive_source::streams::export_data_long::record_data;
use adaptive_source::streams::ExportDataLongStream;
use adaptive_source::types::AdaptiveStream;
use common::WIDE_HEADER;
use jsonschema::JSONSchema;
use std::fs;
use tempfile::tempdir;

fn wide_csv(rows: &[&str]) -> String {
    let mut out = String::from(WIDE_HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

fn spill_dir_is_empty(dir: &std::path::Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn single_row_melts_into_one_record_per_period() {
    let dir = tempdir().unwrap();
    let csv = wide_csv(&["A,100,L1,G,Loc,C,As,5,7"]);

    let records = reshape_export(&csv, Some(dir.path())).unwrap();

    assert_eq!(records.len(), 2);
    let jan = &records[0];
    assert_eq!(jan.account_name, "A");
    assert_eq!(jan.account_code, "100");
    assert_eq!(jan.level_name, "L1");
    assert_eq!(jan.gl_account, "G");
    assert_eq!(jan.location, "Loc");
    assert_eq!(jan.contract, "C");
    assert_eq!(jan.assignment, "As");
    assert_eq!(jan.date, "2022-01-01");
    assert_eq!(jan.amount, Amount::Number(5.0));
    assert_eq!(jan.id, 450_700_251_217);

    let feb = &records[1];
    assert_eq!(feb.date, "2022-02-01");
    assert_eq!(feb.amount, Amount::Number(7.0));
    assert_eq!(feb.id, 572_537_726_613);
}

#[test]
fn output_count_is_rows_times_periods() {
    let dir = tempdir().unwrap();
    let rows: Vec<String> = (0..25)
        .map(|i| format!("Acct {i},{i},Level,GL,Loc,Con,Asg,{i}.5,-{i}"))
        .collect();
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();

    let records = reshape_export(&wide_csv(&row_refs), Some(dir.path())).unwrap();
    assert_eq!(records.len(), 25 * 2);
}

#[test]
fn small_chunks_stream_every_row() {
    let dir = tempdir().unwrap();
    let csv = wide_csv(&[
        "A,1,L,G,Loc,C,As,1,2",
        "B,2,L,G,Loc,C,As,3,4",
        "C,3,L,G,Loc,C,As,5,6",
    ]);

    let mut amounts = Vec::new();
    let emitted = handle_export_data(&csv, Some(dir.path()), 4, |record| {
        amounts.push(record.amount.as_f64().unwrap());
        Ok(())
    })
    .unwrap();

    assert_eq!(emitted, 6);
    assert_eq!(amounts, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn reshape_is_idempotent() {
    let dir = tempdir().unwrap();
    let csv = wide_csv(&["A,100,L1,G,Loc,C,As,5,7", "B,200,L2,G,Loc,C,As,,x"]);

    let first = reshape_export(&csv, Some(dir.path())).unwrap();
    let second = reshape_export(&csv, Some(dir.path())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn ids_differ_when_any_key_field_differs() {
    let dir = tempdir().unwrap();
    let csv = wide_csv(&[
        "A,100,L1,G,Loc,C,As,1,1",
        "A,100,L1,G,Loc,C,Other,1,1",
        "A,100,L1,G,Elsewhere,C,As,1,1",
        "Renamed,100,L1,G,Loc,C,As,1,1",
    ]);
    let records = reshape_export(&csv, Some(dir.path())).unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();

    // account name is not part of the key
    assert_eq!(ids[0], ids[6]);
    assert_eq!(ids[1], ids[7]);
    assert_ne!(ids[0], ids[2]);
    assert_ne!(ids[0], ids[4]);
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn non_numeric_amounts_and_odd_dates_pass_through() {
    let dir = tempdir().unwrap();
    let csv = "Account Name,Account Code,Level Name,GL Account Name,Location Name,Contract Name,Assignment Name,Q1-2022,03/2022\nA,100,L1,G,Loc,C,As,,n/a\n";

    let records = reshape_export(csv, Some(dir.path())).unwrap();
    assert_eq!(records[0].date, "Q1-2022");
    assert_eq!(records[0].amount, Amount::Raw(String::new()));
    assert_eq!(records[1].date, "2022-03-01");
    assert_eq!(records[1].amount, Amount::Raw("n/a".into()));
}

#[test]
fn quoted_identity_values_survive_the_spill() {
    let dir = tempdir().unwrap();
    let csv = wide_csv(&[r#""Sales, ""Net""",100,L1,G,Loc,C,As,5,7"#]);
    let records = reshape_export(&csv, Some(dir.path())).unwrap();
    assert_eq!(records[0].account_name, r#"Sales, "Net""#);
}

#[test]
fn table_without_period_columns_yields_nothing() {
    let dir = tempdir().unwrap();
    let csv = "Account Name,Account Code,Level Name,GL Account Name,Location Name,Contract Name,Assignment Name\nA,100,L1,G,Loc,C,As\n";
    assert!(reshape_export(csv, Some(dir.path())).unwrap().is_empty());
    assert!(spill_dir_is_empty(dir.path()));
}

#[test]
fn empty_output_yields_nothing() {
    let dir = tempdir().unwrap();
    assert!(reshape_export("", Some(dir.path())).unwrap().is_empty());
    assert!(reshape_export("  \n", Some(dir.path())).unwrap().is_empty());
}

#[test]
fn spill_file_is_removed_after_success() {
    let dir = tempdir().unwrap();
    let csv = wide_csv(&["A,100,L1,G,Loc,C,As,5,7"]);

    let mut seen_spill = false;
    handle_export_data(&csv, Some(dir.path()), 1, |_| {
        seen_spill = !spill_dir_is_empty(dir.path());
        Ok(())
    })
    .unwrap();

    assert!(seen_spill, "records should be streamed from a spill file");
    assert!(spill_dir_is_empty(dir.path()));
}

#[test]
fn spill_file_is_removed_when_consumer_fails_midway() {
    let dir = tempdir().unwrap();
    let csv = wide_csv(&["A,1,L,G,Loc,C,As,1,2", "B,2,L,G,Loc,C,As,3,4"]);

    let mut consumed = 0;
    let err = handle_export_data(&csv, Some(dir.path()), 1, |_| {
        consumed += 1;
        if consumed == 3 {
            return Err(SourceError::Reshape("downstream rejected record".into()));
        }
        Ok(())
    })
    .unwrap_err();

    assert!(matches!(err, SourceError::Reshape(_)));
    assert_eq!(consumed, 3);
    assert!(spill_dir_is_empty(dir.path()));
}

#[test]
fn spill_file_is_removed_when_identity_column_missing() {
    let dir = tempdir().unwrap();
    let csv = "Account Name,Account Code,01/2022\nA,100,5\n";

    let err = reshape_export(csv, Some(dir.path())).unwrap_err();
    assert!(matches!(err, SourceError::Reshape(_)));
    assert!(spill_dir_is_empty(dir.path()));
}

#[test]
fn stream_records_match_declared_schema() {
    let dir = tempdir().unwrap();
    let mut config = common::config(&[]);
    config.spill_dir = Some(dir.path().to_path_buf());
    let stream = ExportDataLongStream::new(config).with_chunk_size(2);

    let schema = stream.generate_table_schema();
    let compiled = JSONSchema::compile(&schema).unwrap();

    let body = common::envelope(&wide_csv(&["A,100,L1,G,Loc,C,As,5,7", "B,200,L1,G,Loc,C,As,1.25,0"]));
    let response = ApiResponse::parse(&body).unwrap();

    let mut records = Vec::new();
    let produced = stream
        .generate_table_rows(&response, &mut |data| {
            records.push(serde_json::Value::Object(data));
            Ok(())
        })
        .unwrap();

    assert_eq!(produced, 4);
    assert_eq!(stream.generate_table_name(), "exportDataLong_Actuals");
    for record in &records {
        assert!(compiled.is_valid(record), "record failed schema: {record}");
    }
    assert_eq!(records[0]["level_name"], "L1");
    assert_eq!(records[0]["id"], 450_700_251_217u64);
    assert!(spill_dir_is_empty(dir.path()));
}

#[test]
fn record_data_keeps_every_field() {
    let record = LongRecord {
        id: 1,
        account_name: "A".into(),
        account_code: "100".into(),
        level_name: "L1".into(),
        gl_account: "G".into(),
        location: "Loc".into(),
        contract: "C".into(),
        assignment: "As".into(),
        date: "2022-01-01".into(),
        amount: Amount::Raw("x".into()),
    };
    let data = record_data(record).unwrap();
    let mut keys: Vec<&str> = data.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "account_code",
            "account_name",
            "amount",
            "assignment",
            "contract",
            "date",
            "gl_account",
            "id",
            "level_name",
            "location"
        ]
    );
    assert_eq!(data["amount"], "x");
}
