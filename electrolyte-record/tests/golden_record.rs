use std::fs;

use chrono::{DateTime, Utc};
use electrolyte_core::{alert_level, AlertLevel, Analyte, Status};
use electrolyte_record::{
    evaluate_record_str, export_record_at, import_into, import_record_str, CaseRecord,
    RecordError, RECORD_TYPE,
};
use serde_json::Value;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("Could not read fixture")
}

#[test]
fn critical_sodium_record_matches_golden() {
    let record = read_fixture("critical_sodium_record.json");

    let result = evaluate_record_str(&record).expect("Could not evaluate record");

    let mut actual = serde_json::to_value(&result).expect("Could not serialize result");
    normalize_dynamic_fields(&mut actual);

    let mut expected: Value =
        serde_json::from_str(&read_fixture("critical_sodium_snapshot.json")).expect("Invalid golden");
    normalize_dynamic_fields(&mut expected);

    assert_eq!(actual, expected);
    assert_eq!(alert_level(&result), AlertLevel::Critical);
}

#[test]
fn import_keeps_known_fields_only() {
    let record = import_record_str(&read_fixture("critical_sodium_record.json"))
        .expect("Could not import record");

    assert_eq!(record.patient.name, "Amina Benali");
    assert_eq!(record.patient.gender, "female");
    assert_eq!(record.electrolytes.get(Analyte::Chloride), Some("120"));
    assert_eq!(record.electrolytes.get(Analyte::Magnesium), None);
    assert_eq!(record.electrolytes.iter().count(), 6);
    assert_eq!(
        record.exported_at,
        Some(timestamp("2026-02-11T07:45:00Z"))
    );
}

#[test]
fn export_then_import_reproduces_panel() {
    let original = import_record_str(&read_fixture("critical_sodium_record.json"))
        .expect("Could not import record");

    let exported_at = timestamp("2026-02-12T09:00:00Z");
    let document = export_record_at(&original, exported_at).expect("Could not export record");
    let reimported = import_record_str(&document).expect("Could not re-import record");

    assert_eq!(reimported.electrolytes, original.electrolytes);
    assert_eq!(reimported.patient, original.patient);
    assert_eq!(reimported.exported_at, Some(exported_at));

    let value: Value = serde_json::from_str(&document).expect("Export is not JSON");
    assert_eq!(value["type"], RECORD_TYPE);
    assert_eq!(value["exportedAt"], "2026-02-12T09:00:00Z");
    assert_eq!(value["electrolytes"]["magnesium"], "");
    assert_eq!(value["electrolytes"].as_object().map(|o| o.len()), Some(7));
}

#[test]
fn foreign_document_is_rejected_without_overwrite() {
    let mut current = import_record_str(&read_fixture("critical_sodium_record.json"))
        .expect("Could not import record");
    let before = current.clone();

    let err = import_into(&mut current, &read_fixture("foreign_document.json")).unwrap_err();

    assert!(matches!(
        &err,
        RecordError::UnrecognizedFormat { found: Some(tag) } if tag == "collection"
    ));
    assert!(err.user_message().contains("not recognized"));
    assert_eq!(current, before);
}

#[test]
fn invalid_json_is_rejected_without_overwrite() {
    let mut current = CaseRecord::default();
    current.electrolytes.set(Analyte::Potassium, "2.1");
    let before = current.clone();

    let err = import_into(&mut current, "{ not json").unwrap_err();

    assert!(matches!(err, RecordError::Parse(_)));
    assert_eq!(current, before);
}

#[test]
fn accepted_import_replaces_current_case() {
    let mut current = CaseRecord::default();
    current.electrolytes.set(Analyte::Bicarbonate, "18");

    import_into(&mut current, &read_fixture("critical_sodium_record.json"))
        .expect("Could not import record");

    assert_eq!(current.electrolytes.get(Analyte::Bicarbonate), Some("25"));
    let result = current.evaluate();
    assert_eq!(
        result.interpretation(Analyte::Sodium).map(|i| i.status),
        Some(Status::Low)
    );
}

fn timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("Invalid timestamp")
        .with_timezone(&Utc)
}

fn normalize_dynamic_fields(value: &mut Value) {
    if let Some(obj) = value.as_object_mut() {
        if obj.contains_key("evaluated_at") {
            obj.insert(
                "evaluated_at".to_string(),
                Value::String("__DYNAMIC_TIMESTAMP__".to_string()),
            );
        }
    }
}
