//! Case document (patient + electrolyte panel) import and export.
//!
//! The document is a JSON object tagged with `"type": "bilan-ionique-pfe"`.
//! Import never partially applies a document: either the whole record is
//! accepted or an error describes why it was not.

use chrono::{DateTime, Utc};
use electrolyte_core::{evaluate_panel, ElectrolytePanel, PanelResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Type tag identifying documents produced by this application.
pub const RECORD_TYPE: &str = "bilan-ionique-pfe";

/// Patient metadata carried alongside the panel. Not used by evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PatientInfo {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub age: String,
    /// Kilograms.
    #[serde(deserialize_with = "lenient_text")]
    pub weight: String,
    /// Centimetres.
    #[serde(deserialize_with = "lenient_text")]
    pub height: String,
    /// Blank or null falls back to `"male"`.
    #[serde(deserialize_with = "lenient_gender")]
    pub gender: String,
}

impl Default for PatientInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: String::new(),
            weight: String::new(),
            height: String::new(),
            gender: "male".to_string(),
        }
    }
}

/// A case as held by an editing surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseRecord {
    pub patient: PatientInfo,
    pub electrolytes: ElectrolytePanel,
    /// Export time of the document this record was imported from.
    pub exported_at: Option<DateTime<Utc>>,
}

impl CaseRecord {
    /// Suggested file name for an exported document.
    pub fn file_name(&self) -> String {
        let name = self.patient.name.trim();
        let stem = if name.is_empty() {
            "patient".to_string()
        } else {
            name.replace(['/', '\\'], "-")
        };
        format!("bilan-ionique-{stem}.json")
    }

    /// Whether there is anything worth exporting.
    pub fn can_export(&self) -> bool {
        !self.patient.name.trim().is_empty() || !self.electrolytes.is_empty()
    }

    pub fn evaluate(&self) -> PanelResult {
        evaluate_panel(&self.electrolytes)
    }
}

#[derive(Serialize)]
struct RecordDocument<'a> {
    patient: &'a PatientInfo,
    electrolytes: &'a ElectrolytePanel,
    #[serde(rename = "exportedAt")]
    exported_at: DateTime<Utc>,
    #[serde(rename = "type")]
    record_type: &'static str,
}

/// Import a case from a JSON string.
pub fn import_record_str(document_json: &str) -> Result<CaseRecord, RecordError> {
    let value: Value =
        serde_json::from_str(document_json).map_err(|err| RecordError::Parse(err.to_string()))?;
    import_record_value(&value)
}

/// Import a case from a `serde_json::Value`.
pub fn import_record_value(document: &Value) -> Result<CaseRecord, RecordError> {
    let record_type = document.get("type").and_then(Value::as_str);
    if record_type != Some(RECORD_TYPE) {
        tracing::warn!(found = ?record_type, "rejected case document with unexpected type tag");
        return Err(RecordError::UnrecognizedFormat {
            found: record_type.map(str::to_string),
        });
    }

    let patient = section(document, "patient")?;
    let electrolytes = section(document, "electrolytes")?;
    let exported_at = document
        .get("exportedAt")
        .and_then(Value::as_str)
        .and_then(parse_datetime);

    Ok(CaseRecord {
        patient,
        electrolytes,
        exported_at,
    })
}

/// Replace `target` with the imported case. On error `target` is untouched.
pub fn import_into(target: &mut CaseRecord, document_json: &str) -> Result<(), RecordError> {
    let record = import_record_str(document_json)?;
    *target = record;
    Ok(())
}

/// Serialize a case, stamped with the current time.
pub fn export_record(record: &CaseRecord) -> Result<String, RecordError> {
    export_record_at(record, Utc::now())
}

pub fn export_record_at(
    record: &CaseRecord,
    exported_at: DateTime<Utc>,
) -> Result<String, RecordError> {
    let document = RecordDocument {
        patient: &record.patient,
        electrolytes: &record.electrolytes,
        exported_at,
        record_type: RECORD_TYPE,
    };
    serde_json::to_string_pretty(&document).map_err(|err| RecordError::Serialize(err.to_string()))
}

/// Import a document and evaluate its panel.
pub fn evaluate_record_str(document_json: &str) -> Result<PanelResult, RecordError> {
    let record = import_record_str(document_json)?;
    Ok(record.evaluate())
}

fn section<T: DeserializeOwned + Default>(document: &Value, key: &str) -> Result<T, RecordError> {
    match document.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => {
            T::deserialize(value).map_err(|err| RecordError::Parse(format!("{key}: {err}")))
        }
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

fn lenient_gender<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let gender = lenient_text(deserializer)?;
    if gender.trim().is_empty() {
        Ok(PatientInfo::default().gender)
    } else {
        Ok(gender)
    }
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Could not read case document: {0}")]
    Parse(String),
    #[error("Unrecognized document type: {}", .found.as_deref().unwrap_or("<missing>"))]
    UnrecognizedFormat { found: Option<String> },
    #[error("Could not serialize case document: {0}")]
    Serialize(String),
}

impl RecordError {
    /// Message suitable for showing to the person who picked the file.
    pub fn user_message(&self) -> &'static str {
        match self {
            RecordError::Parse(_) => {
                "Could not read the file. Check that it is a valid JSON file."
            }
            RecordError::UnrecognizedFormat { .. } => {
                "File format not recognized. Please use a case file exported by this application."
            }
            RecordError::Serialize(_) => "Could not export the case file.",
        }
    }
}
