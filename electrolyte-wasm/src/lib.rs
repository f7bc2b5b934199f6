//! Framework-neutral WASM <-> JavaScript bridge.

use electrolyte_core::{
    alert_signal, evaluate_panel, AlertConfig, AlertSignal, AlertTone, ElectrolytePanel,
    PanelResult,
};
use electrolyte_record::{CaseRecord, PatientInfo, RecordError};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsAlertConfig {
    #[serde(default)]
    critical: Option<AlertTone>,
    #[serde(default)]
    moderate: Option<AlertTone>,
    #[serde(default)]
    dispatch_delay_ms: Option<u32>,
}

impl From<JsAlertConfig> for AlertConfig {
    fn from(cfg: JsAlertConfig) -> Self {
        let mut base = AlertConfig::default();
        if let Some(tone) = cfg.critical {
            base.critical = tone;
        }
        if let Some(tone) = cfg.moderate {
            base.moderate = tone;
        }
        if let Some(delay) = cfg.dispatch_delay_ms {
            base.dispatch_delay_ms = delay;
        }
        base
    }
}

#[derive(Serialize)]
struct Evaluation {
    result: PanelResult,
    alert: AlertSignal,
}

#[derive(Serialize, Deserialize)]
struct JsCaseRecord {
    #[serde(default)]
    patient: PatientInfo,
    #[serde(default)]
    electrolytes: ElectrolytePanel,
}

/// Evaluate a panel object (`{sodium: "140", ...}`) and derive its alert signal.
#[wasm_bindgen]
pub fn evaluate(panel: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let panel = from_value::<ElectrolytePanel>(panel)
        .map_err(|err| JsValue::from_str(&format!("Could not read panel: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsAlertConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Could not read config: {err}")))?;
            AlertConfig::from(cfg)
        }
        None => AlertConfig::default(),
    };

    let result = evaluate_panel(&panel);
    let alert = alert_signal(&result, &cfg);

    to_js(&Evaluation { result, alert })
        .map_err(|err| JsValue::from_str(&format!("Could not serialize evaluation: {err}")))
}

/// Parse an exported case document. Errors carry a message meant for the user.
#[wasm_bindgen]
pub fn import_record(document_json: &str) -> Result<JsValue, JsValue> {
    let record = electrolyte_record::import_record_str(document_json)
        .map_err(|err| JsValue::from_str(&format_record_error(&err)))?;

    to_js(&JsCaseRecord {
        patient: record.patient,
        electrolytes: record.electrolytes,
    })
    .map_err(|err| JsValue::from_str(&format!("Could not serialize record: {err}")))
}

/// Serialize a case (`{patient, electrolytes}`) into the exchanged document.
#[wasm_bindgen]
pub fn export_record(record: JsValue) -> Result<String, JsValue> {
    let js_record: JsCaseRecord = from_value(record)
        .map_err(|err| JsValue::from_str(&format!("Could not read record: {err}")))?;

    electrolyte_record::export_record(&CaseRecord::from(js_record))
        .map_err(|err| JsValue::from_str(&format_record_error(&err)))
}

/// Suggested download name for a case (`bilan-ionique-<name>.json`).
#[wasm_bindgen]
pub fn record_file_name(record: JsValue) -> Result<String, JsValue> {
    let js_record: JsCaseRecord = from_value(record)
        .map_err(|err| JsValue::from_str(&format!("Could not read record: {err}")))?;
    Ok(CaseRecord::from(js_record).file_name())
}

impl From<JsCaseRecord> for CaseRecord {
    fn from(record: JsCaseRecord) -> Self {
        CaseRecord {
            patient: record.patient,
            electrolytes: record.electrolytes,
            exported_at: None,
        }
    }
}

/// Maps (the per-analyte results, the panel) become plain JS objects so
/// callers can read `result.per_analyte.sodium.status`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::json_compatible())
}

fn format_record_error(err: &RecordError) -> String {
    err.user_message().to_string()
}
