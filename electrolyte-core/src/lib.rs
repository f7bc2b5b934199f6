//! Core rules for interpreting a blood electrolyte panel.
//!
//! The crate is pure: every operation is a function over immutable tables,
//! so results can be computed from any thread without coordination.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

mod alert;
mod catalog;
mod engine;
mod knowledge;

pub use alert::{alert_level, alert_signal, AlertConfig, AlertLevel, AlertSignal, AlertTone};
pub use catalog::{lookup, CriticalBound, ReferenceRange};
pub use engine::{evaluate_panel, evaluate_panel_at, interpret, interpret_value};
pub use knowledge::{condition_name, recommendations_for, Gate, RecommendationRule, RULES};

/// One of the seven analytes of the panel, in display order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Analyte {
    Sodium,
    Potassium,
    Calcium,
    Magnesium,
    Chloride,
    Phosphate,
    Bicarbonate,
}

impl Analyte {
    pub const ALL: [Analyte; 7] = [
        Analyte::Sodium,
        Analyte::Potassium,
        Analyte::Calcium,
        Analyte::Magnesium,
        Analyte::Chloride,
        Analyte::Phosphate,
        Analyte::Bicarbonate,
    ];

    /// Key used in exchanged documents.
    pub fn key(self) -> &'static str {
        match self {
            Analyte::Sodium => "sodium",
            Analyte::Potassium => "potassium",
            Analyte::Calcium => "calcium",
            Analyte::Magnesium => "magnesium",
            Analyte::Chloride => "chloride",
            Analyte::Phosphate => "phosphate",
            Analyte::Bicarbonate => "bicarbonate",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Analyte::Sodium => "Sodium",
            Analyte::Potassium => "Potassium",
            Analyte::Calcium => "Calcium",
            Analyte::Magnesium => "Magnesium",
            Analyte::Chloride => "Chloride",
            Analyte::Phosphate => "Phosphate",
            Analyte::Bicarbonate => "Bicarbonate",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Analyte::Sodium => "Na⁺",
            Analyte::Potassium => "K⁺",
            Analyte::Calcium => "Ca²⁺",
            Analyte::Magnesium => "Mg²⁺",
            Analyte::Chloride => "Cl⁻",
            Analyte::Phosphate => "PO₄³⁻",
            Analyte::Bicarbonate => "HCO₃⁻",
        }
    }
}

impl fmt::Display for Analyte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Analyte {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Analyte::ALL
            .into_iter()
            .find(|analyte| analyte.key() == s)
            .ok_or_else(|| CoreError::UnknownAnalyte(s.to_string()))
    }
}

/// Side of the reference range an abnormal value falls on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Unknown,
    Low,
    Normal,
    High,
}

impl From<Direction> for Status {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Low => Status::Low,
            Direction::High => Status::High,
        }
    }
}

/// Severity of a single analyte result, most urgent first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Moderate,
    None,
}

/// Recommendation category. The declaration order is the clinical action
/// priority and the order in which entries are listed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Emergency,
    Monitoring,
    Alert,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    /// One instruction per line.
    pub body: String,
}

/// Result of evaluating one analyte.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interpretation {
    pub status: Status,
    pub severity: Severity,
    pub is_critical: bool,
    pub message: String,
    pub recommendations: Vec<Recommendation>,
}

impl Interpretation {
    pub(crate) fn unknown() -> Self {
        Self {
            status: Status::Unknown,
            severity: Severity::None,
            is_critical: false,
            message: "value not provided".to_string(),
            recommendations: Vec::new(),
        }
    }

    pub(crate) fn normal() -> Self {
        Self {
            status: Status::Normal,
            severity: Severity::None,
            is_critical: false,
            message: "normal levels".to_string(),
            recommendations: Vec::new(),
        }
    }

    pub fn is_abnormal(&self) -> bool {
        matches!(self.status, Status::Low | Status::High)
    }
}

/// Raw measurements keyed by analyte.
///
/// Values are kept as the text that was entered or imported; parsing happens
/// at interpretation time so a malformed entry only affects its own analyte.
/// Empty entries are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, RawMeasurement>")]
pub struct ElectrolytePanel {
    values: BTreeMap<Analyte, String>,
}

impl ElectrolytePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, analyte: Analyte) -> Option<&str> {
        self.values.get(&analyte).map(String::as_str)
    }

    /// Store a measurement; blank text clears the entry.
    pub fn set(&mut self, analyte: Analyte, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.values.remove(&analyte);
        } else {
            self.values.insert(analyte, value);
        }
    }

    pub fn clear(&mut self, analyte: Analyte) {
        self.values.remove(&analyte);
    }

    /// True when no analyte has a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Analyte, &str)> {
        self.values
            .iter()
            .map(|(analyte, value)| (*analyte, value.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(Analyte, S)> for ElectrolytePanel {
    fn from_iter<I: IntoIterator<Item = (Analyte, S)>>(iter: I) -> Self {
        let mut panel = ElectrolytePanel::new();
        for (analyte, value) in iter {
            panel.set(analyte, value);
        }
        panel
    }
}

impl Serialize for ElectrolytePanel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Analyte::ALL.len()))?;
        for analyte in Analyte::ALL {
            map.serialize_entry(analyte.key(), self.get(analyte).unwrap_or(""))?;
        }
        map.end()
    }
}

/// Wire shape of one panel entry: form text, a JSON number, or anything else.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMeasurement {
    Text(String),
    Number(f64),
    Other(serde::de::IgnoredAny),
}

impl From<BTreeMap<String, RawMeasurement>> for ElectrolytePanel {
    fn from(raw: BTreeMap<String, RawMeasurement>) -> Self {
        let mut panel = ElectrolytePanel::new();
        for (key, measurement) in raw {
            let Ok(analyte) = key.parse::<Analyte>() else {
                tracing::trace!(key = %key, "ignoring unrecognized analyte key");
                continue;
            };
            match measurement {
                RawMeasurement::Text(text) => panel.set(analyte, text),
                RawMeasurement::Number(number) if number.is_finite() => {
                    panel.set(analyte, number.to_string())
                }
                RawMeasurement::Number(_) | RawMeasurement::Other(_) => {}
            }
        }
        panel
    }
}

/// Aggregated outcome for a whole panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PanelResult {
    pub per_analyte: BTreeMap<Analyte, Interpretation>,
    pub has_abnormalities: bool,
    pub has_critical: bool,
    pub evaluated_at: DateTime<Utc>,
}

impl PanelResult {
    pub fn interpretation(&self, analyte: Analyte) -> Option<&Interpretation> {
        self.per_analyte.get(&analyte)
    }

    /// Analytes outside their reference range, in panel order.
    pub fn abnormal_analytes(&self) -> Vec<Analyte> {
        self.per_analyte
            .iter()
            .filter(|(_, interpretation)| interpretation.is_abnormal())
            .map(|(analyte, _)| *analyte)
            .collect()
    }

    pub fn critical_analytes(&self) -> Vec<Analyte> {
        self.per_analyte
            .iter()
            .filter(|(_, interpretation)| interpretation.is_critical)
            .map(|(analyte, _)| *analyte)
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown analyte: {0}")]
    UnknownAnalyte(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyte_keys_parse_back() {
        for analyte in Analyte::ALL {
            assert_eq!(analyte.key().parse::<Analyte>().unwrap(), analyte);
        }
        assert!(matches!(
            "iron".parse::<Analyte>(),
            Err(CoreError::UnknownAnalyte(key)) if key == "iron"
        ));
    }

    #[test]
    fn blank_values_are_not_stored() {
        let mut panel = ElectrolytePanel::new();
        panel.set(Analyte::Sodium, "140");
        panel.set(Analyte::Potassium, "   ");
        assert_eq!(panel.get(Analyte::Sodium), Some("140"));
        assert_eq!(panel.get(Analyte::Potassium), None);

        panel.set(Analyte::Sodium, "");
        assert!(panel.is_empty());
    }

    #[test]
    fn panel_serializes_every_key() {
        let panel: ElectrolytePanel = [(Analyte::Calcium, "9.1")].into_iter().collect();
        let value = serde_json::to_value(&panel).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 7);
        assert_eq!(object["calcium"], "9.1");
        assert_eq!(object["sodium"], "");
    }

    #[test]
    fn panel_accepts_numbers_and_ignores_foreign_keys() {
        let panel: ElectrolytePanel = serde_json::from_str(
            r#"{"sodium": 110, "potassium": "4.2", "calcium": null,
                "magnesium": true, "iron": "12", "chloride": ""}"#,
        )
        .unwrap();

        assert_eq!(panel.get(Analyte::Sodium), Some("110"));
        assert_eq!(panel.get(Analyte::Potassium), Some("4.2"));
        assert_eq!(panel.get(Analyte::Calcium), None);
        assert_eq!(panel.get(Analyte::Magnesium), None);
        assert_eq!(panel.get(Analyte::Chloride), None);
        assert_eq!(panel.iter().count(), 2);
    }

    #[test]
    fn zero_is_a_measurement_not_a_missing_value() {
        let panel: ElectrolytePanel =
            serde_json::from_str(r#"{"sodium": 0, "potassium": "0"}"#).unwrap();
        assert_eq!(panel.get(Analyte::Sodium), Some("0"));
        assert_eq!(panel.get(Analyte::Potassium), Some("0"));

        let result = evaluate_panel(&panel);
        for analyte in [Analyte::Sodium, Analyte::Potassium] {
            let interpretation = result.interpretation(analyte).unwrap();
            assert_eq!(interpretation.status, Status::Low, "{analyte}");
            assert!(interpretation.is_critical, "{analyte}");
        }
    }

    #[test]
    fn severity_orders_most_urgent_first() {
        let mut severities = vec![Severity::None, Severity::Critical, Severity::Moderate];
        severities.sort();
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::Moderate, Severity::None]
        );
    }
}
