//! Per-analyte interpretation and panel aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::catalog::lookup;
use crate::knowledge::{condition_name, recommendations_for};
use crate::{Analyte, ElectrolytePanel, Interpretation, PanelResult, Severity};

/// Interpret raw measurement text. Absent or non-numeric input yields an
/// `unknown` result rather than an error.
pub fn interpret(analyte: Analyte, raw: Option<&str>) -> Interpretation {
    match raw.and_then(parse_measurement) {
        Some(value) => interpret_value(analyte, value),
        None => Interpretation::unknown(),
    }
}

pub fn interpret_value(analyte: Analyte, value: f64) -> Interpretation {
    if !value.is_finite() {
        return Interpretation::unknown();
    }

    let range = lookup(analyte);
    let Some(direction) = range.classify(value) else {
        return Interpretation::normal();
    };

    let is_critical = range.is_critical(value, direction);
    Interpretation {
        status: direction.into(),
        severity: if is_critical {
            Severity::Critical
        } else {
            Severity::Moderate
        },
        is_critical,
        message: condition_name(analyte, direction).to_string(),
        recommendations: recommendations_for(analyte, value, direction),
    }
}

fn parse_measurement(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Evaluate every analyte of the panel, stamped with the current time.
pub fn evaluate_panel(panel: &ElectrolytePanel) -> PanelResult {
    evaluate_panel_at(panel, Utc::now())
}

pub fn evaluate_panel_at(panel: &ElectrolytePanel, evaluated_at: DateTime<Utc>) -> PanelResult {
    let per_analyte: BTreeMap<Analyte, Interpretation> = Analyte::ALL
        .into_iter()
        .map(|analyte| (analyte, interpret(analyte, panel.get(analyte))))
        .collect();

    let abnormal = per_analyte.values().filter(|i| i.is_abnormal()).count();
    let critical = per_analyte.values().filter(|i| i.is_critical).count();

    tracing::debug!(abnormal, critical, "evaluated electrolyte panel");

    PanelResult {
        per_analyte,
        has_abnormalities: abnormal > 0,
        has_critical: critical > 0,
        evaluated_at,
    }
}
