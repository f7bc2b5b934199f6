//! Condition names and the recommendation rule table.

use crate::{Analyte, Direction, Recommendation, RecommendationKind};

/// Value condition under which a rule applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    Always,
    Below(f64),
    AtOrAbove(f64),
    Above(f64),
}

impl Gate {
    pub fn admits(self, value: f64) -> bool {
        match self {
            Gate::Always => true,
            Gate::Below(threshold) => value < threshold,
            Gate::AtOrAbove(threshold) => value >= threshold,
            Gate::Above(threshold) => value > threshold,
        }
    }
}

/// One entry of the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationRule {
    pub analyte: Analyte,
    pub direction: Direction,
    pub kind: RecommendationKind,
    pub gate: Gate,
    pub title: &'static str,
    pub lines: &'static [&'static str],
}

impl RecommendationRule {
    fn applies(&self, analyte: Analyte, value: f64, direction: Direction) -> bool {
        self.analyte == analyte && self.direction == direction && self.gate.admits(value)
    }

    fn to_recommendation(self) -> Recommendation {
        Recommendation {
            kind: self.kind,
            title: self.title.to_string(),
            body: self.lines.join("\n"),
        }
    }
}

const MONITORING: &str = "Monitoring";
const ALERT: &str = "Alert";

/// Every recommendation the engine can emit. Chloride, phosphate and
/// bicarbonate have no entries.
pub static RULES: &[RecommendationRule] = &[
    // Sodium
    RecommendationRule {
        analyte: Analyte::Sodium,
        direction: Direction::Low,
        kind: RecommendationKind::Emergency,
        gate: Gate::Below(120.0),
        title: "Emergency (Na < 120)",
        lines: &[
            "3% saline bolus: 100 mL over 10 min (max 3 times)",
            "Correct by no more than 8 mmol/L per 24 h",
        ],
    },
    RecommendationRule {
        analyte: Analyte::Sodium,
        direction: Direction::Low,
        kind: RecommendationKind::Monitoring,
        gate: Gate::Always,
        title: MONITORING,
        lines: &["Na every 2-4 h", "Fluid balance and level of consciousness"],
    },
    RecommendationRule {
        analyte: Analyte::Sodium,
        direction: Direction::Low,
        kind: RecommendationKind::Alert,
        gate: Gate::Always,
        title: ALERT,
        lines: &["New confusion or seizure: repeat the 3% saline bolus"],
    },
    RecommendationRule {
        analyte: Analyte::Sodium,
        direction: Direction::High,
        kind: RecommendationKind::Emergency,
        gate: Gate::Above(160.0),
        title: "Emergency (Na > 160)",
        lines: &[
            "Slow correction: -10 mmol/L per 24 h",
            "Give free water (D5W)",
        ],
    },
    RecommendationRule {
        analyte: Analyte::Sodium,
        direction: Direction::High,
        kind: RecommendationKind::Monitoring,
        gate: Gate::Always,
        title: MONITORING,
        lines: &["Na every 4 h", "Urine output"],
    },
    RecommendationRule {
        analyte: Analyte::Sodium,
        direction: Direction::High,
        kind: RecommendationKind::Alert,
        gate: Gate::Always,
        title: ALERT,
        lines: &["Na falling too fast: risk of cerebral edema"],
    },
    // Potassium
    RecommendationRule {
        analyte: Analyte::Potassium,
        direction: Direction::Low,
        kind: RecommendationKind::Emergency,
        gate: Gate::Below(2.5),
        title: "Emergency (K < 2.5)",
        lines: &[
            "IV KCl: 20-40 mmol in 0.9% saline",
            "Max rate 10 mmol/h (20 mmol/h in ICU under cardiac monitoring)",
        ],
    },
    RecommendationRule {
        analyte: Analyte::Potassium,
        direction: Direction::Low,
        kind: RecommendationKind::Monitoring,
        gate: Gate::Always,
        title: MONITORING,
        lines: &["Continuous ECG", "K every 4 h"],
    },
    RecommendationRule {
        analyte: Analyte::Potassium,
        direction: Direction::Low,
        kind: RecommendationKind::Alert,
        gate: Gate::Always,
        title: ALERT,
        lines: &["U waves, tachycardia, ectopic beats"],
    },
    RecommendationRule {
        analyte: Analyte::Potassium,
        direction: Direction::High,
        kind: RecommendationKind::Emergency,
        gate: Gate::AtOrAbove(6.5),
        title: "Emergency (K >= 6.5)",
        lines: &[
            "Calcium gluconate 10% 10 mL IV (cardiac protection)",
            "Insulin + glucose (10 U + 25 g of 30% dextrose)",
            "Nebulized salbutamol",
            "If persistent: dialysis",
        ],
    },
    RecommendationRule {
        analyte: Analyte::Potassium,
        direction: Direction::High,
        kind: RecommendationKind::Monitoring,
        gate: Gate::Always,
        title: MONITORING,
        lines: &["Continuous ECG", "K 1-2 h after treatment"],
    },
    RecommendationRule {
        analyte: Analyte::Potassium,
        direction: Direction::High,
        kind: RecommendationKind::Alert,
        gate: Gate::Always,
        title: ALERT,
        lines: &["Peaked T waves, wide QRS, bradycardia"],
    },
    // Calcium
    RecommendationRule {
        analyte: Analyte::Calcium,
        direction: Direction::Low,
        kind: RecommendationKind::Emergency,
        gate: Gate::Always,
        title: "Emergency (if symptomatic)",
        lines: &["Calcium gluconate 10%: 10-20 mL slow IV"],
    },
    RecommendationRule {
        analyte: Analyte::Calcium,
        direction: Direction::Low,
        kind: RecommendationKind::Monitoring,
        gate: Gate::Always,
        title: MONITORING,
        lines: &["ECG", "Ionized calcium every 4-6 h"],
    },
    RecommendationRule {
        analyte: Analyte::Calcium,
        direction: Direction::Low,
        kind: RecommendationKind::Alert,
        gate: Gate::Always,
        title: ALERT,
        lines: &["Spasms, tingling, prolonged QT"],
    },
    RecommendationRule {
        analyte: Analyte::Calcium,
        direction: Direction::High,
        kind: RecommendationKind::Emergency,
        gate: Gate::Above(13.0),
        title: "Emergency (Ca > 13.0)",
        lines: &[
            "Hydration with 0.9% saline (200-300 mL/h)",
            "Furosemide after rehydration",
            "Calcitonin if needed",
        ],
    },
    RecommendationRule {
        analyte: Analyte::Calcium,
        direction: Direction::High,
        kind: RecommendationKind::Monitoring,
        gate: Gate::Always,
        title: MONITORING,
        lines: &["Urine output", "Calcium twice daily"],
    },
    // Magnesium
    RecommendationRule {
        analyte: Analyte::Magnesium,
        direction: Direction::Low,
        kind: RecommendationKind::Emergency,
        gate: Gate::Below(1.2),
        title: "Emergency (Mg < 1.2)",
        lines: &["MgSO4 2 g IV over 10-20 min, then infusion"],
    },
    RecommendationRule {
        analyte: Analyte::Magnesium,
        direction: Direction::Low,
        kind: RecommendationKind::Monitoring,
        gate: Gate::Always,
        title: MONITORING,
        lines: &["ECG", "Mg every 6-8 h"],
    },
    RecommendationRule {
        analyte: Analyte::Magnesium,
        direction: Direction::High,
        kind: RecommendationKind::Emergency,
        gate: Gate::Above(2.5),
        title: "Emergency (Mg > 2.5)",
        lines: &[
            "Stop magnesium",
            "Calcium gluconate 10% 10 mL IV",
            "Hydration +/- dialysis",
        ],
    },
    RecommendationRule {
        analyte: Analyte::Magnesium,
        direction: Direction::High,
        kind: RecommendationKind::Monitoring,
        gate: Gate::Always,
        title: MONITORING,
        lines: &["Blood pressure, heart rate, ECG", "Mg every 4 h"],
    },
];

/// Ordered recommendations for an abnormal value.
pub fn recommendations_for(
    analyte: Analyte,
    value: f64,
    direction: Direction,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = RULES
        .iter()
        .filter(|rule| rule.applies(analyte, value, direction))
        .map(|rule| rule.to_recommendation())
        .collect();
    recommendations.sort_by_key(|recommendation| recommendation.kind);
    recommendations
}

/// Diagnostic label for a value on the given side of the range.
pub fn condition_name(analyte: Analyte, direction: Direction) -> &'static str {
    let (low, high) = match analyte {
        Analyte::Sodium => ("hyponatremia", "hypernatremia"),
        Analyte::Potassium => ("hypokalemia", "hyperkalemia"),
        Analyte::Calcium => ("hypocalcemia", "hypercalcemia"),
        Analyte::Magnesium => ("hypomagnesemia", "hypermagnesemia"),
        Analyte::Chloride => ("hypochloremia", "hyperchloremia"),
        Analyte::Phosphate => ("hypophosphatemia", "hyperphosphatemia"),
        Analyte::Bicarbonate => ("hypobicarbonatemia", "hyperbicarbonatemia"),
    };
    match direction {
        Direction::Low => low,
        Direction::High => high,
    }
}
