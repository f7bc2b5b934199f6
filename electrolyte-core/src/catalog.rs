//! Reference ranges and critical thresholds.

use serde::Serialize;

use crate::{Analyte, Direction};

/// Threshold past which an abnormal value is life-threatening.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CriticalBound {
    pub value: f64,
    /// Whether a value exactly at the threshold already counts as critical.
    pub inclusive: bool,
}

impl CriticalBound {
    pub const fn strict(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }

    pub const fn inclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    fn crossed_below(&self, value: f64) -> bool {
        if self.inclusive {
            value <= self.value
        } else {
            value < self.value
        }
    }

    fn crossed_above(&self, value: f64) -> bool {
        if self.inclusive {
            value >= self.value
        } else {
            value > self.value
        }
    }
}

/// Normal interval `[low, high]` (inclusive) with optional critical bounds.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
    pub unit: &'static str,
    pub critical_low: Option<CriticalBound>,
    pub critical_high: Option<CriticalBound>,
}

impl ReferenceRange {
    /// Side of the range the value falls on, `None` when within it.
    pub fn classify(&self, value: f64) -> Option<Direction> {
        if value < self.low {
            Some(Direction::Low)
        } else if value > self.high {
            Some(Direction::High)
        } else {
            None
        }
    }

    pub fn is_critical(&self, value: f64, direction: Direction) -> bool {
        match direction {
            Direction::Low => self
                .critical_low
                .is_some_and(|bound| bound.crossed_below(value)),
            Direction::High => self
                .critical_high
                .is_some_and(|bound| bound.crossed_above(value)),
        }
    }
}

const SODIUM: ReferenceRange = ReferenceRange {
    low: 135.0,
    high: 145.0,
    unit: "mmol/L",
    critical_low: Some(CriticalBound::strict(120.0)),
    critical_high: Some(CriticalBound::strict(160.0)),
};

// The only inclusive threshold in the catalog: K = 6.5 is critical.
const POTASSIUM: ReferenceRange = ReferenceRange {
    low: 3.5,
    high: 5.0,
    unit: "mmol/L",
    critical_low: Some(CriticalBound::strict(2.5)),
    critical_high: Some(CriticalBound::inclusive(6.5)),
};

const CALCIUM: ReferenceRange = ReferenceRange {
    low: 8.5,
    high: 10.5,
    unit: "mg/dL",
    critical_low: Some(CriticalBound::strict(7.0)),
    critical_high: Some(CriticalBound::strict(13.0)),
};

const MAGNESIUM: ReferenceRange = ReferenceRange {
    low: 1.7,
    high: 2.2,
    unit: "mg/dL",
    critical_low: Some(CriticalBound::strict(1.2)),
    critical_high: Some(CriticalBound::strict(2.5)),
};

const CHLORIDE: ReferenceRange = ReferenceRange {
    low: 98.0,
    high: 106.0,
    unit: "mmol/L",
    critical_low: None,
    critical_high: None,
};

const PHOSPHATE: ReferenceRange = ReferenceRange {
    low: 2.5,
    high: 4.5,
    unit: "mg/dL",
    critical_low: None,
    critical_high: None,
};

const BICARBONATE: ReferenceRange = ReferenceRange {
    low: 22.0,
    high: 29.0,
    unit: "mmol/L",
    critical_low: None,
    critical_high: None,
};

/// Reference range for an analyte.
pub fn lookup(analyte: Analyte) -> &'static ReferenceRange {
    match analyte {
        Analyte::Sodium => &SODIUM,
        Analyte::Potassium => &POTASSIUM,
        Analyte::Calcium => &CALCIUM,
        Analyte::Magnesium => &MAGNESIUM,
        Analyte::Chloride => &CHLORIDE,
        Analyte::Phosphate => &PHOSPHATE,
        Analyte::Bicarbonate => &BICARBONATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_bounds_lie_outside_normal_range() {
        for analyte in Analyte::ALL {
            let range = lookup(analyte);
            assert!(range.low < range.high, "{analyte}");
            if let Some(bound) = range.critical_low {
                assert!(bound.value < range.low, "{analyte}");
            }
            if let Some(bound) = range.critical_high {
                assert!(bound.value > range.high, "{analyte}");
            }
        }
    }

    #[test]
    fn only_four_analytes_define_critical_thresholds() {
        let with_thresholds: Vec<Analyte> = Analyte::ALL
            .into_iter()
            .filter(|analyte| {
                let range = lookup(*analyte);
                range.critical_low.is_some() || range.critical_high.is_some()
            })
            .collect();

        assert_eq!(
            with_thresholds,
            vec![
                Analyte::Sodium,
                Analyte::Potassium,
                Analyte::Calcium,
                Analyte::Magnesium
            ]
        );
    }

    #[test]
    fn classify_is_inclusive_at_both_ends() {
        let range = lookup(Analyte::Sodium);
        assert_eq!(range.classify(135.0), None);
        assert_eq!(range.classify(145.0), None);
        assert_eq!(range.classify(134.9), Some(Direction::Low));
        assert_eq!(range.classify(145.1), Some(Direction::High));
    }

    #[test]
    fn potassium_high_threshold_is_inclusive() {
        let potassium = lookup(Analyte::Potassium);
        assert!(potassium.is_critical(6.5, Direction::High));
        assert!(!potassium.is_critical(6.4, Direction::High));

        let sodium = lookup(Analyte::Sodium);
        assert!(!sodium.is_critical(160.0, Direction::High));
        assert!(sodium.is_critical(160.5, Direction::High));
    }
}
