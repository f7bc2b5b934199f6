//! Panel-level alerting signal handed to whatever notifies the clinician.

use serde::{Deserialize, Serialize};

use crate::PanelResult;

/// Panel alert level, most urgent first like [`crate::Severity`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Critical,
    Moderate,
    None,
}

pub fn alert_level(result: &PanelResult) -> AlertLevel {
    if result.has_critical {
        AlertLevel::Critical
    } else if result.has_abnormalities {
        AlertLevel::Moderate
    } else {
        AlertLevel::None
    }
}

/// Description of the tone a player should emit. The engine never plays it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertTone {
    pub frequency_hz: f64,
    /// Starting gain, ramped down over the duration.
    pub gain: f64,
    pub duration_ms: u32,
}

/// How each alert level should sound.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertConfig {
    pub critical: AlertTone,
    pub moderate: AlertTone,
    /// Delay between evaluation and playback.
    pub dispatch_delay_ms: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical: AlertTone {
                frequency_hz: 800.0,
                gain: 0.1,
                duration_ms: 500,
            },
            moderate: AlertTone {
                frequency_hz: 500.0,
                gain: 0.08,
                duration_ms: 300,
            },
            dispatch_delay_ms: 100,
        }
    }
}

impl AlertConfig {
    pub fn tone_for(&self, level: AlertLevel) -> Option<AlertTone> {
        match level {
            AlertLevel::Critical => Some(self.critical),
            AlertLevel::Moderate => Some(self.moderate),
            AlertLevel::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertSignal {
    pub level: AlertLevel,
    pub tone: Option<AlertTone>,
    pub dispatch_delay_ms: u32,
}

pub fn alert_signal(result: &PanelResult, config: &AlertConfig) -> AlertSignal {
    let level = alert_level(result);
    AlertSignal {
        level,
        tone: config.tone_for(level),
        dispatch_delay_ms: config.dispatch_delay_ms,
    }
}
