use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute forward-return threshold separating Bear/Neutral/Bull.
pub const REGIME_THRESHOLD: f64 = 0.02;

/// The four supervised targets, one model each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Return,
    Risk,
    Direction,
    Regime,
}

/// How a target is learned and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelTask {
    /// Continuous value, scored by RMSE.
    Regression,
    /// {0,1} label learned as a probability, scored by accuracy.
    BinaryProbability,
    /// Small set of integer labels, scored by accuracy.
    MultiClass,
}

impl TargetKind {
    /// Training order, matching the order artifacts are reported in.
    pub const ALL: [TargetKind; 4] = [
        TargetKind::Return,
        TargetKind::Risk,
        TargetKind::Direction,
        TargetKind::Regime,
    ];

    /// Artifact name prefix.
    pub fn name(self) -> &'static str {
        match self {
            TargetKind::Return => "return",
            TargetKind::Risk => "risk",
            TargetKind::Direction => "direction",
            TargetKind::Regime => "regime",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            TargetKind::Return => "target_return",
            TargetKind::Risk => "target_risk",
            TargetKind::Direction => "target_direction",
            TargetKind::Regime => "target_regime",
        }
    }

    pub fn task(self) -> ModelTask {
        match self {
            TargetKind::Return | TargetKind::Risk => ModelTask::Regression,
            TargetKind::Direction => ModelTask::BinaryProbability,
            TargetKind::Regime => ModelTask::MultiClass,
        }
    }

    pub fn is_classification(self) -> bool {
        self.task() != ModelTask::Regression
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Forward targets for one (symbol, date) of the backbone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetRow {
    pub target_return: Option<f64>,
    pub target_risk: Option<f64>,
    pub target_direction: Option<u8>,
    pub target_regime: Option<u8>,
}

impl TargetRow {
    /// Numeric label for a target, as fed to the model.
    pub fn get(&self, kind: TargetKind) -> Option<f64> {
        match kind {
            TargetKind::Return => self.target_return,
            TargetKind::Risk => self.target_risk,
            TargetKind::Direction => self.target_direction.map(f64::from),
            TargetKind::Regime => self.target_regime.map(f64::from),
        }
    }
}

/// 1 when the forward return is strictly positive.
pub fn direction_label(target_return: f64) -> u8 {
    u8::from(target_return > 0.0)
}

/// 0 = Bear, 1 = Neutral, 2 = Bull. The thresholds themselves are Neutral.
pub fn regime_label(target_return: f64) -> u8 {
    if target_return < -REGIME_THRESHOLD {
        0
    } else if target_return > REGIME_THRESHOLD {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_thresholds() {
        assert_eq!(regime_label(-0.025), 0);
        assert_eq!(regime_label(0.0), 1);
        assert_eq!(regime_label(0.025), 2);
        assert_eq!(regime_label(-0.02), 1);
        assert_eq!(regime_label(0.02), 1);
    }

    #[test]
    fn test_direction_label() {
        assert_eq!(direction_label(0.0), 0);
        assert_eq!(direction_label(1e-12), 1);
        assert_eq!(direction_label(-0.3), 0);
    }

    #[test]
    fn test_target_tasks() {
        assert!(!TargetKind::Return.is_classification());
        assert!(!TargetKind::Risk.is_classification());
        assert_eq!(TargetKind::Direction.task(), ModelTask::BinaryProbability);
        assert_eq!(TargetKind::Regime.task(), ModelTask::MultiClass);
        assert_eq!(TargetKind::Regime.to_string(), "regime");
    }
}
