use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Up only when the probability of an up move is strictly above one half.
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.5 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Bear,
    Neutral,
    Bull,
}

impl Regime {
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(Regime::Bear),
            1 => Some(Regime::Neutral),
            2 => Some(Regime::Bull),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Hold => write!(f, "HOLD"),
            Recommendation::Sell => write!(f, "SELL"),
        }
    }
}

/// Inference output for one (symbol, date). Not persisted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    pub symbol: String,
    pub date: NaiveDate,
    pub predicted_return_21d: f64,
    pub predicted_volatility_21d: Option<f64>,
    /// Surfaced for callers; not part of the recommendation score.
    pub regime: Option<Regime>,
    pub direction: Direction,
    pub direction_probability: f64,
    pub recommendation: Recommendation,
    pub confidence: f64,
}
