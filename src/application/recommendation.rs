//! Rule-based vote over the ensemble outputs for one (symbol, date).
//!
//! Return and direction each cast one vote; regime and risk are carried on
//! the bundle but do not vote.

use crate::domain::signal::{Direction, Recommendation, Regime, SignalBundle};
use chrono::NaiveDate;

/// Predicted returns beyond this magnitude cast a vote.
pub const RETURN_THRESHOLD: f64 = 0.02;

/// Probability assumed when the direction model gave none.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Raw model outputs for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutputs {
    pub predicted_return: f64,
    pub predicted_volatility: Option<f64>,
    pub regime: Option<Regime>,
    pub direction: Direction,
    pub direction_probability: Option<f64>,
}

/// Sum of the return and direction votes, in `-2..=2`.
pub fn score(predicted_return: f64, direction: Direction) -> i32 {
    let return_vote = if predicted_return > RETURN_THRESHOLD {
        1
    } else if predicted_return < -RETURN_THRESHOLD {
        -1
    } else {
        0
    };
    let direction_vote = match direction {
        Direction::Up => 1,
        Direction::Down => -1,
    };
    return_vote + direction_vote
}

pub fn recommendation(score: i32) -> Recommendation {
    if score >= 1 {
        Recommendation::Buy
    } else if score <= -1 {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

/// Probability assigned to the predicted direction, in `[0, 1]`.
pub fn confidence(direction: Direction, probability: Option<f64>) -> f64 {
    let p = probability
        .filter(|p| !p.is_nan())
        .unwrap_or(NEUTRAL_PROBABILITY);
    let c = match direction {
        Direction::Up => p,
        Direction::Down => 1.0 - p,
    };
    c.clamp(0.0, 1.0)
}

pub fn aggregate(symbol: &str, date: NaiveDate, outputs: ModelOutputs) -> SignalBundle {
    let score = score(outputs.predicted_return, outputs.direction);
    SignalBundle {
        symbol: symbol.to_string(),
        date,
        predicted_return_21d: outputs.predicted_return,
        predicted_volatility_21d: outputs.predicted_volatility,
        regime: outputs.regime,
        direction: outputs.direction,
        direction_probability: outputs
            .direction_probability
            .filter(|p| !p.is_nan())
            .unwrap_or(NEUTRAL_PROBABILITY),
        recommendation: recommendation(score),
        confidence: confidence(outputs.direction, outputs.direction_probability),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn outputs(ret: f64, direction: Direction, prob: f64) -> ModelOutputs {
        ModelOutputs {
            predicted_return: ret,
            predicted_volatility: Some(0.02),
            regime: None,
            direction,
            direction_probability: Some(prob),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[test]
    fn test_strong_up_is_buy() {
        let bundle = aggregate("VCB", day(), outputs(0.03, Direction::Up, 0.7));
        assert_eq!(score(0.03, Direction::Up), 2);
        assert_eq!(bundle.recommendation, Recommendation::Buy);
        assert_relative_eq!(bundle.confidence, 0.7);
    }

    #[test]
    fn test_strong_down_is_sell() {
        let bundle = aggregate("VCB", day(), outputs(-0.03, Direction::Down, 0.3));
        assert_eq!(score(-0.03, Direction::Down), -2);
        assert_eq!(bundle.recommendation, Recommendation::Sell);
        assert_relative_eq!(bundle.confidence, 0.7);
    }

    #[test]
    fn test_flat_return_defers_to_direction() {
        let bundle = aggregate("VCB", day(), outputs(0.0, Direction::Down, 0.55));
        assert_eq!(score(0.0, Direction::Down), -1);
        assert_eq!(bundle.recommendation, Recommendation::Sell);
        assert_relative_eq!(bundle.confidence, 0.45);

        let bundle = aggregate("VCB", day(), outputs(0.01, Direction::Up, 0.5));
        assert_eq!(bundle.recommendation, Recommendation::Buy);
        assert_relative_eq!(bundle.confidence, 0.5);
    }

    #[test]
    fn test_conflicting_votes_hold() {
        assert_eq!(recommendation(score(0.05, Direction::Down)), Recommendation::Hold);
        assert_eq!(recommendation(score(-0.05, Direction::Up)), Recommendation::Hold);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(score(RETURN_THRESHOLD, Direction::Up), 1);
        assert_eq!(score(-RETURN_THRESHOLD, Direction::Down), -1);
    }

    #[test]
    fn test_missing_probability_defaults_to_neutral() {
        let mut out = outputs(0.0, Direction::Up, 0.0);
        out.direction_probability = None;
        let bundle = aggregate("VCB", day(), out);
        assert_relative_eq!(bundle.confidence, 0.5);
        assert_relative_eq!(bundle.direction_probability, 0.5);

        assert_relative_eq!(confidence(Direction::Down, Some(f64::NAN)), 0.5);
        assert_relative_eq!(confidence(Direction::Up, Some(1.7)), 1.0);
        assert_relative_eq!(confidence(Direction::Down, Some(1.7)), 0.0);
    }
}
