//! Forward-looking supervised targets.
//!
//! Mirror image of the feature lag discipline: a target at row `t` reads only
//! rows `t+1 ..= t+horizon` of the same symbol.

use crate::application::features::rolling::sample_std;
use crate::domain::feature_table::finite;
use crate::domain::market::{DailyRecord, symbol_runs};
use crate::domain::ml::targets::{TargetRow, direction_label, regime_label};

/// One [`TargetRow`] per price row, in the order of `prices` (sorted by
/// symbol, date).
pub fn build_targets(prices: &[DailyRecord], horizon: usize) -> Vec<TargetRow> {
    let mut out = Vec::with_capacity(prices.len());
    for run in symbol_runs(prices, |r| r.symbol.as_str()) {
        out.extend(targets_for_symbol(run, horizon));
    }
    out
}

fn targets_for_symbol(run: &[DailyRecord], horizon: usize) -> Vec<TargetRow> {
    let close: Vec<f64> = run.iter().map(|r| r.close).collect();
    let daily_returns: Vec<Option<f64>> = (0..close.len())
        .map(|i| {
            if i == 0 || close[i - 1] == 0.0 {
                None
            } else {
                finite(close[i] / close[i - 1] - 1.0)
            }
        })
        .collect();

    (0..close.len())
        .map(|t| {
            let end = t + horizon;
            if horizon == 0 || end >= close.len() {
                return TargetRow::default();
            }

            let target_return = forward_log_return(close[t], close[end]);
            let target_risk = daily_returns[t + 1..=end]
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()
                .and_then(|window| sample_std(&window));

            TargetRow {
                target_return,
                target_risk,
                target_direction: target_return.map(direction_label),
                target_regime: target_return.map(regime_label),
            }
        })
        .collect()
}

/// `ln(future / now)`; null for non-positive prices or non-finite results.
fn forward_log_return(now: f64, future: f64) -> Option<f64> {
    if now <= 0.0 || future <= 0.0 {
        return None;
    }
    finite((future / now).ln())
}
