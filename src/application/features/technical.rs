//! Group B: oscillators.
//!
//! RSI averages gains and losses with a simple rolling mean rather than
//! Wilder's recursive smoothing, so values differ from most charting tools.

use super::rolling::{ratio, rolling_mean, rolling_std};
use super::{SymbolDate, block_for, insert_series};
use crate::domain::feature_table::{ColumnBlock, finite};
use crate::domain::market::{DailyRecord, symbol_runs};
use crate::domain::ml::feature_registry::GROUP_B_TECHNICAL;

pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;
pub const BB_PERIOD: usize = 20;
pub const BB_STD_MULT: f64 = 2.0;

/// `prices` must be sorted by (symbol, date).
pub fn build_technical_features(prices: &[DailyRecord]) -> ColumnBlock<SymbolDate> {
    let mut block = block_for(GROUP_B_TECHNICAL);
    for run in symbol_runs(prices, |r| r.symbol.as_str()) {
        let columns = vec![rsi(run), atr_pct(run), bollinger_width(run)];
        let keys = run.iter().map(|r| (r.symbol.clone(), r.date));
        insert_series(&mut block, keys, &columns);
    }
    block
}

/// `100 * avg_gain / (avg_gain + avg_loss)`; null on a flat window.
fn rsi(run: &[DailyRecord]) -> Vec<Option<f64>> {
    let deltas: Vec<Option<f64>> = (0..run.len())
        .map(|i| (i > 0).then(|| run[i].close - run[i - 1].close))
        .collect();
    let gains: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    let avg_gain = rolling_mean(&gains, RSI_PERIOD);
    let avg_loss = rolling_mean(&losses, RSI_PERIOD);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            let (g, l) = (g?, l?);
            ratio(Some(100.0 * g), Some(g + l))
        })
        .collect()
}

/// Mean true range over the window, as a fraction of the close.
fn atr_pct(run: &[DailyRecord]) -> Vec<Option<f64>> {
    let true_range: Vec<Option<f64>> = run
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = bar.high - bar.low;
            let tr = match i.checked_sub(1).map(|p| run[p].close) {
                Some(prev) => range
                    .max((bar.high - prev).abs())
                    .max((bar.low - prev).abs()),
                None => range,
            };
            finite(tr)
        })
        .collect();

    rolling_mean(&true_range, ATR_PERIOD)
        .iter()
        .zip(run)
        .map(|(&atr, bar)| ratio(atr, Some(bar.close)))
        .collect()
}

/// `(upper - lower) / middle` of the 20-period, 2-sigma band.
fn bollinger_width(run: &[DailyRecord]) -> Vec<Option<f64>> {
    let close: Vec<Option<f64>> = run.iter().map(|r| Some(r.close)).collect();
    let middle = rolling_mean(&close, BB_PERIOD);
    let std = rolling_std(&close, BB_PERIOD);
    middle
        .iter()
        .zip(&std)
        .map(|(&m, &s)| ratio(s.map(|s| 2.0 * BB_STD_MULT * s), m))
        .collect()
}
