//! Group A: momentum, volatility and trend.

use super::rolling::{pct_change, ratio, rolling_mean, rolling_std};
use super::{SymbolDate, block_for, insert_series};
use crate::domain::feature_table::{ColumnBlock, finite};
use crate::domain::market::{DailyRecord, symbol_runs};
use crate::domain::ml::feature_registry::GROUP_A_MARKET;

const RETURN_HORIZONS: [usize; 3] = [1, 5, 21];
const VOL_WINDOWS: [usize; 2] = [5, 21];
const MA_WINDOWS: [usize; 2] = [21, 63];

/// `prices` must be sorted by (symbol, date).
pub fn build_market_features(prices: &[DailyRecord]) -> ColumnBlock<SymbolDate> {
    let mut block = block_for(GROUP_A_MARKET);
    for run in symbol_runs(prices, |r| r.symbol.as_str()) {
        let columns = market_columns(run);
        let keys = run.iter().map(|r| (r.symbol.clone(), r.date));
        insert_series(&mut block, keys, &columns);
    }
    block
}

/// Column-major series in `GROUP_A_MARKET` order for one symbol.
fn market_columns(run: &[DailyRecord]) -> Vec<Vec<Option<f64>>> {
    let close: Vec<f64> = run.iter().map(|r| r.close).collect();
    let close_opt: Vec<Option<f64>> = close.iter().copied().map(Some).collect();

    let returns: Vec<Vec<Option<f64>>> = RETURN_HORIZONS
        .iter()
        .map(|&k| pct_change(&close, k))
        .collect();
    let ret_1d = &returns[0];

    let mut columns = returns.clone();
    for window in VOL_WINDOWS {
        columns.push(rolling_std(ret_1d, window));
    }

    columns.push(
        run.iter()
            .map(|r| {
                if r.close == 0.0 {
                    None
                } else {
                    finite((r.high - r.low) / r.close)
                }
            })
            .collect(),
    );

    for window in MA_WINDOWS {
        let ma = rolling_mean(&close_opt, window);
        columns.push(
            close
                .iter()
                .zip(&ma)
                .map(|(&c, &m)| ratio(m.map(|m| c - m), m))
                .collect(),
        );
    }

    debug_assert_eq!(columns.len(), GROUP_A_MARKET.len());
    columns
}
