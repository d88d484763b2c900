//! Group D: one-quarter lagged macro indicators and daily FX context.
//!
//! Both are market-wide: macro joins on the quarter key alone and FX on the
//! date alone.

use super::rolling::{lag, pct_change, rolling_std};
use super::{block_for, insert_series};
use crate::domain::feature_table::ColumnBlock;
use crate::domain::fundamentals::{MacroIndicator, MacroRecord};
use crate::domain::market::FxRecord;
use chrono::NaiveDate;

pub const FX_COLUMNS: [&str; 2] = ["fx_ret_5d", "fx_vol_21d"];
const FX_RETURN_HORIZON: usize = 5;
const FX_VOL_WINDOW: usize = 21;

/// Previous quarter's value of each indicator, keyed by quarter start.
///
/// The lag is one row of the quarter-sorted series, taken before any daily
/// join, so it is measured in quarters.
pub fn build_macro_features(series: &[MacroRecord]) -> ColumnBlock<NaiveDate> {
    if series.is_empty() {
        return ColumnBlock::empty();
    }

    let mut sorted: Vec<&MacroRecord> = series.iter().collect();
    sorted.sort_by_key(|r| r.quarter_start);

    let names: Vec<&str> = MacroIndicator::ALL.iter().map(|m| m.feature()).collect();
    let mut block = block_for(&names);
    let columns: Vec<Vec<Option<f64>>> = MacroIndicator::ALL
        .iter()
        .map(|&indicator| {
            let values: Vec<Option<f64>> = sorted.iter().map(|r| r.value(indicator)).collect();
            lag(&values, 1)
        })
        .collect();
    insert_series(&mut block, sorted.iter().map(|r| r.quarter_start), &columns);
    block.without_empty_columns()
}

/// FX 5-day return and 21-day realized volatility of daily returns.
pub fn build_fx_features(fx: &[FxRecord]) -> ColumnBlock<NaiveDate> {
    if fx.is_empty() {
        return ColumnBlock::empty();
    }

    let mut sorted = fx.to_vec();
    sorted.sort_by_key(|r| r.date);
    let close: Vec<f64> = sorted.iter().map(|r| r.close).collect();

    let ret_1d = pct_change(&close, 1);
    let columns = vec![
        pct_change(&close, FX_RETURN_HORIZON),
        rolling_std(&ret_1d, FX_VOL_WINDOW),
    ];

    let mut block = block_for(&FX_COLUMNS);
    insert_series(&mut block, sorted.iter().map(|r| r.date), &columns);
    block.without_empty_columns()
}
