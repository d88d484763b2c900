//! Feature builders, groups A to E.
//!
//! Each builder reads normalized source records and returns a [`ColumnBlock`]
//! keyed the way the merge engine joins it. Builders never read a row dated
//! after the row they compute, and per-symbol series never mix symbols.

pub mod bank;
pub mod macro_fx;
pub mod market;
pub mod rolling;
pub mod sentiment;
pub mod technical;

use crate::domain::feature_table::ColumnBlock;
use chrono::NaiveDate;

/// Join key of per-symbol daily and quarterly blocks.
pub type SymbolDate = (String, NaiveDate);

pub use bank::build_bank_features;
pub use macro_fx::{build_fx_features, build_macro_features};
pub use market::build_market_features;
pub use sentiment::build_sentiment_features;
pub use technical::build_technical_features;

/// Names a block after a registry group.
fn block_for<K: Ord>(names: &[&str]) -> ColumnBlock<K> {
    ColumnBlock::new(names.iter().map(|n| n.to_string()).collect())
}

/// Writes column-major series into keyed rows. `columns` must follow the
/// block's column order and share the length of `keys`.
fn insert_series<K, I>(block: &mut ColumnBlock<K>, keys: I, columns: &[Vec<Option<f64>>])
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    debug_assert_eq!(columns.len(), block.columns.len());
    for (i, key) in keys.into_iter().enumerate() {
        let values = columns.iter().map(|series| series[i]).collect();
        block.insert(key, values);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::market::DailyRecord;
    use chrono::{Days, NaiveDate};

    /// Consecutive calendar-day bars with a 1% band around each close.
    pub fn bars(symbol: &str, closes: &[f64]) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyRecord {
                symbol: symbol.to_string(),
                date: start + Days::new(i as u64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1000.0,
            })
            .collect()
    }
}
