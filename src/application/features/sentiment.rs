//! Group C: lagged news sentiment.

use super::rolling::lag;
use super::{SymbolDate, block_for, insert_series};
use crate::domain::feature_table::ColumnBlock;
use crate::domain::market::{SentimentRecord, symbol_runs};
use crate::domain::ml::feature_registry::GROUP_C_SENTIMENT;

const SENTIMENT_LAGS: [usize; 3] = [1, 3, 7];

/// Lags are taken in rows of the per-symbol sentiment series, so a day with
/// no news row does not count as an offset. `sentiment` must be sorted by
/// (symbol, date). An empty input yields an empty block, and columns whose
/// source field is never populated are dropped.
pub fn build_sentiment_features(sentiment: &[SentimentRecord]) -> ColumnBlock<SymbolDate> {
    if sentiment.is_empty() {
        return ColumnBlock::empty();
    }

    let mut block = block_for(GROUP_C_SENTIMENT);
    for run in symbol_runs(sentiment, |r| r.symbol.as_str()) {
        let daily: Vec<Option<f64>> = run.iter().map(|r| r.daily_sentiment).collect();
        let avg_7d: Vec<Option<f64>> = run.iter().map(|r| r.sentiment_7d_avg).collect();
        let buzz: Vec<Option<f64>> = run.iter().map(|r| r.buzz_7d).collect();
        let decay: Vec<Option<f64>> = run.iter().map(|r| r.sentiment_decay).collect();

        let mut columns: Vec<Vec<Option<f64>>> =
            SENTIMENT_LAGS.iter().map(|&k| lag(&daily, k)).collect();
        columns.push(lag(&avg_7d, 1));
        columns.push(lag(&buzz, 1));
        columns.push(lag(&decay, 1));

        let keys = run.iter().map(|r| (r.symbol.clone(), r.date));
        insert_series(&mut block, keys, &columns);
    }
    block.without_empty_columns()
}
