//! Joins the feature groups onto the daily (symbol, date) backbone.

use crate::application::features::{
    SymbolDate, build_bank_features, build_fx_features, build_macro_features,
    build_market_features, build_sentiment_features, build_technical_features,
};
use crate::domain::feature_table::{ColumnBlock, FeatureRow, FeatureTable};
use crate::domain::market::DailyRecord;
use crate::domain::quarter::quarter_start;
use crate::infrastructure::sources::SourceTables;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Output of every feature builder for one run.
#[derive(Debug, Clone)]
pub struct FeatureBlocks {
    pub market: ColumnBlock<SymbolDate>,
    pub technical: ColumnBlock<SymbolDate>,
    pub sentiment: ColumnBlock<SymbolDate>,
    pub fx: ColumnBlock<NaiveDate>,
    pub bank: ColumnBlock<SymbolDate>,
    pub macro_lags: ColumnBlock<NaiveDate>,
}

impl FeatureBlocks {
    pub fn build(sources: &SourceTables) -> Self {
        let blocks = Self {
            // Short histories can leave a whole window column unobserved.
            market: build_market_features(&sources.prices).without_empty_columns(),
            technical: build_technical_features(&sources.prices).without_empty_columns(),
            sentiment: build_sentiment_features(&sources.sentiment),
            fx: build_fx_features(&sources.fx),
            bank: build_bank_features(&sources.fundamentals),
            macro_lags: build_macro_features(&sources.macro_series),
        };
        debug!(
            "Feature blocks: market={} technical={} sentiment={} fx={} bank={} macro={}",
            blocks.market.columns.len(),
            blocks.technical.columns.len(),
            blocks.sentiment.columns.len(),
            blocks.fx.columns.len(),
            blocks.bank.columns.len(),
            blocks.macro_lags.columns.len()
        );
        blocks
    }
}

/// Left-joins every block onto the backbone built from `prices` (sorted by
/// symbol, date). Daily blocks go first and the quarterly blocks last, on the
/// quarter start of each row's date. The row count always equals `prices.len()`.
pub fn merge_features(prices: &[DailyRecord], blocks: &FeatureBlocks) -> FeatureTable {
    let mut table = FeatureTable::from_keys(prices.iter().map(|r| (r.symbol.clone(), r.date)));

    let by_symbol_date = |row: &FeatureRow| (row.symbol.clone(), row.date);
    table.left_join(&blocks.market, by_symbol_date);
    table.left_join(&blocks.technical, by_symbol_date);
    table.left_join(&blocks.sentiment, by_symbol_date);
    table.left_join(&blocks.fx, |row| row.date);
    table.left_join(&blocks.bank, |row| (row.symbol.clone(), quarter_start(row.date)));
    table.left_join(&blocks.macro_lags, |row| quarter_start(row.date));

    info!(
        "Merged feature table: {} rows x {} columns",
        table.len(),
        table.columns().len()
    );
    table
}

/// Runs every feature builder over loaded sources and merges the result.
pub fn build_feature_table(sources: &SourceTables) -> FeatureTable {
    let blocks = FeatureBlocks::build(sources);
    merge_features(&sources.prices, &blocks)
}
