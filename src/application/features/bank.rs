//! Group E: per-bank standardized fundamentals.

use super::rolling::{mean, sample_std};
use super::{SymbolDate, block_for, insert_series};
use crate::domain::feature_table::{ColumnBlock, finite};
use crate::domain::fundamentals::{BankRatio, QuarterlyRecord};
use crate::domain::market::symbol_runs;

/// Fewest observed quarters for which a z-score is defined.
pub const MIN_ZSCORE_SAMPLES: usize = 2;

/// Z-score of every ratio against the bank's own history up to and including
/// the quarter being scored. Null when the ratio is missing that quarter, the
/// history is shorter than [`MIN_ZSCORE_SAMPLES`], or it has zero variance.
pub fn build_bank_features(fundamentals: &[QuarterlyRecord]) -> ColumnBlock<SymbolDate> {
    if fundamentals.is_empty() {
        return ColumnBlock::empty();
    }

    let mut sorted = fundamentals.to_vec();
    sorted.sort_by(|a, b| (&a.symbol, a.quarter_start).cmp(&(&b.symbol, b.quarter_start)));

    let names: Vec<&str> = BankRatio::ALL.iter().map(|r| r.feature()).collect();
    let mut block = block_for(&names);
    for run in symbol_runs(&sorted, |r| r.symbol.as_str()) {
        let columns: Vec<Vec<Option<f64>>> = BankRatio::ALL
            .iter()
            .map(|&ratio| {
                let values: Vec<Option<f64>> = run.iter().map(|r| r.ratio(ratio)).collect();
                expanding_zscore(&values)
            })
            .collect();
        let keys = run.iter().map(|r| (r.symbol.clone(), r.quarter_start));
        insert_series(&mut block, keys, &columns);
    }
    block.without_empty_columns()
}

fn expanding_zscore(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut seen: Vec<f64> = Vec::with_capacity(values.len());
    values
        .iter()
        .map(|value| {
            let x = (*value)?;
            seen.push(x);
            if seen.len() < MIN_ZSCORE_SAMPLES {
                return None;
            }
            let mu = mean(&seen)?;
            let sigma = sample_std(&seen)?;
            if sigma == 0.0 {
                return None;
            }
            finite((x - mu) / sigma)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn record(symbol: &str, quarter: u32, roe: Option<f64>, ldr: f64) -> QuarterlyRecord {
        let mut ratios = [None; 6];
        ratios[BankRatio::Roe.index()] = roe;
        ratios[BankRatio::LoanToDeposit.index()] = Some(ldr);
        QuarterlyRecord {
            symbol: symbol.to_string(),
            quarter_start: NaiveDate::from_ymd_opt(2022, (quarter - 1) * 3 + 1, 1).unwrap(),
            ratios,
        }
    }

    fn key(symbol: &str, quarter: u32) -> SymbolDate {
        let date = NaiveDate::from_ymd_opt(2022, (quarter - 1) * 3 + 1, 1).unwrap();
        (symbol.to_string(), date)
    }

    #[test]
    fn test_expanding_zscore_uses_only_past_quarters() {
        let rows = vec![
            record("VCB", 1, Some(10.0), 0.8),
            record("VCB", 2, Some(12.0), 0.8),
            record("VCB", 3, Some(20.0), 0.8),
        ];
        let block = build_bank_features(&rows);
        let roe = block.columns.iter().position(|c| c == "ROE_z").unwrap();

        assert_eq!(block.get(&key("VCB", 1)).unwrap()[roe], None);
        // Quarter 2 sees {10, 12}: mean 11, sample std sqrt(2).
        let q2 = block.get(&key("VCB", 2)).unwrap()[roe].unwrap();
        assert_relative_eq!(q2, 1.0 / 2f64.sqrt(), epsilon = 1e-12);
        assert!(block.get(&key("VCB", 3)).unwrap()[roe].unwrap() > 1.0);
    }

    #[test]
    fn test_zero_variance_is_null_and_dropped() {
        let rows = vec![
            record("VCB", 1, None, 0.8),
            record("VCB", 2, None, 0.8),
            record("ACB", 1, None, 0.7),
        ];
        let block = build_bank_features(&rows);
        assert!(block.columns.is_empty());
        assert_eq!(block.rows.len(), 3);
    }

    #[test]
    fn test_missing_ratio_does_not_extend_history() {
        let rows = vec![
            record("VCB", 1, Some(10.0), 0.8),
            record("VCB", 2, None, 0.9),
            record("VCB", 3, Some(12.0), 1.0),
        ];
        let block = build_bank_features(&rows);
        let roe = block.columns.iter().position(|c| c == "ROE_z").unwrap();

        assert_eq!(block.get(&key("VCB", 2)).unwrap()[roe], None);
        assert!(block.get(&key("VCB", 3)).unwrap()[roe].is_some());
    }
}
