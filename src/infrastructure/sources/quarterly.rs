//! Quarterly sources: bank fundamentals, bank ratio overrides and macro.

use super::normalize::{CsvRow, NormalizedCsv};
use crate::domain::errors::PipelineError;
use crate::domain::fundamentals::{BankRatio, MacroIndicator, MacroRecord, QuarterlyRecord};
use crate::domain::quarter::parse_quarter_key;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Header spellings found in exported fundamentals workbooks.
const FUNDAMENTAL_ALIASES: &[(&str, &str)] = &[
    ("cp", "symbol"),
    ("năm", "year"),
    ("kỳ", "quarter"),
    ("roe_(%)", "roe"),
    ("p/b", "p_b"),
    ("assets/equity", "assets_equity"),
];

const MACRO_ALIASES: &[(&str, &str)] = &[
    ("inf", "inflation"),
    ("dc", "creditgrowth"),
    ("credit_growth", "creditgrowth"),
];

fn quarter_key(row: &CsvRow<'_>) -> Option<NaiveDate> {
    parse_quarter_key(row.text("year")?, row.text("quarter")?)
}

/// Loads per-bank quarterly ratios. Rows without a valid (year, quarter) are
/// dropped. When `bank_ratios` is given, its ROA replaces the fundamentals ROA
/// for every key it covers.
pub fn load_fundamentals(
    path: &Path,
    bank_ratios: Option<&Path>,
) -> Result<Vec<QuarterlyRecord>, PipelineError> {
    let csv = NormalizedCsv::read(path, FUNDAMENTAL_ALIASES)?;

    let mut dropped = 0usize;
    let mut by_key: BTreeMap<(String, NaiveDate), QuarterlyRecord> = BTreeMap::new();
    for row in csv.rows() {
        let (Some(symbol), Some(quarter_start)) = (row.text("symbol"), quarter_key(&row)) else {
            dropped += 1;
            continue;
        };
        let mut ratios = [None; 6];
        for ratio in BankRatio::ALL {
            ratios[ratio.index()] = row.number(ratio.column());
        }
        by_key.insert(
            (symbol.to_string(), quarter_start),
            QuarterlyRecord {
                symbol: symbol.to_string(),
                quarter_start,
                ratios,
            },
        );
    }
    if dropped > 0 {
        warn!(
            "Dropped {} fundamentals rows with unparsable symbol/year/quarter in {:?}",
            dropped, path
        );
    }

    if let Some(ratio_path) = bank_ratios {
        match load_roa_overrides(ratio_path) {
            Ok(overrides) => {
                let mut applied = 0usize;
                for (key, roa) in overrides {
                    if let Some(record) = by_key.get_mut(&key) {
                        record.ratios[BankRatio::Roa.index()] = Some(roa);
                        applied += 1;
                    }
                }
                debug!("Applied {} ROA overrides from {:?}", applied, ratio_path);
            }
            Err(e) => warn!("Ignoring ROA overrides, keeping fundamentals ROA: {}", e),
        }
    }

    Ok(by_key.into_values().collect())
}

fn load_roa_overrides(path: &Path) -> Result<BTreeMap<(String, NaiveDate), f64>, PipelineError> {
    let csv = NormalizedCsv::read(path, FUNDAMENTAL_ALIASES)?;
    Ok(csv
        .rows()
        .filter_map(|row| {
            let key = (row.text("symbol")?.to_string(), quarter_key(&row)?);
            Some((key, row.number("roa")?))
        })
        .collect())
}

/// Loads the market-wide macro series, one row per quarter, sorted.
pub fn load_macro(path: &Path) -> Result<Vec<MacroRecord>, PipelineError> {
    let csv = NormalizedCsv::read(path, MACRO_ALIASES)?;

    let mut dropped = 0usize;
    let mut by_quarter: BTreeMap<NaiveDate, MacroRecord> = BTreeMap::new();
    for row in csv.rows() {
        let Some(quarter_start) = quarter_key(&row) else {
            dropped += 1;
            continue;
        };
        let mut values = [None; 3];
        for indicator in MacroIndicator::ALL {
            values[indicator.index()] = row.number(indicator.column());
        }
        by_quarter.insert(
            quarter_start,
            MacroRecord {
                quarter_start,
                values,
            },
        );
    }
    if dropped > 0 {
        warn!(
            "Dropped {} macro rows with unparsable year/quarter in {:?}",
            dropped, path
        );
    }
    Ok(by_quarter.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn q(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    #[test]
    fn test_fundamentals_drop_malformed_quarter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fundamentals.csv");
        fs::write(
            &path,
            "CP,Năm,Kỳ,ROE (%),LDR\n\
             VCB,2021,2,\"18,5\",0.8\n\
             VCB,2021,,17.0,0.8\n\
             VCB,abc,3,17.0,0.8\n\
             VCB,2021,7,17.0,0.8\n",
        )
        .unwrap();

        let rows = load_fundamentals(&path, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quarter_start, q(2021, 4));
        assert_eq!(rows[0].ratio(BankRatio::Roe), Some(185.0));
        assert_eq!(rows[0].ratio(BankRatio::LoanToDeposit), Some(0.8));
        assert_eq!(rows[0].ratio(BankRatio::PriceToBook), None);
    }

    #[test]
    fn test_bank_ratio_roa_override() {
        let dir = tempfile::tempdir().unwrap();
        let fund = dir.path().join("fundamentals.csv");
        let ratios = dir.path().join("bank_ratios.csv");
        fs::write(
            &fund,
            "symbol,year,quarter,roa\nVCB,2021,1,1.0\nVCB,2021,2,1.1\n",
        )
        .unwrap();
        fs::write(&ratios, "symbol,year,quarter,roa\nVCB,2021,2,2.5%\n").unwrap();

        let rows = load_fundamentals(&fund, Some(&ratios)).unwrap();
        assert_eq!(rows[0].ratio(BankRatio::Roa), Some(1.0));
        assert_eq!(rows[1].ratio(BankRatio::Roa), Some(2.5));
    }

    #[test]
    fn test_unreadable_bank_ratios_keep_fundamentals() {
        let dir = tempfile::tempdir().unwrap();
        let fund = dir.path().join("fundamentals.csv");
        let ratios = dir.path().join("bank_ratios.csv");
        fs::write(&fund, "symbol,year,quarter,roe,roa\nVCB,2021,1,15.0,1.0\n").unwrap();
        fs::write(&ratios, b"symbol,year,quarter,roa\nVCB,2021,1,\xff\xfe\n").unwrap();

        let rows = load_fundamentals(&fund, Some(&ratios)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ratio(BankRatio::Roe), Some(15.0));
        assert_eq!(rows[0].ratio(BankRatio::Roa), Some(1.0));
    }

    #[test]
    fn test_macro_aliases_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.csv");
        fs::write(
            &path,
            "Year,Quarter,GDP,Inflation,CreditGrowth\n\
             2021,2,5.6,2.7,4.1\n\
             2021,1,4.7,0.3,2.9\n\
             ,1,1.0,1.0,1.0\n",
        )
        .unwrap();

        let rows = load_macro(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].quarter_start, q(2021, 1));
        assert_eq!(rows[1].value(MacroIndicator::CreditGrowth), Some(4.1));
    }
}
