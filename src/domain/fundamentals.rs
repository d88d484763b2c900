use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bank fundamental ratios carried by the quarterly table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BankRatio {
    Roe,
    Roa,
    PriceToBook,
    LoanToDeposit,
    CostToIncome,
    AssetsToEquity,
}

impl BankRatio {
    pub const ALL: [BankRatio; 6] = [
        BankRatio::Roe,
        BankRatio::Roa,
        BankRatio::PriceToBook,
        BankRatio::LoanToDeposit,
        BankRatio::CostToIncome,
        BankRatio::AssetsToEquity,
    ];

    /// Normalized source column name.
    pub fn column(self) -> &'static str {
        match self {
            BankRatio::Roe => "roe",
            BankRatio::Roa => "roa",
            BankRatio::PriceToBook => "p_b",
            BankRatio::LoanToDeposit => "ldr",
            BankRatio::CostToIncome => "cir",
            BankRatio::AssetsToEquity => "assets_equity",
        }
    }

    /// Standardized feature column produced by the bank builder.
    pub fn feature(self) -> &'static str {
        match self {
            BankRatio::Roe => "ROE_z",
            BankRatio::Roa => "ROA_z",
            BankRatio::PriceToBook => "P_B_z",
            BankRatio::LoanToDeposit => "LDR_z",
            BankRatio::CostToIncome => "CIR_z",
            BankRatio::AssetsToEquity => "Assets_Equity_z",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Quarterly macro indicators. One value per quarter, market-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacroIndicator {
    Gdp,
    Inflation,
    CreditGrowth,
}

impl MacroIndicator {
    pub const ALL: [MacroIndicator; 3] = [
        MacroIndicator::Gdp,
        MacroIndicator::Inflation,
        MacroIndicator::CreditGrowth,
    ];

    pub fn column(self) -> &'static str {
        match self {
            MacroIndicator::Gdp => "gdp",
            MacroIndicator::Inflation => "inflation",
            MacroIndicator::CreditGrowth => "creditgrowth",
        }
    }

    /// One-quarter lagged feature column.
    pub fn feature(self) -> &'static str {
        match self {
            MacroIndicator::Gdp => "GDP_t_1Q",
            MacroIndicator::Inflation => "INF_t_1Q",
            MacroIndicator::CreditGrowth => "DC_t_1Q",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Fundamentals for one (symbol, quarter). Unique per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyRecord {
    pub symbol: String,
    pub quarter_start: NaiveDate,
    pub ratios: [Option<f64>; 6],
}

impl QuarterlyRecord {
    pub fn ratio(&self, ratio: BankRatio) -> Option<f64> {
        self.ratios[ratio.index()]
    }
}

/// Macro indicators for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroRecord {
    pub quarter_start: NaiveDate,
    pub values: [Option<f64>; 3],
}

impl MacroRecord {
    pub fn value(&self, indicator: MacroIndicator) -> Option<f64> {
        self.values[indicator.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_indices_match_all_order() {
        for (i, ratio) in BankRatio::ALL.iter().enumerate() {
            assert_eq!(ratio.index(), i);
        }
        for (i, indicator) in MacroIndicator::ALL.iter().enumerate() {
            assert_eq!(indicator.index(), i);
        }
    }

    #[test]
    fn test_ratio_lookup() {
        let mut ratios = [None; 6];
        ratios[BankRatio::LoanToDeposit.index()] = Some(0.8);
        let rec = QuarterlyRecord {
            symbol: "VCB".to_string(),
            quarter_start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            ratios,
        };
        assert_eq!(rec.ratio(BankRatio::LoanToDeposit), Some(0.8));
        assert_eq!(rec.ratio(BankRatio::Roe), None);
    }
}
