//! Synthetic source files for end-to-end tests.
#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use signalfuse::config::{ForestParams, PipelineConfig};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const SYMBOLS: [&str; 2] = ["ACB", "VCB"];
pub const DAYS: u64 = 160;

pub fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

pub fn day(i: u64) -> NaiveDate {
    start() + Days::new(i)
}

/// Oscillating closes with drift, so every target class occurs.
pub fn close(symbol_idx: usize, i: u64) -> f64 {
    let t = i as f64;
    let base = 50.0 + 40.0 * symbol_idx as f64;
    base * (1.0 + 0.08 * (t / 6.0 + symbol_idx as f64).sin() + 0.0005 * t)
}

/// Small forests and no start-date filter.
pub fn config_for(root: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.paths.data_dir = root.join("data");
    config.paths.artifacts_dir = root.join("artifacts");
    config.train_start_date = None;
    config.forest = ForestParams {
        n_trees: 8,
        max_depth: 4,
        min_samples_split: 2,
    };
    config
}

pub fn write_prices(data_dir: &Path, days: u64) {
    let mut csv = String::from("Ticker,Time,Open,High,Low,Close,Volume\n");
    for (s, symbol) in SYMBOLS.iter().enumerate() {
        for i in 0..days {
            let c = close(s, i);
            writeln!(
                csv,
                "{},{},{:.4},{:.4},{:.4},{:.4},{}",
                symbol,
                day(i),
                c,
                c * 1.01,
                c * 0.99,
                c,
                1000 + i
            )
            .unwrap();
        }
    }
    fs::create_dir_all(data_dir).unwrap();
    fs::write(data_dir.join("prices.csv"), csv).unwrap();
}

pub fn write_sentiment(data_dir: &Path, days: u64) {
    let mut csv =
        String::from("symbol,date,daily_sentiment,sentiment_7d_avg,buzz_7d,sentiment_decay\n");
    for symbol in SYMBOLS {
        for i in 0..days {
            let t = i as f64;
            writeln!(
                csv,
                "{},{},{:.4},{:.4},{},{:.4}",
                symbol,
                day(i),
                (t / 5.0).cos() * 0.5,
                (t / 9.0).cos() * 0.3,
                i % 7 + 1,
                (t / 4.0).sin() * 0.2
            )
            .unwrap();
        }
    }
    fs::write(data_dir.join("sentiment.csv"), csv).unwrap();
}

pub fn write_fx(data_dir: &Path, days: u64) {
    let mut csv = String::from("date,close\n");
    for i in 0..days {
        writeln!(csv, "{},{:.2}", day(i), 24000.0 + 150.0 * (i as f64 / 8.0).sin()).unwrap();
    }
    fs::write(data_dir.join("fx.csv"), csv).unwrap();
}

/// Quarters 2022Q3 through 2023Q3, enough history for the quarterly lags and
/// z-scores to be observed on every backbone date.
pub fn write_quarterly(data_dir: &Path) {
    let quarters = [(2022, 3), (2022, 4), (2023, 1), (2023, 2), (2023, 3)];

    let mut macro_csv = String::from("year,quarter,gdp,inflation,creditgrowth\n");
    for (k, (year, q)) in quarters.iter().enumerate() {
        let k = k as f64;
        writeln!(macro_csv, "{},{},{},{},{}", year, q, 5.0 + k, 3.0 - 0.1 * k, 12.0 + k).unwrap();
    }
    fs::write(data_dir.join("macro.csv"), macro_csv).unwrap();

    let mut fundamentals = String::from("symbol,year,quarter,roe,roa\n");
    for (s, symbol) in SYMBOLS.iter().enumerate() {
        for (k, (year, q)) in quarters.iter().enumerate() {
            let wiggle = if k % 2 == 0 { 1.0 } else { -1.0 };
            writeln!(
                fundamentals,
                "{},{},{},{},{}",
                symbol,
                year,
                q,
                15.0 + s as f64 + wiggle * (k as f64 + 1.0),
                1.2 + 0.1 * wiggle
            )
            .unwrap();
        }
    }
    fs::write(data_dir.join("fundamentals.csv"), fundamentals).unwrap();
}

pub fn write_all_sources(data_dir: &Path) {
    write_prices(data_dir, DAYS);
    write_sentiment(data_dir, DAYS);
    write_fx(data_dir, DAYS);
    write_quarterly(data_dir);
}
