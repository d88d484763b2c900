use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar. Unique per (symbol, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Daily news sentiment for one symbol. Every score may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub daily_sentiment: Option<f64>,
    pub sentiment_7d_avg: Option<f64>,
    pub buzz_7d: Option<f64>,
    pub sentiment_decay: Option<f64>,
}

/// Market-wide FX close for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxRecord {
    pub date: NaiveDate,
    pub close: f64,
}

/// Sorts by (symbol, date) and keeps the last row of any duplicated key.
pub fn dedup_daily(mut records: Vec<DailyRecord>) -> Vec<DailyRecord> {
    // Stable sort keeps file order within a key, so "last" means last read.
    records.sort_by(|a, b| (&a.symbol, a.date).cmp(&(&b.symbol, b.date)));
    let mut out: Vec<DailyRecord> = Vec::with_capacity(records.len());
    for record in records {
        match out.last_mut() {
            Some(prev) if prev.symbol == record.symbol && prev.date == record.date => {
                *prev = record;
            }
            _ => out.push(record),
        }
    }
    out
}

/// Splits a (symbol, date)-sorted slice into contiguous per-symbol runs.
pub fn symbol_runs<T, F>(records: &[T], symbol_of: F) -> Vec<&[T]>
where
    F: Fn(&T) -> &str,
{
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=records.len() {
        if i == records.len() || symbol_of(&records[i]) != symbol_of(&records[start]) {
            if i > start {
                runs.push(&records[start..i]);
            }
            start = i;
        }
    }
    runs
}
