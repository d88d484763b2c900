//! Daily sources: prices (required), sentiment and FX (optional).

use super::normalize::NormalizedCsv;
use crate::domain::errors::PipelineError;
use crate::domain::market::{DailyRecord, FxRecord, SentimentRecord, dedup_daily};
use std::path::Path;
use tracing::{info, warn};

const FX_ALIASES: &[(&str, &str)] = &[("price", "close")];

/// Loads the daily price table. Any failure here is fatal for the run.
pub fn load_prices(path: &Path) -> Result<Vec<DailyRecord>, PipelineError> {
    let missing = |reason: &str| PipelineError::DataMissing {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if !path.exists() {
        return Err(missing("file not found"));
    }

    let csv = NormalizedCsv::read(path, &[])?;
    for column in ["symbol", "date", "high", "low", "close"] {
        if !csv.has_column(column) {
            return Err(missing(&format!("missing column '{column}'")));
        }
    }

    let mut skipped = 0usize;
    let mut records = Vec::with_capacity(csv.len());
    for row in csv.rows() {
        let (Some(symbol), Some(date), Some(high), Some(low), Some(close)) = (
            row.text("symbol"),
            row.date("date"),
            row.number("high"),
            row.number("low"),
            row.number("close"),
        ) else {
            skipped += 1;
            continue;
        };
        records.push(DailyRecord {
            symbol: symbol.to_string(),
            date,
            open: row.number("open").unwrap_or(close),
            high,
            low,
            close,
            volume: row.number("volume").unwrap_or(0.0),
        });
    }

    if skipped > 0 {
        warn!("Skipped {} unparsable price rows in {:?}", skipped, path);
    }
    let records = dedup_daily(records);
    if records.is_empty() {
        return Err(missing("no usable rows"));
    }
    info!("Loaded {} price rows from {:?}", records.len(), path);
    Ok(records)
}

pub fn load_sentiment(path: &Path) -> Result<Vec<SentimentRecord>, PipelineError> {
    let csv = NormalizedCsv::read(path, &[])?;
    let mut records: Vec<SentimentRecord> = csv
        .rows()
        .filter_map(|row| {
            Some(SentimentRecord {
                symbol: row.text("symbol")?.to_string(),
                date: row.date("date")?,
                daily_sentiment: row.number("daily_sentiment"),
                sentiment_7d_avg: row.number("sentiment_7d_avg"),
                buzz_7d: row.number("buzz_7d"),
                sentiment_decay: row.number("sentiment_decay"),
            })
        })
        .collect();

    records.sort_by(|a, b| (&a.symbol, a.date).cmp(&(&b.symbol, b.date)));
    records.dedup_by(|later, earlier| {
        let same = later.symbol == earlier.symbol && later.date == earlier.date;
        if same {
            std::mem::swap(later, earlier);
        }
        same
    });
    Ok(records)
}

pub fn load_fx(path: &Path) -> Result<Vec<FxRecord>, PipelineError> {
    let csv = NormalizedCsv::read(path, FX_ALIASES)?;
    let mut records: Vec<FxRecord> = csv
        .rows()
        .filter_map(|row| {
            Some(FxRecord {
                date: row.date("date")?,
                close: row.number("close")?,
            })
        })
        .collect();
    records.sort_by_key(|r| r.date);
    records.dedup_by(|later, earlier| {
        let same = later.date == earlier.date;
        if same {
            *earlier = *later;
        }
        same
    });
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_prices_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_prices(&dir.path().join("prices.csv")).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("prices.csv"));
    }

    #[test]
    fn test_prices_missing_close_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "ticker,time,high,low\nVCB,2024-01-02,2,1\n").unwrap();
        assert!(load_prices(&path).unwrap_err().is_fatal());
    }

    #[test]
    fn test_prices_skip_bad_rows_and_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(
            &path,
            "Ticker,Time,Open,High,Low,Close,Volume\n\
             VCB,2024-01-03,1,2,1,1.5,100\n\
             VCB,2024-01-02,1,2,1,1.4,100\n\
             VCB,not-a-date,1,2,1,1.4,100\n\
             VCB,2024-01-03,1,2,1,1.6,100\n",
        )
        .unwrap();

        let rows = load_prices(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].date < rows[1].date);
        assert_eq!(rows[1].close, 1.6);
    }

    #[test]
    fn test_sentiment_dedup_keeps_last() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentiment.csv");
        fs::write(
            &path,
            "symbol,date,daily_sentiment,buzz_7d\n\
             VCB,2024-01-02,0.1,3\n\
             VCB,2024-01-02,0.4,5\n\
             VCB,2024-01-01,-0.2,\n",
        )
        .unwrap();

        let rows = load_sentiment(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].buzz_7d, None);
        assert_eq!(rows[1].daily_sentiment, Some(0.4));
        assert_eq!(rows[1].sentiment_decay, None);
    }

    #[test]
    fn test_fx_price_alias() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fx.csv");
        fs::write(&path, "Date,Price\n2024-01-03,24100\n2024-01-02,\"24,000\"\n").unwrap();

        let rows = load_fx(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].close, 24000.0);
    }
}
