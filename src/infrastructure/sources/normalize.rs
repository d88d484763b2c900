//! Column-name normalization and cell parsing shared by every source loader.

use crate::domain::errors::PipelineError;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::Path;

/// Renames applied to every source after lower-casing.
const COMMON_ALIASES: &[(&str, &str)] = &[("ticker", "symbol"), ("time", "date")];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Lower-case, trim, collapse whitespace runs into `_`, then apply aliases.
pub fn normalize_header(raw: &str, aliases: &[(&str, &str)]) -> String {
    let lowered = raw
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    COMMON_ALIASES
        .iter()
        .chain(aliases.iter())
        .find(|(from, _)| *from == lowered)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(lowered)
}

/// Numeric cell with thousands separators and percent signs stripped.
/// Empty, `nan` and non-finite cells are null.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '%')
        .collect();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// A whole CSV file with normalized headers.
pub struct NormalizedCsv {
    index: HashMap<String, usize>,
    records: Vec<csv::StringRecord>,
}

impl NormalizedCsv {
    pub fn read(path: &Path, aliases: &[(&str, &str)]) -> Result<Self, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| PipelineError::csv(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| PipelineError::csv(path, e))?
            .clone();
        let mut index = HashMap::new();
        for (i, raw) in headers.iter().enumerate() {
            // First occurrence wins when two raw headers normalize alike.
            index.entry(normalize_header(raw, aliases)).or_insert(i);
        }

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PipelineError::csv(path, e))?;

        Ok(Self {
            index,
            records,
        })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = CsvRow<'_>> {
        self.records.iter().map(move |record| CsvRow {
            index: &self.index,
            record,
        })
    }
}

/// One record of a [`NormalizedCsv`], addressed by normalized column name.
pub struct CsvRow<'a> {
    index: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl CsvRow<'_> {
    pub fn text(&self, column: &str) -> Option<&str> {
        let i = *self.index.get(column)?;
        self.record.get(i).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.text(column).and_then(parse_number)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.text(column).and_then(parse_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Ticker ", &[]), "symbol");
        assert_eq!(normalize_header("TIME", &[]), "date");
        assert_eq!(normalize_header("Assets  Equity", &[]), "assets_equity");
        assert_eq!(normalize_header("ROE (%)", &[("roe_(%)", "roe")]), "roe");
        assert_eq!(normalize_header("Năm", &[("năm", "year")]), "year");
    }

    #[test]
    fn test_parse_number_cleaning() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number("12.5%"), Some(12.5));
        assert_eq!(parse_number("nan"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 5, 17);
        assert_eq!(parse_date("2021-05-17"), expected);
        assert_eq!(parse_date("2021/05/17"), expected);
        assert_eq!(parse_date("17/05/2021"), expected);
        assert_eq!(parse_date("2021-05-17 00:00:00"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_read_normalizes_headers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Ticker,Time,Close").unwrap();
        writeln!(file, "VCB,2024-01-02,\"90,100\"").unwrap();

        let csv = NormalizedCsv::read(file.path(), &[]).unwrap();
        assert!(csv.has_column("symbol"));
        let row = csv.rows().next().unwrap();
        assert_eq!(row.text("symbol"), Some("VCB"));
        assert_eq!(row.number("close"), Some(90100.0));
        assert_eq!(row.date("date"), NaiveDate::from_ymd_opt(2024, 1, 2));
    }
}
