//! The (symbol, date) feature table and the keyed column blocks that feed it.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Maps non-finite arithmetic results (division by zero, log of zero) to null.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Feature columns produced by one builder, keyed by its join key.
///
/// `K` is `(symbol, date)` for per-symbol daily groups, `date` for FX,
/// `(symbol, quarter_start)` for fundamentals and `quarter_start` for macro.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBlock<K: Ord> {
    pub columns: Vec<String>,
    pub rows: BTreeMap<K, Vec<Option<f64>>>,
}

impl<K: Ord> ColumnBlock<K> {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: BTreeMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn insert(&mut self, key: K, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.insert(key, values);
    }

    pub fn get(&self, key: &K) -> Option<&Vec<Option<f64>>> {
        self.rows.get(key)
    }

    /// Drops every column with no observed value. Optional sources that are
    /// present but never populate a field must not contribute a column.
    pub fn without_empty_columns(self) -> Self {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&c| self.rows.values().any(|v| v[c].is_some()))
            .collect();
        if keep.len() == self.columns.len() {
            return self;
        }
        let columns = keep.iter().map(|&c| self.columns[c].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|(k, v)| (k, keep.iter().map(|&c| v[c]).collect()))
            .collect();
        Self { columns, rows }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// One row per (symbol, date) of the daily backbone, plus the feature columns
/// that were present for this run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = (String, NaiveDate)>,
    {
        let rows = keys
            .into_iter()
            .map(|(symbol, date)| FeatureRow {
                symbol,
                date,
                values: Vec::new(),
            })
            .collect();
        Self {
            columns: Vec::new(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.values[col])
    }

    /// Appends a column of per-row values. A repeated name replaces the
    /// earlier column so merges stay idempotent.
    pub fn push_column(&mut self, name: &str, values: Vec<Option<f64>>) {
        assert_eq!(
            values.len(),
            self.rows.len(),
            "column {name} does not match backbone cardinality"
        );
        if let Some(col) = self.column_index(name) {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row.values[col] = value;
            }
            return;
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.values.push(value);
        }
    }

    /// Left-joins a keyed block; `key_of` derives the block key from a row.
    /// Unmatched rows receive nulls; the row count never changes.
    pub fn left_join<K, F>(&mut self, block: &ColumnBlock<K>, key_of: F)
    where
        K: Ord,
        F: Fn(&FeatureRow) -> K,
    {
        let matched: Vec<Option<&Vec<Option<f64>>>> =
            self.rows.iter().map(|row| block.get(&key_of(row))).collect();
        let columns: Vec<Vec<Option<f64>>> = (0..block.columns.len())
            .map(|c| {
                matched
                    .iter()
                    .map(|hit| hit.and_then(|values| values[c]))
                    .collect()
            })
            .collect();
        for (name, values) in block.columns.iter().zip(columns) {
            self.push_column(name, values);
        }
    }

    /// Feature vectors in the order of `names`. Names absent from the table
    /// come back as null in every row and are reported in the second value.
    pub fn select(&self, names: &[String]) -> (Vec<Vec<Option<f64>>>, Vec<String>) {
        let positions: Vec<Option<usize>> =
            names.iter().map(|n| self.column_index(n)).collect();
        let missing = names
            .iter()
            .zip(&positions)
            .filter(|(_, p)| p.is_none())
            .map(|(n, _)| n.clone())
            .collect();
        let matrix = self
            .rows
            .iter()
            .map(|row| {
                positions
                    .iter()
                    .map(|p| p.and_then(|c| row.values[c]))
                    .collect()
            })
            .collect();
        (matrix, missing)
    }

    /// Index of the most recent row of every symbol, in symbol order.
    pub fn latest_per_symbol(&self) -> Vec<usize> {
        let mut latest: HashMap<&str, usize> = HashMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            let entry = latest.entry(row.symbol.as_str()).or_insert(i);
            if self.rows[*entry].date <= row.date {
                *entry = i;
            }
        }
        let mut indices: Vec<usize> = latest.into_values().collect();
        indices.sort_by(|&a, &b| self.rows[a].symbol.cmp(&self.rows[b].symbol));
        indices
    }
}
