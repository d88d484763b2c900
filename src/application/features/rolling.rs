//! Backward-looking window primitives over one symbol's ordered series.
//!
//! Every output at index `i` reads inputs at indices `<= i` only, and a window
//! result is null unless every value in the window is present.

use crate::domain::feature_table::finite;
use statrs::statistics::{Data, Distribution};

/// Percentage change over `k` rows: `v[i] / v[i-k] - 1`.
pub fn pct_change(values: &[f64], k: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i < k {
                return None;
            }
            finite(values[i] / values[i - k] - 1.0)
        })
        .collect()
}

/// Value `k` rows earlier.
pub fn lag(values: &[Option<f64>], k: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i < k { None } else { values[i - k] })
        .collect()
}

/// The full window ending at `i`, or `None` if it is short or has a gap.
fn full_window(values: &[Option<f64>], i: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || i + 1 < window {
        return None;
    }
    values[i + 1 - window..=i].iter().copied().collect()
}

pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let w = full_window(values, i, window)?;
            mean(&w)
        })
        .collect()
}

/// Rolling sample standard deviation (n - 1 denominator).
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let w = full_window(values, i, window)?;
            sample_std(&w)
        })
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Data::new(values.to_vec()).mean().and_then(finite)
}

/// Sample standard deviation; needs at least two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Data::new(values.to_vec()).std_dev().and_then(finite)
}

/// `numerator / denominator`, null when the denominator is exactly zero.
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => finite(n / d),
        _ => None,
    }
}
