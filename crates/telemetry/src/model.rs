//! Telemetry data model.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One parsed CSV cell.
///
/// Typing is decided per cell, so a column may mix numbers and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// A data line keyed by column name.
pub type Row = HashMap<String, Cell>;

/// Descriptive statistics for one column's numeric cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    /// Numeric cells counted (text cells are excluded)
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation (divides by `n`)
    pub std: f64,
    /// Last numeric value minus first, in row order
    pub trend: f64,
    /// Values with |z| >= 2; zero when `std` is zero
    pub outlier_count: usize,
}

/// The result of analysing one CSV upload. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySummary {
    /// Every column name, in header order
    pub headers: Vec<String>,
    /// Only columns with at least one numeric cell appear here
    pub stats: BTreeMap<String, ColumnStats>,
    pub row_count: usize,
}

impl TelemetrySummary {
    /// Stats in header order, skipping columns without numeric cells.
    pub fn ordered_stats(&self) -> impl Iterator<Item = (&str, &ColumnStats)> {
        let mut seen = std::collections::HashSet::new();
        self.headers.iter().filter_map(move |h| {
            if !seen.insert(h.as_str()) {
                return None;
            }
            self.stats.get(h).map(|s| (h.as_str(), s))
        })
    }
}
