//! Per-column descriptive statistics.

use crate::model::{ColumnStats, Row, TelemetrySummary};
use crate::parser::parse;
use std::collections::BTreeMap;
use tracing::debug;

/// Absolute z-score at or above which a value counts as an outlier.
pub const OUTLIER_Z: f64 = 2.0;

/// Compute stats for every header that has at least one numeric cell.
///
/// Columns with no numeric cells are absent from the result.
pub fn compute_stats(rows: &[Row], headers: &[String]) -> BTreeMap<String, ColumnStats> {
    let mut out = BTreeMap::new();

    for header in headers {
        if out.contains_key(header) {
            continue;
        }
        let values: Vec<f64> = rows
            .iter()
            .filter_map(|row| row.get(header).and_then(|c| c.as_number()))
            .collect();
        if let Some(stats) = column_stats(&values) {
            out.insert(header.clone(), stats);
        }
    }

    out
}

/// Parse CSV text and summarise it in one step.
pub fn summarize(text: &str) -> TelemetrySummary {
    let parsed = parse(text);
    let stats = compute_stats(&parsed.rows, &parsed.headers);
    debug!(
        columns = parsed.headers.len(),
        numeric_columns = stats.len(),
        rows = parsed.rows.len(),
        "Telemetry summarised"
    );
    TelemetrySummary {
        headers: parsed.headers,
        stats,
        row_count: parsed.rows.len(),
    }
}

fn column_stats(values: &[f64]) -> Option<ColumnStats> {
    let (&first, &last) = (values.first()?, values.last()?);
    let n = values.len();

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Constant columns are pinned exactly; summing would drift by an ulp.
    if min == max {
        return Some(ColumnStats {
            n,
            min,
            max,
            mean: min,
            std: 0.0,
            trend: last - first,
            outlier_count: 0,
        });
    }

    let mean = (values.iter().sum::<f64>() / n as f64).clamp(min, max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let std = variance.sqrt();

    let outlier_count = if std > 0.0 {
        values
            .iter()
            .filter(|v| ((*v - mean) / std).abs() >= OUTLIER_Z)
            .count()
    } else {
        0
    };

    Some(ColumnStats {
        n,
        min,
        max,
        mean,
        std,
        trend: last - first,
        outlier_count,
    })
}
