//! Condensing a summary into the digest stored in a session's context.

use crate::model::TelemetrySummary;
use serde::{Deserialize, Serialize};

/// What a session remembers about its latest telemetry analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryDigest {
    pub row_count: usize,
    pub headers: Vec<String>,
    /// One line naming trend and outliers for the first few numeric columns
    pub notable: String,
    /// Free-text analysis produced for this upload
    pub analysis: String,
}

impl TelemetryDigest {
    /// Build a digest listing up to `notable_columns` columns in header order.
    pub fn from_summary(
        summary: &TelemetrySummary,
        analysis: impl Into<String>,
        notable_columns: usize,
    ) -> Self {
        let notable: Vec<String> = summary
            .ordered_stats()
            .take(notable_columns)
            .map(|(name, s)| format!("{name}: trend {:+.2}, outliers {}", s.trend, s.outlier_count))
            .collect();

        Self {
            row_count: summary.row_count,
            headers: summary.headers.clone(),
            notable: if notable.is_empty() {
                "no numeric columns".into()
            } else {
                notable.join("; ")
            },
            analysis: analysis.into(),
        }
    }
}
