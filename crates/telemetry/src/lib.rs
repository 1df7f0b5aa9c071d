//! Lap telemetry statistics for Pitwall.
//!
//! Parses batch CSV exports into loosely typed rows and computes
//! descriptive statistics per numeric column: range, mean, population
//! standard deviation, first-to-last trend, and z-score outlier count.
//!
//! Everything here is a total function. Malformed cells are kept as text,
//! empty input yields an empty summary, and nothing panics or errors.

pub mod digest;
pub mod model;
pub mod parser;
pub mod stats;

pub use digest::TelemetryDigest;
pub use model::{Cell, ColumnStats, Row, TelemetrySummary};
pub use parser::{Parsed, parse};
pub use stats::{OUTLIER_Z, compute_stats, summarize};
