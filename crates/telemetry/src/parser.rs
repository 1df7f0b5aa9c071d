//! CSV parsing into loosely typed rows.
//!
//! Leading and trailing whitespace of the document is dropped and the first
//! line is the header. A blank line inside the data is still a row, with
//! every cell empty. Cells are split on commas with no quoting rules; every
//! header and cell is trimmed. A cell becomes a number only when it is a
//! plain decimal literal (optional minus, digits, optional fraction).
//! Anything else, including a leading `+` or an exponent, stays text.

use crate::model::{Cell, Row};
use regex_lite::Regex;
use std::sync::LazyLock;

static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?$").expect("numeric literal pattern compiles")
});

/// Headers and rows of one CSV document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parsed {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Parse CSV text. Never fails; empty input yields empty headers and rows.
pub fn parse(text: &str) -> Parsed {
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Parsed::default();
    }

    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));

    let Some(header_line) = lines.next() else {
        return Parsed::default();
    };

    let headers: Vec<String> = header_line
        .split(',')
        .map(|h| h.trim().to_string())
        .collect();

    let rows = lines
        .map(|line| {
            let mut cells = line.split(',');
            headers
                .iter()
                .map(|h| (h.clone(), to_cell(cells.next().unwrap_or(""))))
                .collect::<Row>()
        })
        .collect();

    Parsed { headers, rows }
}

/// Type a single raw cell.
fn to_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && NUMERIC_LITERAL.is_match(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Cell::Number(n);
            }
        }
    }
    Cell::Text(trimmed.to_string())
}
