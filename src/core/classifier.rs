//! Cell classification - the single place that decides what a cell holds
//! and whether it is worth showing.

use crate::types::{CellKind, ClassifiedCell, RawContent, FORMULA_MARKER};

/// Classify raw cell content against a significance threshold.
///
/// Numbers are `Numeric` only when `abs(value) > threshold`; anything else
/// numeric is `Insignificant`. Text starting with `=` is a formula and is
/// displayed verbatim. Contents the loader could not type (booleans, error
/// codes, dates) degrade to `Text`.
pub fn classify(raw: &RawContent, threshold: f64) -> ClassifiedCell {
    match raw {
        RawContent::Text(text) if text.starts_with(FORMULA_MARKER) => {
            cell(CellKind::Formula, text.clone())
        }
        RawContent::Number(value) => {
            let kind = if value.abs() > threshold {
                CellKind::Numeric
            } else {
                CellKind::Insignificant
            };
            cell(kind, format_number(*value))
        }
        RawContent::Text(text) if text.is_empty() => cell(CellKind::Empty, String::new()),
        RawContent::Text(text) | RawContent::Other(text) => cell(CellKind::Text, text.clone()),
        RawContent::Empty => cell(CellKind::Empty, String::new()),
    }
}

fn cell(kind: CellKind, display_value: String) -> ClassifiedCell {
    ClassifiedCell {
        kind,
        display_value,
    }
}

/// Format a stored number the way the workbook shows it: integral values
/// without a fractional part, everything else at full precision
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
