//! Plain-text report rendering
//!
//! Serializes scan results and loader metadata in call order. No
//! classification happens here; every row arrives already classified.

use crate::error::ProbeError;
use crate::excel::Frame;
use crate::types::{CellKind, ScanRow, SheetSection};
use std::fmt::Write;

const RULE: &str = "==================================================";
const UNDERLINE: &str = "------------------------------";

/// Shown for a named cell that holds nothing
pub const NO_VALUE: &str = "(no value)";

/// Accumulates report text section by section
#[derive(Debug, Default)]
pub struct Report {
    out: String,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    /// Blank line
    pub fn gap(&mut self) {
        self.out.push('\n');
    }

    /// Section header with underline
    pub fn header(&mut self, title: &str) {
        self.line(title);
        self.line(UNDERLINE);
    }

    /// Closing rule after a section
    pub fn rule(&mut self) {
        self.gap();
        self.line(RULE);
        self.gap();
    }

    pub fn note(&mut self, text: &str) {
        self.line(text);
    }

    pub fn sheet_list(&mut self, names: &[String]) {
        self.line("Sheets available:");
        for name in names {
            self.line(format!("- {}", name));
        }
        self.rule();
    }

    /// One line per row: `{label or coordinate}: {value}`
    pub fn rows(&mut self, rows: &[ScanRow]) {
        for row in rows {
            self.line(render_row(row));
        }
    }

    /// Whole-sheet scan section: name, dimensions, windowed cell dump
    pub fn sheet_section(&mut self, section: &SheetSection, window_rows: u32) {
        self.header(&format!("SHEET: {}", section.name));
        self.line(format!(
            "Dimensions: {} rows x {} columns",
            section.row_count, section.column_count
        ));
        self.gap();
        self.line(format!("Cells with content (first {} rows):", window_rows));
        if section.rows.is_empty() {
            self.line("(none)");
        }
        self.rows(&section.rows);
        self.rule();
    }

    /// Tabular preview of a sheet. `Shape` describes the whole table, the
    /// rendered rows come from `preview`.
    pub fn table(&mut self, full: &Frame, preview: &Frame) {
        let (rows, columns) = full.shape();
        self.line(format!("Sheet: {}", full.sheet));
        self.line(format!("Shape: ({}, {})", rows, columns));
        self.out.push_str(&render_frame(preview));
        self.gap();
    }

    /// Inline message standing in for a table that could not be read
    pub fn table_failure(&mut self, error: &ProbeError) {
        let reason = match error {
            ProbeError::TabularRead { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        self.line(format!("Failed to read as table: {}", reason));
        self.gap();
    }

    /// Inline message standing in for a section that could not be produced
    pub fn section_failure(&mut self, error: &ProbeError) {
        self.line(format!("Skipped: {}", error));
    }

    /// Append another report's text
    pub fn append(&mut self, other: Report) {
        self.out.push_str(&other.out);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// `{label or coordinate}: {display_value}`; empty named cells read `(no value)`
pub fn render_row(row: &ScanRow) -> String {
    let value = match row.cell.kind {
        CellKind::Empty => NO_VALUE,
        _ => row.cell.display_value.as_str(),
    };
    format!("{}: {}", row.caption(), value)
}

/// Right-aligned text table with a leading row index
pub fn render_frame(frame: &Frame) -> String {
    let index_width = frame
        .index
        .iter()
        .map(|i| i.to_string().len())
        .max()
        .unwrap_or(0);

    let widths: Vec<usize> = frame
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| {
            frame
                .rows
                .iter()
                .map(|row| row[c].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = write!(out, "{:width$}", "", width = index_width);
    for (name, width) in frame.columns.iter().zip(&widths) {
        let _ = write!(out, "  {:>width$}", name, width = width);
    }
    out.push('\n');

    for (index, row) in frame.index.iter().zip(&frame.rows) {
        let _ = write!(out, "{:<width$}", index, width = index_width);
        for (value, width) in row.iter().zip(&widths) {
            let _ = write!(out, "  {:>width$}", value, width = width);
        }
        out.push('\n');
    }

    out
}
