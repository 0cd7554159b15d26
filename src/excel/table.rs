//! Values-only tabular read of a sheet
//!
//! Treats a sheet as a homogeneous grid from A1 to its last used cell, the way
//! a data-frame loader would, so the cached results of formula cells can be
//! eyeballed next to the formula dump.

use crate::core::classifier::format_number;
use crate::error::{ProbeError, ProbeResult};
use crate::excel::loader::{Sheet, SheetSource, Workbook};
use crate::excel::CellRef;
use crate::types::{LoadMode, RawContent};
use std::ops::Range;
use tracing::warn;

/// Rows shown by default when previewing a table
pub const DEFAULT_HEAD: usize = 5;

/// Anything that can read a sheet as a table of cached values
pub trait TableSource {
    fn read_table(&mut self, sheet: &str, header: bool) -> ProbeResult<Frame>;
}

/// A rectangular table of rendered cell values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub sheet: String,
    pub columns: Vec<String>,
    /// Zero-based position of each row in the data (after the header row)
    pub index: Vec<usize>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    /// Lay a sheet out as a table. With `header`, the first row names the columns.
    pub fn from_sheet(sheet: &Sheet, header: bool) -> Self {
        let height = sheet.row_count();
        let width = sheet.column_count();

        let render_row = |row: u32| -> Vec<String> {
            (1..=width)
                .map(|col| display_raw(sheet.cell(CellRef::new(row, col))))
                .collect()
        };

        let (columns, first_data_row) = if header && height > 0 {
            let names = render_row(1)
                .into_iter()
                .enumerate()
                .map(|(i, name)| {
                    if name.is_empty() {
                        format!("Unnamed: {}", i)
                    } else {
                        name
                    }
                })
                .collect();
            (names, 2)
        } else {
            ((0..width).map(|i| i.to_string()).collect(), 1)
        };

        let rows: Vec<Vec<String>> = (first_data_row..=height).map(render_row).collect();

        Self {
            sheet: sheet.name().to_string(),
            columns,
            index: (0..rows.len()).collect(),
            rows,
        }
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Self {
        self.slice(0..n, 0..self.columns.len())
    }

    /// Positional, half-open, zero-based slice; out-of-range parts are clipped
    pub fn slice(&self, rows: Range<usize>, columns: Range<usize>) -> Self {
        let rows = clip(rows, self.rows.len());
        let columns = clip(columns, self.columns.len());

        Self {
            sheet: self.sheet.clone(),
            columns: self.columns[columns.clone()].to_vec(),
            index: self.index[rows.clone()].to_vec(),
            rows: self.rows[rows]
                .iter()
                .map(|row| row[columns.clone()].to_vec())
                .collect(),
        }
    }
}

fn clip(range: Range<usize>, len: usize) -> Range<usize> {
    let end = range.end.min(len);
    range.start.min(end)..end
}

fn display_raw(raw: &RawContent) -> String {
    match raw {
        RawContent::Empty => String::new(),
        RawContent::Number(n) => format_number(*n),
        RawContent::Text(s) | RawContent::Other(s) => s.clone(),
    }
}

impl TableSource for Workbook {
    fn read_table(&mut self, sheet: &str, header: bool) -> ProbeResult<Frame> {
        if self.mode() != LoadMode::Values {
            return Err(ProbeError::ModeMismatch {
                expected: LoadMode::Values.as_str(),
                actual: self.mode().as_str(),
            });
        }

        let grid = self.grid(sheet).map_err(|e| {
            warn!(sheet, error = %e, "tabular read failed");
            ProbeError::TabularRead {
                sheet: sheet.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Frame::from_sheet(&grid, header))
    }
}
