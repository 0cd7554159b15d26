//! Workbook loader - spreadsheet container → sheet grids

use crate::error::{ProbeError, ProbeResult};
use crate::excel::coordinate::CellRef;
use crate::types::{LoadMode, RawContent, FORMULA_MARKER};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

static EMPTY: RawContent = RawContent::Empty;

/// Anything that can hand out sheet grids by name
pub trait SheetSource {
    /// Sheet names in definition order
    fn sheet_names(&self) -> &[String];

    /// Load the grid of one sheet
    fn grid(&mut self, name: &str) -> ProbeResult<Sheet>;
}

/// One named, sparse, 1-based grid of cells
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    name: String,
    row_count: u32,
    column_count: u32,
    cells: BTreeMap<CellRef, RawContent>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a sheet from cells; dimensions grow to cover every non-empty cell
    pub fn from_cells<I>(name: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = (CellRef, RawContent)>,
    {
        let mut sheet = Self::new(name);
        for (at, content) in cells {
            sheet.insert(at, content);
        }
        sheet
    }

    /// Override the reported dimensions (the container's used range can be
    /// larger than its non-empty cells)
    pub fn with_dimensions(mut self, row_count: u32, column_count: u32) -> Self {
        self.row_count = self.row_count.max(row_count);
        self.column_count = self.column_count.max(column_count);
        self
    }

    fn insert(&mut self, at: CellRef, content: RawContent) {
        if content.is_empty() {
            return;
        }
        self.row_count = self.row_count.max(at.row);
        self.column_count = self.column_count.max(at.col);
        self.cells.insert(at, content);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    /// Raw content at a position; unaddressed positions are `Empty`
    pub fn cell(&self, at: CellRef) -> &RawContent {
        self.cells.get(&at).unwrap_or(&EMPTY)
    }

    /// Raw content at an A1 coordinate
    pub fn cell_at(&self, coordinate: &str) -> ProbeResult<&RawContent> {
        Ok(self.cell(CellRef::parse(coordinate)?))
    }

    /// Non-empty cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &RawContent)> {
        self.cells.iter().map(|(at, content)| (*at, content))
    }
}

/// An opened spreadsheet container, read in one fixed [`LoadMode`]
pub struct Workbook {
    path: PathBuf,
    mode: LoadMode,
    sheet_names: Vec<String>,
    reader: Sheets<BufReader<File>>,
}

impl Workbook {
    /// Open a workbook. Fails with `FileAccess` when the path is missing,
    /// unreadable, not a spreadsheet, or holds no sheets.
    pub fn open<P: AsRef<Path>>(path: P, mode: LoadMode) -> ProbeResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file_access = |reason: String| ProbeError::FileAccess {
            path: path.display().to_string(),
            reason,
        };

        if !path.is_file() {
            return Err(file_access("file not found".to_string()));
        }

        let reader = open_workbook_auto(&path).map_err(|e| file_access(e.to_string()))?;
        let sheet_names = reader.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(file_access("workbook contains no sheets".to_string()));
        }

        info!(
            path = %path.display(),
            mode = %mode,
            sheets = sheet_names.len(),
            "opened workbook"
        );

        Ok(Self {
            path,
            mode,
            sheet_names,
            reader,
        })
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Fail with `UnknownSheet` unless `name` is one of this workbook's sheets
    pub fn ensure_sheet(&self, name: &str) -> ProbeResult<()> {
        if self.sheet_names.iter().any(|s| s == name) {
            Ok(())
        } else {
            Err(ProbeError::UnknownSheet {
                name: name.to_string(),
                available: self.sheet_names.clone(),
            })
        }
    }

    /// Cached values of a sheet, as stored in the container
    fn value_range(&mut self, name: &str) -> ProbeResult<Range<Data>> {
        self.ensure_sheet(name)?;
        self.reader
            .worksheet_range(name)
            .map_err(|e| sheet_read_error(&self.path, name, e))
    }

    fn formula_range(&mut self, name: &str) -> ProbeResult<Range<String>> {
        self.reader
            .worksheet_formula(name)
            .map_err(|e| sheet_read_error(&self.path, name, e))
    }
}

/// A sheet that fails to load after the container opened cleanly
fn sheet_read_error(path: &Path, sheet: &str, e: impl std::fmt::Display) -> ProbeError {
    ProbeError::SheetRead {
        path: path.display().to_string(),
        sheet: sheet.to_string(),
        reason: e.to_string(),
    }
}

impl SheetSource for Workbook {
    fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    fn grid(&mut self, name: &str) -> ProbeResult<Sheet> {
        let values = self.value_range(name)?;
        let mut sheet = Sheet::new(name);
        let (mut rows, mut cols) = range_dimensions(&values);

        for (at, data) in absolute_cells(&values) {
            sheet.insert(at, raw_from_data(data));
        }

        if self.mode == LoadMode::Formulas {
            let formulas = self.formula_range(name)?;
            let (formula_rows, formula_cols) = range_dimensions(&formulas);
            rows = rows.max(formula_rows);
            cols = cols.max(formula_cols);

            for (at, formula) in absolute_cells(&formulas) {
                sheet.insert(at, RawContent::Text(with_formula_marker(formula)));
            }
        }

        debug!(
            sheet = name,
            rows,
            cols,
            cells = sheet.cells.len(),
            "loaded sheet grid"
        );

        Ok(sheet.with_dimensions(rows, cols))
    }
}

/// Used cells of a calamine range, keyed by absolute 1-based position
fn absolute_cells<T>(range: &Range<T>) -> impl Iterator<Item = (CellRef, &T)>
where
    T: calamine::CellType,
{
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    range.used_cells().map(move |(row, col, value)| {
        (
            CellRef::from_zero_based((start_row + row as u32, start_col + col as u32)),
            value,
        )
    })
}

/// 1-based (max_row, max_column) of a range, counted from A1
fn range_dimensions<T>(range: &Range<T>) -> (u32, u32)
where
    T: calamine::CellType,
{
    match range.end() {
        Some((row, col)) if !range.is_empty() => (row + 1, col + 1),
        _ => (0, 0),
    }
}

/// calamine reports formulas without their leading marker
fn with_formula_marker(formula: &str) -> String {
    if formula.starts_with(FORMULA_MARKER) {
        formula.to_string()
    } else {
        format!("{}{}", FORMULA_MARKER, formula)
    }
}

/// Map a stored calamine value onto the loader's raw content variants
fn raw_from_data(data: &Data) -> RawContent {
    match data {
        Data::Empty => RawContent::Empty,
        Data::Int(i) => RawContent::Number(*i as f64),
        Data::Float(f) => RawContent::Number(*f),
        Data::String(s) if s.is_empty() => RawContent::Empty,
        Data::String(s) => RawContent::Text(s.clone()),
        other => RawContent::Other(other.to_string()),
    }
}
