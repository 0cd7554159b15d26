use crate::core::{bounded_scan, named_lookup, whole_sheet_scan, Bounds, ScanWindow};
use crate::error::{ProbeError, ProbeResult};
use crate::excel::coordinate::column_to_letters;
use crate::excel::{Frame, SheetSource, TableSource, Workbook};
use crate::profile::{self, CellProfile, NamedCellMap};
use crate::report::Report;
use crate::types::{LoadMode, Significance};
use colored::Colorize;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How a tabular section lays out each sheet
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    /// First row names the columns
    pub header: bool,
    /// Rows shown when no explicit slice is given
    pub head: usize,
    /// Zero-based, half-open positional slice
    pub rows: Option<Range<usize>>,
    pub columns: Option<Range<usize>>,
}

impl Default for TableView {
    fn default() -> Self {
        Self {
            header: true,
            head: crate::excel::DEFAULT_HEAD,
            rows: None,
            columns: None,
        }
    }
}

impl TableView {
    /// Apply 1-based inclusive `--rows` / `--cols` bounds as a positional slice
    pub fn with_bounds(mut self, rows: Option<Bounds>, columns: Option<Bounds>) -> Self {
        self.rows = rows.map(to_positions);
        self.columns = columns.map(to_positions);
        self
    }

    fn apply(&self, frame: &Frame) -> Frame {
        if self.rows.is_none() && self.columns.is_none() {
            return frame.head(self.head);
        }
        let rows = self.rows.clone().unwrap_or(0..self.head);
        let columns = self.columns.clone().unwrap_or(0..frame.columns.len());
        frame.slice(rows, columns)
    }
}

fn to_positions(bounds: Bounds) -> Range<usize> {
    (bounds.start as usize - 1)..bounds.end as usize
}

fn describe(rows: Bounds, columns: Bounds) -> String {
    format!(
        "rows {}-{}, columns {}-{}",
        rows.start,
        rows.end,
        column_to_letters(columns.start),
        column_to_letters(columns.end)
    )
}

fn load_mode(values: bool) -> LoadMode {
    if values {
        LoadMode::Values
    } else {
        LoadMode::Formulas
    }
}

fn banner(title: &str, file: &Path) {
    println!("{}", format!("🔍 Probe - {}", title).bold().green());
    println!("   File: {}\n", file.display());
}

//==============================================================================
// Tabular fallback
//==============================================================================

/// Append a tabular preview of each sheet. A sheet that cannot be read as a
/// table gets an inline message and the next sheet is still attempted.
pub fn tabular_section<T: TableSource>(
    report: &mut Report,
    source: &mut T,
    sheets: &[String],
    view: &TableView,
) {
    for sheet in sheets {
        match source.read_table(sheet, view.header) {
            Ok(frame) => report.table(&frame, &view.apply(&frame)),
            Err(e) => {
                warn!(sheet = sheet.as_str(), error = %e, "tabular read failed");
                report.note(&format!("Sheet: {}", sheet));
                report.table_failure(&e);
            }
        }
    }
}

/// Tabular section read through a fresh values-only handle. The handle is
/// opened here because a formulas-visible handle cannot serve cached values.
fn values_section(report: &mut Report, file: &Path, sheets: &[String], view: &TableView) {
    match Workbook::open(file, LoadMode::Values) {
        Ok(mut values) => tabular_section(report, &mut values, sheets, view),
        Err(e) => {
            warn!(error = %e, "values-only reopen failed");
            report.table_failure(&e);
        }
    }
}

//==============================================================================
// sheets
//==============================================================================

pub fn sheets_report(file: &Path) -> ProbeResult<String> {
    let workbook = Workbook::open(file, LoadMode::Formulas)?;
    let mut report = Report::new();
    report.sheet_list(workbook.sheet_names());
    Ok(report.finish())
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> ProbeResult<()> {
    let text = sheets_report(&file)?;
    banner("Sheets", &file);
    print!("{}", text);
    Ok(())
}

//==============================================================================
// scan
//==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub values: bool,
    pub window: ScanWindow,
    /// Tabular section after the cell dump; `None` skips it
    pub table: Option<TableView>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            values: false,
            window: ScanWindow::default(),
            table: Some(TableView::default()),
        }
    }
}

pub fn scan_report(file: &Path, options: &ScanOptions) -> ProbeResult<String> {
    let mut workbook = Workbook::open(file, load_mode(options.values))?;
    let names = workbook.sheet_names().to_vec();
    let sections = whole_sheet_scan(&mut workbook, options.window)?;

    let mut report = Report::new();
    report.sheet_list(&names);
    for section in &sections {
        report.sheet_section(section, options.window.rows);
    }

    if let Some(view) = &options.table {
        report.header("DATA AS TABLES");
        if workbook.mode() == LoadMode::Values {
            tabular_section(&mut report, &mut workbook, &names, view);
        } else {
            values_section(&mut report, file, &names, view);
        }
    }

    info!(sheets = sections.len(), "whole-sheet scan complete");
    Ok(report.finish())
}

/// Execute the scan command
pub fn scan(file: PathBuf, options: ScanOptions) -> ProbeResult<()> {
    let text = scan_report(&file, &options)?;
    banner("Workbook Scan", &file);
    print!("{}", text);
    Ok(())
}

//==============================================================================
// cells
//==============================================================================

/// Resolve the named-cell map from a profile file and/or `C6=Label` pairs.
/// The profile's sheet is used unless one is given explicitly.
pub fn resolve_profile(
    sheet: Option<String>,
    map_file: Option<&Path>,
    assignments: &[String],
) -> ProbeResult<CellProfile> {
    let loaded = match map_file {
        Some(path) => Some(CellProfile::load(path)?),
        None => None,
    };

    let sheet = match (sheet, loaded.as_ref()) {
        (Some(s), _) => s,
        (None, Some(p)) => p.sheet.clone(),
        (None, None) => {
            return Err(ProbeError::Profile(
                "no sheet given (use --sheet or a profile file)".to_string(),
            ))
        }
    };

    let mut cells = loaded.map(|p| p.cells).unwrap_or_default();
    for (at, label) in NamedCellMap::from_assignments(assignments)?.iter() {
        cells.insert(&at.to_string(), label)?;
    }

    if cells.is_empty() {
        return Err(ProbeError::Profile(
            "no cells named (use --map or --cell COORDINATE=LABEL)".to_string(),
        ));
    }

    Ok(CellProfile { sheet, cells })
}

pub fn cells_report(file: &Path, profile: &CellProfile, values: bool) -> ProbeResult<String> {
    let mut workbook = Workbook::open(file, load_mode(values))?;
    let sheet = workbook.grid(&profile.sheet)?;

    let mut report = Report::new();
    report.header(&format!("Named cells on sheet {}", profile.sheet));
    report.rows(&named_lookup(&sheet, &profile.cells));
    report.rule();
    Ok(report.finish())
}

/// Execute the cells command
pub fn cells(
    file: PathBuf,
    sheet: Option<String>,
    map_file: Option<PathBuf>,
    assignments: Vec<String>,
    values: bool,
) -> ProbeResult<()> {
    let profile = resolve_profile(sheet, map_file.as_deref(), &assignments)?;
    let text = cells_report(&file, &profile, values)?;
    banner("Named Cells", &file);
    print!("{}", text);
    Ok(())
}

//==============================================================================
// range
//==============================================================================

pub fn range_report(
    file: &Path,
    sheet: &str,
    rows: Bounds,
    columns: Bounds,
    significance: Significance,
    values: bool,
) -> ProbeResult<String> {
    let mut workbook = Workbook::open(file, load_mode(values))?;
    let grid = workbook.grid(sheet)?;

    let mut report = Report::new();
    report.header(&format!(
        "Range scan on sheet {} ({}, significance {})",
        sheet,
        describe(rows, columns),
        significance
    ));
    report.rows(&bounded_scan(&grid, rows, columns, significance));
    report.rule();
    Ok(report.finish())
}

/// Execute the range command
pub fn range(
    file: PathBuf,
    sheet: String,
    rows: String,
    columns: String,
    significance: Significance,
    values: bool,
) -> ProbeResult<()> {
    let rows = Bounds::parse_rows(&rows)?;
    let columns = Bounds::parse_columns(&columns)?;
    let text = range_report(&file, &sheet, rows, columns, significance, values)?;
    banner("Range Scan", &file);
    print!("{}", text);
    Ok(())
}

//==============================================================================
// table
//==============================================================================

pub fn table_report(file: &Path, sheet: Option<&str>, view: &TableView) -> ProbeResult<String> {
    let mut workbook = Workbook::open(file, LoadMode::Values)?;
    let sheets = match sheet {
        Some(name) => {
            workbook.ensure_sheet(name)?;
            vec![name.to_string()]
        }
        None => workbook.sheet_names().to_vec(),
    };

    let mut report = Report::new();
    report.header("DATA AS TABLES");
    tabular_section(&mut report, &mut workbook, &sheets, view);
    Ok(report.finish())
}

/// Execute the table command
pub fn table(
    file: PathBuf,
    sheet: Option<String>,
    view: TableView,
) -> ProbeResult<()> {
    let text = table_report(&file, sheet.as_deref(), &view)?;
    banner("Tables", &file);
    print!("{}", text);
    Ok(())
}

//==============================================================================
// hydraulics
//==============================================================================

/// Append a section, or an inline note when the section's sheet is missing
fn recoverable<F>(report: &mut Report, build: F) -> ProbeResult<()>
where
    F: FnOnce(&mut Report) -> ProbeResult<()>,
{
    let mut section = Report::new();
    match build(&mut section) {
        Ok(()) => {
            report.append(section);
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            warn!(error = %e, "section skipped");
            report.section_failure(&e);
            report.rule();
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Detailed analysis of the sewer network sizing workbook: the Manning's
/// iteration cells on `CH`, their neighbourhood, their cached values, and
/// the hydraulic block of the main flow sheet.
pub fn hydraulics_report(file: &Path) -> ProbeResult<String> {
    let mut workbook = Workbook::open(file, LoadMode::Formulas)?;
    let cells = profile::hydraulic_cells()?;

    let mut report = Report::new();
    report.header("HYDRAULIC MODEL FORMULAS");
    report.gap();

    recoverable(&mut report, |section| {
        let sheet = workbook.grid(profile::HYDRAULIC_SHEET)?;
        section.header(&format!("Named cells on sheet {}", profile::HYDRAULIC_SHEET));
        section.rows(&named_lookup(&sheet, &cells));
        section.rule();

        let rows = Bounds::new(5, 6)?;
        let columns = Bounds::new(1, 32)?;
        section.header(&format!(
            "Iteration columns on sheet {} ({})",
            profile::HYDRAULIC_SHEET,
            describe(rows, columns)
        ));
        section.rows(&bounded_scan(&sheet, rows, columns, Significance::NonZero));
        section.rule();
        Ok(())
    })?;

    if workbook.ensure_sheet(profile::HYDRAULIC_SHEET).is_ok() {
        let rows = Bounds::new(5, 7)?;
        let columns = Bounds::parse_columns("C:O")?;
        report.header(&format!(
            "Cached values on sheet {} ({})",
            profile::HYDRAULIC_SHEET,
            describe(rows, columns)
        ));
        let view = TableView {
            header: false,
            ..TableView::default()
        }
        .with_bounds(Some(rows), Some(columns));
        values_section(
            &mut report,
            file,
            &[profile::HYDRAULIC_SHEET.to_string()],
            &view,
        );
        report.rule();
    }

    recoverable(&mut report, |section| {
        let sheet = workbook.grid(profile::FLOW_SHEET)?;
        let rows = Bounds::new(20, 29)?;
        let columns = Bounds::new(1, 9)?;
        section.header(&format!(
            "Hydraulic block on sheet {} ({})",
            profile::FLOW_SHEET,
            describe(rows, columns)
        ));
        section.rows(&bounded_scan(
            &sheet,
            rows,
            columns,
            Significance::AboveNoise,
        ));
        section.rule();
        Ok(())
    })?;

    Ok(report.finish())
}

/// Execute the hydraulics command
pub fn hydraulics(file: PathBuf) -> ProbeResult<()> {
    let text = hydraulics_report(&file)?;
    banner("Hydraulic Model", &file);
    print!("{}", text);
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
