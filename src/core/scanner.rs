//! Scan strategies: named-cell lookup, bounded range scan and whole-sheet scan.
//!
//! All three classify through [`classify`] and derive coordinates through
//! [`CellRef`], so a cell reports identically whichever strategy finds it.

use crate::core::classifier::classify;
use crate::error::{ProbeError, ProbeResult};
use crate::excel::coordinate::{letters_to_column, MAX_COLUMN, MAX_ROW};
use crate::excel::{CellRef, Sheet, SheetSource};
use crate::profile::NamedCellMap;
use crate::types::{ScanRow, SheetSection, Significance};
use tracing::debug;

/// Inclusive, 1-based bounds along one axis. `end < start` is an empty span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub start: u32,
    pub end: u32,
}

impl Bounds {
    /// Validated bounds for caller input
    pub fn new(start: u32, end: u32) -> ProbeResult<Self> {
        if start == 0 {
            return Err(ProbeError::InvalidRange(format!(
                "{}:{} (bounds are 1-based)",
                start, end
            )));
        }
        if end < start {
            return Err(ProbeError::InvalidRange(format!(
                "{}:{} (end before start)",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// First `len` positions, clipped to `limit`
    pub fn leading(len: u32, limit: u32) -> Self {
        Self {
            start: 1,
            end: len.min(limit),
        }
    }

    /// Parse row bounds: `5:6` or `5`
    pub fn parse_rows(text: &str) -> ProbeResult<Self> {
        Self::parse_with(text, MAX_ROW, |part| {
            part.parse::<u32>()
                .map_err(|_| ProbeError::InvalidRange(text.to_string()))
        })
    }

    /// Parse column bounds: `1:32`, `C:O` or `C`
    pub fn parse_columns(text: &str) -> ProbeResult<Self> {
        Self::parse_with(text, MAX_COLUMN, |part| {
            if part.chars().all(|c| c.is_ascii_digit()) {
                part.parse::<u32>()
                    .map_err(|_| ProbeError::InvalidRange(text.to_string()))
            } else {
                letters_to_column(part).map_err(|_| ProbeError::InvalidRange(text.to_string()))
            }
        })
    }

    fn parse_with<F>(text: &str, limit: u32, parse_part: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> ProbeResult<u32>,
    {
        let (start, end) = match text.trim().split_once(':') {
            Some((a, b)) => (parse_part(a.trim())?, parse_part(b.trim())?),
            None => {
                let single = parse_part(text.trim())?;
                (single, single)
            }
        };
        if end > limit {
            return Err(ProbeError::InvalidRange(format!(
                "{} (beyond the last addressable position {})",
                text, limit
            )));
        }
        Self::new(start, end)
    }

    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Size of the inspection window a whole-sheet scan looks at on each sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub rows: u32,
    pub columns: u32,
}

impl ScanWindow {
    pub const DEFAULT_ROWS: u32 = 20;
    pub const DEFAULT_COLUMNS: u32 = 9;
}

impl Default for ScanWindow {
    fn default() -> Self {
        Self {
            rows: Self::DEFAULT_ROWS,
            columns: Self::DEFAULT_COLUMNS,
        }
    }
}

/// Render each named cell once, in map order, including empty ones
pub fn named_lookup(sheet: &Sheet, names: &NamedCellMap) -> Vec<ScanRow> {
    names
        .iter()
        .map(|(at, label)| ScanRow {
            coordinate: at,
            label: Some(label.to_string()),
            cell: classify(sheet.cell(at), Significance::NonZero.threshold()),
        })
        .collect()
}

/// Row-major scan of a rectangle, keeping only formulas, text and
/// significant numbers
pub fn bounded_scan(
    sheet: &Sheet,
    rows: Bounds,
    columns: Bounds,
    significance: Significance,
) -> Vec<ScanRow> {
    let threshold = significance.threshold();
    // Positions past the sheet's dimensions are empty
    let last_row = rows.end.min(sheet.row_count());
    let last_col = columns.end.min(sheet.column_count());

    let mut found = Vec::new();
    for row in rows.start..=last_row {
        for col in columns.start..=last_col {
            let at = CellRef::new(row, col);
            let cell = classify(sheet.cell(at), threshold);
            if cell.kind.is_suppressed() {
                continue;
            }
            found.push(ScanRow {
                coordinate: at,
                label: None,
                cell,
            });
        }
    }

    debug!(
        sheet = sheet.name(),
        rows = rows.len(),
        columns = columns.len(),
        significance = %significance,
        found = found.len(),
        "bounded scan"
    );
    found
}

/// Dimensions and windowed cell dump of one sheet
pub fn scan_sheet(sheet: &Sheet, window: ScanWindow) -> SheetSection {
    let rows = Bounds::leading(window.rows, sheet.row_count());
    let columns = Bounds::leading(window.columns, sheet.column_count());

    SheetSection {
        name: sheet.name().to_string(),
        row_count: sheet.row_count(),
        column_count: sheet.column_count(),
        rows: bounded_scan(sheet, rows, columns, Significance::NonZero),
    }
}

/// Scan every sheet of a workbook in definition order
pub fn whole_sheet_scan<S: SheetSource>(
    source: &mut S,
    window: ScanWindow,
) -> ProbeResult<Vec<SheetSection>> {
    let names = source.sheet_names().to_vec();
    let mut sections = Vec::with_capacity(names.len());

    for name in &names {
        let sheet = source.grid(name)?;
        sections.push(scan_sheet(&sheet, window));
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellKind, RawContent};
    use pretty_assertions::assert_eq;

    fn at(coordinate: &str) -> CellRef {
        CellRef::parse(coordinate).unwrap()
    }

    fn ch_sheet() -> Sheet {
        Sheet::from_cells(
            "CH",
            vec![
                (at("B5"), RawContent::from("Vazao")),
                (at("C5"), RawContent::Number(0.0)),
                (at("C6"), RawContent::Number(150.5)),
                (at("D6"), RawContent::from("=C6/E6")),
                (at("E6"), RawContent::Number(0.0005)),
                (at("AF6"), RawContent::from("=AE6*2")),
            ],
        )
    }

    struct FakeWorkbook {
        names: Vec<String>,
        sheets: Vec<Sheet>,
    }

    impl SheetSource for FakeWorkbook {
        fn sheet_names(&self) -> &[String] {
            &self.names
        }

        fn grid(&mut self, name: &str) -> ProbeResult<Sheet> {
            self.sheets
                .iter()
                .find(|s| s.name() == name)
                .cloned()
                .ok_or_else(|| ProbeError::UnknownSheet {
                    name: name.to_string(),
                    available: self.names.clone(),
                })
        }
    }

    #[test]
    fn test_named_lookup_in_map_order() {
        let sheet = ch_sheet();
        let names = NamedCellMap::from_pairs([("D6", "Diametro"), ("C6", "Qcalc")]).unwrap();

        let rows = named_lookup(&sheet, &names);
        let lines: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.caption(), r.cell.display_value.clone()))
            .collect();

        assert_eq!(
            lines,
            vec![
                ("Diametro".to_string(), "=C6/E6".to_string()),
                ("Qcalc".to_string(), "150.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_named_lookup_keeps_empty_cells() {
        let sheet = ch_sheet();
        let names =
            NamedCellMap::from_pairs([("C6", "Qcalc"), ("L6", "Iteracao3"), ("C5", "Zero")])
                .unwrap();

        let rows = named_lookup(&sheet, &names);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].cell.kind, CellKind::Empty);
        assert_eq!(rows[1].coordinate, at("L6"));
        assert_eq!(rows[2].cell.kind, CellKind::Insignificant);
    }

    #[test]
    fn test_bounded_scan_row_major_and_suppressed() {
        let sheet = ch_sheet();
        let rows = bounded_scan(
            &sheet,
            Bounds::new(5, 6).unwrap(),
            Bounds::new(1, 32).unwrap(),
            Significance::NonZero,
        );

        let coordinates: Vec<String> = rows.iter().map(|r| r.coordinate.to_string()).collect();
        assert_eq!(coordinates, vec!["B5", "C6", "D6", "E6", "AF6"]);
        assert!(rows.iter().all(|r| r.label.is_none()));
    }

    #[test]
    fn test_bounded_scan_noise_threshold() {
        let sheet = ch_sheet();
        let rows = bounded_scan(
            &sheet,
            Bounds::new(5, 6).unwrap(),
            Bounds::new(1, 32).unwrap(),
            Significance::AboveNoise,
        );

        let coordinates: Vec<String> = rows.iter().map(|r| r.coordinate.to_string()).collect();
        assert_eq!(coordinates, vec!["B5", "C6", "D6", "AF6"]);
    }

    #[test]
    fn test_bounded_scan_past_sheet_edge() {
        let sheet = ch_sheet();
        let rows = bounded_scan(
            &sheet,
            Bounds::new(100, 200).unwrap(),
            Bounds::new(1, 5).unwrap(),
            Significance::NonZero,
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_scan_sheet_window_excludes_zero() {
        let sheet = Sheet::from_cells(
            "Small",
            vec![
                (at("B2"), RawContent::Number(0.0)),
                (at("A1"), RawContent::from("Trecho")),
            ],
        )
        .with_dimensions(5, 3);

        let section = scan_sheet(&sheet, ScanWindow::default());
        assert_eq!(section.row_count, 5);
        assert_eq!(section.column_count, 3);
        assert_eq!(section.rows.len(), 1);
        assert_eq!(section.rows[0].coordinate, at("A1"));
    }

    #[test]
    fn test_scan_sheet_window_caps_output() {
        let cells = (1..=30u32).flat_map(|row| {
            (1..=12u32).map(move |col| (CellRef::new(row, col), RawContent::Number(1.0)))
        });
        let sheet = Sheet::from_cells("Big", cells);

        let section = scan_sheet(&sheet, ScanWindow::default());
        assert_eq!(section.rows.len(), 20 * 9);
        assert_eq!(section.rows.last().unwrap().coordinate, at("I20"));
    }

    #[test]
    fn test_whole_sheet_scan_in_sheet_order() {
        let mut workbook = FakeWorkbook {
            names: vec!["Vazoes".to_string(), "CH".to_string(), "Vazia".to_string()],
            sheets: vec![ch_sheet(), Sheet::new("Vazia"), Sheet::new("Vazoes")],
        };

        let sections = whole_sheet_scan(&mut workbook, ScanWindow::default()).unwrap();
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Vazoes", "CH", "Vazia"]);
        assert!(sections[2].rows.is_empty());
        assert_eq!((sections[2].row_count, sections[2].column_count), (0, 0));
    }

    #[test]
    fn test_whole_sheet_scan_propagates_unknown_sheet() {
        let mut workbook = FakeWorkbook {
            names: vec!["Missing".to_string()],
            sheets: vec![],
        };
        let result = whole_sheet_scan(&mut workbook, ScanWindow::default());
        assert!(matches!(result, Err(ProbeError::UnknownSheet { .. })));
    }

    #[test]
    fn test_strategies_agree_on_coordinates() {
        let sheet = ch_sheet();
        let names = NamedCellMap::from_pairs([("AF6", "Iteracao")]).unwrap();
        let named = named_lookup(&sheet, &names);
        let scanned = bounded_scan(
            &sheet,
            Bounds::new(6, 6).unwrap(),
            Bounds::parse_columns("AF").unwrap(),
            Significance::NonZero,
        );
        assert_eq!(named[0].coordinate, scanned[0].coordinate);
        assert_eq!(named[0].cell, scanned[0].cell);
    }

    #[test]
    fn test_bounds_parsing() {
        assert_eq!(Bounds::parse_rows("5:6").unwrap(), Bounds { start: 5, end: 6 });
        assert_eq!(Bounds::parse_rows("7").unwrap(), Bounds { start: 7, end: 7 });
        assert_eq!(
            Bounds::parse_columns("C:O").unwrap(),
            Bounds { start: 3, end: 15 }
        );
        assert_eq!(
            Bounds::parse_columns("1:32").unwrap(),
            Bounds { start: 1, end: 32 }
        );
        assert!(Bounds::parse_rows("0:3").is_err());
        assert!(Bounds::parse_rows("6:5").is_err());
        assert!(Bounds::parse_rows("a:b").is_err());
        assert!(Bounds::parse_columns("A:XFE").is_err());
    }

    #[test]
    fn test_bounds_len() {
        assert_eq!(Bounds::new(5, 6).unwrap().len(), 2);
        assert!(Bounds::leading(20, 0).is_empty());
        assert_eq!(Bounds::leading(20, 5).len(), 5);
    }
}
