use super::*;
use crate::excel::Frame;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::path::PathBuf;
use tempfile::TempDir;

// =========================================================================
// Fixtures
// =========================================================================

/// Two-sheet sewer sizing workbook: the flow sheet and the `CH` iteration sheet
fn network_workbook(dir: &TempDir, with_flow_sheet: bool) -> PathBuf {
    let path = dir.path().join("rede.xlsx");
    let mut workbook = XlsxWorkbook::new();

    if with_flow_sheet {
        let flows = workbook.add_worksheet();
        flows.set_name("Vazoes e Calculo Hidraulico").unwrap();
        flows.write_string(0, 0, "Trecho").unwrap();
        flows.write_string(0, 1, "Vazao").unwrap();
        flows.write_string(1, 0, "T1").unwrap();
        flows.write_number(1, 1, 150.5).unwrap();
        flows.write_number(1, 2, 0.0).unwrap();
        flows.write_string(20, 0, "Q").unwrap();
        flows.write_number(20, 1, 0.0005).unwrap();
        flows.write_number(20, 2, 0.25).unwrap();
        flows.write_formula(20, 3, "=B21*2").unwrap();
    }

    let ch = workbook.add_worksheet();
    ch.set_name("CH").unwrap();
    ch.write_string(4, 1, "Vazao").unwrap();
    ch.write_number(5, 2, 150.5).unwrap();
    ch.write_formula(5, 3, "=C6/E6").unwrap();
    ch.write_number(5, 4, 0.005).unwrap();
    ch.write_number(5, 5, 0.013).unwrap();
    ch.write_number(5, 6, 0.0).unwrap();
    ch.write_formula(5, 31, "=AE6+1").unwrap();

    workbook.save(&path).unwrap();
    path
}

fn has_line(text: &str, line: &str) -> bool {
    text.lines().any(|l| l == line)
}

/// Table source that fails for one sheet
struct FlakyTables {
    broken: &'static str,
}

impl TableSource for FlakyTables {
    fn read_table(&mut self, sheet: &str, _header: bool) -> ProbeResult<Frame> {
        if sheet == self.broken {
            return Err(ProbeError::TabularRead {
                sheet: sheet.to_string(),
                reason: "cached values unreadable".to_string(),
            });
        }
        Ok(Frame {
            sheet: sheet.to_string(),
            columns: vec!["Q".to_string()],
            index: vec![0],
            rows: vec![vec!["1.5".to_string()]],
        })
    }
}

// =========================================================================
// sheets
// =========================================================================

#[test]
fn test_sheets_report_lists_in_definition_order() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);

    let text = sheets_report(&path).unwrap();
    assert!(text.starts_with("Sheets available:\n- Vazoes e Calculo Hidraulico\n- CH\n"));
}

#[test]
fn test_sheets_report_missing_file() {
    let result = sheets_report(Path::new("/nonexistent/rede.xlsx"));
    assert!(matches!(result, Err(ProbeError::FileAccess { .. })));
}

#[test]
fn test_sheets_report_not_a_spreadsheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.xlsx");
    std::fs::write(&path, "not a zip container").unwrap();

    let result = sheets_report(&path);
    assert!(matches!(result, Err(ProbeError::FileAccess { .. })));
}

// =========================================================================
// scan
// =========================================================================

#[test]
fn test_scan_report_dumps_window() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);
    let options = ScanOptions {
        table: None,
        ..ScanOptions::default()
    };

    let text = scan_report(&path, &options).unwrap();

    assert!(has_line(&text, "SHEET: CH"));
    assert!(has_line(&text, "Dimensions: 6 rows x 32 columns"));
    assert!(has_line(&text, "B5: Vazao"));
    assert!(has_line(&text, "C6: 150.5"));
    assert!(has_line(&text, "D6: =C6/E6"));
    assert!(has_line(&text, "F6: 0.013"));
    // Zero suppressed, column AF outside the window
    assert!(!text.contains("G6:"));
    assert!(!text.contains("AF6:"));
    // Row 21 of the flow sheet is outside the 20-row window
    assert!(!text.contains("C21:"));
    assert!(!text.contains("DATA AS TABLES"));
}

#[test]
fn test_scan_report_sheet_order() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);
    let options = ScanOptions {
        table: None,
        ..ScanOptions::default()
    };

    let text = scan_report(&path, &options).unwrap();
    let flow = text.find("SHEET: Vazoes e Calculo Hidraulico").unwrap();
    let ch = text.find("SHEET: CH").unwrap();
    assert!(flow < ch);
}

#[test]
fn test_scan_report_with_tables() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);

    let text = scan_report(&path, &ScanOptions::default()).unwrap();
    assert!(has_line(&text, "DATA AS TABLES"));
    assert!(has_line(&text, "Sheet: CH"));
    assert!(has_line(&text, "Shape: (20, 4)"));
}

#[test]
fn test_scan_report_values_mode_hides_formulas() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);
    let options = ScanOptions {
        values: true,
        table: None,
        ..ScanOptions::default()
    };

    let text = scan_report(&path, &options).unwrap();
    assert!(!text.contains("=C6/E6"));
    assert!(has_line(&text, "C6: 150.5"));
}

// =========================================================================
// cells
// =========================================================================

#[test]
fn test_cells_report_named_lookup() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);
    let profile = CellProfile {
        sheet: "CH".to_string(),
        cells: NamedCellMap::from_pairs([("C6", "Qcalc"), ("D6", "Diametro")]).unwrap(),
    };

    let text = cells_report(&path, &profile, false).unwrap();
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| l.starts_with("Qcalc") || l.starts_with("Diametro"))
        .collect();
    assert_eq!(lines, vec!["Qcalc: 150.5", "Diametro: =C6/E6"]);
}

#[test]
fn test_cells_report_reports_empty_cells() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);
    let profile = CellProfile {
        sheet: "CH".to_string(),
        cells: NamedCellMap::from_pairs([("L6", "Iteracao3"), ("G6", "TETA")]).unwrap(),
    };

    let text = cells_report(&path, &profile, false).unwrap();
    assert!(has_line(&text, "Iteracao3: (no value)"));
    assert!(has_line(&text, "TETA: 0"));
}

#[test]
fn test_cells_report_unknown_sheet() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);
    let profile = CellProfile {
        sheet: "Perfil".to_string(),
        cells: NamedCellMap::from_pairs([("A1", "Cota")]).unwrap(),
    };

    let result = cells_report(&path, &profile, false);
    assert!(matches!(result, Err(ProbeError::UnknownSheet { .. })));
}

#[test]
fn test_resolve_profile_merges_file_and_assignments() {
    let dir = TempDir::new().unwrap();
    let map = dir.path().join("ch.yaml");
    std::fs::write(&map, "sheet: CH\ncells:\n  C6: Qcalc\n").unwrap();

    let profile = resolve_profile(None, Some(&map), &["D6=Diametro".to_string()]).unwrap();
    assert_eq!(profile.sheet, "CH");
    let labels: Vec<&str> = profile.cells.iter().map(|(_, l)| l).collect();
    assert_eq!(labels, vec!["Qcalc", "Diametro"]);
}

#[test]
fn test_resolve_profile_explicit_sheet_wins() {
    let dir = TempDir::new().unwrap();
    let map = dir.path().join("ch.yaml");
    std::fs::write(&map, "sheet: CH\ncells:\n  C6: Qcalc\n").unwrap();

    let profile = resolve_profile(Some("Copia".to_string()), Some(&map), &[]).unwrap();
    assert_eq!(profile.sheet, "Copia");
}

#[test]
fn test_resolve_profile_requires_sheet_and_cells() {
    let result = resolve_profile(None, None, &["C6=Qcalc".to_string()]);
    assert!(matches!(result, Err(ProbeError::Profile(_))));

    let result = resolve_profile(Some("CH".to_string()), None, &[]);
    assert!(matches!(result, Err(ProbeError::Profile(_))));
}

#[test]
fn test_resolve_profile_rejects_duplicates_across_sources() {
    let dir = TempDir::new().unwrap();
    let map = dir.path().join("ch.yaml");
    std::fs::write(&map, "sheet: CH\ncells:\n  C6: Qcalc\n").unwrap();

    let result = resolve_profile(None, Some(&map), &["c6=Again".to_string()]);
    assert!(matches!(result, Err(ProbeError::Profile(_))));
}

// =========================================================================
// range
// =========================================================================

#[test]
fn test_range_report_nonzero() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);

    let text = range_report(
        &path,
        "CH",
        Bounds::new(5, 6).unwrap(),
        Bounds::new(1, 32).unwrap(),
        Significance::NonZero,
        false,
    )
    .unwrap();

    let cells: Vec<&str> = text.lines().filter(|l| l.contains(": ") && !l.starts_with("Range")).collect();
    assert_eq!(
        cells,
        vec![
            "B5: Vazao",
            "C6: 150.5",
            "D6: =C6/E6",
            "E6: 0.005",
            "F6: 0.013",
            "AF6: =AE6+1",
        ]
    );
}

#[test]
fn test_range_report_noise_threshold() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);

    let text = range_report(
        &path,
        "Vazoes e Calculo Hidraulico",
        Bounds::new(20, 29).unwrap(),
        Bounds::new(1, 9).unwrap(),
        Significance::AboveNoise,
        false,
    )
    .unwrap();

    assert!(has_line(&text, "A21: Q"));
    assert!(has_line(&text, "C21: 0.25"));
    assert!(has_line(&text, "D21: =B21*2"));
    assert!(!text.contains("B21: "));
}

// =========================================================================
// table
// =========================================================================

#[test]
fn test_table_report_single_sheet() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);

    let text = table_report(&path, Some("Vazoes e Calculo Hidraulico"), &TableView::default()).unwrap();
    assert!(has_line(&text, "Sheet: Vazoes e Calculo Hidraulico"));
    assert!(has_line(&text, "Shape: (20, 4)"));
    assert!(!text.contains("Sheet: CH"));
}

#[test]
fn test_table_report_shape_is_whole_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trechos.xlsx");
    let mut workbook = XlsxWorkbook::new();
    let ch = workbook.add_worksheet();
    ch.set_name("CH").unwrap();
    ch.write_string(0, 0, "Trecho").unwrap();
    for row in 1..12u32 {
        ch.write_string(row, 0, format!("T{}", row)).unwrap();
    }
    workbook.save(&path).unwrap();

    let text = table_report(&path, Some("CH"), &TableView::default()).unwrap();
    assert!(has_line(&text, "Shape: (11, 1)"));
    assert!(text.contains("T5"));
    assert!(!text.contains("T6"));
}

#[test]
fn test_table_report_unknown_sheet() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);

    let result = table_report(&path, Some("Perfil"), &TableView::default());
    assert!(matches!(result, Err(ProbeError::UnknownSheet { .. })));
}

#[test]
fn test_tabular_failure_is_reported_inline() {
    let mut report = Report::new();
    let mut source = FlakyTables {
        broken: "Vazoes e Calculo Hidraulico",
    };
    let sheets = vec!["Vazoes e Calculo Hidraulico".to_string(), "CH".to_string()];

    tabular_section(&mut report, &mut source, &sheets, &TableView::default());
    report.note("end of report");
    let text = report.finish();

    assert!(has_line(&text, "Sheet: Vazoes e Calculo Hidraulico"));
    assert!(has_line(&text, "Failed to read as table: cached values unreadable"));
    assert!(has_line(&text, "Sheet: CH"));
    assert!(has_line(&text, "Shape: (1, 1)"));
    assert!(text.ends_with("end of report\n"));
}

#[test]
fn test_tabular_section_requires_values_mode() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);
    let mut workbook = Workbook::open(&path, LoadMode::Formulas).unwrap();

    let mut report = Report::new();
    tabular_section(&mut report, &mut workbook, &["CH".to_string()], &TableView::default());
    let text = report.finish();
    assert!(text.contains("Failed to read as table: Workbook opened in formulas-visible mode"));
}

#[test]
fn test_table_view_slice_bounds() {
    let view = TableView {
        header: false,
        ..TableView::default()
    }
    .with_bounds(
        Some(Bounds::new(5, 7).unwrap()),
        Some(Bounds::parse_columns("C:O").unwrap()),
    );
    assert_eq!(view.rows, Some(4..7));
    assert_eq!(view.columns, Some(2..15));
}

// =========================================================================
// hydraulics
// =========================================================================

#[test]
fn test_hydraulics_report() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, true);

    let text = hydraulics_report(&path).unwrap();

    assert!(has_line(&text, "Qcalc: 150.5"));
    assert!(has_line(&text, "Diametro: =C6/E6"));
    assert!(has_line(&text, "TETA: 0"));
    assert!(has_line(&text, "Iteracao3: (no value)"));
    assert!(has_line(&text, "AF6: =AE6+1"));
    assert!(text.contains("Cached values on sheet CH (rows 5-7, columns C-O)"));
    assert!(has_line(&text, "C21: 0.25"));
    assert!(!text.contains("B21: "));
}

#[test]
fn test_hydraulics_report_routes_around_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let path = network_workbook(&dir, false);

    let text = hydraulics_report(&path).unwrap();
    assert!(has_line(&text, "Qcalc: 150.5"));
    assert!(text.contains("Skipped: Unknown sheet 'Vazoes e Calculo Hidraulico'"));
}
