use clap::{Parser, Subcommand};
use royalbit_probe::cli::{self, ScanOptions, TableView};
use royalbit_probe::core::{Bounds, ScanWindow};
use royalbit_probe::types::Significance;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "probe")]
#[command(about = "Inspect spreadsheet calculation models: formulas, values and layout.")]
#[command(long_about = "Probe - Spreadsheet model inspection
Shows which cells hold formulas, which hold literal values, and what the
formulas say, so a workbook's calculation can be reimplemented elsewhere.

COMMANDS:
  sheets      - List the sheets of a workbook
  scan        - Dimensions and cell dump of every sheet, plus cached-value tables
  cells       - Look up named cells (C6=Qcalc ...) on one sheet
  range       - Scan a row/column rectangle for formulas and significant values
  table       - Cached values of one or all sheets as a table
  hydraulics  - Detailed report for the sewer network sizing workbook

EXAMPLES:
  probe sheets VazoeseCapacidadesRede.xlsx
  probe scan VazoeseCapacidadesRede.xlsx --no-table
  probe cells rede.xlsx --sheet CH --cell C6=Qcalc --cell D6=Diametro
  probe range rede.xlsx --sheet CH --rows 5:6 --cols A:AF
  probe range rede.xlsx --sheet \"Vazoes e Calculo Hidraulico\" --rows 20:29 --cols 1:9 -s noise

LOGGING:
  Diagnostics go to stderr. Set PROBE_LOG (e.g. PROBE_LOG=royalbit_probe=debug)
  or pass --verbose.")]
#[command(version)]
struct Cli {
    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable coloured headers
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook
    Sheets {
        /// Path to the workbook (.xlsx, .xlsm, .xls, .ods)
        #[arg(env = "PROBE_WORKBOOK")]
        file: PathBuf,
    },

    #[command(long_about = "Scan every sheet of a workbook.

For each sheet, in definition order: name, dimensions, and every formula,
text or non-zero number inside the inspection window (default: first 20 rows,
first 9 columns). Then every sheet is read again as a table of cached values;
a sheet that cannot be read that way gets an inline message and the report
carries on.

Use --values to show cached values instead of formula text in the cell dump.")]
    /// Dimensions and cell dump of every sheet
    Scan {
        /// Path to the workbook
        #[arg(env = "PROBE_WORKBOOK")]
        file: PathBuf,

        /// Show cached values instead of formulas
        #[arg(long)]
        values: bool,

        /// Skip the cached-value tables
        #[arg(long)]
        no_table: bool,

        /// Rows in the inspection window
        #[arg(long, default_value_t = ScanWindow::DEFAULT_ROWS)]
        rows: u32,

        /// Columns in the inspection window
        #[arg(long, default_value_t = ScanWindow::DEFAULT_COLUMNS)]
        cols: u32,
    },

    #[command(long_about = "Look up named cells on one sheet.

Cells are reported in the order given, including cells that hold nothing.

PROFILE FILE (--map):
  sheet: CH
  cells:
    C6: Qcalc
    D6: Diametro

EXAMPLES:
  probe cells rede.xlsx --map ch.yaml
  probe cells rede.xlsx --sheet CH --cell C6=Qcalc --cell L6=Iteracao3")]
    /// Look up named cells on one sheet
    Cells {
        /// Path to the workbook
        #[arg(env = "PROBE_WORKBOOK")]
        file: PathBuf,

        /// Sheet name (overrides the profile's sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// YAML profile naming the cells
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Named cell as COORDINATE=LABEL (repeatable)
        #[arg(short, long = "cell")]
        cells: Vec<String>,

        /// Show cached values instead of formulas
        #[arg(long)]
        values: bool,
    },

    #[command(long_about = "Scan a rectangle of one sheet, row by row.

Reports formulas, text, and numbers whose magnitude exceeds the significance
threshold. Empty cells are never reported.

SIGNIFICANCE:
  nonzero   - any number other than 0 (default)
  noise     - |value| > 0.001
  <number>  - |value| > number")]
    /// Scan a row/column rectangle of one sheet
    Range {
        /// Path to the workbook
        #[arg(env = "PROBE_WORKBOOK")]
        file: PathBuf,

        /// Sheet name
        #[arg(long)]
        sheet: String,

        /// Rows, 1-based inclusive: 5:6
        #[arg(long)]
        rows: String,

        /// Columns, 1-based inclusive, numbers or letters: 1:32 or A:AF
        #[arg(long)]
        cols: String,

        /// Which numbers to report: nonzero, noise, or a threshold
        #[arg(short, long, default_value = "nonzero", env = "PROBE_SIGNIFICANCE")]
        significance: Significance,

        /// Show cached values instead of formulas
        #[arg(long)]
        values: bool,
    },

    /// Cached values of one or all sheets as a table
    Table {
        /// Path to the workbook
        #[arg(env = "PROBE_WORKBOOK")]
        file: PathBuf,

        /// Sheet name (default: every sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Treat the first row as data instead of column names
        #[arg(long)]
        no_header: bool,

        /// Rows to show when no slice is given
        #[arg(long, default_value_t = royalbit_probe::excel::DEFAULT_HEAD)]
        head: usize,

        /// Row slice, 1-based inclusive table positions: 5:7
        #[arg(long)]
        rows: Option<String>,

        /// Column slice, 1-based inclusive, numbers or letters: C:O
        #[arg(long)]
        cols: Option<String>,
    },

    #[command(long_about = "Detailed report for the sewer network sizing workbook.

  1. Named cells of the Manning's-equation iteration on sheet CH
     (C6 Qcalc, D6 Diametro, E6 Declividade, F6 Manning, G6 TETA,
      H6 E, I6 E', J6-L6 Iteracao1-3)
  2. Every formula and non-zero value on CH rows 5-6, columns A-AF
  3. Cached values of CH rows 5-7, columns C-O
  4. Formulas and values above 0.001 on 'Vazoes e Calculo Hidraulico'
     rows 20-29, columns A-I

A missing sheet skips its sections with an inline note.")]
    /// Detailed report for the sewer network sizing workbook
    Hydraulics {
        /// Path to the workbook
        #[arg(env = "PROBE_WORKBOOK")]
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "royalbit_probe=debug"
    } else {
        "royalbit_probe=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("PROBE_LOG")
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Sheets { file } => cli::sheets(file)?,

        Commands::Scan {
            file,
            values,
            no_table,
            rows,
            cols,
        } => {
            let options = ScanOptions {
                values,
                window: ScanWindow {
                    rows,
                    columns: cols,
                },
                table: if no_table {
                    None
                } else {
                    Some(TableView::default())
                },
            };
            cli::scan(file, options)?
        }

        Commands::Cells {
            file,
            sheet,
            map,
            cells,
            values,
        } => cli::cells(file, sheet, map, cells, values)?,

        Commands::Range {
            file,
            sheet,
            rows,
            cols,
            significance,
            values,
        } => cli::range(file, sheet, rows, cols, significance, values)?,

        Commands::Table {
            file,
            sheet,
            no_header,
            head,
            rows,
            cols,
        } => {
            let rows = rows.as_deref().map(Bounds::parse_rows).transpose()?;
            let cols = cols.as_deref().map(Bounds::parse_columns).transpose()?;
            let view = TableView {
                header: !no_header,
                head,
                ..TableView::default()
            }
            .with_bounds(rows, cols);
            cli::table(file, sheet, view)?
        }

        Commands::Hydraulics { file } => cli::hydraulics(file)?,
    }

    Ok(())
}
