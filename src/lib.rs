//! Probe - inspect spreadsheet calculation models
//!
//! This library opens a workbook, classifies each cell as a formula, a
//! literal number, text, or nothing, and renders what it finds as a
//! plain-text report, so the logic of an opaque spreadsheet model can be
//! reimplemented elsewhere.
//!
//! # Features
//!
//! - Formulas-visible or values-only loading (one mode per handle)
//! - Named-cell lookup, bounded range scan and whole-sheet scan, all
//!   classifying through one routine
//! - Values-only tabular previews with inline failure reporting
//! - YAML named-cell profiles
//!
//! # Example
//!
//! ```no_run
//! use royalbit_probe::core::named_lookup;
//! use royalbit_probe::excel::{SheetSource, Workbook};
//! use royalbit_probe::profile::NamedCellMap;
//! use royalbit_probe::report::render_row;
//! use royalbit_probe::types::LoadMode;
//!
//! let mut workbook = Workbook::open("VazoeseCapacidadesRede.xlsx", LoadMode::Formulas)?;
//! let sheet = workbook.grid("CH")?;
//! let names = NamedCellMap::from_pairs([("C6", "Qcalc"), ("D6", "Diametro")])?;
//!
//! for row in named_lookup(&sheet, &names) {
//!     println!("{}", render_row(&row));
//! }
//! # Ok::<(), royalbit_probe::error::ProbeError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod profile;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use error::{ProbeError, ProbeResult};
pub use types::{CellKind, ClassifiedCell, LoadMode, RawContent, ScanRow, Significance};
