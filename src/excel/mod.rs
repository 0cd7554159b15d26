//! Spreadsheet access for inspection
//!
//! - Loader: container → named sheet grids, formulas-visible or values-only
//! - Coordinates: A1 ↔ (row, column)
//! - Table: values-only tabular read of a whole sheet

pub mod coordinate;
mod loader;
mod table;

pub use coordinate::CellRef;
pub use loader::{Sheet, SheetSource, Workbook};
pub use table::{Frame, TableSource, DEFAULT_HEAD};
