//! Cell classification and scan strategies

pub mod classifier;
pub mod scanner;

pub use classifier::classify;
pub use scanner::{bounded_scan, named_lookup, scan_sheet, whole_sheet_scan, Bounds, ScanWindow};
