//! CLI command handlers

pub mod commands;

pub use commands::{cells, hydraulics, range, scan, sheets, table, ScanOptions, TableView};
