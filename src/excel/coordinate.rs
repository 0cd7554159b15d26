//! A1-style cell coordinates
//!
//! Every scan derives its coordinate strings through [`CellRef`], so a cell
//! reads the same whether it was found by a named lookup or a range scan.

use crate::error::{ProbeError, ProbeResult};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Last column a worksheet can address (XFD)
pub const MAX_COLUMN: u32 = 16_384;
/// Last row a worksheet can address
pub const MAX_ROW: u32 = 1_048_576;

/// A 1-based (row, column) grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1 coordinate (`C6`, `aa10`, `$B$2`)
    pub fn parse(coordinate: &str) -> ProbeResult<Self> {
        let pattern = Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]+)$")
            .map_err(|e| ProbeError::InvalidCoordinate(format!("Regex error: {}", e)))?;

        let trimmed = coordinate.trim();
        let captures = pattern
            .captures(trimmed)
            .ok_or_else(|| ProbeError::InvalidCoordinate(coordinate.to_string()))?;

        let col = letters_to_column(&captures[1])?;
        let row: u32 = captures[2]
            .parse()
            .map_err(|_| ProbeError::InvalidCoordinate(coordinate.to_string()))?;

        if row == 0 || row > MAX_ROW {
            return Err(ProbeError::InvalidCoordinate(format!(
                "{} (row out of range)",
                coordinate
            )));
        }

        Ok(Self { row, col })
    }

    /// From a zero-based position as reported by calamine
    pub fn from_zero_based((row, col): (u32, u32)) -> Self {
        Self {
            row: row + 1,
            col: col + 1,
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::parse(s)
    }
}

/// Convert a 1-based column number to its letters (1→A, 26→Z, 27→AA)
pub fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;

    while n > 0 {
        let remainder = (n - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }

    result
}

/// Convert column letters to a 1-based column number (A→1, AF→32)
pub fn letters_to_column(letters: &str) -> ProbeResult<u32> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ProbeError::InvalidCoordinate(letters.to_string()));
    }

    let col = letters
        .to_ascii_uppercase()
        .bytes()
        .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1));

    if col > MAX_COLUMN {
        return Err(ProbeError::InvalidCoordinate(format!(
            "{} (column out of range)",
            letters
        )));
    }

    Ok(col)
}
