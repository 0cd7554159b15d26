use crate::error::ProbeError;
use crate::excel::CellRef;
use std::fmt;
use std::str::FromStr;

//==============================================================================
// Raw cell content
//==============================================================================

/// Content stored in a cell, exactly as the loader found it.
///
/// Formulas are not a separate variant: in formulas-visible mode the loader
/// stores them as `Text` starting with the formula marker, and the classifier
/// is the only place that tells the two apart.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawContent {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// Anything the workbook stores that is neither a number nor a string
    /// (booleans, error codes, dates), pre-rendered by the loader.
    Other(String),
}

impl RawContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, RawContent::Empty)
    }
}

impl From<&str> for RawContent {
    fn from(value: &str) -> Self {
        RawContent::Text(value.to_string())
    }
}

//==============================================================================
// Classification
//==============================================================================

/// Leading character that marks stored text as a formula
pub const FORMULA_MARKER: char = '=';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Formula,
    Numeric,
    /// Numeric, but not above the significance threshold
    Insignificant,
    Text,
    Empty,
}

impl CellKind {
    /// Kinds that bulk scans leave out of their output
    pub fn is_suppressed(self) -> bool {
        matches!(self, CellKind::Insignificant | CellKind::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedCell {
    pub kind: CellKind,
    pub display_value: String,
}

//==============================================================================
// Load mode
//==============================================================================

/// How a workbook handle exposes formula cells. Fixed for the handle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Formula text, with its leading `=`
    #[default]
    Formulas,
    /// Last cached computed value, or empty
    Values,
}

impl LoadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadMode::Formulas => "formulas-visible",
            LoadMode::Values => "values-only",
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//==============================================================================
// Significance
//==============================================================================

/// Threshold used by the main hydraulic sheet scan to drop rounding noise
pub const NOISE_THRESHOLD: f64 = 0.001;

/// Which numeric cells a range scan reports.
///
/// `NonZero` and `AboveNoise` are kept apart on purpose: existing analyses use
/// both and they report different cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Significance {
    /// Any non-zero number
    #[default]
    NonZero,
    /// `abs(value) > 0.001`
    AboveNoise,
    /// `abs(value) > threshold`
    Threshold(f64),
}

impl Significance {
    pub fn threshold(self) -> f64 {
        match self {
            Significance::NonZero => 0.0,
            Significance::AboveNoise => NOISE_THRESHOLD,
            Significance::Threshold(t) => t,
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Significance::NonZero => write!(f, "nonzero"),
            Significance::AboveNoise => write!(f, "noise (> {})", NOISE_THRESHOLD),
            Significance::Threshold(t) => write!(f, "> {}", t),
        }
    }
}

impl FromStr for Significance {
    type Err = ProbeError;

    /// `nonzero`, `noise`, or an explicit threshold such as `0.05`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nonzero" | "non-zero" => Ok(Significance::NonZero),
            "noise" => Ok(Significance::AboveNoise),
            other => match other.parse::<f64>() {
                Ok(t) if t.is_finite() && t >= 0.0 => Ok(Significance::Threshold(t)),
                _ => Err(ProbeError::InvalidRange(format!(
                    "significance must be 'nonzero', 'noise' or a non-negative number, got '{}'",
                    s
                ))),
            },
        }
    }
}

//==============================================================================
// Scan results
//==============================================================================

/// One reported cell from a scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub coordinate: CellRef,
    pub label: Option<String>,
    pub cell: ClassifiedCell,
}

impl ScanRow {
    /// Label when present, else the bare coordinate
    pub fn caption(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => self.coordinate.to_string(),
        }
    }
}

/// Whole-sheet scan output for a single sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSection {
    pub name: String,
    pub row_count: u32,
    pub column_count: u32,
    pub rows: Vec<ScanRow>,
}
