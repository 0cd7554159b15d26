//! Named-cell maps and lookup profiles
//!
//! A profile names a sheet and the cells of known interest on it:
//!
//! ```yaml
//! sheet: CH
//! cells:
//!   C6: Qcalc
//!   D6: Diametro
//! ```
//!
//! Key order in `cells` is display order.

use crate::error::{ProbeError, ProbeResult};
use crate::excel::CellRef;
use serde::Deserialize;
use std::path::Path;

/// Ordered coordinate → label mapping with unique coordinates
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedCellMap {
    entries: Vec<(CellRef, String)>,
}

impl NamedCellMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(coordinate, label)` pairs, keeping their order
    pub fn from_pairs<I, C, L>(pairs: I) -> ProbeResult<Self>
    where
        I: IntoIterator<Item = (C, L)>,
        C: AsRef<str>,
        L: Into<String>,
    {
        let mut map = Self::new();
        for (coordinate, label) in pairs {
            map.insert(coordinate.as_ref(), label)?;
        }
        Ok(map)
    }

    /// Append a named cell. Duplicate coordinates and blank labels are rejected.
    pub fn insert(&mut self, coordinate: &str, label: impl Into<String>) -> ProbeResult<()> {
        let at = CellRef::parse(coordinate)?;
        let label = label.into();

        if label.trim().is_empty() {
            return Err(ProbeError::Profile(format!(
                "cell {} has an empty label",
                at
            )));
        }
        if let Some((_, existing)) = self.entries.iter().find(|(c, _)| *c == at) {
            return Err(ProbeError::Profile(format!(
                "cell {} is named twice ('{}' and '{}')",
                at, existing, label
            )));
        }

        self.entries.push((at, label));
        Ok(())
    }

    /// Parse `C6=Qcalc` command-line assignments
    pub fn from_assignments<S: AsRef<str>>(assignments: &[S]) -> ProbeResult<Self> {
        let mut map = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (coordinate, label) = assignment.split_once('=').ok_or_else(|| {
                ProbeError::Profile(format!(
                    "expected COORDINATE=LABEL, got '{}'",
                    assignment
                ))
            })?;
            map.insert(coordinate, label.trim())?;
        }
        Ok(map)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellRef, &str)> {
        self.entries.iter().map(|(at, label)| (*at, label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Named cells on one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct CellProfile {
    pub sheet: String,
    pub cells: NamedCellMap,
}

#[derive(Deserialize)]
struct RawProfile {
    sheet: String,
    cells: serde_yaml::Mapping,
}

impl CellProfile {
    /// Load a profile from a YAML file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> ProbeResult<Self> {
        let raw: RawProfile = serde_yaml::from_str(content)?;
        let mut cells = NamedCellMap::new();

        for (key, value) in &raw.cells {
            let coordinate = key
                .as_str()
                .ok_or_else(|| ProbeError::Profile(format!("coordinate must be text: {:?}", key)))?;
            let label = match value {
                serde_yaml::Value::String(s) => s.clone(),
                serde_yaml::Value::Number(n) => n.to_string(),
                other => {
                    return Err(ProbeError::Profile(format!(
                        "label for {} must be text: {:?}",
                        coordinate, other
                    )))
                }
            };
            cells.insert(coordinate, label)?;
        }

        if cells.is_empty() {
            return Err(ProbeError::Profile(format!(
                "profile for sheet '{}' names no cells",
                raw.sheet
            )));
        }

        Ok(Self {
            sheet: raw.sheet,
            cells,
        })
    }
}

//==============================================================================
// Built-in hydraulic network profile
//==============================================================================

/// Sheet holding the partially-full conduit iteration
pub const HYDRAULIC_SHEET: &str = "CH";
/// Main flow and hydraulic calculation sheet
pub const FLOW_SHEET: &str = "Vazoes e Calculo Hidraulico";

/// Input and iteration cells of the Manning's-equation solver on sheet `CH`
pub fn hydraulic_cells() -> ProbeResult<NamedCellMap> {
    NamedCellMap::from_pairs([
        ("C6", "Qcalc"),
        ("D6", "Diametro"),
        ("E6", "Declividade"),
        ("F6", "Manning"),
        ("G6", "TETA"),
        ("H6", "E"),
        ("I6", "E'"),
        ("J6", "Iteracao1"),
        ("K6", "Iteracao2"),
        ("L6", "Iteracao3"),
    ])
}
