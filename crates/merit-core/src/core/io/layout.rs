use crate::core::models::cell::SiDbCell;
use crate::core::models::layout::GateLayout;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed layout file: {0}")]
    Parse(#[from] Box<toml::de::Error>),

    #[error("Cell {index} has dimer atom {value}, expected 0 or 1")]
    InvalidDimerAtom { index: usize, value: i64 },
}

/// Metadata carried alongside a layout file's cell list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutMetadata {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LayoutFile {
    #[serde(default)]
    name: Option<String>,
    cells: Vec<[i64; 3]>,
}

/// Parses a layout from its TOML text form.
///
/// The schema is a flat `cells = [[column, row, dimer_atom], …]` array with
/// an optional `name` key.
pub fn read_layout(text: &str) -> Result<(GateLayout, LayoutMetadata), LayoutReadError> {
    let file: LayoutFile = toml::from_str(text).map_err(Box::new)?;

    let mut cells = Vec::with_capacity(file.cells.len());
    for (index, &[column, row, dimer_atom]) in file.cells.iter().enumerate() {
        if !(0..=1).contains(&dimer_atom) {
            return Err(LayoutReadError::InvalidDimerAtom {
                index,
                value: dimer_atom,
            });
        }
        cells.push(SiDbCell::new(column, row, dimer_atom as u8));
    }

    Ok((GateLayout::new(cells), LayoutMetadata { name: file.name }))
}

/// Reads a layout from a `*.toml` file on disk.
pub fn read_layout_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<(GateLayout, LayoutMetadata), LayoutReadError> {
    let text = fs::read_to_string(path)?;
    read_layout(&text)
}
