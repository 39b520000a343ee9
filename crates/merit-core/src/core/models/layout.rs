use super::cell::SiDbCell;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One candidate gate design: an ordered collection of SiDB sites.
///
/// Layouts are immutable once constructed; the evaluation engine identifies a
/// layout solely by its position in the candidate slice it was handed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateLayout {
    cells: Vec<SiDbCell>,
}

impl GateLayout {
    pub fn new(cells: Vec<SiDbCell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[SiDbCell] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Inclusive lattice bounding box as ((min column, min row), (max column, max row)).
    pub fn bounding_box(&self) -> Option<((i64, i64), (i64, i64))> {
        let first = self.cells.first()?;
        let mut min = (first.column, first.row);
        let mut max = min;
        for cell in &self.cells[1..] {
            min.0 = min.0.min(cell.column);
            min.1 = min.1.min(cell.row);
            max.0 = max.0.max(cell.column);
            max.1 = max.1.max(cell.row);
        }
        Some((min, max))
    }

    /// Smallest pairwise site separation in nm. `None` for fewer than two sites.
    pub fn min_cell_spacing_nm(&self) -> Option<f64> {
        let mut min_spacing: Option<f64> = None;
        for (i, a) in self.cells.iter().enumerate() {
            for b in &self.cells[i + 1..] {
                let d = a.distance_nm(b);
                min_spacing = Some(min_spacing.map_or(d, |m: f64| m.min(d)));
            }
        }
        min_spacing
    }

    /// Distance from an arbitrary point in nm space to the nearest site.
    pub fn distance_to_nm(&self, point: &Point2<f64>) -> Option<f64> {
        self.cells
            .iter()
            .map(|cell| nalgebra::distance(&cell.position_nm(), point))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl FromIterator<SiDbCell> for GateLayout {
    fn from_iter<I: IntoIterator<Item = SiDbCell>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
