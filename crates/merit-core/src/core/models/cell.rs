use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Lattice constant along a dimer row of the Si(100) 2x1 surface, in nm.
pub const INTRA_ROW_SPACING_NM: f64 = 0.384;
/// Distance between neighboring dimer rows, in nm.
pub const INTER_ROW_SPACING_NM: f64 = 0.768;
/// Distance between the two atoms of a single dimer pair, in nm.
pub const DIMER_PAIR_SPACING_NM: f64 = 0.225;

/// A single dangling bond site on the hydrogen-passivated Si(100) 2x1 lattice.
///
/// Sites are addressed by dimer column, dimer row, and the atom within the
/// dimer pair (0 = upper, 1 = lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiDbCell {
    pub column: i64,
    pub row: i64,
    pub dimer_atom: u8,
}

impl SiDbCell {
    pub fn new(column: i64, row: i64, dimer_atom: u8) -> Self {
        Self {
            column,
            row,
            dimer_atom,
        }
    }

    /// Position of the site in euclidean nm space.
    pub fn position_nm(&self) -> Point2<f64> {
        Point2::new(
            self.column as f64 * INTRA_ROW_SPACING_NM,
            self.row as f64 * INTER_ROW_SPACING_NM
                + f64::from(self.dimer_atom) * DIMER_PAIR_SPACING_NM,
        )
    }

    /// Euclidean distance to another site in nm.
    pub fn distance_nm(&self, other: &SiDbCell) -> f64 {
        nalgebra::distance(&self.position_nm(), &other.position_nm())
    }
}
