use super::context::SimulationParameters;
use super::screened_potential_ev;
use crate::core::models::cell::SiDbCell;
use crate::core::models::defect::ChargedDefect;
use crate::core::models::layout::GateLayout;

/// Fraction of the charge transition level a defect-induced potential must
/// reach to break gate operation.
const DISTURB_FRACTION: f64 = 0.25;

/// Counters collected while scanning defect positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefectInfluenceStats {
    pub scanned_positions: usize,
    pub disturbing_positions: usize,
}

/// Scans every lattice site around the layout (bounding box plus margin) with
/// the given defect placed at that site and returns the clearance distance:
/// the largest layout distance at which the defect still disturbs operation.
///
/// A clearance of 0 means the layout is insensitive to this defect species at
/// every scanned position.
pub fn grid_search(
    layout: &GateLayout,
    defect: &ChargedDefect,
    scan_margin: (i64, i64),
    simulation: &SimulationParameters,
    stats: Option<&mut DefectInfluenceStats>,
) -> f64 {
    let Some(((min_col, min_row), (max_col, max_row))) = layout.bounding_box() else {
        return 0.0;
    };

    let threshold_ev = simulation.mu_minus.abs() * DISTURB_FRACTION;
    let mut collected = DefectInfluenceStats::default();
    let mut clearance = 0.0f64;

    for column in (min_col - scan_margin.0)..=(max_col + scan_margin.0) {
        for row in (min_row - scan_margin.1)..=(max_row + scan_margin.1) {
            for dimer_atom in 0..2u8 {
                let position = SiDbCell::new(column, row, dimer_atom).position_nm();
                let Some(distance) = layout.distance_to_nm(&position) else {
                    continue;
                };
                collected.scanned_positions += 1;

                let potential = screened_potential_ev(distance, defect.epsilon_r, defect.lambda_tf)
                    * f64::from(defect.charge.unsigned_abs());
                if potential > threshold_ev {
                    collected.disturbing_positions += 1;
                    clearance = clearance.max(distance);
                }
            }
        }
    }

    if let Some(stats) = stats {
        *stats = collected;
    }
    clearance
}
