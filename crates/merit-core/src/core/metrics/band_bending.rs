use super::context::{SimulationParameters, StabilityParameters};
use super::screened_potential_ev;
use crate::core::models::layout::GateLayout;

/// Estimates the band bending resilience of a layout in volts.
///
/// For every site, the surrounding sites shift the local potential; once that
/// shift reaches the charge transition level the site's population flips. The
/// resilience is the smallest remaining margin across all sites, i.e. the
/// least potential perturbation that destabilizes any charge state.
pub fn resilience(
    layout: &GateLayout,
    stability: &StabilityParameters,
    simulation: &SimulationParameters,
) -> f64 {
    let cells = layout.cells();
    if cells.is_empty() {
        return 0.0;
    }

    let transition_level = stability.mu_minus.abs();
    let mut min_margin = transition_level;

    for (i, site) in cells.iter().enumerate() {
        let mut local_shift = 0.0;
        for (j, other) in cells.iter().enumerate() {
            if i == j {
                continue;
            }
            local_shift += screened_potential_ev(
                site.distance_nm(other),
                simulation.epsilon_r,
                simulation.lambda_tf,
            );
        }
        min_margin = min_margin.min((transition_level - local_shift).max(0.0));
    }

    min_margin
}
