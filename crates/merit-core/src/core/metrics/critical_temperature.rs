use super::context::SimulationParameters;
use super::screened_potential_ev;
use crate::core::models::layout::GateLayout;
use crate::core::models::truth_table::TruthTable;

const BOLTZMANN_EV_PER_K: f64 = 8.617e-5;
/// Upper end of the simulated temperature range in Kelvin.
const MAX_SIMULATED_TEMPERATURE_K: f64 = 400.0;
/// Tolerated occupation probability of an excited charge configuration.
const EXCITED_POPULATION_LIMIT: f64 = 0.01;

/// Estimates the critical temperature of a gate in Kelvin.
///
/// The estimate follows the Boltzmann population of the first excited charge
/// configuration: the gate stops operating once the excited state is occupied
/// more often than [`EXCITED_POPULATION_LIMIT`]. The transition gap is bounded
/// by the charge transition level and by the coupling energy of the closest
/// site pair.
pub fn gate_based(
    layout: &GateLayout,
    behavior: &[TruthTable],
    simulation: &SimulationParameters,
) -> f64 {
    let transition_gap_ev = match layout.min_cell_spacing_nm() {
        Some(spacing) => screened_potential_ev(spacing, simulation.epsilon_r, simulation.lambda_tf)
            .min(simulation.mu_minus.abs()),
        None => simulation.mu_minus.abs(),
    };

    // Multi-output gates split the available drive across their outputs.
    let output_demand = 1.0 + 0.1 * behavior.len().saturating_sub(1) as f64;
    let effective_gap_ev = transition_gap_ev / output_demand;

    let population_term = ((1.0 - EXCITED_POPULATION_LIMIT) / EXCITED_POPULATION_LIMIT).ln();
    (effective_gap_ev / (BOLTZMANN_EV_PER_K * population_term))
        .clamp(0.0, MAX_SIMULATED_TEMPERATURE_K)
}
