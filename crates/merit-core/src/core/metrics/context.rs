use crate::core::models::defect::ChargedDefect;
use serde::{Deserialize, Serialize};

/// Physical simulation constants shared by every metric routine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Charge transition level mu_minus in eV.
    pub mu_minus: f64,
    /// Number of charge states per site (2: negative/neutral).
    pub charge_states: u8,
    /// Relative permittivity of the substrate.
    pub epsilon_r: f64,
    /// Thomas-Fermi screening length in nm.
    pub lambda_tf: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            mu_minus: -0.32,
            charge_states: 2,
            epsilon_r: 5.6,
            lambda_tf: 5.0,
        }
    }
}

/// How strictly the operational check treats kink states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingCondition {
    RejectKinks,
    TolerateKinks,
}

/// Shared, immutable configuration an evaluation starts from.
///
/// Every worker derives its own [`MetricContext`] from this value; the base
/// context itself is only ever read.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseContext {
    pub simulation: SimulationParameters,
    pub operating_condition: OperatingCondition,
}

impl Default for BaseContext {
    fn default() -> Self {
        Self {
            simulation: SimulationParameters::default(),
            operating_condition: OperatingCondition::RejectKinks,
        }
    }
}

/// One axis of the operational-domain parameter sweep.
///
/// The cursor advances in place while a sweep runs, which is why contexts are
/// never shared between workers.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepDimension {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub current: f64,
}

impl SweepDimension {
    pub fn new(name: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self {
            name,
            min,
            max,
            step,
            current: min,
        }
    }

    /// Number of grid points on this axis, endpoints inclusive.
    pub fn point_count(&self) -> usize {
        ((self.max - self.min) / self.step + 1.0 + 1e-9).floor() as usize
    }

    /// Moves the cursor to the given grid point.
    pub fn advance_to(&mut self, point: usize) {
        self.current = self.min + point as f64 * self.step;
    }

    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

/// Parameters of the charge-population stability analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityParameters {
    pub mu_minus: f64,
    pub charge_states: u8,
}

/// Per-worker private configuration bundle for the metric routines.
///
/// Derived once per worker from the shared [`BaseContext`]; two contexts
/// derived from the same base compare equal but own their state independently,
/// so no metric call can observe another worker's sweep cursors.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricContext {
    pub simulation: SimulationParameters,
    pub operating_condition: OperatingCondition,
    /// Operational-domain sweep axes: epsilon_r and lambda_tf.
    pub sweep: [SweepDimension; 2],
    /// Defect species scanned during clearance analysis.
    pub defects: Vec<ChargedDefect>,
    pub stability: StabilityParameters,
    /// Extra lattice sites scanned around the layout bounding box.
    pub scan_margin: (i64, i64),
}

impl MetricContext {
    /// Derives a fresh, independently owned context. Pure: depends only on
    /// the base context.
    pub fn derive(base: &BaseContext) -> Self {
        Self {
            simulation: base.simulation,
            operating_condition: base.operating_condition,
            sweep: [
                SweepDimension::new("epsilon_r", 4.0, 6.0, 0.2),
                SweepDimension::new("lambda_tf", 4.0, 6.0, 0.2),
            ],
            defects: vec![ChargedDefect::si_vacancy(), ChargedDefect::arsenic()],
            stability: StabilityParameters {
                mu_minus: base.simulation.mu_minus,
                charge_states: base.simulation.charge_states,
            },
            scan_margin: (20, 20),
        }
    }
}
