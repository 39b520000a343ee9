use serde::{Deserialize, Serialize};
use std::env;
use std::thread;

/// Hard upper bound on the worker count, independent of the hardware.
pub const DEFAULT_WORKER_CAP: usize = 128;

/// Environment tunable that may lower (never raise) the worker count.
pub const WORKER_COUNT_ENV: &str = "MERIT_NUM_THREADS";

/// Signed weights of the chi scalarization.
///
/// Metrics where a larger raw value is better (critical temperature,
/// operational-domain ratio, band bending resilience) carry negative weights
/// so that minimizing chi favors them; the defect clearances, where larger
/// means more easily disturbed, carry positive weights. The default vector is
/// the hand-tuned one; it is configurable but nothing calibrates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiWeights {
    pub critical_temperature: f64,
    pub operational_ratio: f64,
    pub clearance_arsenic: f64,
    pub clearance_vacancy: f64,
    pub band_bending: f64,
}

impl Default for ChiWeights {
    fn default() -> Self {
        Self {
            critical_temperature: -1.0,
            operational_ratio: -1.0,
            clearance_arsenic: 1.0,
            clearance_vacancy: 1.0,
            band_bending: -1.0,
        }
    }
}

/// Knobs of a single batch evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// Upper bound on the number of worker threads. Zero short-circuits the
    /// evaluation to the explicit empty outcome.
    pub worker_cap: usize,
    /// Emit one progress line per completed candidate plus a summary line.
    pub verbose: bool,
    pub weights: ChiWeights,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            worker_cap: DEFAULT_WORKER_CAP,
            verbose: false,
            weights: ChiWeights::default(),
        }
    }
}

/// Resolves the worker count for this run from the machine, the configured
/// cap, the environment tunable, and the candidate count.
pub(crate) fn effective_worker_count(candidates: usize, config: &EvaluationConfig) -> usize {
    let hardware = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let override_value = env::var(WORKER_COUNT_ENV).ok();
    clamp_worker_count(
        hardware,
        config.worker_cap,
        override_value.as_deref(),
        candidates,
    )
}

/// `min(hardware, cap, override, candidates)`, floor-clamped to one worker.
/// A non-positive or unparsable override is ignored; because the override
/// participates through `min`, it can reduce but never increase the
/// hardware-derived count.
pub(crate) fn clamp_worker_count(
    hardware: usize,
    cap: usize,
    override_value: Option<&str>,
    candidates: usize,
) -> usize {
    let mut count = hardware.max(1).min(cap);
    if let Some(raw) = override_value {
        match raw.trim().parse::<usize>() {
            Ok(parsed) if parsed > 0 => count = count.min(parsed),
            _ => {}
        }
    }
    count.min(candidates).max(1)
}
