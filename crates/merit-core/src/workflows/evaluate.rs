use crate::core::metrics::context::BaseContext;
use crate::core::metrics::MetricComputer;
use crate::core::models::layout::GateLayout;
use crate::core::models::truth_table::TruthTable;
use crate::engine::config::{self, EvaluationConfig};
use crate::engine::error::EngineError;
use crate::engine::state::EvaluationResult;
use crate::engine::{aggregate, pool};
use std::io::{self, Write};
use tracing::{info, instrument};

/// Evaluates every candidate layout against the expected behavior and selects
/// the one with the minimal chi value.
///
/// Candidates are identified by their position in `layouts`; the returned
/// metric table is index-aligned with it. `Ok(None)` is the explicit empty
/// outcome: no candidates were supplied (or the worker cap is zero), which is
/// not an error. A metric failure for any candidate fails the whole
/// evaluation; no partial table is returned.
#[instrument(skip_all, name = "fom_evaluation")]
pub fn run<M>(
    layouts: &[GateLayout],
    behavior: &[TruthTable],
    base: &BaseContext,
    computer: &M,
    config: &EvaluationConfig,
) -> Result<Option<EvaluationResult>, EngineError>
where
    M: MetricComputer + Sync,
{
    if layouts.is_empty() {
        info!("No candidate layouts supplied; nothing to evaluate.");
        return Ok(None);
    }
    if config.worker_cap == 0 {
        info!("Worker cap is zero; skipping evaluation.");
        return Ok(None);
    }

    let workers = config::effective_worker_count(layouts.len(), config);
    info!(
        candidates = layouts.len(),
        workers, "Starting figure-of-merit evaluation."
    );

    let records = if config.verbose {
        let stdout = io::stdout();
        let mut sink = stdout.lock();
        let _ = writeln!(
            sink,
            "[FoM] Evaluating {} layout(s) with {} worker(s)",
            layouts.len(),
            workers
        );
        pool::compute_records(
            layouts,
            behavior,
            base,
            computer,
            workers,
            Some(&mut sink as &mut dyn Write),
        )?
    } else {
        pool::compute_records(layouts, behavior, base, computer, workers, None)?
    };

    let result = aggregate::aggregate(records, &config.weights);

    info!(
        best_index = result.best_index,
        best_chi = result.best_chi,
        "Evaluation complete."
    );
    if config.verbose {
        println!(
            "[FoM] Best layout index is {} (chi = {:.3})",
            result.best_index, result.best_chi
        );
    }

    Ok(Some(result))
}
