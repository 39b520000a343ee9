use super::distributor::WorkDistributor;
use super::error::EngineError;
use super::progress::{ProgressQueue, format_report_line};
use crate::core::metrics::context::{BaseContext, MetricContext};
use crate::core::metrics::{FomMetrics, MetricComputer};
use crate::core::models::layout::GateLayout;
use crate::core::models::truth_table::TruthTable;
use std::io::Write;
use std::sync::{Mutex, OnceLock};
use std::thread;
use tracing::debug;

/// Evaluates every candidate exactly once and returns the index-aligned
/// metric table.
///
/// With a worker count of one the computation runs on the calling thread.
/// Otherwise `worker_count` threads are spawned for the duration of this call
/// and joined before it returns; each worker derives its own context, claims
/// indices from the shared distributor, and writes each record into the
/// once-writable slot owned by the claimed index. A progress sink, when
/// given, receives one line per completed candidate, serialized through the
/// monitor queue and written by the calling thread.
///
/// A metric failure aborts the evaluation: the first failure (tagged with its
/// candidate index) is returned and no partial table escapes. Workers that
/// already hold other indices finish those computations naturally; there is
/// no cancellation.
pub(crate) fn compute_records<M>(
    layouts: &[GateLayout],
    behavior: &[TruthTable],
    base: &BaseContext,
    computer: &M,
    worker_count: usize,
    mut progress_sink: Option<&mut dyn Write>,
) -> Result<Vec<FomMetrics>, EngineError>
where
    M: MetricComputer + Sync,
{
    debug_assert!(!layouts.is_empty());

    if worker_count <= 1 {
        return compute_sequential(layouts, behavior, base, computer, progress_sink);
    }

    let total = layouts.len();
    let distributor = WorkDistributor::new(total);
    let slots: Vec<OnceLock<FomMetrics>> = (0..total).map(|_| OnceLock::new()).collect();
    let failure: Mutex<Option<EngineError>> = Mutex::new(None);
    let queue = progress_sink.as_ref().map(|_| ProgressQueue::new());

    thread::scope(|scope| {
        for _ in 0..worker_count {
            // Producers are registered on the calling thread, before the
            // consumer starts, so the queue cannot drain prematurely.
            let producer = queue.as_ref().map(|q| q.producer());
            let distributor = &distributor;
            let slots = &slots;
            let failure = &failure;

            scope.spawn(move || {
                let mut context = MetricContext::derive(base);
                while let Some(index) = distributor.claim_next() {
                    match computer.compute(&layouts[index], behavior, &mut context) {
                        Ok(record) => {
                            if let Some(producer) = &producer {
                                producer.report(index, record);
                            }
                            if slots[index].set(record).is_err() {
                                record_failure(
                                    failure,
                                    EngineError::Internal(format!(
                                        "result slot {index} written twice"
                                    )),
                                );
                                return;
                            }
                        }
                        Err(source) => {
                            record_failure(failure, EngineError::Metric { index, source });
                            return;
                        }
                    }
                }
            });
        }

        if let (Some(queue), Some(sink)) = (&queue, progress_sink.as_deref_mut()) {
            let consumed = queue.drain(sink);
            debug!(consumed, "Progress consumer finished.");
        }
    });

    if let Some(error) = failure
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
    {
        return Err(error);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.into_inner().ok_or_else(|| {
                EngineError::Internal(format!("result slot {index} was never written"))
            })
        })
        .collect()
}

fn compute_sequential<M>(
    layouts: &[GateLayout],
    behavior: &[TruthTable],
    base: &BaseContext,
    computer: &M,
    mut progress_sink: Option<&mut dyn Write>,
) -> Result<Vec<FomMetrics>, EngineError>
where
    M: MetricComputer,
{
    let mut context = MetricContext::derive(base);
    let mut records = Vec::with_capacity(layouts.len());

    for (index, layout) in layouts.iter().enumerate() {
        let record = computer
            .compute(layout, behavior, &mut context)
            .map_err(|source| EngineError::Metric { index, source })?;
        if let Some(sink) = progress_sink.as_deref_mut() {
            let _ = writeln!(sink, "{}", format_report_line(index, &record));
        }
        records.push(record);
    }

    Ok(records)
}

fn record_failure(failure: &Mutex<Option<EngineError>>, error: EngineError) {
    let mut guard = failure
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    // First failure wins; later ones carry no extra information.
    if guard.is_none() {
        *guard = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::MetricError;
    use crate::core::models::cell::SiDbCell;

    /// Derives every metric from the candidate's cell count, so each record
    /// identifies the layout it came from.
    struct CellCountComputer;

    impl MetricComputer for CellCountComputer {
        fn compute(
            &self,
            layout: &GateLayout,
            _behavior: &[TruthTable],
            _context: &mut MetricContext,
        ) -> Result<FomMetrics, MetricError> {
            if layout.is_empty() {
                return Err(MetricError::EmptyLayout);
            }
            Ok(FomMetrics {
                critical_temperature: layout.cell_count() as f64,
                ..FomMetrics::default()
            })
        }
    }

    /// Builds N layouts where layout i carries i + 1 cells.
    fn counted_layouts(n: usize) -> Vec<GateLayout> {
        (0..n)
            .map(|i| (0..=i as i64).map(|c| SiDbCell::new(c, 0, 0)).collect())
            .collect()
    }

    fn behavior() -> Vec<TruthTable> {
        vec![TruthTable::and()]
    }

    #[test]
    fn every_slot_is_populated_for_any_worker_count() {
        const N: usize = 23;
        let layouts = counted_layouts(N);
        let base = BaseContext::default();

        for workers in [1, 2, 3, 8, 32] {
            let records = compute_records(
                &layouts,
                &behavior(),
                &base,
                &CellCountComputer,
                workers,
                None,
            )
            .unwrap();

            assert_eq!(records.len(), N, "workers = {workers}");
            for (index, record) in records.iter().enumerate() {
                assert_eq!(
                    record.critical_temperature,
                    (index + 1) as f64,
                    "slot {index} misaligned with workers = {workers}"
                );
            }
        }
    }

    #[test]
    fn results_are_identical_across_worker_counts() {
        let layouts = counted_layouts(17);
        let base = BaseContext::default();

        let sequential =
            compute_records(&layouts, &behavior(), &base, &CellCountComputer, 1, None).unwrap();
        let parallel =
            compute_records(&layouts, &behavior(), &base, &CellCountComputer, 7, None).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn metric_failure_aborts_the_whole_evaluation() {
        // Five candidates; the middle one is empty and cannot be computed.
        let mut layouts = counted_layouts(5);
        layouts[2] = GateLayout::default();
        let base = BaseContext::default();

        for workers in [1, 4] {
            let result = compute_records(
                &layouts,
                &behavior(),
                &base,
                &CellCountComputer,
                workers,
                None,
            );
            match result {
                Err(EngineError::Metric { index, source }) => {
                    assert_eq!(index, 2);
                    assert_eq!(source, MetricError::EmptyLayout);
                }
                other => panic!("expected a metric failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn progress_sink_receives_one_line_per_candidate() {
        const N: usize = 12;
        let layouts = counted_layouts(N);
        let base = BaseContext::default();
        let mut sink = Vec::new();

        let records = compute_records(
            &layouts,
            &behavior(),
            &base,
            &CellCountComputer,
            4,
            Some(&mut sink),
        )
        .unwrap();
        assert_eq!(records.len(), N);

        let output = String::from_utf8(sink).unwrap();
        let mut reported: Vec<usize> = output
            .lines()
            .map(|line| {
                let open = line.find('[').unwrap();
                let close = line.find(']').unwrap();
                line[open + 1..close].parse::<usize>().unwrap()
            })
            .collect();
        reported.sort_unstable();
        assert_eq!(reported, (0..N).collect::<Vec<_>>());
    }

    #[test]
    fn sequential_path_reports_in_index_order() {
        let layouts = counted_layouts(4);
        let base = BaseContext::default();
        let mut sink = Vec::new();

        compute_records(
            &layouts,
            &behavior(),
            &base,
            &CellCountComputer,
            1,
            Some(&mut sink),
        )
        .unwrap();

        let output = String::from_utf8(sink).unwrap();
        let reported: Vec<usize> = output
            .lines()
            .map(|line| {
                let open = line.find('[').unwrap();
                let close = line.find(']').unwrap();
                line[open + 1..close].parse::<usize>().unwrap()
            })
            .collect();
        assert_eq!(reported, vec![0, 1, 2, 3]);
    }
}
