use crate::core::metrics::FomMetrics;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Condvar, Mutex, MutexGuard};

/// One completed candidate, as reported by the worker that evaluated it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProgressReport {
    pub index: usize,
    pub metrics: FomMetrics,
}

/// Monitor-protected FIFO of completion reports.
///
/// Workers enqueue reports concurrently; a single consumer (the thread that
/// started the evaluation, never a worker) drains the queue and prints one
/// complete line per report. Lines can interleave across candidates only at
/// line granularity, never mid-line. The consumer terminates once every
/// registered producer has finished and the queue is empty, so a worker that
/// stops early cannot wedge the caller.
pub(crate) struct ProgressQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

struct QueueState {
    pending: VecDeque<ProgressReport>,
    producers: usize,
}

impl ProgressQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                producers: 0,
            }),
            ready: Condvar::new(),
        }
    }

    // A poisoned monitor can only lose progress lines, never results.
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a producer. Must be called before the consumer starts
    /// draining, or the consumer may observe an empty, producer-less queue
    /// and stop early.
    pub fn producer(&self) -> ProgressProducer<'_> {
        self.lock_state().producers += 1;
        ProgressProducer { queue: self }
    }

    fn pop(&self) -> Option<ProgressReport> {
        let mut state = self.lock_state();
        loop {
            if let Some(report) = state.pending.pop_front() {
                return Some(report);
            }
            if state.producers == 0 {
                return None;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Consumer loop: blocks until reports arrive, prints them, and repeats
    /// until all producers are done. Returns the number of reports consumed.
    /// A sink write failure stops printing but not consumption.
    pub fn drain(&self, sink: &mut dyn Write) -> usize {
        let mut consumed = 0;
        let mut sink_broken = false;
        while let Some(report) = self.pop() {
            consumed += 1;
            if !sink_broken
                && writeln!(sink, "{}", format_report_line(report.index, &report.metrics)).is_err()
            {
                sink_broken = true;
            }
        }
        consumed
    }
}

/// A worker's handle for enqueuing reports; completion is signalled on drop.
pub(crate) struct ProgressProducer<'a> {
    queue: &'a ProgressQueue,
}

impl ProgressProducer<'_> {
    pub fn report(&self, index: usize, metrics: FomMetrics) {
        let mut state = self.queue.lock_state();
        state.pending.push_back(ProgressReport { index, metrics });
        drop(state);
        self.queue.ready.notify_one();
    }
}

impl Drop for ProgressProducer<'_> {
    fn drop(&mut self) {
        let mut state = self.queue.lock_state();
        state.producers -= 1;
        drop(state);
        self.queue.ready.notify_all();
    }
}

/// Formats the per-candidate console line.
pub(crate) fn format_report_line(index: usize, metrics: &FomMetrics) -> String {
    format!(
        "  [{index}] CT={:.2} K | OPD={:.3} | MDC_As={:.3} nm | MDC_Vac={:.3} nm | BBR={:.2} mV",
        metrics.critical_temperature,
        metrics.operational_domain_ratio,
        metrics.defect_clearance_arsenic,
        metrics.defect_clearance_vacancy,
        metrics.band_bending_resilience_mv,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn record(index: usize) -> FomMetrics {
        FomMetrics {
            critical_temperature: index as f64,
            ..FomMetrics::default()
        }
    }

    #[test]
    fn drain_without_producers_returns_immediately() {
        let queue = ProgressQueue::new();
        let mut sink = Vec::new();
        assert_eq!(queue.drain(&mut sink), 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn every_report_is_printed_exactly_once() {
        const WORKERS: usize = 4;
        const PER_WORKER: usize = 25;

        let queue = ProgressQueue::new();
        let mut sink = Vec::new();

        let consumed = thread::scope(|scope| {
            for worker in 0..WORKERS {
                let producer = queue.producer();
                scope.spawn(move || {
                    for i in 0..PER_WORKER {
                        producer.report(worker * PER_WORKER + i, record(worker));
                    }
                });
            }
            queue.drain(&mut sink)
        });

        assert_eq!(consumed, WORKERS * PER_WORKER);

        let output = String::from_utf8(sink).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), WORKERS * PER_WORKER);

        let mut seen: Vec<usize> = lines
            .iter()
            .map(|line| {
                assert!(line.starts_with("  ["), "partial line: {line:?}");
                let open = line.find('[').unwrap();
                let close = line.find(']').unwrap();
                line[open + 1..close].parse::<usize>().unwrap()
            })
            .collect();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..WORKERS * PER_WORKER).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn consumer_stops_when_producers_finish_early() {
        let queue = ProgressQueue::new();
        let mut sink = Vec::new();

        let consumed = thread::scope(|scope| {
            let producer = queue.producer();
            scope.spawn(move || {
                producer.report(0, record(0));
                // The producer drops here without reporting anything else,
                // simulating a worker that failed mid-batch.
            });
            queue.drain(&mut sink)
        });

        assert_eq!(consumed, 1);
    }

    #[test]
    fn report_lines_are_complete_and_labeled() {
        let metrics = FomMetrics {
            critical_temperature: 310.25,
            operational_domain_ratio: 0.52,
            defect_clearance_arsenic: 1.1,
            defect_clearance_vacancy: 1.3,
            band_bending_resilience_mv: 197.4,
            chi_value: 0.0,
        };
        let line = format_report_line(7, &metrics);
        assert!(line.contains("[7]"));
        assert!(line.contains("CT=310.25 K"));
        assert!(line.contains("OPD=0.520"));
        assert!(line.contains("BBR=197.40 mV"));
    }
}
