//! # MERIT++ Core Library
//!
//! A library for evaluating batches of silicon dangling bond (SiDB) gate layouts
//! against several expensive figures of merit (FoMs) and selecting the
//! best-scoring candidate, safely and in parallel.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`GateLayout`,
//!   `TruthTable`, the charged-defect catalog), the figure-of-merit estimators
//!   behind the `MetricComputer` seam, and I/O utilities (TOML layout files,
//!   CSV report artifacts).
//!
//! - **[`engine`]: The Logic Core.** This stateful layer coordinates parallel
//!   evaluation: a bounded worker pool fed by a single atomic work index,
//!   per-worker metric contexts, a monitor-protected progress channel, and the
//!   score aggregation that turns raw metric columns into a single chi value
//!   per candidate.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It
//!   ties `engine` and `core` together into the complete evaluation procedure:
//!   candidates in, index-aligned metric table and best candidate out.

pub mod core;
pub mod engine;
pub mod workflows;
