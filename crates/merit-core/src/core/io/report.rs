use crate::core::metrics::FomMetrics;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

/// Report column order: candidate index, the five raw metrics, chi.
const HEADER: [&str; 7] = [
    "index",
    "critical_temperature_K",
    "operational_domain_ratio",
    "defect_clearance_arsenic_nm",
    "defect_clearance_vacancy_nm",
    "band_bending_resilience_mV",
    "chi",
];

#[derive(Debug, Serialize)]
struct ReportRow {
    index: usize,
    critical_temperature_k: f64,
    operational_domain_ratio: f64,
    defect_clearance_arsenic_nm: f64,
    defect_clearance_vacancy_nm: f64,
    band_bending_resilience_mv: f64,
    chi: f64,
}

impl ReportRow {
    fn new(index: usize, metrics: &FomMetrics) -> Self {
        Self {
            index,
            critical_temperature_k: metrics.critical_temperature,
            operational_domain_ratio: metrics.operational_domain_ratio,
            defect_clearance_arsenic_nm: metrics.defect_clearance_arsenic,
            defect_clearance_vacancy_nm: metrics.defect_clearance_vacancy,
            band_bending_resilience_mv: metrics.band_bending_resilience_mv,
            chi: metrics.chi_value,
        }
    }
}

fn write_rows<W: Write>(
    writer: W,
    rows: impl Iterator<Item = ReportRow>,
) -> Result<(), ReportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    // The header is written explicitly so that an empty table still produces
    // a header-only artifact.
    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the full metric table, one row per candidate. An empty table
/// produces only the header row.
pub fn write_full_table<W: Write>(writer: W, metrics: &[FomMetrics]) -> Result<(), ReportError> {
    write_rows(
        writer,
        metrics
            .iter()
            .enumerate()
            .map(|(index, entry)| ReportRow::new(index, entry)),
    )
}

/// Writes a best-only artifact: the header plus the single row of the best
/// candidate, or only the header when there is no best candidate.
pub fn write_best_only<W: Write>(
    writer: W,
    best: Option<(usize, &FomMetrics)>,
) -> Result<(), ReportError> {
    write_rows(
        writer,
        best.into_iter()
            .map(|(index, entry)| ReportRow::new(index, entry)),
    )
}

pub fn write_full_table_to_path<P: AsRef<Path>>(
    path: P,
    metrics: &[FomMetrics],
) -> Result<(), ReportError> {
    let file = File::create(path)?;
    write_full_table(BufWriter::new(file), metrics)
}

pub fn write_best_only_to_path<P: AsRef<Path>>(
    path: P,
    best: Option<(usize, &FomMetrics)>,
) -> Result<(), ReportError> {
    let file = File::create(path)?;
    write_best_only(BufWriter::new(file), best)
}
