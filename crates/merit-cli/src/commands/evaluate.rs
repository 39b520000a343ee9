use crate::cli::EvaluateArgs;
use crate::error::{CliError, Result};
use crate::progress::BatchProgress;
use meritpp::core::io::layout;
use meritpp::core::io::report::{self, ReportError};
use meritpp::core::metrics::context::BaseContext;
use meritpp::core::metrics::{FomMetrics, PhysicalMetricComputer};
use meritpp::core::models::layout::GateLayout;
use meritpp::core::models::truth_table::{candidate_gate_names, resolve_truth_tables};
use meritpp::engine::config::{DEFAULT_WORKER_CAP, EvaluationConfig};
use meritpp::workflows;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};

const BATCH_HEADER: [&str; 9] = [
    "gate",
    "file",
    "index",
    "critical_temperature_K",
    "operational_domain_ratio",
    "defect_clearance_arsenic_nm",
    "defect_clearance_vacancy_nm",
    "band_bending_resilience_mV",
    "chi",
];

#[derive(Debug, Serialize)]
struct BatchRow<'a> {
    gate: &'a str,
    file: &'a str,
    index: usize,
    critical_temperature_k: f64,
    operational_domain_ratio: f64,
    defect_clearance_arsenic_nm: f64,
    defect_clearance_vacancy_nm: f64,
    band_bending_resilience_mv: f64,
    chi: f64,
}

impl<'a> BatchRow<'a> {
    fn new(gate: &'a str, file: &'a str, index: usize, metrics: &FomMetrics) -> Self {
        Self {
            gate,
            file,
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

struct LayoutEntry {
    path: PathBuf,
    layout: GateLayout,
}

pub fn run(args: &EvaluateArgs, thread_cap: Option<usize>) -> Result<()> {
    if args.sample_count == Some(0) {
        return Err(CliError::Argument(
            "--sample-count must be greater than zero".to_string(),
        ));
    }
    for dir in &args.input_dirs {
        if !dir.is_dir() {
            return Err(CliError::Argument(format!(
                "'{}' is not a valid directory",
                dir.display()
            )));
        }
    }

    let mut layout_files = collect_layout_files(args)?;

    if let Some(count) = args.sample_count {
        if count >= layout_files.len() {
            if count > layout_files.len() {
                warn!(
                    "Requested sample count ({count}) exceeds available layout files ({}); \
                     processing all files without sampling.",
                    layout_files.len()
                );
            }
        } else {
            layout_files.shuffle(&mut rand::thread_rng());
            layout_files.truncate(count);
        }
    }
    layout_files.sort();

    if layout_files.is_empty() {
        println!("No layout files found in the given directories. Nothing to do.");
        return Ok(());
    }

    // Group files by gate name; the BTreeMap keeps group iteration sorted.
    let mut groups: BTreeMap<String, Vec<LayoutEntry>> = BTreeMap::new();
    let mut group_candidates: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut load_errors = 0usize;

    for path in layout_files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let candidates = candidate_gate_names(&stem);
        let group_key = candidates.get(1).unwrap_or(&candidates[0]).clone();

        match layout::read_layout_from_path(&path) {
            Ok((layout, _metadata)) => {
                groups
                    .entry(group_key.clone())
                    .or_default()
                    .push(LayoutEntry { path, layout });
                let names = group_candidates.entry(group_key).or_default();
                for candidate in candidates {
                    if !names.contains(&candidate) {
                        names.push(candidate);
                    }
                }
            }
            Err(source) => {
                let err = CliError::LayoutParsing { path, source };
                warn!("Skipping layout: {err}");
                load_errors += 1;
            }
        }
    }

    if groups.is_empty() {
        println!("No valid layouts could be loaded from the given directories.");
        return if load_errors == 0 {
            Ok(())
        } else {
            Err(CliError::Data(format!(
                "{load_errors} layout file(s) failed to load"
            )))
        };
    }

    fs::create_dir_all(&args.output_dir)?;
    let table_path = args.output_dir.join("fom_table.csv");
    let best_path = args.output_dir.join("fom_best_only.csv");

    let mut table_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&table_path)
        .map_err(ReportError::from)?;
    let mut best_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&best_path)
        .map_err(ReportError::from)?;
    table_writer
        .write_record(BATCH_HEADER)
        .map_err(ReportError::from)?;
    best_writer
        .write_record(BATCH_HEADER)
        .map_err(ReportError::from)?;

    let computer = PhysicalMetricComputer::new();
    let base = BaseContext::default();
    let config = EvaluationConfig {
        worker_cap: thread_cap.unwrap_or(DEFAULT_WORKER_CAP),
        verbose: args.progress,
        ..EvaluationConfig::default()
    };

    let bar = BatchProgress::new(groups.len() as u64, !args.progress);
    let mut processed = 0usize;
    let mut failed = 0usize;

    for (gate_name, entries) in &groups {
        bar.start_group(gate_name);

        let candidates = &group_candidates[gate_name];
        let Some(tables) = resolve_truth_tables(candidates) else {
            warn!(
                "Skipping gate '{gate_name}': no known truth table generator for candidates {:?}.",
                candidates
            );
            bar.finish_group();
            continue;
        };

        let layouts: Vec<GateLayout> = entries.iter().map(|entry| entry.layout.clone()).collect();

        let evaluation = match workflows::evaluate::run(&layouts, &tables, &base, &computer, &config)
        {
            Ok(Some(result)) => result,
            Ok(None) => {
                bar.finish_group();
                continue;
            }
            Err(e) => {
                // One failed group must not stop the rest of the batch, but
                // it must not emit any table rows either.
                error!("FoM evaluation failed for gate '{gate_name}': {e}");
                failed += 1;
                bar.finish_group();
                continue;
            }
        };

        for (index, entry) in evaluation.metrics.iter().enumerate() {
            let file_name = entries[index]
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let row = BatchRow::new(gate_name, &file_name, index, entry);

            if let Err(e) = table_writer.serialize(&row) {
                warn!("Failed to append to '{}': {}", table_path.display(), e);
            }
            if index == evaluation.best_index {
                if let Err(e) = best_writer.serialize(&row) {
                    warn!("Failed to append to '{}': {}", best_path.display(), e);
                }
            }
        }

        if args.gate_reports {
            let report_path = args.output_dir.join(format!("{gate_name}_fom_report.csv"));
            // A failed side report is logged but never invalidates the batch.
            if let Err(e) = report::write_full_table_to_path(&report_path, &evaluation.metrics) {
                warn!(
                    "Failed to write FoM report to '{}': {}",
                    report_path.display(),
                    e
                );
            }
        }

        info!(
            gate = %gate_name,
            layouts = evaluation.metrics.len(),
            best_index = evaluation.best_index,
            best_chi = evaluation.best_chi,
            "Gate group processed."
        );
        processed += 1;
        bar.finish_group();
    }

    table_writer.flush()?;
    best_writer.flush()?;
    bar.finish();

    println!(
        "FoM evaluation complete. Reports written to '{}'. Processed {} gate group(s).",
        args.output_dir.display(),
        processed
    );
    if failed > 0 {
        eprintln!("{failed} gate group(s) failed to evaluate; see the log for details.");
    }
    if load_errors > 0 {
        eprintln!("{load_errors} layout file(s) could not be loaded.");
    }

    Ok(())
}

fn collect_layout_files(args: &EvaluateArgs) -> Result<Vec<PathBuf>> {
    let mut layout_files = Vec::new();
    for dir in &args.input_dirs {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                layout_files.push(path);
            }
        }
    }
    Ok(layout_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    fn write_layout(dir: &Path, name: &str, cells: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        writeln!(file, "cells = {cells}").unwrap();
    }

    fn evaluate_args(input: &Path, output: &Path) -> EvaluateArgs {
        EvaluateArgs {
            input_dirs: vec![input.to_path_buf()],
            output_dir: output.to_path_buf(),
            sample_count: None,
            progress: false,
            gate_reports: false,
        }
    }

    #[test]
    fn zero_sample_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = evaluate_args(dir.path(), dir.path());
        args.sample_count = Some(0);
        assert!(matches!(run(&args, None), Err(CliError::Argument(_))));
    }

    #[test]
    fn missing_input_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = evaluate_args(&dir.path().join("nope"), dir.path());
        assert!(matches!(run(&args, None), Err(CliError::Argument(_))));
    }

    #[test]
    fn empty_input_directory_is_not_an_error() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let args = evaluate_args(input.path(), output.path());

        run(&args, None).unwrap();
        // Nothing to do, so no artifacts are produced.
        assert!(!output.path().join("fom_table.csv").exists());
    }

    #[test]
    fn evaluates_groups_and_writes_batch_artifacts() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        write_layout(input.path(), "and_0.toml", "[[0, 0, 0], [4, 0, 0]]");
        write_layout(input.path(), "and_1.toml", "[[0, 0, 0], [5, 0, 0]]");
        write_layout(input.path(), "xor_0.toml", "[[0, 0, 0], [3, 1, 0]]");

        let args = evaluate_args(input.path(), output.path());
        run(&args, Some(2)).unwrap();

        let table = fs::read_to_string(output.path().join("fom_table.csv")).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], BATCH_HEADER.join(","));
        // Three data rows: two for the "and" group, one for "xor".
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("and,and_0.toml,0,"));
        assert!(lines[2].starts_with("and,and_1.toml,1,"));
        assert!(lines[3].starts_with("xor,xor_0.toml,0,"));

        let best = fs::read_to_string(output.path().join("fom_best_only.csv")).unwrap();
        // One best row per group plus the header.
        assert_eq!(best.lines().count(), 3);
    }

    #[test]
    fn unknown_gates_are_skipped_without_failing_the_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        write_layout(input.path(), "mystery_0.toml", "[[0, 0, 0], [4, 0, 0]]");
        write_layout(input.path(), "or_0.toml", "[[0, 0, 0], [4, 0, 0]]");

        let args = evaluate_args(input.path(), output.path());
        run(&args, Some(1)).unwrap();

        let table = fs::read_to_string(output.path().join("fom_table.csv")).unwrap();
        assert_eq!(table.lines().count(), 2);
        assert!(table.lines().nth(1).unwrap().starts_with("or,"));
    }

    #[test]
    fn failing_group_does_not_prevent_other_groups() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        // The empty layout makes the whole "nand" group fail fatally.
        write_layout(input.path(), "nand_0.toml", "[]");
        write_layout(input.path(), "nand_1.toml", "[[0, 0, 0], [4, 0, 0]]");
        write_layout(input.path(), "wire_0.toml", "[[0, 0, 0], [4, 0, 0]]");

        let args = evaluate_args(input.path(), output.path());
        run(&args, Some(1)).unwrap();

        let table = fs::read_to_string(output.path().join("fom_table.csv")).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        // Only the "wire" group may emit rows; the failed group emits none.
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("wire,"));
    }

    #[test]
    fn unreadable_layout_files_are_skipped() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        write_layout(input.path(), "and_0.toml", "[[0, 0, 0], [4, 0, 0]]");
        fs::write(input.path().join("and_1.toml"), "not a layout at all").unwrap();

        let args = evaluate_args(input.path(), output.path());
        run(&args, Some(1)).unwrap();

        let table = fs::read_to_string(output.path().join("fom_table.csv")).unwrap();
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn gate_reports_are_written_on_request() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        write_layout(input.path(), "maj_0.toml", "[[0, 0, 0], [4, 0, 0], [2, 2, 0]]");

        let mut args = evaluate_args(input.path(), output.path());
        args.gate_reports = true;
        run(&args, Some(1)).unwrap();

        let report = fs::read_to_string(output.path().join("maj_fom_report.csv")).unwrap();
        assert_eq!(report.lines().count(), 2);
        assert!(report.starts_with("index,critical_temperature_K"));
    }

    #[test]
    fn sample_count_limits_the_number_of_rows() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        for i in 0..6 {
            write_layout(
                input.path(),
                &format!("and_{i}.toml"),
                "[[0, 0, 0], [4, 0, 0]]",
            );
        }

        let mut args = evaluate_args(input.path(), output.path());
        args.sample_count = Some(2);
        run(&args, Some(1)).unwrap();

        let table = fs::read_to_string(output.path().join("fom_table.csv")).unwrap();
        assert_eq!(table.lines().count(), 3);
    }
}
