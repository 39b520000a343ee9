use super::config::ChiWeights;
use super::state::EvaluationResult;
use crate::core::metrics::FomMetrics;

/// Column maxima across the whole metric table.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnMaxima {
    critical_temperature: f64,
    operational_ratio: f64,
    clearance_arsenic: f64,
    clearance_vacancy: f64,
    band_bending: f64,
}

impl ColumnMaxima {
    fn of(metrics: &[FomMetrics]) -> Self {
        let mut maxima = Self::default();
        for entry in metrics {
            maxima.critical_temperature = maxima.critical_temperature.max(entry.critical_temperature);
            maxima.operational_ratio = maxima.operational_ratio.max(entry.operational_domain_ratio);
            maxima.clearance_arsenic = maxima.clearance_arsenic.max(entry.defect_clearance_arsenic);
            maxima.clearance_vacancy = maxima.clearance_vacancy.max(entry.defect_clearance_vacancy);
            maxima.band_bending = maxima.band_bending.max(entry.band_bending_resilience_mv);
        }
        maxima
    }
}

/// Normalizes a column value by its column maximum. A maximum numerically
/// indistinguishable from zero maps the whole column to zero instead of
/// propagating a division by ~0.
fn safe_norm(value: f64, max: f64) -> f64 {
    if max <= f64::EPSILON { 0.0 } else { value / max }
}

/// Normalizes every metric column, fills in each record's chi value, and
/// selects the candidate with the minimal chi. Ties are broken by the lowest
/// index. The table must not be empty.
pub(crate) fn aggregate(mut metrics: Vec<FomMetrics>, weights: &ChiWeights) -> EvaluationResult {
    debug_assert!(!metrics.is_empty());

    let maxima = ColumnMaxima::of(&metrics);

    let mut best_index = 0usize;
    let mut best_chi = f64::MAX;

    for (index, entry) in metrics.iter_mut().enumerate() {
        let chi = weights.critical_temperature
            * safe_norm(entry.critical_temperature, maxima.critical_temperature)
            + weights.operational_ratio
                * safe_norm(entry.operational_domain_ratio, maxima.operational_ratio)
            + weights.clearance_arsenic
                * safe_norm(entry.defect_clearance_arsenic, maxima.clearance_arsenic)
            + weights.clearance_vacancy
                * safe_norm(entry.defect_clearance_vacancy, maxima.clearance_vacancy)
            + weights.band_bending
                * safe_norm(entry.band_bending_resilience_mv, maxima.band_bending);
        entry.chi_value = chi;

        if chi < best_chi {
            best_chi = chi;
            best_index = index;
        }
    }

    EvaluationResult {
        metrics,
        best_index,
        best_chi,
    }
}
