use super::MetricError;
use super::context::{OperatingCondition, SweepDimension};
use crate::core::models::layout::GateLayout;
use crate::core::models::truth_table::TruthTable;

/// Coupling strength above which kink states start to form.
const KINK_COUPLING_CEILING: f64 = 0.2;

/// Counters collected while sweeping the operational domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationalDomainStats {
    pub total_parameter_points: usize,
    pub operational_parameter_points: usize,
}

/// Whether the layout implements its expected behavior at one parameter point.
///
/// The gate operates when the inter-site coupling is strong enough to drive
/// the required logic transitions; under the reject-kinks condition an
/// over-coupled layout is rejected as well.
pub fn is_operational(
    layout: &GateLayout,
    behavior: &[TruthTable],
    epsilon_r: f64,
    lambda_tf: f64,
    condition: OperatingCondition,
) -> bool {
    let Some(d_min) = layout.min_cell_spacing_nm() else {
        // A single isolated site cannot implement any logic function.
        return false;
    };

    let coupling = (-d_min / lambda_tf).exp() / epsilon_r;
    if coupling < required_drive(behavior) {
        return false;
    }
    if condition == OperatingCondition::RejectKinks && coupling > KINK_COUPLING_CEILING {
        return false;
    }
    true
}

/// Minimum coupling strength the expected behavior demands.
fn required_drive(behavior: &[TruthTable]) -> f64 {
    let outputs = behavior.len().max(1) as f64;
    let (ones, rows) = behavior.iter().fold((0u32, 0usize), |(ones, rows), table| {
        (ones + table.ones_count(), rows + table.num_rows())
    });
    let ones_fraction = if rows == 0 {
        0.0
    } else {
        f64::from(ones) / rows as f64
    };
    0.13 + 0.04 * ones_fraction + 0.02 * (outputs - 1.0)
}

/// Sweeps both context dimensions and counts the parameter points at which
/// the layout is operational. The sweep cursors advance in place.
pub fn grid_search(
    layout: &GateLayout,
    behavior: &[TruthTable],
    dimensions: &mut [SweepDimension; 2],
    condition: OperatingCondition,
) -> Result<OperationalDomainStats, MetricError> {
    for dim in dimensions.iter() {
        if dim.step <= 0.0 || dim.max < dim.min {
            return Err(MetricError::DegenerateSweep {
                name: dim.name,
                min: dim.min,
                max: dim.max,
                step: dim.step,
            });
        }
    }

    let points = (dimensions[0].point_count(), dimensions[1].point_count());
    let mut stats = OperationalDomainStats::default();

    dimensions[0].reset();
    for outer in 0..points.0 {
        dimensions[0].advance_to(outer);
        dimensions[1].reset();
        for inner in 0..points.1 {
            dimensions[1].advance_to(inner);
            stats.total_parameter_points += 1;
            if is_operational(
                layout,
                behavior,
                dimensions[0].current,
                dimensions[1].current,
                condition,
            ) {
                stats.operational_parameter_points += 1;
            }
        }
    }

    Ok(stats)
}
