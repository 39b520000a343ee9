use super::context::MetricContext;
use super::{
    FomMetrics, MetricComputer, MetricError, band_bending, critical_temperature, defect_clearance,
    operational_domain,
};
use crate::core::models::defect::DefectKind;
use crate::core::models::layout::GateLayout;
use crate::core::models::truth_table::TruthTable;
use tracing::debug;

/// The built-in metric backend.
///
/// Computes all five figures of merit from closed-form electrostatic
/// estimates. Deterministic; a full simulator backend can be swapped in
/// through the [`MetricComputer`] trait without touching the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalMetricComputer;

impl PhysicalMetricComputer {
    pub fn new() -> Self {
        Self
    }
}

impl MetricComputer for PhysicalMetricComputer {
    fn compute(
        &self,
        layout: &GateLayout,
        behavior: &[TruthTable],
        context: &mut MetricContext,
    ) -> Result<FomMetrics, MetricError> {
        if layout.is_empty() {
            return Err(MetricError::EmptyLayout);
        }
        if behavior.is_empty() {
            return Err(MetricError::MissingBehavior);
        }

        let mut record = FomMetrics::default();

        let domain_stats = operational_domain::grid_search(
            layout,
            behavior,
            &mut context.sweep,
            context.operating_condition,
        )?;
        if domain_stats.total_parameter_points != 0 {
            record.operational_domain_ratio = domain_stats.operational_parameter_points as f64
                / domain_stats.total_parameter_points as f64;
        }

        record.critical_temperature =
            critical_temperature::gate_based(layout, behavior, &context.simulation);

        let resilience_v = band_bending::resilience(layout, &context.stability, &context.simulation);
        record.band_bending_resilience_mv = resilience_v * 1000.0;

        for defect in &context.defects {
            let clearance = defect_clearance::grid_search(
                layout,
                defect,
                context.scan_margin,
                &context.simulation,
                None,
            );
            match defect.kind {
                DefectKind::Arsenic => record.defect_clearance_arsenic = clearance,
                DefectKind::SiVacancy => record.defect_clearance_vacancy = clearance,
            }
        }

        debug!(
            cells = layout.cell_count(),
            ct = record.critical_temperature,
            opd = record.operational_domain_ratio,
            "Metric record computed."
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::context::BaseContext;
    use crate::core::models::cell::SiDbCell;

    fn pair_layout() -> GateLayout {
        GateLayout::new(vec![SiDbCell::new(0, 0, 0), SiDbCell::new(4, 0, 0)])
    }

    #[test]
    fn computes_a_fully_populated_record() {
        let computer = PhysicalMetricComputer::new();
        let mut ctx = MetricContext::derive(&BaseContext::default());
        let record = computer
            .compute(&pair_layout(), &[TruthTable::and()], &mut ctx)
            .unwrap();

        assert!(record.critical_temperature > 0.0);
        assert!(record.operational_domain_ratio > 0.0);
        assert!(record.operational_domain_ratio <= 1.0);
        assert!(record.defect_clearance_arsenic > 0.0);
        assert!(record.defect_clearance_vacancy > 0.0);
        assert!(record.band_bending_resilience_mv > 0.0);
        assert_eq!(record.chi_value, 0.0);
    }

    #[test]
    fn empty_layout_is_a_structural_failure() {
        let computer = PhysicalMetricComputer::new();
        let mut ctx = MetricContext::derive(&BaseContext::default());
        let result = computer.compute(&GateLayout::default(), &[TruthTable::and()], &mut ctx);
        assert_eq!(result, Err(MetricError::EmptyLayout));
    }

    #[test]
    fn missing_behavior_is_rejected() {
        let computer = PhysicalMetricComputer::new();
        let mut ctx = MetricContext::derive(&BaseContext::default());
        let result = computer.compute(&pair_layout(), &[], &mut ctx);
        assert_eq!(result, Err(MetricError::MissingBehavior));
    }

    #[test]
    fn identical_inputs_produce_identical_records() {
        let computer = PhysicalMetricComputer::new();
        let base = BaseContext::default();
        let behavior = [TruthTable::xor()];

        let mut ctx_a = MetricContext::derive(&base);
        let mut ctx_b = MetricContext::derive(&base);
        let a = computer
            .compute(&pair_layout(), &behavior, &mut ctx_a)
            .unwrap();
        let b = computer
            .compute(&pair_layout(), &behavior, &mut ctx_b)
            .unwrap();
        assert_eq!(a, b);
    }
}
