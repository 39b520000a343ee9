use crate::core::metrics::MetricError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Metric computation failed for candidate {index}: {source}")]
    Metric {
        index: usize,
        #[source]
        source: MetricError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
