use meritpp::core::io::layout::LayoutReadError;
use meritpp::core::io::report::ReportError;
use meritpp::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to parse layout '{path}': {source}", path = path.display())]
    LayoutParsing {
        path: PathBuf,
        #[source]
        source: LayoutReadError,
    },

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Data error: {0}")]
    Data(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
