//! Domain error types.

use crate::domain::pipeline::{StageId, StageStatus};
use crate::domain::schedule::RunId;

/// Top-level error type for stockcast.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("insufficient history: have {points} points, need {minimum}")]
    InsufficientHistory { points: usize, minimum: usize },

    #[error("stale continuation for {run}")]
    StaleRun { run: RunId },

    #[error("stage {stage} failed: {source}")]
    StageFailed {
        stage: StageId,
        #[source]
        source: Box<StockcastError>,
    },

    #[error("stage {stage} cannot move from {from} to {to}")]
    InvalidTransition {
        stage: StageId,
        from: StageStatus,
        to: StageStatus,
    },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("no instrument selected")]
    NoInstrumentSelected,

    #[error("catalog error: {reason}")]
    Catalog { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockcastError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        StockcastError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        StockcastError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        let code: u8 = match err {
            StockcastError::Io(_) => 1,
            StockcastError::ConfigParse { .. }
            | StockcastError::ConfigMissing { .. }
            | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::Catalog { .. }
            | StockcastError::UnknownSymbol { .. }
            | StockcastError::NoInstrumentSelected => 3,
            StockcastError::InvalidInput { .. } | StockcastError::InsufficientHistory { .. } => 4,
            StockcastError::StaleRun { .. }
            | StockcastError::StageFailed { .. }
            | StockcastError::InvalidTransition { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
