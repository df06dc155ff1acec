use convcode_core::FecError;
use convcode_sim::SimError;

use crate::config::ConfigError;

pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced by the `convcode` binary
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid bit '{0}' in input, expected 0 or 1")]
    InvalidBit(char),

    #[error("invalid soft symbol '{0}'")]
    InvalidSymbol(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fec(#[from] FecError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
