use convcode_core::FecError;

pub type SimResult<T> = Result<T, SimError>;

/// Errors that can occur while configuring or running a simulation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("error probability {0} outside [0, 1]")]
    InvalidProbability(f64),

    #[error("SNR must be finite, got {0} dB")]
    InvalidSnr(f64),

    #[error("invalid sweep: {0}")]
    InvalidSweep(String),

    #[error(transparent)]
    Fec(#[from] FecError),
}
