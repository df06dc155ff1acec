//! Error types for the convolutional codec

use thiserror::Error;

/// Result type for codec operations
pub type FecResult<T> = Result<T, FecError>;

/// Errors raised by the encoder and decoder.
///
/// Only [`FecError::InvalidConfig`] is ever returned from construction.
/// Decoding is total: truncation is a defined behavior and a degenerate
/// traceback step falls back to bit 0, so those two variants only surface
/// through [`crate::ViterbiDecoder::check_length`] and the warning log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FecError {
    /// Code parameters rejected at construction
    #[error("invalid code configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Received length is not a whole number of trellis steps
    #[error("received {received} symbols, not a multiple of {multiple}; trailing {} dropped", .received % .multiple)]
    TruncatedInput { received: usize, multiple: usize },

    /// No input bit reproduces an observed survivor transition
    #[error("degenerate traceback at step {step}: no input drives state {from} to state {to}")]
    DegenerateTraceback { step: usize, from: usize, to: usize },
}

impl FecError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        FecError::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this error is fatal to the caller
    pub fn is_fatal(&self) -> bool {
        matches!(self, FecError::InvalidConfig { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_message_reports_remainder() {
        let err = FecError::TruncatedInput {
            received: 15,
            multiple: 2,
        };
        assert_eq!(
            err.to_string(),
            "received 15 symbols, not a multiple of 2; trailing 1 dropped"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let err = FecError::invalid_config("no generators");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "invalid code configuration: no generators");
    }
}
