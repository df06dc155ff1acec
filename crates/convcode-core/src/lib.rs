//! # Convolutional Coding Library
//!
//! A rate 1/n convolutional encoder and a maximum-likelihood Viterbi decoder
//! for the same code, with hard-decision (Hamming) and soft-decision
//! (squared Euclidean) branch metrics.
//!
//! ## Overview
//!
//! A code is defined by its constraint length K and n generator polynomials.
//! Generators are tap masks over the shift register, least-significant bit
//! first: bit `i` selects register position `i`, where position 0 is the
//! newest input bit. The trellis has 2^(K-1) states.
//!
//! ```text
//! TX: data bits -> flush K-1 zeros -> shift register -> n parity bits per input
//! RX: n symbols per step -> add-compare-select -> survivor traceback -> data bits
//! ```
//!
//! ## Example
//!
//! ```rust
//! use convcode_core::{CodeConfig, ConvolutionalEncoder, ViterbiDecoder};
//!
//! let encoder = ConvolutionalEncoder::new(CodeConfig::simple_k3()).unwrap();
//! let decoder = ViterbiDecoder::new(&encoder);
//!
//! let data = vec![true, false, true, true, false];
//! let mut received = encoder.encode(&data);
//! received[3] = !received[3];
//!
//! assert_eq!(decoder.decode(&received), data);
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod metric;
pub mod register;
pub mod viterbi;

// Re-export main types
pub use config::{CodeConfig, DecisionMode, MAX_CONSTRAINT_LENGTH};
pub use encoder::{free_distance, ConvolutionalEncoder, Transition};
pub use error::{FecError, FecResult};
pub use metric::{BranchMetric, Hamming, SquaredEuclidean};
pub use register::ShiftRegister;
pub use viterbi::{DecodeOutcome, ViterbiDecoder};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{CodeConfig, DecisionMode};
    pub use crate::encoder::ConvolutionalEncoder;
    pub use crate::error::{FecError, FecResult};
    pub use crate::metric::{BranchMetric, Hamming, SquaredEuclidean};
    pub use crate::viterbi::{DecodeOutcome, ViterbiDecoder};
}
