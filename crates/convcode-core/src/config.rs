//! Code parameters
//!
//! A convolutional code is fully described by its constraint length K and an
//! ordered set of generator tap patterns. Each generator is a bitmask over the
//! K register positions, least-significant bit first: bit `i` set means
//! register position `i` (position 0 = most recently inserted bit) is XOR-ed
//! into that generator's output.
//!
//! ## Standard Codes
//!
//! - **K=3, Rate 1/2**: taps [7, 5] (111, 101)
//! - **K=3, Rate 1/3**: taps [7, 5, 3]
//! - **K=5, Rate 1/2**: taps [0o23, 0o33]
//! - **K=7, Rate 1/2**: taps [0o171, 0o133]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FecError, FecResult};

/// Largest supported constraint length. The decoder keeps a dense trellis of
/// 2^(K-1) states plus one survivor pointer per state and step, so K is
/// capped at 2^15 states.
pub const MAX_CONSTRAINT_LENGTH: usize = 16;

/// Configuration for a convolutional code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeConfig {
    /// Constraint length K (memory + 1)
    pub constraint_length: usize,
    /// Generator tap patterns (one per output bit)
    pub generators: Vec<u32>,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self::simple_k3()
    }
}

impl CodeConfig {
    pub fn new(constraint_length: usize, generators: Vec<u32>) -> Self {
        Self {
            constraint_length,
            generators,
        }
    }

    /// Simple rate 1/2, K=3 code.
    ///
    /// Generators: 7 (111), 5 (101)
    pub fn simple_k3() -> Self {
        Self::new(3, vec![0b111, 0b101])
    }

    /// Rate 1/3, K=3 code.
    pub fn k3_rate_third() -> Self {
        Self::new(3, vec![0b111, 0b101, 0b011])
    }

    /// Rate 1/2, K=5 code (GSM full-rate speech taps).
    pub fn gsm_k5_rate_half() -> Self {
        Self::new(5, vec![0o23, 0o33])
    }

    /// Rate 1/2, K=7 code with the 171/133 taps (Voyager, 802.11a/g, DVB-S).
    pub fn nasa_k7_rate_half() -> Self {
        Self::new(7, vec![0o171, 0o133])
    }

    /// Check the parameters.
    ///
    /// Fails if K is zero or above [`MAX_CONSTRAINT_LENGTH`], if there are no
    /// generators, or if a generator taps a position at or beyond K.
    pub fn validate(&self) -> FecResult<()> {
        let k = self.constraint_length;
        if k < 1 {
            return Err(FecError::invalid_config("constraint length must be at least 1"));
        }
        if k > MAX_CONSTRAINT_LENGTH {
            return Err(FecError::invalid_config(format!(
                "constraint length {} exceeds maximum of {}",
                k, MAX_CONSTRAINT_LENGTH
            )));
        }
        if self.generators.is_empty() {
            return Err(FecError::invalid_config("at least one generator is required"));
        }
        for (index, &gen) in self.generators.iter().enumerate() {
            let width = (u32::BITS - gen.leading_zeros()) as usize;
            if width > k {
                return Err(FecError::invalid_config(format!(
                    "generator #{} ({:#b}) taps position {} but K={}",
                    index,
                    gen,
                    width - 1,
                    k
                )));
            }
        }
        Ok(())
    }

    /// Number of output bits per input bit (n).
    pub fn outputs_per_input(&self) -> usize {
        self.generators.len()
    }

    /// Code rate 1/n.
    pub fn rate(&self) -> f64 {
        1.0 / self.generators.len() as f64
    }

    /// Register memory m = K - 1.
    pub fn memory(&self) -> usize {
        self.constraint_length.saturating_sub(1)
    }

    /// Number of trellis states 2^m.
    pub fn num_states(&self) -> usize {
        1 << self.memory()
    }
}

impl fmt::Display for CodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conv(K={}, rate=1/{}, generators={:?})",
            self.constraint_length,
            self.generators.len(),
            self.generators
                .iter()
                .map(|g| format!("{:0width$b}", g, width = self.constraint_length))
                .collect::<Vec<_>>()
        )
    }
}

/// Decision mode for the decoder input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionMode {
    /// Bits in, Hamming branch metric
    Hard,
    /// Real-valued antipodal symbols in, squared Euclidean branch metric
    #[default]
    Soft,
}

impl fmt::Display for DecisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionMode::Hard => write!(f, "hard"),
            DecisionMode::Soft => write!(f, "soft"),
        }
    }
}
