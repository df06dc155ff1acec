//! # Convolutional Encoder
//!
//! A rate-1/n convolutional encoder and the trellis it implies. The same
//! output computation drives both [`ConvolutionalEncoder::encode`] (a forward
//! run over a shift register) and [`ConvolutionalEncoder::next_state`] (the
//! state-transition function the Viterbi decoder expands), so walking
//! `next_state` from state 0 reproduces `encode` exactly.
//!
//! ## Example
//!
//! ```rust
//! use convcode_core::{CodeConfig, ConvolutionalEncoder};
//!
//! let encoder = ConvolutionalEncoder::new(CodeConfig::simple_k3()).unwrap();
//! let data = [true, false, true, true, false];
//! let coded = encoder.encode(&data);
//!
//! // (data_len + K - 1) * n = (5 + 2) * 2
//! assert_eq!(coded.len(), 14);
//! ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::config::CodeConfig;
use crate::error::FecResult;
use crate::register::ShiftRegister;

/// One trellis branch: where an input bit leads and what it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next_state: usize,
    pub output: Vec<bool>,
}

/// Convolutional encoder with validated, immutable code parameters.
///
/// The encoder holds no register between calls; every `encode` starts from
/// the all-zero register and ends with K-1 flush bits.
#[derive(Debug, Clone)]
pub struct ConvolutionalEncoder {
    config: CodeConfig,
    memory: usize,
}

impl ConvolutionalEncoder {
    /// Create an encoder, rejecting invalid parameters with
    /// [`FecError::InvalidConfig`](crate::FecError::InvalidConfig).
    pub fn new(config: CodeConfig) -> FecResult<Self> {
        config.validate()?;
        let memory = config.memory();
        tracing::debug!(code = %config, "convolutional encoder configured");
        Ok(Self { config, memory })
    }

    /// Shorthand for `new(CodeConfig::new(k, generators))`.
    pub fn with_generators(constraint_length: usize, generators: &[u32]) -> FecResult<Self> {
        Self::new(CodeConfig::new(constraint_length, generators.to_vec()))
    }

    /// Encode a block of input bits.
    ///
    /// Each input bit is shifted into the register and one output bit per
    /// generator is emitted. The register is then flushed with K-1 zeros.
    ///
    /// Output length: `(input.len() + K - 1) * n`
    pub fn encode(&self, input: &[bool]) -> Vec<bool> {
        let n = self.outputs_per_input();
        let mut output = Vec::with_capacity((input.len() + self.memory) * n);
        let mut register = ShiftRegister::new(self.config.constraint_length);

        let flush = std::iter::repeat(false).take(self.memory);
        for bit in input.iter().copied().chain(flush) {
            register = register.push(bit);
            output.extend(self.config.generators.iter().map(|&g| register.parity(g)));
        }

        output
    }

    /// Encode by walking the trellis from state 0 with [`Self::next_state`],
    /// including the flush bits. Returns the coded bits and the final state.
    pub fn walk(&self, input: &[bool]) -> (Vec<bool>, usize) {
        let mut output = Vec::with_capacity((input.len() + self.memory) * self.outputs_per_input());
        let mut state = 0;

        let flush = std::iter::repeat(false).take(self.memory);
        for bit in input.iter().copied().chain(flush) {
            let transition = self.next_state(state, bit);
            output.extend(transition.output);
            state = transition.next_state;
        }

        (output, state)
    }

    /// Trellis transition from `state` on `input`.
    ///
    /// Rebuilds the register from the state, shifts the input into position 0
    /// and computes the n output bits. The next state is
    /// `(state >> 1) | (input << (m - 1))`; with m = 0 there is a single state
    /// and the next state is always 0.
    pub fn next_state(&self, state: usize, input: bool) -> Transition {
        let register =
            ShiftRegister::from_state(state, self.config.constraint_length).push(input);
        let output = self
            .config
            .generators
            .iter()
            .map(|&g| register.parity(g))
            .collect();

        let next_state = if self.memory == 0 {
            0
        } else {
            (state >> 1) | ((input as usize) << (self.memory - 1))
        };

        Transition { next_state, output }
    }

    /// Number of trellis states: 2^(K-1).
    pub fn state_count(&self) -> usize {
        1 << self.memory
    }

    pub fn constraint_length(&self) -> usize {
        self.config.constraint_length
    }

    pub fn generators(&self) -> &[u32] {
        &self.config.generators
    }

    /// Output bits per input bit (n).
    pub fn outputs_per_input(&self) -> usize {
        self.config.generators.len()
    }

    /// Code rate 1/n.
    pub fn rate(&self) -> f64 {
        self.config.rate()
    }

    /// Register memory m = K - 1 (also the number of flush bits).
    pub fn memory(&self) -> usize {
        self.memory
    }

    pub fn config(&self) -> &CodeConfig {
        &self.config
    }
}

/// Compute the free distance (d_free) of a code.
///
/// The free distance is the minimum output weight over all paths that leave
/// state 0 and later return to it, and bounds the error-correcting capability
/// at floor((d_free - 1) / 2) channel errors.
///
/// Branch output weights are non-negative, so this is a shortest-path search
/// (Dijkstra) from the state reached by input 1 back to state 0. Cost grows
/// with 2^(K-1); fine for the constraint lengths used in practice. Returns 0
/// for K = 1, where every path stays in state 0.
pub fn free_distance(encoder: &ConvolutionalEncoder) -> usize {
    if encoder.memory() == 0 {
        return 0;
    }

    let weight = |t: &Transition| t.output.iter().filter(|&&b| b).count();

    // First step must take input 1 to diverge from the zero state
    let first = encoder.next_state(0, true);
    let mut dist = vec![usize::MAX; encoder.state_count()];
    let mut heap = BinaryHeap::new();
    dist[first.next_state] = weight(&first);
    heap.push(Reverse((dist[first.next_state], first.next_state)));

    while let Some(Reverse((d, state))) = heap.pop() {
        if state == 0 {
            return d;
        }
        if d > dist[state] {
            continue;
        }
        for input in [false, true] {
            let t = encoder.next_state(state, input);
            let total = d + weight(&t);
            if total < dist[t.next_state] {
                dist[t.next_state] = total;
                heap.push(Reverse((total, t.next_state)));
            }
        }
    }

    // Unreachable: m zero inputs always return to state 0
    0
}
