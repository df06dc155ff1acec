//! Viterbi Decoder: Maximum-Likelihood Decoding of Convolutional Codes
//!
//! Finds the maximum-likelihood input sequence for a received block by dynamic
//! programming over the code trellis. One accumulated path metric and one
//! survivor are kept per state; each trellis step extends every reachable
//! state along both input bits and keeps, per target state, the cheapest
//! arrival (add-compare-select).
//!
//! ## Algorithm
//!
//! 1. Split the received block into steps of n values (n = outputs per input).
//!    A trailing partial step is dropped.
//! 2. Start with metric 0 at state 0 and +inf elsewhere.
//! 3. Per step, for each target state, scan its incoming branches in the order
//!    (source state ascending, input 0 before 1) and keep a candidate only if
//!    it is strictly cheaper. Ties therefore go to the first branch scanned.
//! 4. Terminate at state 0 whenever it is reachable, since the encoder flush
//!    returns the register there; otherwise at the cheapest state.
//! 5. Rebuild the winning state sequence and read each input bit back off the
//!    transition function, then drop the K-1 flush bits.
//!
//! Survivors are stored as one parent pointer per (step, state) rather than a
//! full copy of each path, so memory grows as O(steps * 2^(K-1)) words. There
//! is no bounded traceback depth: blocks are decoded whole.
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
//! received[3] = !received[3]; // one channel error
//!
//! assert_eq!(decoder.decode(&received), data);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::encoder::ConvolutionalEncoder;
use crate::error::{FecError, FecResult};
use crate::metric::{BranchMetric, Hamming, SquaredEuclidean};

/// A trellis branch entering some state. `output` indexes the decoder's flat
/// table of expected outputs.
#[derive(Debug, Clone, Copy, Default)]
struct Branch {
    from: usize,
    output: usize,
}

/// Result of one decode call with its bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome {
    /// Decoded data bits (flush bits removed)
    pub bits: Vec<bool>,
    /// State the winning survivor ends in
    pub final_state: usize,
    /// Accumulated metric of the winning survivor (+inf if none)
    pub path_metric: f64,
    /// Number of trellis steps processed
    pub steps: usize,
    /// Trailing received values ignored because they did not fill a step
    pub dropped_symbols: usize,
}

/// Viterbi decoder bound to one encoder's trellis.
///
/// Immutable after construction; a single decoder can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct ViterbiDecoder {
    encoder: ConvolutionalEncoder,
    /// Two incoming branches per state: state `s` owns entries `2s` and
    /// `2s + 1`, in the order the forward expansion (state ascending, input 0
    /// then 1) visits them.
    predecessors: Vec<Branch>,
    /// Expected outputs, n bits per branch, indexed by `Branch::output`
    outputs: Vec<bool>,
}

impl ViterbiDecoder {
    /// Build a decoder for the trellis of `encoder`.
    pub fn new(encoder: &ConvolutionalEncoder) -> Self {
        let states = encoder.state_count();
        let n = encoder.outputs_per_input();
        let mut predecessors = vec![Branch::default(); 2 * states];
        let mut outputs = vec![false; 2 * states * n];
        let mut filled = vec![0usize; states];

        // Every state has exactly two incoming branches: the input bit is
        // fixed by the target and the dropped oldest bit takes both values.
        for from in 0..states {
            for input in [false, true] {
                let t = encoder.next_state(from, input);
                let slot = 2 * t.next_state + filled[t.next_state];
                filled[t.next_state] += 1;

                outputs[slot * n..(slot + 1) * n].copy_from_slice(&t.output);
                predecessors[slot] = Branch { from, output: slot * n };
            }
        }

        Self {
            encoder: encoder.clone(),
            predecessors,
            outputs,
        }
    }

    /// The encoder whose trellis this decoder searches.
    pub fn encoder(&self) -> &ConvolutionalEncoder {
        &self.encoder
    }

    /// Hard-decision decoding (Hamming branch metric).
    pub fn decode(&self, received: &[bool]) -> Vec<bool> {
        self.decode_with(&Hamming, received).bits
    }

    /// Soft-decision decoding of antipodal symbols (squared Euclidean branch
    /// metric). A coded 0 is expected near -1.0 and a coded 1 near +1.0.
    pub fn decode_soft(&self, received: &[f64]) -> Vec<bool> {
        self.decode_with(&SquaredEuclidean, received).bits
    }

    /// Run the Viterbi recursion with an arbitrary branch metric.
    ///
    /// Never fails: a trailing partial step is dropped and an empty or
    /// unreachable result decodes to no bits.
    pub fn decode_with<M: BranchMetric>(&self, metric: &M, received: &[M::Symbol]) -> DecodeOutcome {
        let n = self.encoder.outputs_per_input();
        let steps = received.len() / n;
        let dropped_symbols = received.len() % n;
        if dropped_symbols != 0 {
            tracing::debug!(
                received = received.len(),
                n,
                dropped = dropped_symbols,
                "truncating partial trellis step"
            );
        }

        let mut metrics = vec![f64::INFINITY; self.encoder.state_count()];
        metrics[0] = 0.0;
        let mut survivors: Vec<Vec<Option<usize>>> = Vec::with_capacity(steps);

        for symbol in received.chunks_exact(n) {
            let (next_metrics, parents) = self.step(metric, symbol, &metrics);
            metrics = next_metrics;
            survivors.push(parents);
        }

        let final_state = select_final_state(&metrics);
        let path_metric = metrics[final_state];
        let bits = match trace_states(&survivors, final_state) {
            Some(path) => self.reconstruct_bits(&path),
            None => Vec::new(),
        };

        tracing::debug!(steps, final_state, path_metric, decoded = bits.len(), "viterbi decode done");

        DecodeOutcome {
            bits,
            final_state,
            path_metric,
            steps,
            dropped_symbols,
        }
    }

    /// One add-compare-select step. Reads only the previous metrics and
    /// writes fresh tables.
    fn step<M: BranchMetric>(
        &self,
        metric: &M,
        symbol: &[M::Symbol],
        metrics: &[f64],
    ) -> (Vec<f64>, Vec<Option<usize>>) {
        let n = self.encoder.outputs_per_input();
        let select = |branches: &[Branch]| {
            let mut best = (f64::INFINITY, None);
            for branch in branches {
                let from_metric = metrics[branch.from];
                if !from_metric.is_finite() {
                    continue;
                }
                let expected = &self.outputs[branch.output..branch.output + n];
                let candidate = from_metric + metric.distance(symbol, expected);
                if candidate < best.0 {
                    best = (candidate, Some(branch.from));
                }
            }
            best
        };

        #[cfg(feature = "parallel")]
        let selected: Vec<(f64, Option<usize>)> = self.predecessors.par_chunks_exact(2).map(select).collect();
        #[cfg(not(feature = "parallel"))]
        let selected: Vec<(f64, Option<usize>)> = self.predecessors.chunks_exact(2).map(select).collect();

        selected.into_iter().unzip()
    }

    /// Recover input bits from a state sequence `[p0, p1, ..., pT]`.
    ///
    /// Each pair `(p_i, p_i+1)` yields the first input (0, then 1) whose
    /// transition from `p_i` lands on `p_i+1`. A pair no input explains is
    /// logged and read as 0. The last K-1 bits are flush bits and are dropped
    /// when the sequence is longer than that.
    pub fn reconstruct_bits(&self, path: &[usize]) -> Vec<bool> {
        let mut bits = Vec::with_capacity(path.len().saturating_sub(1));

        for (step, pair) in path.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let input = [false, true]
                .into_iter()
                .find(|&input| self.encoder.next_state(from, input).next_state == to);

            match input {
                Some(bit) => bits.push(bit),
                None => {
                    let err = FecError::DegenerateTraceback { step, from, to };
                    tracing::warn!(%err, "assuming input bit 0");
                    bits.push(false);
                }
            }
        }

        let memory = self.encoder.memory();
        if bits.len() > memory {
            bits.truncate(bits.len() - memory);
        }
        bits
    }

    /// Strict length check for callers that treat truncation as an error.
    pub fn check_length(&self, received: usize) -> FecResult<()> {
        let multiple = self.encoder.outputs_per_input();
        if received % multiple == 0 {
            Ok(())
        } else {
            Err(FecError::TruncatedInput { received, multiple })
        }
    }
}

/// State 0 if reachable, otherwise the lowest metric (smallest index on ties).
fn select_final_state(metrics: &[f64]) -> usize {
    if metrics[0].is_finite() {
        return 0;
    }

    let mut best = 0;
    for (state, &m) in metrics.iter().enumerate() {
        if m < metrics[best] {
            best = state;
        }
    }
    best
}

/// Follow parent pointers back from `last`. `None` if the survivor chain is
/// broken, i.e. `last` was never reached.
fn trace_states(survivors: &[Vec<Option<usize>>], last: usize) -> Option<Vec<usize>> {
    let mut path = vec![0; survivors.len() + 1];
    let mut state = last;
    path[survivors.len()] = state;

    for (t, parents) in survivors.iter().enumerate().rev() {
        state = parents[state]?;
        path[t] = state;
    }

    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodeConfig;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn bits(v: &[u8]) -> Vec<bool> {
        v.iter().map(|&b| b == 1).collect()
    }

    fn codec(config: CodeConfig) -> (ConvolutionalEncoder, ViterbiDecoder) {
        let encoder = ConvolutionalEncoder::new(config).unwrap();
        let decoder = ViterbiDecoder::new(&encoder);
        (encoder, decoder)
    }

    fn antipodal(coded: &[bool]) -> Vec<f64> {
        coded.iter().map(|&b| SquaredEuclidean::level(b)).collect()
    }

    #[test]
    fn test_reference_vector_roundtrip() {
        let (_, decoder) = codec(CodeConfig::simple_k3());
        let received = bits(&[1, 1, 1, 0, 0, 0, 0, 1, 0, 1, 1, 1, 0, 0]);
        assert_eq!(decoder.decode(&received), bits(&[1, 0, 1, 1, 0]));
        assert_eq!(decoder.decode_soft(&antipodal(&received)), bits(&[1, 0, 1, 1, 0]));
    }

    #[test]
    fn test_roundtrip_random_blocks() {
        let mut rng = StdRng::seed_from_u64(7);
        let configs = [
            CodeConfig::simple_k3(),
            CodeConfig::k3_rate_third(),
            CodeConfig::new(2, vec![0b11, 0b10]),
            CodeConfig::new(4, vec![0b1111, 0b1011]),
            CodeConfig::gsm_k5_rate_half(),
            CodeConfig::nasa_k7_rate_half(),
        ];

        for config in configs {
            let (encoder, decoder) = codec(config);
            for len in [1usize, 2, 9, 64] {
                let data: Vec<bool> = (0..len).map(|_| rng.gen()).collect();
                let coded = encoder.encode(&data);
                assert_eq!(decoder.decode(&coded), data, "{} len {}", encoder.config(), len);
                assert_eq!(decoder.decode_soft(&antipodal(&coded)), data);
            }
        }
    }

    #[test]
    fn test_empty_block_decodes_to_flush_bits() {
        // Only the m flush steps arrive; with nothing longer than m to strip
        // the flush bits are returned as-is.
        let (encoder, decoder) = codec(CodeConfig::simple_k3());
        assert_eq!(decoder.decode(&encoder.encode(&[])), bits(&[0, 0]));
    }

    #[test]
    fn test_outcome_for_clean_block() {
        let (encoder, decoder) = codec(CodeConfig::simple_k3());
        let coded = encoder.encode(&bits(&[1, 0, 1, 1, 0]));
        let outcome = decoder.decode_with(&Hamming, &coded);
        assert_eq!(outcome.final_state, 0);
        assert_eq!(outcome.path_metric, 0.0);
        assert_eq!(outcome.steps, 7);
        assert_eq!(outcome.dropped_symbols, 0);
    }

    #[test]
    fn test_corrects_any_single_error() {
        let (encoder, decoder) = codec(CodeConfig::simple_k3());
        let data = bits(&[1, 0, 1, 1, 0, 1, 0, 0, 1, 1]);
        let coded = encoder.encode(&data);

        for pos in 0..coded.len() {
            let mut received = coded.clone();
            received[pos] = !received[pos];
            let decoded = decoder.decode(&received);
            let residual = decoded.iter().zip(&data).filter(|(a, b)| a != b).count();
            assert_eq!(decoded.len(), data.len());
            assert!(residual <= 1, "flip at {} left {} errors", pos, residual);
        }
    }

    #[test]
    fn test_corrects_two_separated_errors() {
        // d_free = 5 for (7,5): any two channel errors are within reach
        let (encoder, decoder) = codec(CodeConfig::simple_k3());
        let data = bits(&[0, 1, 1, 0, 1, 0, 0, 0, 1, 1, 1, 0, 1, 0, 1, 1]);
        let mut received = encoder.encode(&data);
        received[2] = !received[2];
        received[27] = !received[27];
        assert_eq!(decoder.decode(&received), data);
    }

    #[test]
    fn test_soft_uses_reliability() {
        let (encoder, decoder) = codec(CodeConfig::simple_k3());
        let data = bits(&[1, 1, 0, 1, 0, 0, 1, 0]);
        let coded = encoder.encode(&data);

        // Bounded noise plus three barely-wrong symbols
        let mut symbols: Vec<f64> = antipodal(&coded)
            .iter()
            .enumerate()
            .map(|(i, s)| s + 0.4 * ((i as f64) * 0.7).sin())
            .collect();
        for pos in [1, 2, 3] {
            symbols[pos] = -0.05 * SquaredEuclidean::level(coded[pos]);
        }

        let hard: Vec<bool> = symbols.iter().map(|&s| s > 0.0).collect();
        let soft_errors = decoder
            .decode_soft(&symbols)
            .iter()
            .zip(&data)
            .filter(|(a, b)| a != b)
            .count();
        let hard_errors = decoder
            .decode(&hard)
            .iter()
            .zip(&data)
            .filter(|(a, b)| a != b)
            .count();

        assert_eq!(soft_errors, 0);
        assert!(soft_errors <= hard_errors);
    }

    #[test]
    fn test_truncation_law() {
        let (encoder, decoder) = codec(CodeConfig::k3_rate_third());
        let coded = encoder.encode(&bits(&[1, 0, 0, 1, 1, 1, 0]));

        for extra in 1..3 {
            let mut longer = coded.clone();
            longer.extend(std::iter::repeat(true).take(extra));
            assert_eq!(decoder.decode(&longer), decoder.decode(&coded));

            let full = decoder.decode_with(&Hamming, &coded);
            let truncated = decoder.decode_with(&Hamming, &longer);
            assert_eq!(truncated.bits, full.bits);
            assert_eq!(truncated.dropped_symbols, extra);

            let mut soft = antipodal(&coded);
            soft.extend(std::iter::repeat(0.3).take(extra));
            assert_eq!(decoder.decode_soft(&soft), decoder.decode_soft(&antipodal(&coded)));
        }
    }

    #[test]
    fn test_empty_and_short_input() {
        let (_, decoder) = codec(CodeConfig::simple_k3());
        assert!(decoder.decode(&[]).is_empty());
        assert!(decoder.decode(&[true]).is_empty());
        assert!(decoder.decode_soft(&[0.9]).is_empty());

        let outcome = decoder.decode_with(&Hamming, &[true]);
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.dropped_symbols, 1);
    }

    #[test]
    fn test_short_block_keeps_bits_when_no_data() {
        // Two steps with m = 2: nothing to strip, best path into state 0 is 00
        let (encoder, decoder) = codec(CodeConfig::simple_k3());
        let (received, last) = {
            let a = encoder.next_state(0, true);
            let b = encoder.next_state(a.next_state, true);
            ([a.output, b.output].concat(), b.next_state)
        };
        assert_eq!(last, 3);

        let outcome = decoder.decode_with(&Hamming, &received);
        assert_eq!(outcome.final_state, 0, "state 0 wins whenever reachable");
        assert_eq!(outcome.path_metric, 3.0);
        assert_eq!(outcome.bits, bits(&[0, 0]));
    }

    #[test]
    fn test_unreachable_final_state_yields_empty() {
        let (_, decoder) = codec(CodeConfig::simple_k3());
        let outcome = decoder.decode_with(&SquaredEuclidean, &[f64::NAN, 1.0, -1.0, -1.0]);
        assert!(outcome.bits.is_empty());
        assert_eq!(outcome.final_state, 0);
        assert!(outcome.path_metric.is_infinite());

        assert!(decoder.decode_soft(&[f64::INFINITY, 1.0]).is_empty());
    }

    #[test]
    fn test_k1_decodes_to_zeros() {
        // One state: the survivor sequence carries no input information
        let (encoder, decoder) = codec(CodeConfig::new(1, vec![1]));
        let coded = encoder.encode(&bits(&[1, 0, 1]));
        assert_eq!(decoder.decode(&coded), bits(&[0, 0, 0]));
        assert_eq!(decoder.decode_soft(&antipodal(&coded)), bits(&[0, 0, 0]));
    }

    #[test]
    fn test_largest_constraint_length_decodes() {
        // Second generator taps the newest bit only, so the code is systematic
        let k = crate::MAX_CONSTRAINT_LENGTH;
        let (encoder, decoder) = codec(CodeConfig::new(k, vec![(1 << k) - 1, 1]));
        assert_eq!(decoder.predecessors.len(), 2 * encoder.state_count());

        let data = bits(&[1, 0, 0, 1, 1, 1, 0, 1, 0, 0, 1, 0]);
        let outcome = decoder.decode_with(&Hamming, &encoder.encode(&data));
        assert_eq!(outcome.bits, data);
        assert_eq!(outcome.final_state, 0);
        assert_eq!(outcome.path_metric, 0.0);
    }

    #[test]
    fn test_predecessor_layout() {
        let (encoder, decoder) = codec(CodeConfig::simple_k3());
        let n = encoder.outputs_per_input();
        for to in 0..encoder.state_count() {
            let pair = &decoder.predecessors[2 * to..2 * to + 2];
            assert!(pair[0].from < pair[1].from);
            for branch in pair {
                let input = to >> (encoder.memory() - 1) == 1;
                let t = encoder.next_state(branch.from, input);
                assert_eq!(t.next_state, to);
                assert_eq!(&decoder.outputs[branch.output..branch.output + n], &t.output[..]);
            }
        }
    }

    #[test]
    fn test_reconstruct_bits() {
        let (_, decoder) = codec(CodeConfig::simple_k3());
        // 0 -1-> 2 -0-> 1 -0-> 0 -0-> 0, then drop two flush bits
        assert_eq!(decoder.reconstruct_bits(&[0, 2, 1, 0, 0]), bits(&[1, 0]));
        assert!(decoder.reconstruct_bits(&[0]).is_empty());
        assert!(decoder.reconstruct_bits(&[]).is_empty());
    }

    #[test]
    fn test_reconstruct_bits_degenerate_step_reads_zero() {
        let (_, decoder) = codec(CodeConfig::simple_k3());
        // 0 -> 3 is not a trellis edge
        assert_eq!(decoder.reconstruct_bits(&[0, 3]), bits(&[0]));
        assert_eq!(decoder.reconstruct_bits(&[0, 3, 3, 3, 1]), bits(&[0, 1]));
    }

    #[test]
    fn test_check_length() {
        let (_, decoder) = codec(CodeConfig::k3_rate_third());
        assert!(decoder.check_length(0).is_ok());
        assert!(decoder.check_length(9).is_ok());
        assert_eq!(
            decoder.check_length(10),
            Err(FecError::TruncatedInput {
                received: 10,
                multiple: 3
            })
        );
    }

    #[test]
    fn test_decoder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ViterbiDecoder>();
        assert_send_sync::<ConvolutionalEncoder>();
    }
}
