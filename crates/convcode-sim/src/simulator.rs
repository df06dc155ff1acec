//! Coded Transmission Simulator
//!
//! Runs data through encoder, channel and decoder and counts what survives.
//!
//! ```text
//! data ──► encode ──► channel (AWGN | BSC) ──► [slice at 0] ──► decode ──► compare
//! ```
//!
//! [`Simulator::simulate_ber`] repeats this over many random blocks per SNR
//! point and also measures uncoded BPSK over the same channel as a baseline.
//! SNR points are evaluated in parallel, each with RNGs derived from the
//! sweep seed and the point index, so a curve is reproducible regardless of
//! thread count.

use convcode_core::{ConvolutionalEncoder, DecisionMode, ViterbiDecoder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ber::{BerCounter, BerCurve, BerPoint};
use crate::channel::{hard_slice, Channel, ChannelConfig};
use crate::error::{SimError, SimResult};

/// Channel output as handed to the decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Received {
    /// Noisy antipodal symbols
    Soft(Vec<f64>),
    /// Bits after a binary channel
    Hard(Vec<bool>),
}

impl Received {
    pub fn len(&self) -> usize {
        match self {
            Received::Soft(s) => s.len(),
            Received::Hard(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything observed in one transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionReport {
    pub data: Vec<bool>,
    pub encoded: Vec<bool>,
    pub received: Received,
    pub decoded: Vec<bool>,
    pub bit_errors: u64,
    pub ber: f64,
}

/// BER sweep parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Data bits per block
    pub block_length: usize,
    /// SNR points in dB
    pub snr_db: Vec<f64>,
    /// Blocks simulated per SNR point
    pub num_blocks: usize,
    pub decision: DecisionMode,
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            block_length: 100,
            snr_db: (0..=6).map(f64::from).collect(),
            num_blocks: 100,
            decision: DecisionMode::Soft,
            seed: 0,
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.block_length == 0 {
            return Err(SimError::InvalidSweep("block length must be positive".into()));
        }
        if self.num_blocks == 0 {
            return Err(SimError::InvalidSweep("number of blocks must be positive".into()));
        }
        if self.snr_db.is_empty() {
            return Err(SimError::InvalidSweep("no SNR points".into()));
        }
        if let Some(&bad) = self.snr_db.iter().find(|s| !s.is_finite()) {
            return Err(SimError::InvalidSnr(bad));
        }
        Ok(())
    }
}

/// Encoder/decoder pair driven over a noisy channel.
#[derive(Debug, Clone)]
pub struct Simulator {
    encoder: ConvolutionalEncoder,
    decoder: ViterbiDecoder,
}

impl Simulator {
    /// Create a simulator; the decoder is built from `encoder`'s trellis.
    pub fn new(encoder: ConvolutionalEncoder) -> Self {
        let decoder = ViterbiDecoder::new(&encoder);
        Self { encoder, decoder }
    }

    pub fn encoder(&self) -> &ConvolutionalEncoder {
        &self.encoder
    }

    pub fn decoder(&self) -> &ViterbiDecoder {
        &self.decoder
    }

    /// Encode, pass through AWGN at `snr_db`, decode.
    ///
    /// Soft mode decodes the noisy reals directly; hard mode slices them at
    /// zero first.
    pub fn transmit(
        &self,
        data: &[bool],
        snr_db: f64,
        mode: DecisionMode,
        channel: &mut Channel,
    ) -> SimResult<TransmissionReport> {
        let encoded = self.encoder.encode(data);
        let noisy = channel.awgn(&encoded, snr_db)?;
        let decoded = self.decode(&noisy, mode);
        Ok(report(data, encoded, Received::Soft(noisy), decoded))
    }

    /// Encode, flip bits with probability `p`, hard-decode.
    pub fn transmit_bsc(&self, data: &[bool], p: f64, channel: &mut Channel) -> SimResult<TransmissionReport> {
        let encoded = self.encoder.encode(data);
        let flipped = channel.bsc(&encoded, p)?;
        let decoded = self.decoder.decode(&flipped);
        Ok(report(data, encoded, Received::Hard(flipped), decoded))
    }

    /// Coded vs. uncoded BER over an SNR range.
    pub fn simulate_ber(&self, sweep: &SweepConfig) -> SimResult<BerCurve> {
        sweep.validate()?;
        tracing::info!(
            code = %self.encoder.config(),
            points = sweep.snr_db.len(),
            blocks = sweep.num_blocks,
            block_length = sweep.block_length,
            decision = %sweep.decision,
            "starting BER sweep"
        );

        let points = sweep
            .snr_db
            .par_iter()
            .enumerate()
            .map(|(index, &snr_db)| self.simulate_point(sweep, index, snr_db))
            .collect::<SimResult<Vec<_>>>()?;

        Ok(BerCurve {
            code: self.encoder.config().to_string(),
            decision: sweep.decision,
            block_length: sweep.block_length,
            num_blocks: sweep.num_blocks,
            points,
        })
    }

    fn simulate_point(&self, sweep: &SweepConfig, index: usize, snr_db: f64) -> SimResult<BerPoint> {
        let seed = point_seed(sweep.seed, index);
        let mut data_rng = StdRng::seed_from_u64(seed);
        let mut channel = Channel::new(ChannelConfig {
            snr_db,
            seed: Some(seed ^ CHANNEL_SEED_SALT),
            ..Default::default()
        })?;

        let mut coded = BerCounter::new();
        let mut uncoded = BerCounter::new();

        for _ in 0..sweep.num_blocks {
            let data: Vec<bool> = (0..sweep.block_length).map(|_| data_rng.gen()).collect();

            let encoded = self.encoder.encode(&data);
            let noisy = channel.awgn(&encoded, snr_db)?;
            coded.update(&data, &self.decode(&noisy, sweep.decision));

            let raw = channel.awgn(&data, snr_db)?;
            uncoded.update(&data, &hard_slice(&raw));
        }

        tracing::info!(
            snr_db,
            coded_ber = coded.ber(),
            uncoded_ber = uncoded.ber(),
            "SNR point done"
        );

        Ok(BerPoint {
            snr_db,
            coded,
            uncoded,
        })
    }

    fn decode(&self, symbols: &[f64], mode: DecisionMode) -> Vec<bool> {
        match mode {
            DecisionMode::Soft => self.decoder.decode_soft(symbols),
            DecisionMode::Hard => self.decoder.decode(&hard_slice(symbols)),
        }
    }
}

const CHANNEL_SEED_SALT: u64 = 0x5DEE_CE66_D1CE_4E5B;

/// Per-point seed, spread so neighbouring indices do not share streams.
fn point_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn report(data: &[bool], encoded: Vec<bool>, received: Received, decoded: Vec<bool>) -> TransmissionReport {
    let mut counter = BerCounter::new();
    let bit_errors = counter.update(data, &decoded);
    TransmissionReport {
        data: data.to_vec(),
        encoded,
        received,
        decoded,
        bit_errors,
        ber: counter.ber(),
    }
}
