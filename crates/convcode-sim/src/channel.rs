//! Channel Models for Coded Transmission
//!
//! Coded bits leave the encoder as 0/1 and are carried over one of:
//!
//! 1. **Ideal**: BPSK mapping only, no impairment
//! 2. **AWGN**: BPSK mapping (0 -> -1.0, 1 -> +1.0) plus Gaussian noise
//! 3. **BSC**: binary symmetric channel, each bit flipped with probability p
//!
//! ## Usage
//!
//! ```rust
//! use convcode_sim::channel::{hard_slice, Channel, ChannelConfig};
//!
//! let mut channel = Channel::new(ChannelConfig::seeded(42)).unwrap();
//! let bits = vec![true, false, true, true];
//!
//! let noisy = channel.awgn(&bits, 30.0).unwrap();
//! assert_eq!(hard_slice(&noisy), bits);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Channel model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelModel {
    /// Perfect channel (no impairments)
    Ideal,
    /// Additive White Gaussian Noise on BPSK symbols
    #[default]
    Awgn,
    /// Binary symmetric channel
    Bsc,
}

/// Channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel model used by [`Channel::apply`]
    pub model: ChannelModel,
    /// Symbol SNR in dB (AWGN)
    pub snr_db: f64,
    /// Bit flip probability (BSC)
    pub error_probability: f64,
    /// RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            model: ChannelModel::Awgn,
            snr_db: 5.0,
            error_probability: 0.0,
            seed: None,
        }
    }
}

impl ChannelConfig {
    /// AWGN channel at the given SNR
    pub fn with_snr(snr_db: f64) -> Self {
        Self {
            snr_db,
            ..Default::default()
        }
    }

    /// Binary symmetric channel with flip probability `p`
    pub fn bsc(p: f64) -> Self {
        Self {
            model: ChannelModel::Bsc,
            error_probability: p,
            ..Default::default()
        }
    }

    /// Default channel with a reproducible RNG
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        validate_snr(self.snr_db)?;
        validate_probability(self.error_probability)
    }
}

/// Map coded bits to antipodal levels: 0 -> -1.0, 1 -> +1.0.
pub fn bpsk_modulate(bits: &[bool]) -> Vec<f64> {
    bits.iter().map(|&b| if b { 1.0 } else { -1.0 }).collect()
}

/// Hard decision at zero: strictly positive values are 1.
pub fn hard_slice(symbols: &[f64]) -> Vec<bool> {
    symbols.iter().map(|&x| x > 0.0).collect()
}

fn validate_snr(snr_db: f64) -> SimResult<()> {
    if snr_db.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidSnr(snr_db))
    }
}

fn validate_probability(p: f64) -> SimResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(SimError::InvalidProbability(p))
    }
}

/// Channel simulator
#[derive(Debug)]
pub struct Channel {
    config: ChannelConfig,
    rng: StdRng,
}

impl Channel {
    /// Create a new channel with the given configuration
    pub fn new(config: ChannelConfig) -> SimResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, rng })
    }

    /// Get current configuration
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Pass coded bits through the configured model, returning the received
    /// antipodal symbols.
    pub fn apply(&mut self, bits: &[bool]) -> SimResult<Vec<f64>> {
        match self.config.model {
            ChannelModel::Ideal => Ok(bpsk_modulate(bits)),
            ChannelModel::Awgn => self.awgn(bits, self.config.snr_db),
            ChannelModel::Bsc => {
                let flipped = self.bsc(bits, self.config.error_probability)?;
                Ok(bpsk_modulate(&flipped))
            }
        }
    }

    /// BPSK-map `bits` and add white Gaussian noise.
    ///
    /// noise_power = signal_power / 10^(SNR_dB/10), with signal power
    /// measured as the mean symbol power.
    pub fn awgn(&mut self, bits: &[bool], snr_db: f64) -> SimResult<Vec<f64>> {
        validate_snr(snr_db)?;
        let symbols = bpsk_modulate(bits);
        if symbols.is_empty() {
            return Ok(symbols);
        }

        let signal_power = symbols.iter().map(|s| s * s).sum::<f64>() / symbols.len() as f64;
        let snr_linear = 10.0_f64.powf(snr_db / 10.0);
        let noise_std = (signal_power / snr_linear).sqrt();
        let noise = Normal::new(0.0, noise_std).map_err(|_| SimError::InvalidSnr(snr_db))?;

        Ok(symbols
            .into_iter()
            .map(|s| s + noise.sample(&mut self.rng))
            .collect())
    }

    /// Flip each bit independently with probability `p`.
    pub fn bsc(&mut self, bits: &[bool], p: f64) -> SimResult<Vec<bool>> {
        validate_probability(p)?;
        Ok(bits
            .iter()
            .map(|&b| b ^ (self.rng.gen::<f64>() < p))
            .collect())
    }
}
