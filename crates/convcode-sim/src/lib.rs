//! # Convolutional Code Simulation
//!
//! Noisy-channel transmission and bit-error-rate measurement for codes built
//! with `convcode-core`. Only the core's public encoder/decoder contract is
//! used.
//!
//! ## Example
//!
//! ```rust
//! use convcode_core::{CodeConfig, ConvolutionalEncoder};
//! use convcode_sim::{Simulator, SweepConfig};
//!
//! let encoder = ConvolutionalEncoder::new(CodeConfig::simple_k3()).unwrap();
//! let sim = Simulator::new(encoder);
//!
//! let curve = sim
//!     .simulate_ber(&SweepConfig {
//!         block_length: 32,
//!         snr_db: vec![0.0, 4.0],
//!         num_blocks: 4,
//!         seed: 7,
//!         ..Default::default()
//!     })
//!     .unwrap();
//! assert_eq!(curve.points.len(), 2);
//! ```

pub mod ber;
pub mod channel;
pub mod error;
pub mod simulator;

pub use ber::{BerCounter, BerCurve, BerPoint};
pub use channel::{bpsk_modulate, hard_slice, Channel, ChannelConfig, ChannelModel};
pub use error::{SimError, SimResult};
pub use simulator::{Received, Simulator, SweepConfig, TransmissionReport};
