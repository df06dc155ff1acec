//! Bit error rate accounting and sweep results
//!
//! ```rust
//! use convcode_sim::ber::BerCounter;
//!
//! let mut ber = BerCounter::new();
//! let tx = vec![true, false, true, true, false, true, false, false, true, true];
//! let rx = vec![true, false, true, false, false, true, false, true, true, true];
//! ber.update(&tx, &rx);
//! assert_eq!(ber.error_bits(), 2);
//! assert!((ber.ber() - 0.2).abs() < 1e-10);
//! ```

use std::fmt::Write as _;

use convcode_core::DecisionMode;
use serde::{Deserialize, Serialize};

/// Running bit error count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BerCounter {
    error_bits: u64,
    total_bits: u64,
}

impl BerCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `tx` and `rx` over the shorter of the two lengths.
    pub fn update(&mut self, tx: &[bool], rx: &[bool]) -> u64 {
        let errors = tx.iter().zip(rx).filter(|(a, b)| a != b).count() as u64;
        self.error_bits += errors;
        self.total_bits += tx.len().min(rx.len()) as u64;
        errors
    }

    /// Error rate; 0 when nothing was compared.
    pub fn ber(&self) -> f64 {
        if self.total_bits == 0 {
            return 0.0;
        }
        self.error_bits as f64 / self.total_bits as f64
    }

    pub fn error_bits(&self) -> u64 {
        self.error_bits
    }

    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Wilson score interval `(lower, upper)` on the BER at the given
    /// two-sided confidence level. Stays informative when no errors were
    /// seen, where the upper bound is still positive.
    pub fn confidence_interval(&self, confidence: f64) -> (f64, f64) {
        if self.total_bits == 0 {
            return (0.0, 1.0);
        }
        let n = self.total_bits as f64;
        let p = self.ber();
        let z = two_sided_z(confidence);
        let z2n = z * z / n;

        let center = (p + z2n / 2.0) / (1.0 + z2n);
        let half = z / (1.0 + z2n) * (p * (1.0 - p) / n + z2n / (4.0 * n)).sqrt();
        ((center - half).max(0.0), (center + half).min(1.0))
    }
}

/// z such that P(|Z| <= z) = `confidence` for standard normal Z
/// (Abramowitz and Stegun 26.2.23, error below 4.5e-4).
fn two_sided_z(confidence: f64) -> f64 {
    let tail = ((1.0 - confidence) / 2.0).clamp(f64::MIN_POSITIVE, 0.5);
    let t = (-2.0 * tail.ln()).sqrt();
    let num = 2.515517 + t * (0.802853 + t * 0.010328);
    let den = 1.0 + t * (1.432788 + t * (0.189269 + t * 0.001308));
    t - num / den
}

/// Coded and uncoded error rates at one SNR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BerPoint {
    pub snr_db: f64,
    pub coded: BerCounter,
    pub uncoded: BerCounter,
}

impl BerPoint {
    pub fn coded_ber(&self) -> f64 {
        self.coded.ber()
    }

    pub fn uncoded_ber(&self) -> f64 {
        self.uncoded.ber()
    }

    /// 95% interval on the coded BER.
    pub fn coded_interval(&self) -> (f64, f64) {
        self.coded.confidence_interval(0.95)
    }
}

/// Result of a BER sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BerCurve {
    /// Human-readable code description
    pub code: String,
    pub decision: DecisionMode,
    pub block_length: usize,
    pub num_blocks: usize,
    pub points: Vec<BerPoint>,
}

impl BerCurve {
    /// One row per SNR point with a header line.
    pub fn to_csv(&self) -> String {
        let mut out =
            String::from("snr_db,coded_ber,uncoded_ber,coded_errors,coded_bits,uncoded_errors,uncoded_bits\n");
        for p in &self.points {
            // Writing to a String cannot fail
            let _ = writeln!(
                out,
                "{},{:e},{:e},{},{},{},{}",
                p.snr_db,
                p.coded_ber(),
                p.uncoded_ber(),
                p.coded.error_bits(),
                p.coded.total_bits(),
                p.uncoded.error_bits(),
                p.uncoded.total_bits(),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shorter_sequence_bounds_comparison() {
        let mut ber = BerCounter::new();
        assert_eq!(ber.update(&[true, true, true], &[true, false]), 1);
        assert_eq!(ber.total_bits(), 2);
        assert_relative_eq!(ber.ber(), 0.5);
    }

    #[test]
    fn test_empty_counter() {
        let ber = BerCounter::new();
        assert_eq!(ber.ber(), 0.0);
        assert_eq!(ber.confidence_interval(0.95), (0.0, 1.0));
    }

    #[test]
    fn test_confidence_interval_brackets_estimate() {
        let mut ber = BerCounter::new();
        let tx = vec![false; 1000];
        let rx: Vec<bool> = (0..1000).map(|i| i % 10 == 0).collect();
        ber.update(&tx, &rx);

        let (lo, hi) = ber.confidence_interval(0.95);
        assert!(lo < 0.1 && 0.1 < hi);
        let (lo99, hi99) = ber.confidence_interval(0.99);
        assert!(lo99 < lo && hi < hi99);
    }

    #[test]
    fn test_interval_without_errors() {
        let mut ber = BerCounter::new();
        ber.update(&[false; 1000], &[false; 1000]);
        let (lo, hi) = ber.confidence_interval(0.95);
        assert_relative_eq!(lo, 0.0, epsilon = 1e-12);
        // Wilson upper bound for 0/1000 at 95%
        assert_relative_eq!(hi, 0.00383, epsilon = 1e-4);
    }

    #[test]
    fn test_z_approximation() {
        assert_relative_eq!(two_sided_z(0.95), 1.960, epsilon = 1e-3);
        assert_relative_eq!(two_sided_z(0.80), 1.2816, epsilon = 1e-3);
        assert_relative_eq!(two_sided_z(0.99), 2.576, epsilon = 1e-3);
    }

    #[test]
    fn test_csv() {
        let mut coded = BerCounter::new();
        coded.update(&[true; 4], &[true, true, true, false]);
        let curve = BerCurve {
            code: "K=3".into(),
            decision: DecisionMode::Soft,
            block_length: 4,
            num_blocks: 1,
            points: vec![BerPoint {
                snr_db: 2.0,
                coded,
                uncoded: BerCounter::new(),
            }],
        };
        let csv = curve.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("snr_db,"));
        assert_eq!(lines[1], "2,2.5e-1,0e0,1,4,0,0");
    }
}
