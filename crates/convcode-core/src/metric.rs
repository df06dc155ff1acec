//! Branch metrics for trellis decoding
//!
//! A branch metric is the local cost of one hypothesized transition: the
//! distance between the n received values of a trellis step and the n bits
//! the transition would have emitted. Lower is better.
//!
//! - [`Hamming`]: hard decisions, number of differing bits
//! - [`SquaredEuclidean`]: soft decisions, squared distance to the antipodal
//!   mapping 0 -> -1.0, 1 -> +1.0

/// Distance between one received symbol group and an expected output.
pub trait BranchMetric: Sync {
    /// Received value type (a bit for hard decisions, a real for soft).
    type Symbol: Sync;

    /// Cost of receiving `received` when `expected` was sent. Both slices have
    /// length n.
    fn distance(&self, received: &[Self::Symbol], expected: &[bool]) -> f64;
}

/// Hamming distance on hard-decision bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hamming;

impl BranchMetric for Hamming {
    type Symbol = bool;

    fn distance(&self, received: &[bool], expected: &[bool]) -> f64 {
        received
            .iter()
            .zip(expected)
            .filter(|(r, e)| r != e)
            .count() as f64
    }
}

/// Squared Euclidean distance on antipodal soft symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl SquaredEuclidean {
    /// Antipodal level of a coded bit.
    #[inline]
    pub fn level(bit: bool) -> f64 {
        if bit {
            1.0
        } else {
            -1.0
        }
    }
}

impl BranchMetric for SquaredEuclidean {
    type Symbol = f64;

    fn distance(&self, received: &[f64], expected: &[bool]) -> f64 {
        received
            .iter()
            .zip(expected)
            .map(|(&r, &e)| {
                let diff = r - Self::level(e);
                diff * diff
            })
            .sum()
    }
}
