//! Shift register value type
//!
//! The register is never held as long-lived mutable state: the encoder and
//! the trellis both derive a transient register from a state and an input bit.

/// A K-bit shift register.
///
/// Bit `i` of the packed word is register position `i`; position 0 holds the
/// most recently inserted bit and position K-1 the oldest retained bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShiftRegister {
    bits: u32,
    len: usize,
}

impl ShiftRegister {
    /// An all-zero register of `len` positions.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not in `1..=32`.
    pub fn new(len: usize) -> Self {
        assert!((1..=32).contains(&len), "register length {} outside 1..=32", len);
        Self { bits: 0, len }
    }

    /// Rebuild the register whose newest `len - 1` positions hold `state`.
    ///
    /// Register position `j` takes state bit `m - 1 - j` (m = len - 1), so the
    /// newest bit is the most significant bit of the state. The oldest
    /// position is zero; it is about to be shifted out anyway.
    ///
    /// # Panics
    ///
    /// Panics if `len` is not in `1..=32`.
    pub fn from_state(state: usize, len: usize) -> Self {
        let len = Self::new(len).len;
        let memory = len - 1;
        let mut bits = 0u32;
        for j in 0..memory {
            if (state >> (memory - 1 - j)) & 1 == 1 {
                bits |= 1 << j;
            }
        }
        Self { bits, len }
    }

    /// Shift `bit` into position 0, dropping the oldest position.
    #[must_use]
    pub fn push(self, bit: bool) -> Self {
        let bits = ((self.bits << 1) | bit as u32) & self.mask();
        Self { bits, len: self.len }
    }

    /// Trellis state: positions 0..m-1 packed with position 0 as the most
    /// significant bit. This is the state the register is in once its newest
    /// bit has been consumed.
    pub fn state(&self) -> usize {
        let memory = self.len - 1;
        let mut state = 0usize;
        for j in 0..memory {
            if (self.bits >> j) & 1 == 1 {
                state |= 1 << (memory - 1 - j);
            }
        }
        state
    }

    /// Bit at register position `pos`.
    pub fn bit(&self, pos: usize) -> bool {
        pos < self.len && (self.bits >> pos) & 1 == 1
    }

    /// XOR of the positions selected by a generator tap pattern.
    pub fn parity(&self, taps: u32) -> bool {
        (self.bits & taps).count_ones() & 1 == 1
    }

    /// Number of positions (K).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn mask(&self) -> u32 {
        u32::MAX >> (32 - self.len)
    }
}
