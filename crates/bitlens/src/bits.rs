//! Arbitrary-width unsigned magnitudes.
//!
//! Bits are addressed LSB-first: bit 0 is the least significant bit, matching Verilog
//! `[high:low]` numbering. Storage is a [BitVec] trimmed so the top stored bit is always
//! set, which makes equality independent of how the value was produced.

use bitvec::prelude::*;

/// Largest power of ten that fits in a `u64`, used to convert to decimal in chunks.
const DECIMAL_CHUNK: u128 = 10_000_000_000_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 19;

/// A non-negative integer of unbounded width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Magnitude {
    bits: BitVec<u64, Lsb0>,
}

impl Magnitude {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_limbs(vec![value])
    }

    /// Builds a magnitude from little-endian 64-bit limbs.
    pub fn from_limbs(limbs: Vec<u64>) -> Self {
        let mut magnitude = Magnitude {
            bits: BitVec::from_vec(limbs),
        };
        magnitude.normalize();
        magnitude
    }

    /// Accumulates digit values (most significant first) in base `radix`.
    ///
    /// Digits must already be validated to be below `radix`.
    pub fn from_digits(digits: &[u8], radix: u32) -> Self {
        Self::from_digits_masked(digits, radix, usize::MAX)
    }

    /// Like [Magnitude::from_digits], keeping only the low `width` bits. Digits that lie
    /// entirely above `width` are never visited.
    pub fn from_digits_masked(digits: &[u8], radix: u32, width: usize) -> Self {
        if radix.is_power_of_two() {
            Self::from_pow2_digits(digits, radix.trailing_zeros() as usize, width)
        } else {
            Self::from_digits_accumulated(digits, radix, width)
        }
    }

    /// Places `bits_per_digit` bits per digit, least significant digit first.
    fn from_pow2_digits(digits: &[u8], bits_per_digit: usize, width: usize) -> Self {
        let needed = digits.len().saturating_mul(bits_per_digit).min(width);
        let mut bits: BitVec<u64, Lsb0> = BitVec::with_capacity(needed);

        for &digit in digits.iter().rev() {
            if bits.len() >= needed {
                break;
            }
            for shift in 0..bits_per_digit {
                bits.push((digit >> shift) & 1 == 1);
            }
        }
        bits.truncate(needed);

        let mut magnitude = Magnitude { bits };
        magnitude.normalize();
        magnitude
    }

    /// Multiply-accumulate over 64-bit limbs, working modulo `2^(64 * limbs)` so a sized
    /// literal never grows past its width.
    fn from_digits_accumulated(digits: &[u8], radix: u32, width: usize) -> Self {
        let max_limbs = width.div_ceil(64);
        let mut limbs: Vec<u64> = Vec::new();

        for &digit in digits {
            let mut carry = digit as u128;
            for limb in limbs.iter_mut() {
                let acc = (*limb as u128) * radix as u128 + carry;
                *limb = acc as u64;
                carry = acc >> 64;
            }
            if carry != 0 && limbs.len() < max_limbs {
                limbs.push(carry as u64);
            }
        }

        Self::from_limbs(limbs).masked(width)
    }

    /// Number of significant bits (0 for zero).
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_zero(&self) -> bool {
        self.bits.is_empty()
    }

    /// Reads bit `index`; bits above [Magnitude::bit_len] are 0.
    pub fn bit(&self, index: usize) -> bool {
        self.bits.get(index).is_some_and(|bit| *bit)
    }

    /// Keeps only the low `width` bits.
    pub fn masked(&self, width: usize) -> Self {
        if width >= self.bits.len() {
            return self.clone();
        }

        let mut bits = self.bits.clone();
        bits.truncate(width);
        let mut magnitude = Magnitude { bits };
        magnitude.normalize();
        magnitude
    }

    /// Bits `low..=high` shifted down to position 0.
    pub fn range(&self, low: usize, high: usize) -> Self {
        let end = (high + 1).min(self.bits.len());
        if low >= end {
            return Self::zero();
        }

        let mut magnitude = Magnitude {
            bits: self.bits[low..end].to_bitvec(),
        };
        magnitude.normalize();
        magnitude
    }

    /// Reads `len` bits (at most 64) starting at `low` as a `u64`.
    pub fn chunk(&self, low: usize, len: usize) -> u64 {
        debug_assert!(len <= 64, "chunk wider than 64 bits");
        let end = low.saturating_add(len).min(self.bits.len());
        if low >= end {
            return 0;
        }

        self.bits[low..end].load_le::<u64>()
    }

    /// The value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.bits.len() > 64 {
            return None;
        }
        Some(self.chunk(0, 64))
    }

    /// Little-endian 64-bit limbs; empty for zero.
    pub fn limbs(&self) -> Vec<u64> {
        self.bits
            .chunks(64)
            .map(|chunk| chunk.load_le::<u64>())
            .collect()
    }

    pub fn to_decimal_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let mut limbs = self.limbs();
        let mut groups: Vec<u64> = Vec::new();

        while limbs.iter().any(|&limb| limb != 0) {
            let mut rem: u128 = 0;
            for limb in limbs.iter_mut().rev() {
                let acc = (rem << 64) | *limb as u128;
                *limb = (acc / DECIMAL_CHUNK) as u64;
                rem = acc % DECIMAL_CHUNK;
            }
            groups.push(rem as u64);
        }

        let Some((top, rest)) = groups.split_last() else {
            return "0".to_string();
        };

        let mut out = top.to_string();
        for group in rest.iter().rev() {
            out.push_str(&format!("{:0width$}", group, width = DECIMAL_CHUNK_DIGITS));
        }
        out
    }

    fn normalize(&mut self) {
        let len = self.bits.last_one().map_or(0, |index| index + 1);
        self.bits.truncate(len);
    }
}

impl From<u64> for Magnitude {
    fn from(value: u64) -> Self {
        Magnitude::from_u64(value)
    }
}

/// Rounds `bits` up to the next multiple of `unit`.
pub fn round_up(bits: usize, unit: usize) -> usize {
    bits.div_ceil(unit) * unit
}
