use std::fmt::{self, Debug};

use bitvec::{boxed::BitBox, order::Lsb0, vec::BitVec};

use crate::traits::{FlagRead, FlagWrite};

const WORD_BITS: usize = u64::BITS as usize;

/// Flags stored in a heap allocated array of `u64` words. Flag `i` lives in
/// word `i / 64` at bit `i % 64`.
#[derive(Clone, PartialEq, Eq)]
pub struct ArrayFlags {
    bits: BitBox<u64, Lsb0>,
}

impl ArrayFlags {
    pub fn new(len: usize, initial: bool) -> Self {
        let bits = BitVec::<u64, Lsb0>::repeat(initial, len).into_boxed_bitslice();
        tracing::debug!(len, words = bits.as_raw_slice().len(), "allocated flag array");
        Self { bits }
    }

    /// the number of backing words
    #[inline]
    pub fn words(&self) -> usize {
        self.bits.as_raw_slice().len()
    }
}

impl Debug for ArrayFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ArrayFlags({}/{} in {} words)",
            self.count_ones(),
            self.bits.len(),
            self.words()
        )
    }
}

impl FlagRead for ArrayFlags {
    #[inline]
    fn len(&self) -> u64 {
        self.bits.len() as u64
    }

    #[inline]
    fn get(&self, position: u64) -> bool {
        self.bits[position as usize]
    }

    fn all(&self) -> bool {
        let Some((&last, body)) = self.bits.as_raw_slice().split_last() else {
            return true;
        };
        if !body.iter().all(|&word| word == u64::MAX) {
            return false;
        }

        // the tail word may carry padding bits above `len`, which must not
        // take part in the conjunction
        let tail = self.bits.len() % WORD_BITS;
        let mask = if tail == 0 {
            u64::MAX
        } else {
            (1u64 << tail) - 1
        };
        last & mask == mask
    }

    fn count_ones(&self) -> u64 {
        self.bits.count_ones() as u64
    }

    fn iter(&self) -> impl Iterator<Item = bool> {
        self.bits.iter().by_vals()
    }
}

impl FlagWrite for ArrayFlags {
    #[inline]
    fn set(&mut self, position: u64, value: bool) -> bool {
        self.bits.replace(position as usize, value)
    }
}
