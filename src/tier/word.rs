use std::fmt::{self, Debug};

use num::PrimInt;

use crate::traits::{FlagRead, FlagWrite};

/// A primitive unsigned integer which can hold a whole tier of flags.
pub trait Word: PrimInt + Debug {
    const DEBUG_NAME: &'static str;

    const BITS: u64;
}

impl Word for u32 {
    const DEBUG_NAME: &'static str = "Word32";
    const BITS: u64 = u32::BITS as u64;
}

impl Word for u64 {
    const DEBUG_NAME: &'static str = "Word64";
    const BITS: u64 = u64::BITS as u64;
}

/// Up to `W::BITS` flags packed into a single word. Bit `i` of the word holds
/// flag `i`. Bits at or above `len` are padding and are always zero.
#[derive(Clone, PartialEq, Eq)]
pub struct WordFlags<W: Word> {
    word: W,
    len: u8,
}

impl<W: Word> WordFlags<W> {
    /// Callers must ensure `0 < len <= W::BITS`.
    pub(crate) fn new(len: u64, initial: bool) -> Self {
        debug_assert!(len > 0 && len <= W::BITS, "len out of range");
        let mut flags = Self { word: W::zero(), len: len as u8 };
        if initial {
            flags.word = flags.mask();
        }
        flags
    }

    /// returns a word with exactly the addressable bits set
    #[inline]
    fn mask(&self) -> W {
        // a shift by the full word width overflows
        if u64::from(self.len) == W::BITS {
            W::max_value()
        } else {
            (W::one() << usize::from(self.len)) - W::one()
        }
    }

    #[inline]
    fn bit(position: u64) -> W {
        W::one() << position as usize
    }
}

impl<W: Word> Debug for WordFlags<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WordFlags<{}>({}/{})",
            W::DEBUG_NAME,
            self.count_ones(),
            self.len
        )
    }
}

impl<W: Word> FlagRead for WordFlags<W> {
    #[inline]
    fn len(&self) -> u64 {
        u64::from(self.len)
    }

    #[inline]
    fn get(&self, position: u64) -> bool {
        debug_assert!(position < self.len(), "position out of range");
        self.word & Self::bit(position) != W::zero()
    }

    #[inline]
    fn all(&self) -> bool {
        let mask = self.mask();
        self.word & mask == mask
    }

    fn count_ones(&self) -> u64 {
        u64::from((self.word & self.mask()).count_ones())
    }

    fn iter(&self) -> impl Iterator<Item = bool> {
        (0..self.len()).map(move |position| self.get(position))
    }
}

impl<W: Word> FlagWrite for WordFlags<W> {
    #[inline]
    fn set(&mut self, position: u64, value: bool) -> bool {
        debug_assert!(position < self.len(), "position out of range");
        let bit = Self::bit(position);
        let previous = self.word & bit != W::zero();
        self.word = if value { self.word | bit } else { self.word & !bit };
        previous
    }
}
