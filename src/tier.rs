use std::fmt::{self, Debug};

use crate::{
    FlagErr, MAX_CAPACITY,
    tier::{array::ArrayFlags, word::WordFlags},
    traits::{FlagRead, FlagWrite},
    util::MultiIter,
};

pub mod array;
pub mod word;

/// The storage representation picked for a flag at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKind {
    Word32,
    Word64,
    Array,
}

impl TierKind {
    /// Pick the smallest `TierKind` able to hold `capacity` flags
    pub fn pick_capacity(capacity: u64) -> Self {
        if capacity <= u64::from(u32::BITS) {
            TierKind::Word32
        } else if capacity <= u64::from(u64::BITS) {
            TierKind::Word64
        } else {
            TierKind::Array
        }
    }

    /// The largest capacity this kind can hold.
    pub fn max_capacity(self) -> u64 {
        match self {
            TierKind::Word32 => u64::from(u32::BITS),
            TierKind::Word64 => u64::from(u64::BITS),
            TierKind::Array => MAX_CAPACITY,
        }
    }

    /// Builds a tier of `capacity` flags, all equal to `initial`.
    ///
    /// Fails with [`FlagErr::Capacity`] if `capacity` is zero or exceeds
    /// [`TierKind::max_capacity`]. A kind wider than
    /// [`TierKind::pick_capacity`] would choose is accepted.
    pub fn build(self, capacity: u64, initial: bool) -> Result<Tier, FlagErr> {
        if capacity == 0 || capacity > self.max_capacity() {
            return Err(FlagErr::Capacity(capacity));
        }
        Ok(match self {
            TierKind::Word32 => Tier::Word32(WordFlags::new(capacity, initial)),
            TierKind::Word64 => Tier::Word64(WordFlags::new(capacity, initial)),
            TierKind::Array => {
                // unreachable on 64 bit targets, capacity is bounded well below usize::MAX
                let len = usize::try_from(capacity).map_err(|_| FlagErr::Capacity(capacity))?;
                Tier::Array(ArrayFlags::new(len, initial))
            }
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Tier {
    Word32(WordFlags<u32>),
    Word64(WordFlags<u64>),
    Array(ArrayFlags),
}

static_assertions::const_assert!(std::mem::size_of::<Tier>() <= 24);

impl Tier {
    pub fn kind(&self) -> TierKind {
        match self {
            Tier::Word32(_) => TierKind::Word32,
            Tier::Word64(_) => TierKind::Word64,
            Tier::Array(_) => TierKind::Array,
        }
    }
}

impl Debug for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Word32(flags) => flags.fmt(f),
            Tier::Word64(flags) => flags.fmt(f),
            Tier::Array(flags) => flags.fmt(f),
        }
    }
}

MultiIter!(TierIter, W32, W64, Arr);

impl FlagRead for Tier {
    fn len(&self) -> u64 {
        match self {
            Tier::Word32(flags) => flags.len(),
            Tier::Word64(flags) => flags.len(),
            Tier::Array(flags) => flags.len(),
        }
    }

    fn get(&self, position: u64) -> bool {
        debug_assert!(position < self.len(), "position out of range");

        match self {
            Tier::Word32(flags) => flags.get(position),
            Tier::Word64(flags) => flags.get(position),
            Tier::Array(flags) => flags.get(position),
        }
    }

    fn all(&self) -> bool {
        match self {
            Tier::Word32(flags) => flags.all(),
            Tier::Word64(flags) => flags.all(),
            Tier::Array(flags) => flags.all(),
        }
    }

    fn count_ones(&self) -> u64 {
        match self {
            Tier::Word32(flags) => flags.count_ones(),
            Tier::Word64(flags) => flags.count_ones(),
            Tier::Array(flags) => flags.count_ones(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = bool> {
        match self {
            Tier::Word32(flags) => TierIter::W32(flags.iter()),
            Tier::Word64(flags) => TierIter::W64(flags.iter()),
            Tier::Array(flags) => TierIter::Arr(flags.iter()),
        }
    }
}

impl FlagWrite for Tier {
    fn set(&mut self, position: u64, value: bool) -> bool {
        debug_assert!(position < self.len(), "position out of range");

        match self {
            Tier::Word32(flags) => flags.set(position, value),
            Tier::Word64(flags) => flags.set(position, value),
            Tier::Array(flags) => flags.set(position, value),
        }
    }
}
