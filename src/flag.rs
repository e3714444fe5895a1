use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};

use crate::{
    FlagErr, MAX_CAPACITY, MIN_CAPACITY,
    tier::{Tier, TierKind},
    traits::{FlagRead, FlagWrite},
    view,
};

/// A fixed-capacity set of boolean flags with an "all flags set" query.
///
/// `MultiFlag` picks its storage once, based on capacity: flags which fit
/// into a single `u32` or `u64` are stored inline, larger flags are stored in
/// a heap allocated array of `u64` words. Every operation behaves the same
/// regardless of the storage picked.
///
/// A flag may be released early with [`MultiFlag::dispose`]. After disposal
/// [`MultiFlag::get_flag`] and [`MultiFlag::view`] return `None` and writes
/// fail with [`FlagErr::Disposed`].
///
/// # Examples
///
/// ```
/// use flagpole::MultiFlag;
///
/// let mut flag = MultiFlag::new(10).unwrap();
/// assert_eq!(flag.get_flag(), Some(true));
/// assert_eq!(flag.view().as_deref(), Some("TTTTTTTTTT"));
///
/// flag.reset_flag(3).unwrap();
/// assert_eq!(flag.get_flag(), Some(false));
/// assert_eq!(flag.view().as_deref(), Some("TTTFTTTTTT"));
///
/// flag.dispose();
/// assert_eq!(flag.get_flag(), None);
/// assert_eq!(flag.view(), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct MultiFlag {
    capacity: u64,
    /// `None` once disposed
    tier: Option<Tier>,
}

impl MultiFlag {
    /// Creates a flag holding `capacity` flags, all set.
    pub fn new(capacity: u64) -> Result<Self, FlagErr> {
        Self::with_value(capacity, true)
    }

    /// Creates a flag holding `capacity` flags, all equal to `initial`.
    ///
    /// Fails with [`FlagErr::Capacity`] unless
    /// `MIN_CAPACITY <= capacity <= MAX_CAPACITY`.
    pub fn with_value(capacity: u64, initial: bool) -> Result<Self, FlagErr> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(FlagErr::Capacity(capacity));
        }
        let tier = TierKind::pick_capacity(capacity).build(capacity, initial)?;
        Ok(Self { capacity, tier: Some(tier) })
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns the storage tier, or `None` once disposed.
    #[inline]
    pub fn kind(&self) -> Option<TierKind> {
        self.tier.as_ref().map(Tier::kind)
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.tier.is_none()
    }

    /// Sets the flag at `position`.
    pub fn set_flag(&mut self, position: u64) -> Result<(), FlagErr> {
        self.write(position, true)
    }

    /// Clears the flag at `position`.
    pub fn reset_flag(&mut self, position: u64) -> Result<(), FlagErr> {
        self.write(position, false)
    }

    fn write(&mut self, position: u64, value: bool) -> Result<(), FlagErr> {
        let capacity = self.capacity;
        let tier = self.tier.as_mut().ok_or(FlagErr::Disposed)?;
        if position >= capacity {
            return Err(FlagErr::Position { position, capacity });
        }
        tier.set(position, value);
        Ok(())
    }

    /// Returns true if every flag is set, or `None` once disposed.
    #[inline]
    pub fn get_flag(&self) -> Option<bool> {
        self.tier.as_ref().map(FlagRead::all)
    }

    /// Returns the number of set flags, or `None` once disposed.
    pub fn count_set(&self) -> Option<u64> {
        self.tier.as_ref().map(FlagRead::count_ones)
    }

    /// Renders one `'T'` or `'F'` per flag in ascending position order, or
    /// `None` once disposed.
    pub fn view(&self) -> Option<String> {
        self.tier.as_ref().map(|tier| view::render(tier.iter()))
    }

    /// Returns an iterator over every flag in ascending position order. The
    /// iterator is empty once disposed.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.tier.iter().flat_map(|tier| tier.iter())
    }

    /// Releases the flag storage. Calling `dispose` again has no effect.
    pub fn dispose(&mut self) {
        if let Some(tier) = self.tier.take() {
            tracing::trace!(capacity = self.capacity, kind = ?tier.kind(), "disposed flag");
        }
    }
}

impl Debug for MultiFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tier {
            Some(tier) => f.debug_tuple("MultiFlag").field(tier).finish(),
            None => write!(f, "MultiFlag(Disposed; {})", self.capacity),
        }
    }
}

impl Display for MultiFlag {
    /// Writes the view; a disposed flag writes nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for value in self.iter() {
            f.write_char(view::to_char(value))?;
        }
        Ok(())
    }
}

impl FromStr for MultiFlag {
    type Err = FlagErr;

    /// Rebuilds a flag from its view. The view is validated before any
    /// storage is allocated.
    fn from_str(view: &str) -> Result<Self, Self::Err> {
        view::conjunction(view)?;
        // every valid character is ASCII, so bytes and flags coincide
        let mut flag = MultiFlag::new(view.len() as u64)?;
        for (position, value) in view::parse(view).enumerate() {
            if !value? {
                flag.reset_flag(position as u64)?;
            }
        }
        Ok(flag)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use itertools::Itertools;
    use proptest::proptest;

    use super::*;
    use crate::testutil::{FlagGen, baseline, capacity_strategy, mkflag, replace_at};

    /// capacities covering every tier: `Word32`, `Word64`, and `Array`
    const CAPACITIES: [u64; 3] = [10, 50, 100];

    #[test]
    fn test_constructor_invalid_capacity() {
        assert_matches!(MultiFlag::new(0), Err(FlagErr::Capacity(0)));
        assert_matches!(MultiFlag::new(1), Err(FlagErr::Capacity(1)));
        assert_matches!(
            MultiFlag::new(MAX_CAPACITY + 1),
            Err(FlagErr::Capacity(17_179_868_705))
        );
        assert_matches!(MultiFlag::with_value(u64::MAX, false), Err(FlagErr::Capacity(_)));
    }

    #[test]
    fn test_constructor_min_capacity() {
        let flag = MultiFlag::with_value(MIN_CAPACITY, false).unwrap();
        assert_eq!(flag.kind(), Some(TierKind::Word32));
        assert_eq!(flag.view().as_deref(), Some("FF"));
    }

    #[test]
    #[ignore = "allocates 2 GiB"]
    fn test_constructor_max_capacity() {
        let mut flag = MultiFlag::new(MAX_CAPACITY).unwrap();
        assert_eq!(flag.kind(), Some(TierKind::Array));
        assert_eq!(flag.get_flag(), Some(true));
        flag.reset_flag(MAX_CAPACITY - 1).unwrap();
        assert_eq!(flag.get_flag(), Some(false));
        assert_matches!(flag.set_flag(MAX_CAPACITY), Err(FlagErr::Position { .. }));
    }

    #[test]
    fn test_constructor_kind() {
        assert_eq!(MultiFlag::new(10).unwrap().kind(), Some(TierKind::Word32));
        assert_eq!(MultiFlag::new(50).unwrap().kind(), Some(TierKind::Word64));
        assert_eq!(MultiFlag::new(100).unwrap().kind(), Some(TierKind::Array));
    }

    #[test]
    fn test_get_flag_init() {
        for capacity in CAPACITIES {
            assert_eq!(MultiFlag::new(capacity).unwrap().get_flag(), Some(true));
            assert_eq!(
                MultiFlag::with_value(capacity, false).unwrap().get_flag(),
                Some(false)
            );
        }
    }

    #[test]
    fn test_view_init() {
        for capacity in CAPACITIES {
            let flag = MultiFlag::new(capacity).unwrap();
            assert_eq!(flag.view(), Some(baseline(capacity, true)));
            assert_eq!(flag.count_set(), Some(capacity));

            let flag = MultiFlag::with_value(capacity, false).unwrap();
            assert_eq!(flag.view(), Some(baseline(capacity, false)));
            assert_eq!(flag.count_set(), Some(0));
        }
    }

    #[test]
    fn test_set_flag_invalid_position() {
        for capacity in CAPACITIES {
            let mut flag = MultiFlag::new(capacity).unwrap();
            let before = flag.clone();
            assert_matches!(
                flag.set_flag(capacity),
                Err(FlagErr::Position { position, capacity: c }) if position == capacity && c == capacity
            );
            assert_matches!(flag.set_flag(u64::MAX), Err(FlagErr::Position { .. }));
            assert_eq!(flag, before);
        }
    }

    #[test]
    fn test_reset_flag_invalid_position() {
        for capacity in CAPACITIES {
            let mut flag = MultiFlag::new(capacity).unwrap();
            assert_matches!(flag.reset_flag(capacity), Err(FlagErr::Position { .. }));
            assert_eq!(flag.get_flag(), Some(true));
            assert_eq!(flag.view(), Some(baseline(capacity, true)));
        }
    }

    #[test]
    fn test_set_flag_true_init() {
        let mut flag_gen = FlagGen::new(0xDEAD_BEEF);
        for capacity in CAPACITIES {
            let mut flag = MultiFlag::new(capacity).unwrap();
            flag.set_flag(flag_gen.position(capacity)).unwrap();
            assert_eq!(flag.get_flag(), Some(true));
            assert_eq!(flag.view(), Some(baseline(capacity, true)));
        }
    }

    #[test]
    fn test_set_flag_false_init() {
        let mut flag_gen = FlagGen::new(0xDEAD_BEEF);
        for capacity in CAPACITIES {
            let position = flag_gen.position(capacity);
            let mut flag = MultiFlag::with_value(capacity, false).unwrap();
            flag.set_flag(position).unwrap();
            assert_eq!(flag.get_flag(), Some(false));
            assert_eq!(
                flag.view(),
                Some(replace_at(&baseline(capacity, false), position, 'T'))
            );
        }
    }

    #[test]
    fn test_reset_flag_true_init() {
        let mut flag_gen = FlagGen::new(0xDEAD_BEEF);
        for capacity in CAPACITIES {
            let position = flag_gen.position(capacity);
            let mut flag = MultiFlag::new(capacity).unwrap();
            flag.reset_flag(position).unwrap();
            assert_eq!(flag.get_flag(), Some(false));
            assert_eq!(
                flag.view(),
                Some(replace_at(&baseline(capacity, true), position, 'F'))
            );
        }
    }

    #[test]
    fn test_reset_flag_false_init() {
        let mut flag_gen = FlagGen::new(0xDEAD_BEEF);
        for capacity in CAPACITIES {
            let mut flag = MultiFlag::with_value(capacity, false).unwrap();
            flag.reset_flag(flag_gen.position(capacity)).unwrap();
            assert_eq!(flag.get_flag(), Some(false));
            assert_eq!(flag.view(), Some(baseline(capacity, false)));
        }
    }

    #[test]
    fn test_fill_every_position() {
        for capacity in [2, 32, 33, 64, 65, 128, 129] {
            let mut flag = MultiFlag::with_value(capacity, false).unwrap();
            for position in 0..capacity {
                assert_eq!(flag.get_flag(), Some(false), "capacity {capacity}");
                flag.set_flag(position).unwrap();
            }
            assert_eq!(flag.get_flag(), Some(true), "capacity {capacity}");
        }
    }

    #[test]
    fn test_scenario_capacity_10() {
        let mut flag = MultiFlag::new(10).unwrap();
        assert_eq!(flag.to_string(), "TTTTTTTTTT");
        flag.reset_flag(3).unwrap();
        assert_eq!(flag.to_string(), "TTTFTTTTTT");
        assert_eq!(flag.get_flag(), Some(false));
    }

    #[test]
    fn test_scenario_capacity_50() {
        let mut flag = MultiFlag::with_value(50, false).unwrap();
        flag.set_flag(10).unwrap();
        assert_eq!(flag.get_flag(), Some(false));
        assert_eq!(flag.iter().positions(|v| v).collect_vec(), [10]);
    }

    #[test]
    fn test_large_array() {
        let capacity = (1 << 20) + 10;
        let mut flag_gen = FlagGen::new(0xDEAD_BEEF);

        let mut flag = MultiFlag::new(capacity).unwrap();
        flag.set_flag(flag_gen.position(capacity)).unwrap();
        assert_eq!(flag.get_flag(), Some(true));
        flag.reset_flag(capacity - 1).unwrap();
        assert_eq!(flag.get_flag(), Some(false));

        let mut flag = MultiFlag::with_value(capacity, false).unwrap();
        flag.set_flag(flag_gen.position(capacity)).unwrap();
        assert_eq!(flag.get_flag(), Some(false));
        assert_matches!(flag.reset_flag(capacity), Err(FlagErr::Position { .. }));
    }

    #[test]
    #[ignore = "allocates 256 MiB"]
    fn test_beyond_i32_array() {
        let capacity = i32::MAX as u64 + 10;
        let mut flag_gen = FlagGen::new(0xDEAD_BEEF);

        let mut flag = MultiFlag::new(capacity).unwrap();
        assert_eq!(flag.get_flag(), Some(true));
        flag.reset_flag(flag_gen.position(capacity)).unwrap();
        assert_eq!(flag.get_flag(), Some(false));
    }

    #[test]
    fn test_dispose() {
        for capacity in CAPACITIES {
            let mut flag = MultiFlag::new(capacity).unwrap();
            flag.dispose();
            assert!(flag.is_disposed());
            assert_eq!(flag.get_flag(), None);
            assert_eq!(flag.view(), None);
            assert_eq!(flag.count_set(), None);
            assert_eq!(flag.kind(), None);
            assert_eq!(flag.iter().count(), 0);
            assert_eq!(flag.to_string(), "");
            assert_eq!(flag.capacity(), capacity);

            // dispose is idempotent
            flag.dispose();
            assert!(flag.is_disposed());
            assert_eq!(flag.get_flag(), None);
            assert_eq!(flag.view(), None);
        }
    }

    #[test]
    fn test_write_after_dispose() {
        let mut flag = MultiFlag::new(10).unwrap();
        flag.dispose();
        assert_matches!(flag.set_flag(0), Err(FlagErr::Disposed));
        assert_matches!(flag.reset_flag(0), Err(FlagErr::Disposed));
        // out of range positions report disposal first
        assert_matches!(flag.reset_flag(10), Err(FlagErr::Disposed));
        assert_eq!(flag.get_flag(), None);
    }

    #[test]
    fn test_debug() {
        let mut flag = mkflag(10, true, [3]);
        assert_eq!(format!("{flag:?}"), "MultiFlag(WordFlags<Word32>(9/10))");
        flag.dispose();
        assert_eq!(format!("{flag:?}"), "MultiFlag(Disposed; 10)");
    }

    #[test]
    fn test_from_str() {
        let flag: MultiFlag = "TTFT".parse().unwrap();
        assert_eq!(flag.capacity(), 4);
        assert_eq!(flag.get_flag(), Some(false));
        assert_eq!(flag.view().as_deref(), Some("TTFT"));

        assert_matches!("T".parse::<MultiFlag>(), Err(FlagErr::Capacity(1)));
        assert_matches!("".parse::<MultiFlag>(), Err(FlagErr::Capacity(0)));
        assert_matches!(
            "TTxT".parse::<MultiFlag>(),
            Err(FlagErr::InvalidView { position: 2, found: 'x' })
        );
    }

    #[test]
    fn test_from_str_validates_first() {
        // an invalid character wins over an invalid capacity
        assert_matches!(
            "x".parse::<MultiFlag>(),
            Err(FlagErr::InvalidView { position: 0, found: 'x' })
        );

        // positions count characters, not bytes
        assert_matches!(
            "TTїF".parse::<MultiFlag>(),
            Err(FlagErr::InvalidView { position: 2, found: 'ї' })
        );

        // a long view with an invalid tail fails without building the flag
        let mut view = baseline((1 << 20) + 10, true);
        view.push('?');
        assert_matches!(
            view.parse::<MultiFlag>(),
            Err(FlagErr::InvalidView { position, found: '?' }) if position == (1 << 20) + 10
        );
    }

    proptest! {
        #[test]
        fn test_reset_one_proptest(capacity in capacity_strategy(), seed: u64) {
            let position = FlagGen::new(seed).position(capacity);
            let mut flag = MultiFlag::new(capacity).unwrap();
            flag.reset_flag(position).unwrap();
            assert_eq!(flag.get_flag(), Some(false));
            assert_eq!(flag.view(), Some(replace_at(&baseline(capacity, true), position, 'F')));
            assert_eq!(flag.count_set(), Some(capacity - 1));
        }

        #[test]
        fn test_view_roundtrip_proptest(capacity in capacity_strategy(), resets: Vec<u64>) {
            let flag = mkflag(capacity, true, resets.into_iter().map(|p| p % capacity));
            let view = flag.view().unwrap();
            let parsed: MultiFlag = view.parse().unwrap();
            assert_eq!(parsed.kind(), flag.kind());
            assert_eq!(parsed.get_flag(), flag.get_flag());
            assert_eq!(parsed, flag);
        }
    }
}
