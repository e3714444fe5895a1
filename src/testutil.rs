use proptest::{prop_oneof, strategy::Strategy};
use rand::{SeedableRng, seq::index};

use crate::{MIN_CAPACITY, MultiFlag, view};

/// Builds a flag of `capacity` flags equal to `initial`, then flips every
/// position in `flips` to `!initial`.
pub fn mkflag(capacity: u64, initial: bool, flips: impl IntoIterator<Item = u64>) -> MultiFlag {
    let mut flag = MultiFlag::with_value(capacity, initial).unwrap();
    for position in flips {
        if initial {
            flag.reset_flag(position).unwrap();
        } else {
            flag.set_flag(position).unwrap();
        }
    }
    flag
}

/// The view of a fresh flag: `capacity` copies of one character.
pub fn baseline(capacity: u64, initial: bool) -> String {
    std::iter::repeat_n(view::to_char(initial), capacity as usize).collect()
}

/// Replaces the character at `position` in an ASCII `view`.
#[track_caller]
pub fn replace_at(view: &str, position: u64, ch: char) -> String {
    let position = position as usize;
    assert!(position < view.len(), "position {position} out of range");
    let mut out = String::with_capacity(view.len());
    out.push_str(&view[..position]);
    out.push(ch);
    out.push_str(&view[position + 1..]);
    out
}

/// Capacities clustered around the tier boundaries, plus a uniform spread.
pub fn capacity_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        MIN_CAPACITY..=4u64,
        30u64..=34,
        62u64..=66,
        126u64..=130,
        MIN_CAPACITY..=4096,
    ]
}

pub struct FlagGen {
    rng: rand::rngs::StdRng,
}

impl FlagGen {
    pub fn new(seed: u64) -> Self {
        let rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self { rng }
    }

    /// A random position in `[0, capacity)`.
    #[track_caller]
    pub fn position(&mut self, capacity: u64) -> u64 {
        let len = usize::try_from(capacity).unwrap();
        index::sample(&mut self.rng, len, 1).index(0) as u64
    }

    /// `count` random positions in `[0, capacity)`, possibly repeating.
    pub fn positions(&mut self, capacity: u64, count: usize) -> Vec<u64> {
        (0..count).map(|_| self.position(capacity)).collect()
    }
}
