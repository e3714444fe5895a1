//! Flagpole provides [`MultiFlag`], a fixed-capacity set of boolean flags
//! answering a single aggregate question: are all flags set?
//!
//! ## Key Features:
//!
//! - **Capacity tiers**: flags are packed into a single `u32` or `u64` when
//!   they fit, and into a heap allocated array of `u64` words otherwise. Up to
//!   [`MAX_CAPACITY`] flags are supported.
//!
//! - **Textual view**: every flag renders to a `'T'`/`'F'` string, which can
//!   be parsed back into an equivalent [`MultiFlag`].
//!
//! - **Explicit disposal**: a flag may release its storage early, after
//!   which reads return `None` instead of touching freed state.
//!
//! The [`file`] and [`store`] modules contain the collaborators used to
//! persist flag views: retrying file helpers and simple record stores.

use thiserror::Error;

pub mod file;
mod flag;
pub mod store;
pub mod tier;
mod traits;
mod util;
pub mod view;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use flag::MultiFlag;
pub use tier::TierKind;
pub use traits::{FlagRead, FlagWrite};

/// The smallest number of flags a [`MultiFlag`] can hold.
pub const MIN_CAPACITY: u64 = 2;

/// The largest number of flags a [`MultiFlag`] can hold.
pub const MAX_CAPACITY: u64 = 17_179_868_704;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlagErr {
    #[error("capacity {0} is outside of [2, 17179868704]")]
    Capacity(u64),

    #[error("position {position} is out of range for capacity {capacity}")]
    Position { position: u64, capacity: u64 },

    #[error("flag has been disposed")]
    Disposed,

    #[error("invalid view character {found:?} at position {position}")]
    InvalidView { position: usize, found: char },
}
