//! The textual view of a flag: one character per position in ascending
//! order, `'T'` for a set flag and `'F'` for a cleared one.

use crate::FlagErr;

pub const SET: char = 'T';
pub const UNSET: char = 'F';

#[inline]
pub fn to_char(value: bool) -> char {
    if value { SET } else { UNSET }
}

#[inline]
pub fn from_char(position: usize, found: char) -> Result<bool, FlagErr> {
    match found {
        SET => Ok(true),
        UNSET => Ok(false),
        found => Err(FlagErr::InvalidView { position, found }),
    }
}

pub fn render(flags: impl Iterator<Item = bool>) -> String {
    flags.map(to_char).collect()
}

/// Decodes a view into its flags, yielding an error at the first invalid
/// character.
pub fn parse(view: &str) -> impl Iterator<Item = Result<bool, FlagErr>> + '_ {
    view.chars()
        .enumerate()
        .map(|(position, found)| from_char(position, found))
}

/// Validates a view and returns the conjunction of its flags.
pub fn conjunction(view: &str) -> Result<bool, FlagErr> {
    parse(view).try_fold(true, |all, value| Ok(all & value?))
}
