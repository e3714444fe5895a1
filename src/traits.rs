pub trait FlagRead {
    /// the number of addressable flags.
    fn len(&self) -> u64;

    /// returns the value of the flag at `position`.
    ///
    /// Callers must ensure `position < self.len()`.
    fn get(&self, position: u64) -> bool;

    /// returns true if every addressable flag is set. Padding bits beyond
    /// `len` never participate.
    fn all(&self) -> bool;

    /// returns the number of set flags
    fn count_ones(&self) -> u64;

    /// returns an iterator over every flag in ascending position order
    fn iter(&self) -> impl Iterator<Item = bool>;
}

pub trait FlagWrite {
    /// Sets the flag at `position` to `value`, returning its previous value.
    ///
    /// Callers must ensure `position < self.len()`.
    fn set(&mut self, position: u64, value: bool) -> bool;
}
