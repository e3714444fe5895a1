//! Records held by the stores.

use std::fmt::{self, Display};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Identifies a record within one store table. Ids are assigned in
/// increasing order, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub const FIRST: RecordId = RecordId(1);

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn next(self) -> RecordId {
        RecordId(self.0 + 1)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stored flag: its view and the value of "all flags set" at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRecord {
    pub id: RecordId,
    pub view: String,
    pub value: bool,
}

/// A stored file: its name and raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: RecordId,
    pub name: String,
    pub content: Bytes,
}
