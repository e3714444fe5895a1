//! Record stores for flags and files.
//!
//! Stores are exposed through the [`FlagStore`] and [`FileStore`] traits so
//! callers can swap backends. [`InMemoryStore`] keeps records in memory and
//! [`SqliteStore`] persists them to a SQLite database.

use bytes::Bytes;
use thiserror::Error;

use crate::{FlagErr, MultiFlag, view};

mod in_memory;
pub mod model;
mod sqlite;
#[cfg(test)]
mod testing;

pub use in_memory::InMemoryStore;
pub use model::{FileRecord, FlagRecord, RecordId};
pub use sqlite::SqliteStore;

/// The longest file name a [`FileStore`] accepts, in characters.
pub const MAX_FILE_NAME: usize = 255;

#[derive(Debug, Error)]
pub enum StoreErr {
    #[error("invalid flag view: {0}")]
    View(#[from] FlagErr),

    #[error("flag value {value} does not match its view")]
    Inconsistent { value: bool },

    #[error("cannot save a disposed flag")]
    Disposed,

    #[error("file name must be 1 to 255 characters long, got {0}")]
    Name(usize),

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

pub trait FlagStore {
    /// Stores a flag view along with its value, returning the new record id.
    ///
    /// Fails if `view` contains anything other than `'T'` and `'F'`, or if
    /// `value` is not the conjunction of the flags in `view`.
    fn add_flag(&mut self, view: &str, value: bool) -> Result<RecordId, StoreErr>;

    fn get_flag(&self, id: RecordId) -> Result<Option<FlagRecord>, StoreErr>;

    /// Returns the id of the first record storing `view`.
    fn find_flag(&self, view: &str) -> Result<Option<RecordId>, StoreErr>;

    /// Removes a record, returning false if it did not exist.
    fn delete_flag(&mut self, id: RecordId) -> Result<bool, StoreErr>;

    /// Stores the current view and value of `flag`.
    fn save(&mut self, flag: &MultiFlag) -> Result<RecordId, StoreErr> {
        let (Some(view), Some(value)) = (flag.view(), flag.get_flag()) else {
            return Err(StoreErr::Disposed);
        };
        self.add_flag(&view, value)
    }

    /// Rebuilds the flag stored under `id`.
    fn load(&self, id: RecordId) -> Result<Option<MultiFlag>, StoreErr> {
        let Some(record) = self.get_flag(id)? else {
            return Ok(None);
        };
        Ok(Some(record.view.parse::<MultiFlag>()?))
    }
}

pub trait FileStore {
    /// Stores a named file, returning the new record id. Names need not be
    /// unique.
    fn add_file(&mut self, name: &str, content: Bytes) -> Result<RecordId, StoreErr>;

    fn get_file(&self, id: RecordId) -> Result<Option<FileRecord>, StoreErr>;

    /// Removes a record, returning false if it did not exist.
    fn delete_file(&mut self, id: RecordId) -> Result<bool, StoreErr>;

    /// Returns every file stored under `name`, oldest first.
    fn get_files(&self, name: &str) -> Result<Vec<FileRecord>, StoreErr>;
}

/// Validates a flag record before insertion.
pub(crate) fn check_flag(view: &str, value: bool) -> Result<(), StoreErr> {
    if view::conjunction(view)? != value {
        return Err(StoreErr::Inconsistent { value });
    }
    Ok(())
}

/// Validates a file name before insertion.
pub(crate) fn check_file_name(name: &str) -> Result<(), StoreErr> {
    let len = name.chars().count();
    if len == 0 || len > MAX_FILE_NAME {
        return Err(StoreErr::Name(len));
    }
    Ok(())
}
