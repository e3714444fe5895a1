//! In-memory store implementation

use std::collections::BTreeMap;

use bytes::Bytes;

use super::{
    FileRecord, FileStore, FlagRecord, FlagStore, RecordId, StoreErr, check_file_name, check_flag,
};

/// Keeps every record in memory. Each table assigns its own ids, so
/// iterating a table in id order yields records in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    flags: Table<FlagRecord>,
    files: Table<FileRecord>,
}

#[derive(Debug)]
struct Table<R> {
    next_id: RecordId,
    rows: BTreeMap<RecordId, R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { next_id: RecordId::FIRST, rows: BTreeMap::new() }
    }
}

impl<R> Table<R> {
    fn insert(&mut self, row: impl FnOnce(RecordId) -> R) -> RecordId {
        let id = self.next_id;
        self.next_id = id.next();
        self.rows.insert(id, row(id));
        id
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag_count(&self) -> usize {
        self.flags.rows.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.rows.len()
    }
}

impl FlagStore for InMemoryStore {
    fn add_flag(&mut self, view: &str, value: bool) -> Result<RecordId, StoreErr> {
        check_flag(view, value)?;
        let id = self.flags.insert(|id| FlagRecord { id, view: view.to_owned(), value });
        tracing::debug!(%id, len = view.len(), value, "added flag");
        Ok(id)
    }

    fn get_flag(&self, id: RecordId) -> Result<Option<FlagRecord>, StoreErr> {
        Ok(self.flags.rows.get(&id).cloned())
    }

    fn find_flag(&self, view: &str) -> Result<Option<RecordId>, StoreErr> {
        Ok(self
            .flags
            .rows
            .values()
            .find(|record| record.view == view)
            .map(|record| record.id))
    }

    fn delete_flag(&mut self, id: RecordId) -> Result<bool, StoreErr> {
        let deleted = self.flags.rows.remove(&id).is_some();
        tracing::debug!(%id, deleted, "delete flag");
        Ok(deleted)
    }
}

impl FileStore for InMemoryStore {
    fn add_file(&mut self, name: &str, content: Bytes) -> Result<RecordId, StoreErr> {
        check_file_name(name)?;
        let len = content.len();
        let id = self.files.insert(|id| FileRecord { id, name: name.to_owned(), content });
        tracing::debug!(%id, name, len, "added file");
        Ok(id)
    }

    fn get_file(&self, id: RecordId) -> Result<Option<FileRecord>, StoreErr> {
        Ok(self.files.rows.get(&id).cloned())
    }

    fn delete_file(&mut self, id: RecordId) -> Result<bool, StoreErr> {
        let deleted = self.files.rows.remove(&id).is_some();
        tracing::debug!(%id, deleted, "delete file");
        Ok(deleted)
    }

    fn get_files(&self, name: &str) -> Result<Vec<FileRecord>, StoreErr> {
        Ok(self
            .files
            .rows
            .values()
            .filter(|record| record.name == name)
            .cloned()
            .collect())
    }
}
