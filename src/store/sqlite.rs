//! SQLite store implementation

use std::path::Path;

use bytes::Bytes;
use rusqlite::{
    Connection, OptionalExtension, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use super::{
    FileRecord, FileStore, FlagRecord, FlagStore, RecordId, StoreErr, check_file_name, check_flag,
};

/// `AUTOINCREMENT` keeps ids from being reused after a delete.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS flags (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    view    TEXT    NOT NULL,
    value   INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS files (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT    NOT NULL CHECK (length(name) BETWEEN 1 AND 255),
    content BLOB    NOT NULL
);
CREATE INDEX IF NOT EXISTS files_name ON files (name);
";

/// Persists records to a SQLite database, one table per record kind.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`, creating missing tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreErr> {
        let path = path.as_ref();
        tracing::debug!(?path, "opening sqlite store");
        Self::init(Connection::open(path)?)
    }

    /// Opens a private database which is discarded on drop.
    pub fn open_in_memory() -> Result<Self, StoreErr> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreErr> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn last_id(&self) -> Result<RecordId, StoreErr> {
        let rowid = self.conn.last_insert_rowid();
        let id = u64::try_from(rowid)
            .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, rowid))?;
        Ok(RecordId::from(id))
    }
}

fn flag_row(row: &Row<'_>) -> rusqlite::Result<FlagRecord> {
    Ok(FlagRecord { id: row.get(0)?, view: row.get(1)?, value: row.get(2)? })
}

fn file_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let content: Vec<u8> = row.get(2)?;
    Ok(FileRecord { id: row.get(0)?, name: row.get(1)?, content: Bytes::from(content) })
}

impl FlagStore for SqliteStore {
    fn add_flag(&mut self, view: &str, value: bool) -> Result<RecordId, StoreErr> {
        check_flag(view, value)?;
        self.conn
            .execute("INSERT INTO flags (view, value) VALUES (?1, ?2)", params![view, value])?;
        let id = self.last_id()?;
        tracing::debug!(%id, len = view.len(), value, "added flag");
        Ok(id)
    }

    fn get_flag(&self, id: RecordId) -> Result<Option<FlagRecord>, StoreErr> {
        let record = self
            .conn
            .query_row("SELECT id, view, value FROM flags WHERE id = ?1", params![id], flag_row)
            .optional()?;
        Ok(record)
    }

    fn find_flag(&self, view: &str) -> Result<Option<RecordId>, StoreErr> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM flags WHERE view = ?1 ORDER BY id LIMIT 1",
                params![view],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn delete_flag(&mut self, id: RecordId) -> Result<bool, StoreErr> {
        let deleted = self.conn.execute("DELETE FROM flags WHERE id = ?1", params![id])? > 0;
        tracing::debug!(%id, deleted, "delete flag");
        Ok(deleted)
    }
}

impl FileStore for SqliteStore {
    fn add_file(&mut self, name: &str, content: Bytes) -> Result<RecordId, StoreErr> {
        check_file_name(name)?;
        self.conn.execute(
            "INSERT INTO files (name, content) VALUES (?1, ?2)",
            params![name, content.as_ref()],
        )?;
        let id = self.last_id()?;
        tracing::debug!(%id, name, len = content.len(), "added file");
        Ok(id)
    }

    fn get_file(&self, id: RecordId) -> Result<Option<FileRecord>, StoreErr> {
        let record = self
            .conn
            .query_row("SELECT id, name, content FROM files WHERE id = ?1", params![id], file_row)
            .optional()?;
        Ok(record)
    }

    fn delete_file(&mut self, id: RecordId) -> Result<bool, StoreErr> {
        let deleted = self.conn.execute("DELETE FROM files WHERE id = ?1", params![id])? > 0;
        tracing::debug!(%id, deleted, "delete file");
        Ok(deleted)
    }

    fn get_files(&self, name: &str) -> Result<Vec<FileRecord>, StoreErr> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, content FROM files WHERE name = ?1 ORDER BY id")?;
        let files = stmt
            .query_map(params![name], file_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(files)
    }
}

impl ToSql for RecordId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let id = i64::try_from(self.get())
            .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
        Ok(ToSqlOutput::from(id))
    }
}

impl FromSql for RecordId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let id = i64::column_result(value)?;
        u64::try_from(id)
            .map(RecordId::from)
            .map_err(|_| FromSqlError::OutOfRange(id))
    }
}
