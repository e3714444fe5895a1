//! File helpers used to persist flag views, with optional retries around
//! writes and copies.
//!
//! Every function rejects a path which is empty or whitespace only with
//! [`FileErr::InvalidPath`] before touching the file system.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::util::is_blank;

mod retry;

pub use retry::{Retry, RetryConfig, is_transient};

#[derive(Debug, Error)]
pub enum FileErr {
    #[error("path is empty or blank")]
    InvalidPath,

    #[error("{0:?} does not exist")]
    NotFound(PathBuf),

    #[error("{0:?} is not a regular file")]
    NotAFile(PathBuf),

    #[error("{0:?} already exists")]
    AlreadyExists(PathBuf),

    #[error("tries must be at least 1, got {0}")]
    Tries(u32),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn check_path(path: &Path) -> Result<&Path, FileErr> {
    if is_blank(&path.as_os_str().to_string_lossy()) {
        Err(FileErr::InvalidPath)
    } else {
        Ok(path)
    }
}

/// Ensures `path` names an existing regular file.
fn require_file(path: &Path) -> Result<&Path, FileErr> {
    let path = check_path(path)?;
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(path),
        Ok(_) => Err(FileErr::NotAFile(path.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(FileErr::NotFound(path.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Ensures `path` may be created or overwritten as a regular file.
fn require_writable(path: &Path) -> Result<&Path, FileErr> {
    let path = check_path(path)?;
    if path.is_dir() {
        return Err(FileErr::NotAFile(path.to_path_buf()));
    }
    Ok(path)
}

/// Creates or overwrites `path` with `text`.
pub fn write(text: &str, path: impl AsRef<Path>) -> Result<(), FileErr> {
    let path = require_writable(path.as_ref())?;
    fs::write(path, text)?;
    Ok(())
}

pub fn read_all(path: impl AsRef<Path>) -> Result<String, FileErr> {
    let path = require_file(path.as_ref())?;
    Ok(fs::read_to_string(path)?)
}

/// Reads `path` split into lines. A trailing `\r` is stripped from each line
/// and a final line terminator does not produce an empty line.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, FileErr> {
    Ok(read_all(path)?.lines().map(str::to_owned).collect())
}

/// Like [`write`], retrying transient I/O errors according to `retry`.
pub fn try_write(text: &str, path: impl AsRef<Path>, retry: &Retry) -> Result<(), FileErr> {
    let path = require_writable(path.as_ref())?;
    retry.run(|| fs::write(path, text), is_transient)?;
    Ok(())
}

/// Copies the file at `from` to `to`, retrying transient I/O errors
/// according to `retry`.
///
/// Fails without retrying if `from` is not an existing regular file, if `to`
/// is a directory, or if `to` exists and `rewrite` is false.
pub fn try_copy(
    from: impl AsRef<Path>,
    to: impl AsRef<Path>,
    rewrite: bool,
    retry: &Retry,
) -> Result<(), FileErr> {
    let from = require_file(from.as_ref())?;
    let to = require_writable(to.as_ref())?;
    if !rewrite && to.exists() {
        return Err(FileErr::AlreadyExists(to.to_path_buf()));
    }
    let copied = retry.run(|| fs::copy(from, to), is_transient)?;
    tracing::debug!(?from, ?to, copied, "copied file");
    Ok(())
}

/// Returns the absolute, canonical path of an existing file.
pub fn full_path(path: impl AsRef<Path>) -> Result<PathBuf, FileErr> {
    let path = require_file(path.as_ref())?;
    Ok(fs::canonicalize(path)?)
}

/// Returns the final component of an existing file's path. Fails with
/// [`FileErr::InvalidPath`] if the name is not valid UTF-8.
pub fn file_name(path: impl AsRef<Path>) -> Result<String, FileErr> {
    let full = full_path(path)?;
    full.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or(FileErr::InvalidPath)
}

/// Returns the absolute path of the directory containing an existing file.
pub fn parent_dir(path: impl AsRef<Path>) -> Result<PathBuf, FileErr> {
    let full = full_path(path)?;
    full.parent().map(Path::to_path_buf).ok_or(FileErr::InvalidPath)
}

/// Creates a directory and any missing parents, returning its absolute path.
/// An existing directory is not an error.
pub fn mkdir(path: impl AsRef<Path>) -> Result<PathBuf, FileErr> {
    let path = check_path(path.as_ref())?;
    if path.is_file() {
        return Err(FileErr::AlreadyExists(path.to_path_buf()));
    }
    fs::create_dir_all(path)?;
    Ok(fs::canonicalize(path)?)
}
