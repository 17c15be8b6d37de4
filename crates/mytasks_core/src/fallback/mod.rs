//! Local fallback storage for backend outages.
//!
//! # Responsibility
//! - Persist one serialized task collection per identity under the key
//!   `todos_<owner>`.
//! - Stay write-only from the store's point of view except during a failed
//!   initial load; fallback data is never reconciled back to the backend.
//!
//! # Invariants
//! - One identity's fallback data is never visible under another key.
//! - A missing key reads as `None`, not as an error.

use crate::model::todo::Todo;
use crate::model::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub type FallbackResult<T> = Result<T, FallbackError>;

/// Fallback persistence error.
#[derive(Debug)]
pub enum FallbackError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl Display for FallbackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "invalid fallback payload: {err}"),
        }
    }
}

impl Error for FallbackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
        }
    }
}

impl From<io::Error> for FallbackError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for FallbackError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Keyed persistence contract for the degraded path.
pub trait FallbackStore {
    /// Reads the collection stored for `owner`, or `None` when absent.
    fn read(&self, owner: &UserId) -> FallbackResult<Option<Vec<Todo>>>;

    /// Replaces the stored collection for `owner`.
    fn write(&mut self, owner: &UserId, todos: &[Todo]) -> FallbackResult<()>;
}

/// File-backed fallback store: one JSON document per identity.
pub struct JsonFileFallback {
    dir: PathBuf,
}

impl JsonFileFallback {
    /// Uses `dir` as the fallback root; created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, owner: &UserId) -> PathBuf {
        self.dir.join(format!("{}.json", fallback_key(owner)))
    }
}

impl FallbackStore for JsonFileFallback {
    fn read(&self, owner: &UserId) -> FallbackResult<Option<Vec<Todo>>> {
        let path = self.key_path(owner);
        let payload = match fs::read_to_string(&path) {
            Ok(payload) => payload,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let todos: Vec<Todo> = serde_json::from_str(&payload)?;
        Ok(Some(todos))
    }

    fn write(&mut self, owner: &UserId, todos: &[Todo]) -> FallbackResult<()> {
        fs::create_dir_all(&self.dir)?;
        let payload = serde_json::to_string(todos)?;
        write_atomically(&self.key_path(owner), &payload)
    }
}

// Write-then-rename so a crash mid-write never leaves a truncated document
// behind the live key.
fn write_atomically(path: &Path, payload: &str) -> FallbackResult<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Derives the storage key for one identity: `todos_<owner>` with the owner
/// id reduced to a safe filename alphabet.
pub fn fallback_key(owner: &UserId) -> String {
    let sanitized: String = owner
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("todos_{sanitized}")
}

/// Map-backed fallback store for tests and demo runs.
#[derive(Default)]
pub struct MemoryFallback {
    entries: std::collections::BTreeMap<String, Vec<Todo>>,
}

impl MemoryFallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a key has been written for `owner`.
    pub fn contains(&self, owner: &UserId) -> bool {
        self.entries.contains_key(&fallback_key(owner))
    }
}

impl FallbackStore for MemoryFallback {
    fn read(&self, owner: &UserId) -> FallbackResult<Option<Vec<Todo>>> {
        Ok(self.entries.get(&fallback_key(owner)).cloned())
    }

    fn write(&mut self, owner: &UserId, todos: &[Todo]) -> FallbackResult<()> {
        self.entries.insert(fallback_key(owner), todos.to_vec());
        Ok(())
    }
}
