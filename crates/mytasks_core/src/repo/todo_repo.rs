//! Backing-store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the row operations the task store consumes: list-by-owner,
//!   insert-returning, update/delete by id and owner, bulk clear.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate task text before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - All row filters include the owner column (ownership check lives at the
//!   storage boundary, not in the caller).

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::time::now_epoch_ms;
use crate::model::todo::{normalize_text, NewTodo, Todo, TodoId, TodoPatch, TodoValidationError};
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TODO_SELECT_SQL: &str = "SELECT id, text, completed, owner, created_at FROM todos";

const REQUIRED_COLUMNS: &[&str] = &["id", "text", "completed", "owner", "created_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Backing-store error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    /// Backend cannot be reached; the store falls back where a fallback
    /// path exists.
    Unavailable(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::Unavailable(message) => write!(f, "backing store unavailable: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract consumed by the task store.
///
/// Exactly the operations the reconciliation logic needs; implementations
/// are interchangeable and selected by configuration.
pub trait TodoRepository {
    /// Returns all rows for `owner`, newest first (stable id tiebreak).
    fn list_by_owner(&self, owner: &UserId) -> RepoResult<Vec<Todo>>;

    /// Inserts one row; the store assigns id and creation time and returns
    /// the full row.
    fn insert(&mut self, new_todo: &NewTodo) -> RepoResult<Todo>;

    /// Applies a partial update to the row matching both id and owner.
    fn update(&mut self, id: TodoId, owner: &UserId, patch: &TodoPatch) -> RepoResult<()>;

    /// Deletes the row matching both id and owner.
    fn delete(&mut self, id: TodoId, owner: &UserId) -> RepoResult<()>;

    /// Deletes all completed rows for `owner`, returning the removed count.
    fn delete_completed(&mut self, owner: &UserId) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Wraps a connection after verifying schema version and shape.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match what this binary expects.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_exists: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'todos');",
            [],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Err(RepoError::MissingRequiredTable("todos"));
        }

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('todos');")?;
        let mut rows = stmt.query([])?;
        let mut present = Vec::new();
        while let Some(row) = rows.next()? {
            present.push(row.get::<_, String>(0)?);
        }
        for column in REQUIRED_COLUMNS {
            if !present.iter().any(|name| name == column) {
                return Err(RepoError::MissingRequiredColumn {
                    table: "todos",
                    column,
                });
            }
        }

        Ok(Self { conn })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn list_by_owner(&self, owner: &UserId) -> RepoResult<Vec<Todo>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE owner = ?1
             ORDER BY created_at DESC, id ASC;"
        ))?;

        let mut rows = stmt.query(params![owner.as_str()])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn insert(&mut self, new_todo: &NewTodo) -> RepoResult<Todo> {
        let text = normalize_text(&new_todo.text)?;
        let todo = Todo {
            id: Uuid::new_v4(),
            text,
            completed: new_todo.completed,
            owner: new_todo.owner.clone(),
            created_at: now_epoch_ms(),
        };

        self.conn.execute(
            "INSERT INTO todos (id, text, completed, owner, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                todo.id.to_string(),
                todo.text.as_str(),
                bool_to_int(todo.completed),
                todo.owner.as_str(),
                todo.created_at,
            ],
        )?;

        Ok(todo)
    }

    fn update(&mut self, id: TodoId, owner: &UserId, patch: &TodoPatch) -> RepoResult<()> {
        let text = match &patch.text {
            Some(raw) => Some(normalize_text(raw)?),
            None => None,
        };

        if patch.is_empty() {
            let exists: bool = self.conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM todos WHERE id = ?1 AND owner = ?2);",
                params![id.to_string(), owner.as_str()],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(RepoError::NotFound(id));
            }
            return Ok(());
        }

        let changed = self.conn.execute(
            "UPDATE todos
             SET
                text = COALESCE(?1, text),
                completed = COALESCE(?2, completed)
             WHERE id = ?3 AND owner = ?4;",
            params![
                text.as_deref(),
                patch.completed.map(bool_to_int),
                id.to_string(),
                owner.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete(&mut self, id: TodoId, owner: &UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM todos WHERE id = ?1 AND owner = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_completed(&mut self, owner: &UserId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM todos WHERE owner = ?1 AND completed = 1;",
            params![owner.as_str()],
        )?;

        Ok(changed)
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in todos.id")))?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in todos.completed"
            )));
        }
    };

    let todo = Todo {
        id,
        text: row.get("text")?,
        completed,
        owner: UserId::from(row.get::<_, String>("owner")?),
        created_at: row.get("created_at")?,
    };
    todo.validate()?;
    Ok(todo)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
