//! In-memory backing store.
//!
//! # Responsibility
//! - Provide a process-local `TodoRepository` for demo and test runs,
//!   interchangeable with the SQLite implementation.
//! - Simulate backend outage via a switchable failure flag.

use crate::model::time::now_epoch_ms;
use crate::model::todo::{normalize_text, NewTodo, Todo, TodoId, TodoPatch};
use crate::model::user::UserId;
use crate::repo::todo_repo::{RepoError, RepoResult, TodoRepository};
use uuid::Uuid;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Process-local task repository with no durability.
#[derive(Default)]
pub struct MemoryTodoRepository {
    rows: Vec<Todo>,
    failing: bool,
}

impl MemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with a small demo collection.
    pub fn with_sample_data(owner: &UserId) -> Self {
        let now = now_epoch_ms();
        let sample = [
            ("Complete project proposal", false, now),
            ("Review code changes", true, now - MS_PER_DAY),
            ("Schedule team meeting", false, now - 2 * MS_PER_DAY),
        ];

        let mut repo = Self::new();
        for (text, completed, created_at) in sample {
            repo.rows.push(Todo {
                id: Uuid::new_v4(),
                text: text.to_string(),
                completed,
                owner: owner.clone(),
                created_at,
            });
        }
        repo
    }

    /// Makes every subsequent operation fail with `Unavailable`.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Rows currently held, in insertion order. Test inspection hook.
    pub fn rows(&self) -> &[Todo] {
        &self.rows
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.failing {
            return Err(RepoError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

impl TodoRepository for MemoryTodoRepository {
    fn list_by_owner(&self, owner: &UserId) -> RepoResult<Vec<Todo>> {
        self.check_available()?;

        let mut todos: Vec<Todo> = self
            .rows
            .iter()
            .filter(|todo| &todo.owner == owner)
            .cloned()
            .collect();
        todos.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(todos)
    }

    fn insert(&mut self, new_todo: &NewTodo) -> RepoResult<Todo> {
        self.check_available()?;

        let todo = Todo {
            id: Uuid::new_v4(),
            text: normalize_text(&new_todo.text)?,
            completed: new_todo.completed,
            owner: new_todo.owner.clone(),
            created_at: now_epoch_ms(),
        };
        self.rows.push(todo.clone());
        Ok(todo)
    }

    fn update(&mut self, id: TodoId, owner: &UserId, patch: &TodoPatch) -> RepoResult<()> {
        self.check_available()?;

        let normalized = match &patch.text {
            Some(raw) => Some(normalize_text(raw)?),
            None => None,
        };

        let row = self
            .rows
            .iter_mut()
            .find(|todo| todo.id == id && &todo.owner == owner)
            .ok_or(RepoError::NotFound(id))?;

        if let Some(text) = normalized {
            row.text = text;
        }
        if let Some(completed) = patch.completed {
            row.completed = completed;
        }
        Ok(())
    }

    fn delete(&mut self, id: TodoId, owner: &UserId) -> RepoResult<()> {
        self.check_available()?;

        let before = self.rows.len();
        self.rows
            .retain(|todo| !(todo.id == id && &todo.owner == owner));
        if self.rows.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_completed(&mut self, owner: &UserId) -> RepoResult<usize> {
        self.check_available()?;

        let before = self.rows.len();
        self.rows
            .retain(|todo| !(&todo.owner == owner && todo.completed));
        Ok(before - self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTodoRepository;
    use crate::model::todo::{NewTodo, TodoPatch};
    use crate::model::user::UserId;
    use crate::repo::todo_repo::{RepoError, TodoRepository};

    fn owner() -> UserId {
        UserId::from("user-1")
    }

    #[test]
    fn sample_data_is_scoped_to_owner_and_newest_first() {
        let repo = MemoryTodoRepository::with_sample_data(&owner());

        let listed = repo.list_by_owner(&owner()).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].text, "Complete project proposal");
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let other = repo.list_by_owner(&UserId::from("someone-else")).unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn failing_flag_turns_every_operation_into_unavailable() {
        let mut repo = MemoryTodoRepository::new();
        repo.set_failing(true);

        let err = repo
            .insert(&NewTodo {
                text: "x".to_string(),
                completed: false,
                owner: owner(),
            })
            .unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));
        assert!(matches!(
            repo.list_by_owner(&owner()),
            Err(RepoError::Unavailable(_))
        ));

        repo.set_failing(false);
        assert!(repo.list_by_owner(&owner()).is_ok());
    }

    #[test]
    fn update_respects_owner_filter() {
        let mut repo = MemoryTodoRepository::new();
        let created = repo
            .insert(&NewTodo {
                text: "mine".to_string(),
                completed: false,
                owner: owner(),
            })
            .unwrap();

        let err = repo
            .update(
                created.id,
                &UserId::from("someone-else"),
                &TodoPatch::completed(true),
            )
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));

        repo.update(created.id, &owner(), &TodoPatch::completed(true))
            .unwrap();
        assert!(repo.rows()[0].completed);
    }
}
