use mytasks_core::db::migrations::latest_version;
use mytasks_core::db::open_db_in_memory;
use mytasks_core::{
    NewTodo, RepoError, SqliteTodoRepository, TodoPatch, TodoRepository, UserId,
};
use rusqlite::Connection;
use uuid::Uuid;

fn owner() -> UserId {
    UserId::from("user-1")
}

fn new_todo(text: &str) -> NewTodo {
    NewTodo {
        text: text.to_string(),
        completed: false,
        owner: owner(),
    }
}

#[test]
fn insert_returns_full_row_and_trims_text() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let created = repo.insert(&new_todo("  Buy milk  ")).unwrap();
    assert_eq!(created.text, "Buy milk");
    assert!(!created.completed);
    assert_eq!(created.owner, owner());
    assert!(created.created_at > 0);

    let listed = repo.list_by_owner(&owner()).unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn insert_rejects_blank_text() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let err = repo.insert(&new_todo("   ")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_by_owner(&owner()).unwrap().is_empty());
}

#[test]
fn list_is_scoped_to_owner_and_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    repo.insert(&new_todo("mine a")).unwrap();
    repo.insert(&new_todo("mine b")).unwrap();
    repo.insert(&NewTodo {
        text: "theirs".to_string(),
        completed: false,
        owner: UserId::from("user-2"),
    })
    .unwrap();

    // Collapse timestamps so the id tiebreak is what keeps order stable.
    conn.execute("UPDATE todos SET created_at = 1234567890000;", [])
        .unwrap();

    let listed = repo.list_by_owner(&owner()).unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|todo| todo.owner == owner()));
    let listed_ids: Vec<_> = listed.iter().map(|todo| todo.id).collect();
    let mut sorted_ids = listed_ids.clone();
    sorted_ids.sort();
    assert_eq!(listed_ids, sorted_ids);
}

#[test]
fn list_orders_by_created_at_descending() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let older = repo.insert(&new_todo("older")).unwrap();
    let newer = repo.insert(&new_todo("newer")).unwrap();
    conn.execute(
        "UPDATE todos SET created_at = 1000 WHERE id = ?1;",
        [older.id.to_string()],
    )
    .unwrap();
    conn.execute(
        "UPDATE todos SET created_at = 2000 WHERE id = ?1;",
        [newer.id.to_string()],
    )
    .unwrap();

    let listed = repo.list_by_owner(&owner()).unwrap();
    assert_eq!(listed[0].id, newer.id);
    assert_eq!(listed[1].id, older.id);
}

#[test]
fn update_merges_partial_fields() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let created = repo.insert(&new_todo("draft")).unwrap();

    repo.update(created.id, &owner(), &TodoPatch::completed(true))
        .unwrap();
    let after_toggle = repo.list_by_owner(&owner()).unwrap();
    assert_eq!(after_toggle[0].text, "draft");
    assert!(after_toggle[0].completed);

    repo.update(created.id, &owner(), &TodoPatch::text("  final  "))
        .unwrap();
    let after_edit = repo.list_by_owner(&owner()).unwrap();
    assert_eq!(after_edit[0].text, "final");
    assert!(after_edit[0].completed);
}

#[test]
fn update_and_delete_enforce_owner_filter() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let created = repo.insert(&new_todo("mine")).unwrap();
    let stranger = UserId::from("user-2");

    let update_err = repo
        .update(created.id, &stranger, &TodoPatch::completed(true))
        .unwrap_err();
    assert!(matches!(update_err, RepoError::NotFound(id) if id == created.id));

    let delete_err = repo.delete(created.id, &stranger).unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(id) if id == created.id));

    // Row untouched by either rejected call.
    let listed = repo.list_by_owner(&owner()).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].completed);
}

#[test]
fn update_missing_row_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = repo
        .update(missing, &owner(), &TodoPatch::completed(true))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn delete_removes_only_the_matching_row() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let keep = repo.insert(&new_todo("keep")).unwrap();
    let gone = repo.insert(&new_todo("gone")).unwrap();

    repo.delete(gone.id, &owner()).unwrap();
    let listed = repo.list_by_owner(&owner()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
}

#[test]
fn delete_completed_removes_all_completed_rows_for_owner() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let active = repo.insert(&new_todo("active")).unwrap();
    let done_a = repo.insert(&new_todo("done a")).unwrap();
    let done_b = repo.insert(&new_todo("done b")).unwrap();
    repo.update(done_a.id, &owner(), &TodoPatch::completed(true))
        .unwrap();
    repo.update(done_b.id, &owner(), &TodoPatch::completed(true))
        .unwrap();

    let other_done = repo
        .insert(&NewTodo {
            text: "theirs done".to_string(),
            completed: true,
            owner: UserId::from("user-2"),
        })
        .unwrap();

    let removed = repo.delete_completed(&owner()).unwrap();
    assert_eq!(removed, 2);

    let listed = repo.list_by_owner(&owner()).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, active.id);

    // Other identity's completed row survives the bulk clear.
    let other_listed = repo.list_by_owner(&UserId::from("user-2")).unwrap();
    assert_eq!(other_listed.len(), 1);
    assert_eq!(other_listed[0].id, other_done.id);
}

#[test]
fn delete_completed_with_no_completed_rows_is_a_successful_noop() {
    let conn = open_db_in_memory().unwrap();
    let mut repo = SqliteTodoRepository::try_new(&conn).unwrap();

    repo.insert(&new_todo("active")).unwrap();
    assert_eq!(repo.delete_completed(&owner()).unwrap(), 0);
    assert_eq!(repo.list_by_owner(&owner()).unwrap().len(), 1);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteTodoRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_todos_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTodoRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("todos"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_todos_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE todos (
            id TEXT PRIMARY KEY NOT NULL,
            text TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTodoRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "todos",
            column: "owner"
        })
    ));
}
