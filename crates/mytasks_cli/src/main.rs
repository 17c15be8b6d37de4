//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mytasks_core` wiring: build a
//!   store from an optional config document, sign in a demo identity, and
//!   print the collection with derived stats.
//! - Keep output deterministic apart from generated ids.

use mytasks_core::db::open_db;
use mytasks_core::model::time::{format_created_at, now_epoch_ms};
use mytasks_core::{
    AppConfig, BackendKind, Filter, JsonFileFallback, MemoryTodoRepository,
    SqliteTodoRepository, TodoStore, User, UserId,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("mytasks_core ping={}", mytasks_core::ping());
    println!("mytasks_core version={}", mytasks_core::core_version());

    let config = match load_config() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(config) = config {
        if let Some(log_dir) = &config.log_dir {
            let level = config
                .log_level
                .as_deref()
                .unwrap_or_else(|| mytasks_core::default_log_level());
            if let Err(message) = mytasks_core::init_logging(level, log_dir) {
                eprintln!("logging init failed: {message}");
                return ExitCode::FAILURE;
            }
        }
        run_with_config(&config)
    } else {
        run_demo()
    }
}

fn load_config() -> Result<Option<AppConfig>, String> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(None);
    };
    let payload =
        std::fs::read_to_string(&path).map_err(|err| format!("cannot read `{path}`: {err}"))?;
    let config = AppConfig::from_json_str(&payload).map_err(|err| err.to_string())?;
    Ok(Some(config))
}

fn run_with_config(config: &AppConfig) -> ExitCode {
    let fallback = JsonFileFallback::new(config.fallback_dir.clone());

    match config.backend {
        BackendKind::Sqlite => {
            // Validated by AppConfig; sqlite backend always carries a path.
            let Some(db_path) = config.db_path.as_deref() else {
                eprintln!("missing db_path for sqlite backend");
                return ExitCode::FAILURE;
            };
            let conn = match open_db(db_path) {
                Ok(conn) => conn,
                Err(err) => {
                    eprintln!("cannot open database `{db_path}`: {err}");
                    return ExitCode::FAILURE;
                }
            };
            let repo = match SqliteTodoRepository::try_new(&conn) {
                Ok(repo) => repo,
                Err(err) => {
                    eprintln!("cannot use database `{db_path}`: {err}");
                    return ExitCode::FAILURE;
                }
            };
            run_session(TodoStore::new(repo, fallback))
        }
        BackendKind::Memory => {
            let repo = MemoryTodoRepository::with_sample_data(&demo_user().id);
            run_session(TodoStore::new(repo, fallback))
        }
    }
}

fn run_demo() -> ExitCode {
    let repo = MemoryTodoRepository::with_sample_data(&demo_user().id);
    let fallback = mytasks_core::MemoryFallback::new();
    run_session(TodoStore::new(repo, fallback))
}

fn run_session<R, F>(mut store: TodoStore<R, F>) -> ExitCode
where
    R: mytasks_core::TodoRepository,
    F: mytasks_core::FallbackStore,
{
    match store.sign_in(demo_user()) {
        Ok(outcome) => println!("loaded count={} source={:?}", outcome.count, outcome.source),
        Err(err) => {
            eprintln!("load failed: {err}");
            return ExitCode::FAILURE;
        }
    }

    let stats = store.stats();
    println!(
        "stats total={} active={} completed={}",
        stats.total, stats.active, stats.completed
    );
    let now = now_epoch_ms();
    for todo in store.filtered(Filter::All) {
        let mark = if todo.completed { "x" } else { " " };
        println!(
            "[{mark}] {} ({})",
            todo.text,
            format_created_at(todo.created_at, now)
        );
    }
    ExitCode::SUCCESS
}

fn demo_user() -> User {
    let mut user = User::new(UserId::from("demo-user"), "demo@example.com");
    user.display_name = Some("Demo User".to_string());
    user
}
