//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire logging, storage and the post service the way a host app would.
//! - Run one scripted create / foreign edit / author edit sequence and print
//!   each outcome with its destination.
//!
//! Settings come from `YATUBE_DB_PATH` (default: in-memory),
//! `YATUBE_LOG_LEVEL` and `YATUBE_LOG_DIR` (logging is skipped when unset).

use log::error;
use std::error::Error;
use std::process::ExitCode;
use uuid::Uuid;
use yatube_core::db::{open_db, open_db_in_memory};
use yatube_core::{
    default_log_level, init_logging, Actor, Group, GroupRepository, PostDraft, PostOutcome,
    PostService, SqliteGroupRepository, SqlitePostRepository, SqliteUserRepository, User,
    UserRepository,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("yatube_cli failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("YATUBE_LOG_DIR") {
        let level = std::env::var("YATUBE_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        init_logging(&level, log_dir)?;
    }

    let conn = match std::env::var("YATUBE_DB_PATH") {
        Ok(path) => open_db(path)?,
        Err(_) => open_db_in_memory()?,
    };
    println!("yatube_core version={}", yatube_core::core_version());

    // Usernames and slugs carry a uuid suffix so reruns on a file db succeed.
    let suffix = uuid_suffix();
    let users = SqliteUserRepository::try_new(&conn)?;
    let author = User::new(format!("author_{suffix}"));
    let reader = User::new(format!("reader_{suffix}"));
    users.create_user(&author)?;
    users.create_user(&reader)?;

    let group = Group::new(format!("smoke_{suffix}"), "Smoke test group");
    SqliteGroupRepository::try_new(&conn)?.create_group(&group)?;

    let author = Actor::authenticated(author);
    let reader = Actor::authenticated(reader);
    let service = PostService::new(SqlitePostRepository::try_new(&conn)?);

    let created = service.create_post(&author, &PostDraft::new("hello", Some(group.id)))?;
    report("create", &created);
    let post_id = created.post().id();

    let denied = service.edit_post(&reader, post_id, &PostDraft::new("hacked", None))?;
    report("edit by reader", &denied);

    let updated = service.edit_post(&author, post_id, &PostDraft::new("hello again", None))?;
    report("edit by author", &updated);

    println!("posts={}", service.count_posts()?);
    Ok(())
}

fn report(step: &str, outcome: &PostOutcome) {
    println!(
        "{step}: outcome={} applied={} destination={:?}",
        outcome.label(),
        outcome.is_applied(),
        outcome.destination()
    );
}

fn uuid_suffix() -> String {
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(8);
    suffix
}
