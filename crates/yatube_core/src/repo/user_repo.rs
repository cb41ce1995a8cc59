//! User repository contract and SQLite implementation.
//!
//! Users are owned by the external authentication subsystem; this repository
//! lets that subsystem (and tests) seed records and lets the core read them.

use crate::model::user::{User, UserId};
use crate::repo::error::{conflict_or_db, count_from_db, parse_uuid, RepoResult};
use crate::repo::schema::ensure_tables;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for user records.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (uuid, username) VALUES (?1, ?2);",
                params![user.id.to_string(), user.username.as_str()],
            )
            .map_err(|err| {
                conflict_or_db(err, || format!("username `{}` is taken", user.username))
            })?;

        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, username FROM users WHERE uuid = ?1;",
                [id.to_string()],
                read_user_columns,
            )
            .optional()?;
        row.map(parse_user).transpose()
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, username FROM users WHERE username = ?1;",
                [username],
                read_user_columns,
            )
            .optional()?;
        row.map(parse_user).transpose()
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        count_from_db(count, "users")
    }
}

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get("uuid")?, row.get("username")?))
}

fn parse_user((uuid_text, username): (String, String)) -> RepoResult<User> {
    let user = User {
        id: parse_uuid(&uuid_text, "users.uuid")?,
        username,
    };
    user.validate()?;
    Ok(user)
}
