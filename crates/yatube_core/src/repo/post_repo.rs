//! Post repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide count/get/create/update/exists APIs over `posts`.
//! - Offer a transaction boundary so one mutation reads and writes atomically.
//!
//! # Invariants
//! - `update_post` never writes `author_uuid` or `pub_date`.
//! - Posts are always returned with their author resolved from `users`.

use crate::model::group::GroupId;
use crate::model::post::{Post, PostId};
use crate::model::user::{User, UserId};
use crate::repo::error::{conflict_or_db, count_from_db, parse_uuid, RepoError, RepoResult};
use crate::repo::schema::ensure_tables;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const POST_SELECT_SQL: &str = "SELECT
    p.uuid AS uuid,
    p.text AS text,
    p.group_uuid AS group_uuid,
    p.pub_date AS pub_date,
    u.uuid AS author_uuid,
    u.username AS author_username
FROM posts p
INNER JOIN users u ON u.uuid = p.author_uuid";

/// Group constraint used by `PostFilter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupFilter {
    /// Group is not part of the match.
    #[default]
    Any,
    /// Post has no group.
    Ungrouped,
    Exactly(GroupId),
}

/// Field predicate for `PostRepository::post_exists`.
///
/// Unset fields match every post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Exact text match.
    pub text: Option<String>,
    pub author: Option<UserId>,
    pub group: GroupFilter,
}

/// Repository interface for the post entity store.
pub trait PostRepository {
    fn count_posts(&self) -> RepoResult<u64>;
    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>>;
    fn create_post(&self, post: &Post) -> RepoResult<PostId>;
    /// Overwrites `text` and `group` of an existing post.
    fn update_post(&self, post: &Post) -> RepoResult<()>;
    fn post_exists(&self, filter: &PostFilter) -> RepoResult<bool>;
    /// Group lookup needed to validate a post's group reference.
    fn group_exists(&self, id: GroupId) -> RepoResult<bool>;
    /// Runs `work` as one atomic unit; an `Err` rolls back every write.
    fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "post_groups", "posts"])?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn count_posts(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts;", [], |row| row.get(0))?;
        count_from_db(count, "posts")
    }

    fn get_post(&self, id: PostId) -> RepoResult<Option<Post>> {
        let row = self
            .conn
            .query_row(
                &format!("{POST_SELECT_SQL} WHERE p.uuid = ?1;"),
                [id.to_string()],
                read_post_columns,
            )
            .optional()?;
        row.map(parse_post).transpose()
    }

    fn create_post(&self, post: &Post) -> RepoResult<PostId> {
        post.validate()?;

        self.conn
            .execute(
                "INSERT INTO posts (uuid, text, author_uuid, group_uuid, pub_date)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    post.id().to_string(),
                    post.text(),
                    post.author().id.to_string(),
                    post.group().map(|id| id.to_string()),
                    post.pub_date(),
                ],
            )
            .map_err(|err| conflict_or_db(err, || format!("post id {} is taken", post.id())))?;

        Ok(post.id())
    }

    fn update_post(&self, post: &Post) -> RepoResult<()> {
        post.validate()?;

        let changed = self.conn.execute(
            "UPDATE posts
             SET text = ?2,
                 group_uuid = ?3
             WHERE uuid = ?1;",
            params![
                post.id().to_string(),
                post.text(),
                post.group().map(|id| id.to_string()),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "post",
                id: post.id(),
            });
        }
        Ok(())
    }

    fn post_exists(&self, filter: &PostFilter) -> RepoResult<bool> {
        let mut sql = String::from("SELECT EXISTS(SELECT 1 FROM posts WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(text) = filter.text.as_ref() {
            sql.push_str(" AND text = ?");
            bind_values.push(Value::Text(text.clone()));
        }
        if let Some(author) = filter.author {
            sql.push_str(" AND author_uuid = ?");
            bind_values.push(Value::Text(author.to_string()));
        }
        match filter.group {
            GroupFilter::Any => {}
            GroupFilter::Ungrouped => sql.push_str(" AND group_uuid IS NULL"),
            GroupFilter::Exactly(group) => {
                sql.push_str(" AND group_uuid = ?");
                bind_values.push(Value::Text(group.to_string()));
            }
        }
        sql.push_str(");");

        let exists: i64 = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get(0))?;
        Ok(exists == 1)
    }

    fn group_exists(&self, id: GroupId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM post_groups WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        // Repository calls inside `work` share `self.conn`, so they run in `tx`.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = work(self)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

struct PostColumns {
    uuid: String,
    text: String,
    group_uuid: Option<String>,
    pub_date: i64,
    author_uuid: String,
    author_username: String,
}

fn read_post_columns(row: &Row<'_>) -> rusqlite::Result<PostColumns> {
    Ok(PostColumns {
        uuid: row.get("uuid")?,
        text: row.get("text")?,
        group_uuid: row.get("group_uuid")?,
        pub_date: row.get("pub_date")?,
        author_uuid: row.get("author_uuid")?,
        author_username: row.get("author_username")?,
    })
}

fn parse_post(columns: PostColumns) -> RepoResult<Post> {
    let id = parse_uuid(&columns.uuid, "posts.uuid")?;
    let group = columns
        .group_uuid
        .as_deref()
        .map(|value| parse_uuid(value, "posts.group_uuid"))
        .transpose()?;
    let author = User {
        id: parse_uuid(&columns.author_uuid, "users.uuid")?,
        username: columns.author_username,
    };

    let post = Post::from_stored(id, columns.text, author, group, columns.pub_date);
    post.validate()?;
    Ok(post)
}
