//! Group repository contract and SQLite implementation.
//!
//! # Invariants
//! - Slugs are unique; a duplicate slug is reported as `Conflict`.
//! - There is no update path: groups are read-only once created.

use crate::model::group::{Group, GroupId};
use crate::repo::error::{conflict_or_db, count_from_db, parse_uuid, RepoResult};
use crate::repo::schema::ensure_tables;
use rusqlite::{params, Connection, OptionalExtension, Row};

const GROUP_SELECT_SQL: &str = "SELECT uuid, slug, title, description FROM post_groups";

/// Repository interface for administrative group records.
pub trait GroupRepository {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    fn get_group_by_slug(&self, slug: &str) -> RepoResult<Option<Group>>;
    fn count_groups(&self) -> RepoResult<u64>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["post_groups"])?;
        Ok(Self { conn })
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn create_group(&self, group: &Group) -> RepoResult<GroupId> {
        group.validate()?;

        self.conn
            .execute(
                "INSERT INTO post_groups (uuid, slug, title, description)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    group.id.to_string(),
                    group.slug.as_str(),
                    group.title.as_str(),
                    group.description.as_str(),
                ],
            )
            .map_err(|err| conflict_or_db(err, || format!("group slug `{}` is taken", group.slug)))?;

        Ok(group.id)
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let row = self
            .conn
            .query_row(
                &format!("{GROUP_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                read_group_columns,
            )
            .optional()?;
        row.map(parse_group).transpose()
    }

    fn get_group_by_slug(&self, slug: &str) -> RepoResult<Option<Group>> {
        let row = self
            .conn
            .query_row(
                &format!("{GROUP_SELECT_SQL} WHERE slug = ?1;"),
                [slug],
                read_group_columns,
            )
            .optional()?;
        row.map(parse_group).transpose()
    }

    fn count_groups(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM post_groups;", [], |row| row.get(0))?;
        count_from_db(count, "post_groups")
    }
}

struct GroupColumns {
    uuid: String,
    slug: String,
    title: String,
    description: String,
}

fn read_group_columns(row: &Row<'_>) -> rusqlite::Result<GroupColumns> {
    Ok(GroupColumns {
        uuid: row.get("uuid")?,
        slug: row.get("slug")?,
        title: row.get("title")?,
        description: row.get("description")?,
    })
}

fn parse_group(columns: GroupColumns) -> RepoResult<Group> {
    let group = Group {
        id: parse_uuid(&columns.uuid, "post_groups.uuid")?,
        slug: columns.slug,
        title: columns.title,
        description: columns.description,
    };
    group.validate()?;
    Ok(group)
}
