//! Post domain model.
//!
//! # Responsibility
//! - Define the post record and the caller-supplied draft used by create/edit.
//!
//! # Invariants
//! - `author` is assigned once in `Post::new` and has no public mutator.
//! - `id` and `pub_date` never change after construction.
//! - Only crate code (the mutation service) can rewrite `text` and `group`.

use crate::model::group::GroupId;
use crate::model::user::{Actor, User};
use crate::model::validation::{validate_text, ValidationError};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable post identifier; also the key of the post detail destination.
pub type PostId = Uuid;

/// Persisted post.
///
/// Fields are private so the write-once author relation cannot be broken
/// from outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    id: PostId,
    text: String,
    author: User,
    group: Option<GroupId>,
    /// Unix epoch milliseconds.
    pub_date: i64,
}

impl Post {
    /// Creates a new post owned by `author`, stamped with the current time.
    pub fn new(author: &Actor, text: impl Into<String>, group: Option<GroupId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            author: author.user().clone(),
            group,
            pub_date: now_epoch_ms(),
        }
    }

    /// Rebuilds a post from stored columns.
    pub(crate) fn from_stored(
        id: PostId,
        text: String,
        author: User,
        group: Option<GroupId>,
        pub_date: i64,
    ) -> Self {
        Self {
            id,
            text,
            author,
            group,
            pub_date,
        }
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn author(&self) -> &User {
        &self.author
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn pub_date(&self) -> i64 {
        self.pub_date
    }

    /// Returns whether `actor` is this post's author.
    pub fn is_authored_by(&self, actor: &Actor) -> bool {
        self.author.id == actor.id()
    }

    /// Replaces the editable fields; identity, author and date stay.
    pub(crate) fn rewrite(&mut self, text: String, group: Option<GroupId>) {
        self.text = text;
        self.group = group;
    }

    /// Checks field rules before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_text(&self.text)
    }
}

/// Caller input for create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    /// Raw text as submitted; surrounding whitespace is stripped on apply.
    pub text: String,
    pub group_id: Option<GroupId>,
}

impl PostDraft {
    pub fn new(text: impl Into<String>, group_id: Option<GroupId>) -> Self {
        Self {
            text: text.into(),
            group_id,
        }
    }

    /// Text as it will be stored, or `None` when blank.
    pub fn normalized_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::{Post, PostDraft};
    use crate::model::user::{Actor, User};
    use uuid::Uuid;

    #[test]
    fn new_post_belongs_to_actor() {
        let actor = Actor::authenticated(User::new("author"));
        let post = Post::new(&actor, "Тестовый пост", None);
        assert!(post.is_authored_by(&actor));
        assert_eq!(post.author(), actor.user());
        assert!(post.pub_date() > 0);
    }

    #[test]
    fn rewrite_keeps_identity_author_and_date() {
        let actor = Actor::authenticated(User::new("author"));
        let mut post = Post::new(&actor, "before", None);
        let (id, pub_date) = (post.id(), post.pub_date());
        let group = Uuid::new_v4();

        post.rewrite("after".to_string(), Some(group));

        assert_eq!(post.id(), id);
        assert_eq!(post.pub_date(), pub_date);
        assert_eq!(post.author(), actor.user());
        assert_eq!(post.text(), "after");
        assert_eq!(post.group(), Some(group));
    }

    #[test]
    fn other_actor_is_not_author() {
        let author = Actor::authenticated(User::new("author"));
        let other = Actor::authenticated(User::new("author_3"));
        let post = Post::new(&author, "text", None);
        assert!(!post.is_authored_by(&other));
    }

    #[test]
    fn draft_normalization_strips_and_rejects_blank() {
        assert_eq!(
            PostDraft::new("  Еще один пост \n", None).normalized_text(),
            Some("Еще один пост")
        );
        assert_eq!(PostDraft::new(" \t ", None).normalized_text(), None);
    }
}
