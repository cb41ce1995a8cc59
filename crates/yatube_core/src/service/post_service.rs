//! Post mutation service.
//!
//! # Responsibility
//! - Create posts on behalf of an authenticated actor.
//! - Apply edits by the post's author; turn edits by anyone else into a
//!   no-op `Unauthorized` outcome.
//!
//! # Invariants
//! - Every mutation runs in one repository transaction.
//! - Authorization is decided before input validation, from
//!   `(actor, post.author)` only.
//! - A non-author edit performs no write at all.
//! - Post text never appears in log events.

use crate::model::group::GroupId;
use crate::model::post::{Post, PostDraft, PostId};
use crate::model::user::Actor;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::post_repo::{PostFilter, PostRepository};
use crate::service::outcome::PostOutcome;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Rejected caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostInputError {
    /// Text is empty or whitespace only.
    EmptyText,
    /// Draft names a group that does not exist.
    GroupNotFound(GroupId),
}

impl Display for PostInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "post text must not be blank"),
            Self::GroupNotFound(id) => write!(f, "group not found: {id}"),
        }
    }
}

impl Error for PostInputError {}

/// Failure of a create/edit call. No mutation was applied.
#[derive(Debug)]
pub enum PostServiceError {
    InvalidInput(PostInputError),
    /// Edit targeted a post id that does not exist.
    NotFound(PostId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl PostServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(PostInputError::EmptyText) => "empty_text",
            Self::InvalidInput(PostInputError::GroupNotFound(_)) => "group_not_found",
            Self::NotFound(_) => "post_not_found",
            Self::Repo(_) => "repo_failure",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

impl Display for PostServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::NotFound(id) => write!(f, "post not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent post state: {details}"),
        }
    }
}

impl Error for PostServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<PostInputError> for PostServiceError {
    fn from(value: PostInputError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<RepoError> for PostServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "post",
                id,
            } => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type PostServiceResult<T> = Result<T, PostServiceError>;

/// Authorization-aware create/edit workflow over a post repository.
pub struct PostService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> PostService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a post authored by `actor`.
    ///
    /// # Contract
    /// - Blank text or an unknown group returns `InvalidInput`; nothing is
    ///   stored.
    /// - On success the post count grows by one and the outcome is `Created`,
    ///   routed to the actor's profile.
    pub fn create_post(&self, actor: &Actor, draft: &PostDraft) -> PostServiceResult<PostOutcome> {
        let started_at = Instant::now();
        let result = self
            .repo
            .in_transaction(|repo| -> PostServiceResult<PostOutcome> {
                let (text, group) = checked_draft(repo, draft)?;
                let post = Post::new(actor, text, group);
                let post_id = repo.create_post(&post)?;
                let stored = repo
                    .get_post(post_id)?
                    .ok_or(PostServiceError::InconsistentState(
                        "created post not found in read-back",
                    ))?;
                Ok(PostOutcome::Created(stored))
            });

        log_mutation("post_create", actor, &result, started_at);
        result
    }

    /// Edits post `post_id` on behalf of `actor`.
    ///
    /// # Contract
    /// - Unknown `post_id` returns `NotFound`.
    /// - `actor` is not the author: `Ok(Unauthorized)` with the post exactly
    ///   as stored; the draft is neither validated nor written.
    /// - `actor` is the author: draft validated like `create_post`, then
    ///   `text`/`group` overwritten in place; `Updated`.
    pub fn edit_post(
        &self,
        actor: &Actor,
        post_id: PostId,
        draft: &PostDraft,
    ) -> PostServiceResult<PostOutcome> {
        let started_at = Instant::now();
        let result = self
            .repo
            .in_transaction(|repo| -> PostServiceResult<PostOutcome> {
                let mut post = repo
                    .get_post(post_id)?
                    .ok_or(PostServiceError::NotFound(post_id))?;
                if !post.is_authored_by(actor) {
                    return Ok(PostOutcome::Unauthorized(post));
                }

                let (text, group) = checked_draft(repo, draft)?;
                post.rewrite(text, group);
                repo.update_post(&post)?;
                let stored = repo
                    .get_post(post_id)?
                    .ok_or(PostServiceError::InconsistentState(
                        "edited post not found in read-back",
                    ))?;
                Ok(PostOutcome::Updated(stored))
            });

        log_mutation("post_edit", actor, &result, started_at);
        result
    }

    /// Gets one post by stable ID.
    pub fn get_post(&self, post_id: PostId) -> RepoResult<Option<Post>> {
        self.repo.get_post(post_id)
    }

    /// Returns the total number of stored posts.
    pub fn count_posts(&self) -> RepoResult<u64> {
        self.repo.count_posts()
    }

    /// Returns whether any stored post matches `filter`.
    pub fn post_exists(&self, filter: &PostFilter) -> RepoResult<bool> {
        self.repo.post_exists(filter)
    }
}

fn checked_draft<R: PostRepository>(
    repo: &R,
    draft: &PostDraft,
) -> PostServiceResult<(String, Option<GroupId>)> {
    let text = draft
        .normalized_text()
        .ok_or(PostInputError::EmptyText)?
        .to_string();

    if let Some(group_id) = draft.group_id {
        if !repo.group_exists(group_id)? {
            return Err(PostInputError::GroupNotFound(group_id).into());
        }
    }

    Ok((text, draft.group_id))
}

fn log_mutation(
    event: &str,
    actor: &Actor,
    result: &PostServiceResult<PostOutcome>,
    started_at: Instant,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(PostOutcome::Unauthorized(post)) => warn!(
            "event={event} module=service status=denied outcome=unauthorized post_id={} actor_id={} duration_ms={duration_ms}",
            post.id(),
            actor.id()
        ),
        Ok(outcome) => info!(
            "event={event} module=service status=ok outcome={} post_id={} actor_id={} has_group={} duration_ms={duration_ms}",
            outcome.label(),
            outcome.post().id(),
            actor.id(),
            outcome.post().group().is_some()
        ),
        Err(err) => warn!(
            "event={event} module=service status=error error_code={} actor_id={} duration_ms={duration_ms} error={err}",
            err.code(),
            actor.id()
        ),
    }
}
