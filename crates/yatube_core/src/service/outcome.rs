//! Mutation outcomes and their navigation destinations.
//!
//! # Invariants
//! - `Created` always routes to the author's profile.
//! - `Updated` and `Unauthorized` both route to the post detail view; only
//!   the persisted data differs between them.

use crate::model::post::{Post, PostId};
use serde::Serialize;

/// Navigation target chosen for a mutation outcome.
///
/// The core never builds URLs; the routing layer maps these to routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// Profile page of the given user.
    Profile { username: String },
    /// Detail view of one post.
    PostDetail { post_id: PostId },
}

/// Tagged result of `create_post` / `edit_post`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "post", rename_all = "snake_case")]
pub enum PostOutcome {
    /// New post stored.
    Created(Post),
    /// Author edit applied; holds the post as now stored.
    Updated(Post),
    /// Edit by a non-author: nothing was written; holds the post unchanged.
    Unauthorized(Post),
}

impl PostOutcome {
    pub fn post(&self) -> &Post {
        match self {
            Self::Created(post) | Self::Updated(post) | Self::Unauthorized(post) => post,
        }
    }

    pub fn into_post(self) -> Post {
        match self {
            Self::Created(post) | Self::Updated(post) | Self::Unauthorized(post) => post,
        }
    }

    /// Whether the store was changed by the call.
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Unauthorized(_))
    }

    pub fn destination(&self) -> Destination {
        match self {
            Self::Created(post) => Destination::Profile {
                username: post.author().username.clone(),
            },
            Self::Updated(post) | Self::Unauthorized(post) => Destination::PostDetail {
                post_id: post.id(),
            },
        }
    }

    /// Stable label used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Unauthorized(_) => "unauthorized",
        }
    }
}
