//! Users, the authenticated actor and the caller session.
//!
//! # Responsibility
//! - Describe user records created by the external authentication subsystem.
//! - Model "already authenticated" as a type: mutation entry points take an
//!   `Actor`, and only an authenticated `Session` can hand one out.
//!
//! # Invariants
//! - `username` is unique across the store.
//! - Two actors are the same identity iff their user ids are equal.

use crate::model::validation::{validate_username, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier.
pub type UserId = Uuid;

/// User record as stored by the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique login name; also the key of the profile destination.
    pub username: String,
}

impl User {
    /// Creates a user with a generated stable ID.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
        }
    }

    /// Checks username rules before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)
    }
}

/// Identity of an authenticated caller attempting a mutation.
///
/// Not deserializable: an actor only comes from the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    user: User,
}

impl Actor {
    /// Wraps a user the authentication layer has already verified.
    pub fn authenticated(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}

/// Caller state handed over by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    /// No login; no mutation entry point is reachable.
    #[default]
    Anonymous,
    Authenticated(Actor),
}

impl Session {
    /// Session for a logged-in user.
    pub fn login(user: User) -> Self {
        Self::Authenticated(Actor::authenticated(user))
    }

    /// Returns the actor for authenticated sessions only.
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(actor) => Some(actor),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.actor().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{Actor, Session, User};

    #[test]
    fn anonymous_session_has_no_actor() {
        let session = Session::default();
        assert!(session.actor().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn login_exposes_actor_with_same_identity() {
        let user = User::new("author");
        let session = Session::login(user.clone());
        let actor = session.actor().expect("logged-in session has an actor");
        assert_eq!(actor.id(), user.id);
        assert_eq!(actor.username(), "author");
    }

    #[test]
    fn actors_with_same_username_but_different_ids_differ() {
        let first = Actor::authenticated(User::new("author"));
        let second = Actor::authenticated(User::new("author"));
        assert_ne!(first.id(), second.id());
    }
}
