//! Topical group that posts may be filed under.
//!
//! # Invariants
//! - `slug` is globally unique and never reassigned after creation.
//! - Groups are created by administrative action; the post workflow only
//!   reads them.

use crate::model::validation::{validate_slug, validate_title, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable group identifier.
pub type GroupId = Uuid;

/// Group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub slug: String,
    pub title: String,
    pub description: String,
}

impl Group {
    /// Creates a group with a generated ID and an empty description.
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug: slug.into(),
            title: title.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks slug and title rules before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_slug(&self.slug)?;
        validate_title(&self.title)
    }
}
