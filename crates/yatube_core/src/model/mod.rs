//! Domain model for the blog core.
//!
//! # Responsibility
//! - Define users, the authenticated actor, groups and posts.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - Every record is identified by a stable uuid that is never reused.
//! - A post's author is fixed at construction and has no mutator.

pub mod group;
pub mod post;
pub mod user;
pub mod validation;
