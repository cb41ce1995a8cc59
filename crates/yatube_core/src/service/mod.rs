//! Post mutation use-cases.
//!
//! # Responsibility
//! - Enforce the create/edit authorization policy over the entity store.
//! - Return typed outcomes that a routing layer maps to navigation targets.

pub mod outcome;
pub mod post_service;
