//! Entity store: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Provide count/get/create/update/exists access per entity kind.
//! - Keep SQL details out of the mutation service.
//!
//! # Invariants
//! - Write paths validate the model before any SQL mutation.
//! - Read paths reject rows that do not parse back into valid models.
//! - Uniqueness violations surface as `RepoError::Conflict`, not raw SQLite
//!   errors.

pub mod error;
pub mod group_repo;
pub mod post_repo;
mod schema;
pub mod user_repo;
