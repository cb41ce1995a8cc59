//! Core domain logic for the Yatube blog.
//! This crate owns the post mutation workflow and every invariant behind it.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::group::{Group, GroupId};
pub use model::post::{Post, PostDraft, PostId};
pub use model::user::{Actor, Session, User, UserId};
pub use model::validation::ValidationError;
pub use repo::error::{RepoError, RepoResult};
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::post_repo::{GroupFilter, PostFilter, PostRepository, SqlitePostRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::outcome::{Destination, PostOutcome};
pub use service::post_service::{
    PostInputError, PostService, PostServiceError, PostServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
