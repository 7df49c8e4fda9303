//! User Aggregate
//!
//! Users own clients; this crate only maintains their client back-references.

pub mod entity;
pub mod repository;

pub use entity::User;
pub use repository::{MongoUserRepository, UserRepository};
