//! ClientBook Platform
//!
//! Client records (customer/contacts) over MongoDB:
//! - Request validation for every client operation
//! - Client service with owner bookkeeping on create/delete
//! - MongoDB and in-memory repositories behind async traits
//! - REST API with OpenAPI documentation
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints (clients only)

pub mod client;
pub mod user;

pub mod memory;
pub mod shared;

pub mod app;

pub use shared::error::{PlatformError, Result};

pub use client::entity::{Client, ClientFilter, ClientPatch, NewClient};
pub use client::repository::{ClientRepository, MongoClientRepository};
pub use client::service::{ClientService, CreateOutcome};
pub use user::{MongoUserRepository, User, UserRepository};
pub use memory::{InMemoryClientRepository, InMemoryUserRepository};
pub use app::{build_router, router_with_repositories};
