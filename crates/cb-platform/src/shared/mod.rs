//! Shared infrastructure: errors, identifiers, list-query types, indexes and health.

pub mod api_common;
pub mod error;
pub mod health_api;
pub mod ids;
pub mod indexes;

pub use api_common::{PageLimits, QueryOptions, QueryResult, SortDirection, SortSpec};
pub use error::{ErrorResponse, PlatformError, Result};
pub use health_api::{health_router, HealthState};
pub use indexes::initialize_indexes;
