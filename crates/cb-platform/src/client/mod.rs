//! Client Aggregate
//!
//! Customer/contact records: entity, validation, persistence, service and API.

pub mod api;
pub mod entity;
pub mod repository;
pub mod service;
pub mod validation;

pub use api::{clients_router, ClientsState};
pub use entity::{Client, ClientFilter, ClientPatch, NewClient};
pub use repository::{ClientRepository, MongoClientRepository};
pub use service::{ClientService, CreateOutcome};
