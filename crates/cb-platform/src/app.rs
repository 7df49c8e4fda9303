//! HTTP application assembly
//!
//! Collects the API routers, their OpenAPI paths, and the Swagger UI into one
//! axum `Router`. Transport layers (tracing, CORS) are added by the server.

use std::sync::Arc;

use axum::Router;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::client::{clients_router, ClientRepository, ClientService, ClientsState};
use crate::shared::api_common::PageLimits;
use crate::shared::health_api::{health_router, HealthState};
use crate::user::UserRepository;

/// Build the application router
pub fn build_router(clients_state: ClientsState, health_state: HealthState) -> Router {
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/v1/clients", clients_router(clients_state))
        .merge(health_router(health_state))
        .split_for_parts();

    openapi.info.title = "ClientBook API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Client records with owner bookkeeping".to_string());

    Router::new()
        .merge(router)
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
}

/// Router over the given repositories, without a database health check
pub fn router_with_repositories(
    clients: Arc<dyn ClientRepository>,
    users: Arc<dyn UserRepository>,
    limits: PageLimits,
) -> Router {
    let service = ClientService::new(clients, users);
    build_router(
        ClientsState::new(service, limits),
        HealthState::new(None, Some(env!("CARGO_PKG_VERSION").to_string())),
    )
}
