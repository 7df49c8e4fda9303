//! Clients API
//!
//! REST endpoints for client management.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{Client, SocialLink};
use super::service::{ClientService, CreateOutcome};
use super::validation::{
    validate_client_id, validate_email_param, validate_name_param, CreateClientRequest, ListClientsQuery,
    UpdateClientRequest,
};
use crate::shared::api_common::{PageLimits, QueryResult};
use crate::shared::error::{ErrorResponse, PlatformError};

/// Client response DTO
#[derive(Debug, Clone, Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub linkedin: Option<SocialLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub instagram: Option<SocialLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub facebook: Option<SocialLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            email: c.email,
            name: c.name,
            description: c.description,
            linkedin: c.linkedin,
            instagram: c.instagram,
            facebook: c.facebook,
            user: c.user,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Create response. `created` is false when a client with the email already existed.
#[derive(Debug, Clone, Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientResponse {
    pub created: bool,
    pub client: ClientResponse,
}

impl From<CreateOutcome> for CreateClientResponse {
    fn from(outcome: CreateOutcome) -> Self {
        Self {
            created: outcome.created,
            client: outcome.client.into(),
        }
    }
}

/// One page of clients
#[derive(Debug, Clone, Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPageResponse {
    pub results: Vec<ClientResponse>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl From<QueryResult<Client>> for ClientPageResponse {
    fn from(page: QueryResult<Client>) -> Self {
        let page = page.map(ClientResponse::from);
        Self {
            results: page.results,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
            total_results: page.total_results,
        }
    }
}

/// Clients API state
#[derive(Clone)]
pub struct ClientsState {
    pub service: ClientService,
    pub limits: PageLimits,
}

impl ClientsState {
    pub fn new(service: ClientService, limits: PageLimits) -> Self {
        Self { service, limits }
    }
}

/// Create a client
#[utoipa::path(
    post,
    path = "",
    tag = "clients",
    operation_id = "createClient",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = CreateClientResponse),
        (status = 200, description = "A client with this email already exists", body = CreateClientResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn create_client(
    State(state): State<ClientsState>,
    body: Result<Json<CreateClientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateClientResponse>), PlatformError> {
    let Json(req) = body?;
    let outcome = state.service.create(req.validate()?).await?;

    let status = if outcome.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(outcome.into())))
}

/// List clients
#[utoipa::path(
    get,
    path = "",
    tag = "clients",
    operation_id = "listClients",
    params(ListClientsQuery),
    responses(
        (status = 200, description = "One page of clients", body = ClientPageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    )
)]
pub async fn list_clients(
    State(state): State<ClientsState>,
    query: Result<Query<ListClientsQuery>, QueryRejection>,
) -> Result<Json<ClientPageResponse>, PlatformError> {
    let Query(query) = query?;
    let (filter, options) = query.validate(state.limits)?;

    let page = state.service.list(&filter, &options).await?;
    Ok(Json(page.into()))
}

/// Get client by ID
#[utoipa::path(
    get,
    path = "/{clientId}",
    tag = "clients",
    operation_id = "getClient",
    params(
        ("clientId" = String, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client found", body = ClientResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse)
    )
)]
pub async fn get_client(
    State(state): State<ClientsState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ClientResponse>, PlatformError> {
    let Path(raw) = path?;
    let id = validate_client_id(&raw)?;

    let client = state.service.get_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("Client", &id))?;

    Ok(Json(client.into()))
}

/// Update client by ID
#[utoipa::path(
    patch,
    path = "/{clientId}",
    tag = "clients",
    operation_id = "updateClient",
    params(
        ("clientId" = String, Path, description = "Client ID")
    ),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse),
        (status = 409, description = "Email used by another client", body = ErrorResponse)
    )
)]
pub async fn update_client(
    State(state): State<ClientsState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateClientRequest>, JsonRejection>,
) -> Result<Json<ClientResponse>, PlatformError> {
    let Path(raw) = path?;
    let id = validate_client_id(&raw)?;
    let Json(req) = body?;
    let patch = req.validate()?;

    let client = state.service.update_by_id(&id, &patch).await?
        .ok_or_else(|| PlatformError::not_found("Client", &id))?;

    Ok(Json(client.into()))
}

/// Delete client by ID
#[utoipa::path(
    delete,
    path = "/{clientId}",
    tag = "clients",
    operation_id = "deleteClient",
    params(
        ("clientId" = String, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client deleted; the removed record", body = ClientResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse)
    )
)]
pub async fn delete_client(
    State(state): State<ClientsState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ClientResponse>, PlatformError> {
    let Path(raw) = path?;
    let id = validate_client_id(&raw)?;

    let removed = state.service.delete_by_id(&id).await?;
    Ok(Json(removed.into()))
}

/// Get client by email
#[utoipa::path(
    get,
    path = "/by-email/{email}",
    tag = "clients",
    operation_id = "getClientByEmail",
    params(
        ("email" = String, Path, description = "Client email")
    ),
    responses(
        (status = 200, description = "Client found", body = ClientResponse),
        (status = 400, description = "Malformed email", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse)
    )
)]
pub async fn get_client_by_email(
    State(state): State<ClientsState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ClientResponse>, PlatformError> {
    let Path(raw) = path?;
    let email = validate_email_param(&raw)?;

    let client = state.service.get_by_email(&email).await?
        .ok_or_else(|| PlatformError::not_found_by("Client", "email", &email))?;

    Ok(Json(client.into()))
}

/// Update client by email
#[utoipa::path(
    patch,
    path = "/by-email/{email}",
    tag = "clients",
    operation_id = "updateClientByEmail",
    params(
        ("email" = String, Path, description = "Client email")
    ),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse),
        (status = 409, description = "Email used by another client", body = ErrorResponse)
    )
)]
pub async fn update_client_by_email(
    State(state): State<ClientsState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateClientRequest>, JsonRejection>,
) -> Result<Json<ClientResponse>, PlatformError> {
    let Path(raw) = path?;
    let email = validate_email_param(&raw)?;
    let Json(req) = body?;
    let patch = req.validate()?;

    let client = state.service.update_by_email(&email, &patch).await?
        .ok_or_else(|| PlatformError::not_found_by("Client", "email", &email))?;

    Ok(Json(client.into()))
}

/// Get clients by name
#[utoipa::path(
    get,
    path = "/by-name/{name}",
    tag = "clients",
    operation_id = "getClientsByName",
    params(
        ("name" = String, Path, description = "Client name")
    ),
    responses(
        (status = 200, description = "Clients with this name (possibly none)", body = [ClientResponse]),
        (status = 400, description = "Empty name", body = ErrorResponse)
    )
)]
pub async fn get_clients_by_name(
    State(state): State<ClientsState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<ClientResponse>>, PlatformError> {
    let Path(raw) = path?;
    let name = validate_name_param(&raw)?;

    let clients = state.service.get_by_name(&name).await?;
    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

/// Create clients router
pub fn clients_router(state: ClientsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_client, list_clients))
        .routes(routes!(get_client, update_client, delete_client))
        .routes(routes!(get_client_by_email, update_client_by_email))
        .routes(routes!(get_clients_by_name))
        .with_state(state)
}
