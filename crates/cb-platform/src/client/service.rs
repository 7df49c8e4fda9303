//! Client Service
//!
//! Client CRUD over the repository ports, including the owning user's
//! client list bookkeeping.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::entity::{normalize_email, Client, ClientFilter, ClientPatch, NewClient};
use super::repository::ClientRepository;
use crate::shared::api_common::{QueryOptions, QueryResult};
use crate::shared::error::{PlatformError, Result};
use crate::user::repository::UserRepository;

/// Result of a create call. A client that already exists with the same email
/// is returned with `created == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub created: bool,
    pub client: Client,
}

impl CreateOutcome {
    fn created(client: Client) -> Self {
        Self { created: true, client }
    }

    fn existing(client: Client) -> Self {
        Self { created: false, client }
    }
}

#[derive(Clone)]
pub struct ClientService {
    clients: Arc<dyn ClientRepository>,
    users: Arc<dyn UserRepository>,
}

impl ClientService {
    pub fn new(clients: Arc<dyn ClientRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { clients, users }
    }

    /// Create a client unless one with the same email exists.
    ///
    /// When the client names a user, its id is appended to that user's list.
    /// If that append fails the inserted client is removed again.
    pub async fn create(&self, input: NewClient) -> Result<CreateOutcome> {
        if let Some(existing) = self.clients.find_by_email(&input.email).await? {
            info!(client_id = %existing.id, email = %existing.email, "Client already exists");
            return Ok(CreateOutcome::existing(existing));
        }

        let client = Client::new(input);
        match self.clients.insert(&client).await {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => {
                // Another request inserted the same email after our lookup
                return match self.clients.find_by_email(&client.email).await? {
                    Some(existing) => {
                        info!(client_id = %existing.id, email = %existing.email, "Client created concurrently");
                        Ok(CreateOutcome::existing(existing))
                    }
                    None => Err(e),
                };
            }
            Err(e) => return Err(e),
        }

        if let Some(user_id) = client.user.as_deref() {
            match self.users.push_client(user_id, &client.id).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(client_id = %client.id, user_id = %user_id, "Owning user not found; client kept without back-reference");
                }
                Err(e) => {
                    error!(client_id = %client.id, user_id = %user_id, error = %e, "Failed to link client to user; rolling back");
                    if let Err(cleanup) = self.clients.delete(&client.id).await {
                        error!(client_id = %client.id, error = %cleanup, "Rollback of client insert failed");
                    }
                    return Err(e);
                }
            }
        }

        info!(client_id = %client.id, email = %client.email, "Client created");
        Ok(CreateOutcome::created(client))
    }

    pub async fn list(&self, filter: &ClientFilter, options: &QueryOptions) -> Result<QueryResult<Client>> {
        self.clients.paginate(filter, options).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Client>> {
        self.clients.find_by_id(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Client>> {
        self.clients.find_by_email(&normalize_email(email)).await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Vec<Client>> {
        self.clients.find_by_name(name).await
    }

    pub async fn update_by_id(&self, id: &str, patch: &ClientPatch) -> Result<Option<Client>> {
        ensure_patch(patch)?;
        let updated = self.clients.update_by_id(id, patch).await?;
        if let Some(client) = &updated {
            info!(client_id = %client.id, "Client updated");
        }
        Ok(updated)
    }

    pub async fn update_by_email(&self, email: &str, patch: &ClientPatch) -> Result<Option<Client>> {
        ensure_patch(patch)?;
        let updated = self.clients.update_by_email(&normalize_email(email), patch).await?;
        if let Some(client) = &updated {
            info!(client_id = %client.id, "Client updated");
        }
        Ok(updated)
    }

    /// Delete a client and return the removed record.
    ///
    /// Fails with `NotFound` when no client has `id`. The id is also removed
    /// from the owning user's list.
    pub async fn delete_by_id(&self, id: &str) -> Result<Client> {
        let client = self.clients.find_by_id(id).await?
            .ok_or_else(|| PlatformError::not_found("Client", id))?;

        if !self.clients.delete(id).await? {
            return Err(PlatformError::not_found("Client", id));
        }

        if let Some(user_id) = client.user.as_deref() {
            if let Err(e) = self.users.pull_client(user_id, id).await {
                warn!(client_id = %id, user_id = %user_id, error = %e, "Failed to unlink deleted client from user");
            }
        }

        info!(client_id = %id, "Client deleted");
        Ok(client)
    }
}

fn ensure_patch(patch: &ClientPatch) -> Result<()> {
    if patch.is_empty() {
        return Err(PlatformError::validation("update must change at least one field"));
    }
    Ok(())
}
