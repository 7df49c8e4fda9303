//! In-memory repositories
//!
//! Process-local implementations of the repository ports, used by the
//! `memory` storage backend and by tests. Email uniqueness is checked under
//! the same write lock as the insert, so it holds like the MongoDB unique index.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::client::entity::{Client, ClientFilter, ClientPatch};
use crate::client::repository::ClientRepository;
use crate::shared::api_common::{QueryOptions, QueryResult, SortDirection, SortSpec};
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

#[derive(Default)]
pub struct InMemoryClientRepository {
    clients: RwLock<HashMap<String, Client>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    fn update_where(&self, patch: &ClientPatch, pred: impl Fn(&Client) -> bool) -> Result<Option<Client>> {
        let mut clients = self.clients.write();
        let Some(id) = clients.values().find(|c| pred(*c)).map(|c| c.id.clone()) else {
            return Ok(None);
        };

        if let Some(email) = &patch.email {
            if clients.values().any(|c| c.id != id && &c.email == email) {
                return Err(PlatformError::duplicate("Client", "email", email.as_str()));
            }
        }

        let Some(client) = clients.get_mut(&id) else {
            return Ok(None);
        };
        client.apply(patch);
        Ok(Some(client.clone()))
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn insert(&self, client: &Client) -> Result<()> {
        let mut clients = self.clients.write();
        if clients.values().any(|c| c.email == client.email) {
            return Err(PlatformError::duplicate("Client", "email", client.email.as_str()));
        }
        if clients.contains_key(&client.id) {
            return Err(PlatformError::duplicate("Client", "id", client.id.as_str()));
        }
        clients.insert(client.id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Client>> {
        Ok(self.clients.read().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>> {
        Ok(self.clients.read().values().find(|c| c.email == email).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Client>> {
        let mut found: Vec<Client> = self.clients.read()
            .values()
            .filter(|c| c.name == name)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn paginate(&self, filter: &ClientFilter, options: &QueryOptions) -> Result<QueryResult<Client>> {
        let mut matching: Vec<Client> = self.clients.read()
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare_clients(a, b, &options.sort));

        let total = matching.len() as u64;
        let page: Vec<Client> = matching
            .into_iter()
            .skip(options.skip() as usize)
            .take(options.limit as usize)
            .collect();

        Ok(QueryResult::new(page, options, total))
    }

    async fn update_by_id(&self, id: &str, patch: &ClientPatch) -> Result<Option<Client>> {
        self.update_where(patch, |c| c.id == id)
    }

    async fn update_by_email(&self, email: &str, patch: &ClientPatch) -> Result<Option<Client>> {
        self.update_where(patch, |c| c.email == email)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.clients.write().remove(id).is_some())
    }
}

/// Order two clients by the sort specs, then by id.
///
/// Unknown sort fields compare equal, as a field missing from every document
/// does in MongoDB.
fn compare_clients(a: &Client, b: &Client, sort: &[SortSpec]) -> Ordering {
    for spec in sort {
        let ordering = match spec.field.as_str() {
            "id" | "_id" => a.id.cmp(&b.id),
            "email" => a.email.cmp(&b.email),
            "name" => a.name.cmp(&b.name),
            "description" => a.description.cmp(&b.description),
            "user" => a.user.cmp(&b.user),
            "createdAt" => a.created_at.cmp(&b.created_at),
            "updatedAt" => a.updated_at.cmp(&b.updated_at),
            _ => Ordering::Equal,
        };
        let ordering = match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.id.cmp(&b.id)
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored user, for assertions
    pub fn get(&self, id: &str) -> Option<User> {
        self.users.read().get(id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write();
        if users.contains_key(&user.id) {
            return Err(PlatformError::duplicate("User", "id", user.id.as_str()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn push_client(&self, user_id: &str, client_id: &str) -> Result<bool> {
        match self.users.write().get_mut(user_id) {
            Some(user) => {
                user.customers.push(client_id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_client(&self, user_id: &str, client_id: &str) -> Result<bool> {
        match self.users.write().get_mut(user_id) {
            Some(user) => {
                user.customers.retain(|c| c != client_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
