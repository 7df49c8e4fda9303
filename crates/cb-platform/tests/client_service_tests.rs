//! Client Service Integration Tests
//!
//! Service behaviour against the in-memory repositories, plus hand-written
//! repositories for the failure and race paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use cb_platform::shared::api_common::{PageLimits, QueryOptions, QueryResult, SortSpec};
use cb_platform::{
    Client, ClientFilter, ClientPatch, ClientRepository, ClientService, InMemoryClientRepository,
    InMemoryUserRepository, NewClient, PlatformError, Result, User, UserRepository,
};

struct Fixture {
    clients: Arc<InMemoryClientRepository>,
    users: Arc<InMemoryUserRepository>,
    service: ClientService,
}

fn fixture() -> Fixture {
    let clients = Arc::new(InMemoryClientRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let service = ClientService::new(clients.clone(), users.clone());
    Fixture { clients, users, service }
}

async fn owner(users: &InMemoryUserRepository) -> User {
    let user = User::new("owner@example.com", "Owner");
    users.insert(&user).await.unwrap();
    user
}

fn new_client(email: &str, name: &str) -> NewClient {
    NewClient::new(email, name, "Consulting")
}

/// Users repository whose writes always fail
struct FailingUserRepository;

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn insert(&self, _user: &User) -> Result<()> {
        Err(PlatformError::internal("users unavailable"))
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<User>> {
        Ok(None)
    }

    async fn push_client(&self, _user_id: &str, _client_id: &str) -> Result<bool> {
        Err(PlatformError::internal("users unavailable"))
    }

    async fn pull_client(&self, _user_id: &str, _client_id: &str) -> Result<bool> {
        Err(PlatformError::internal("users unavailable"))
    }
}

/// Hides stored clients from the first email lookup, as if a concurrent
/// create committed between the lookup and the insert.
struct RacingClientRepository {
    inner: InMemoryClientRepository,
    lookup_hidden: AtomicBool,
}

#[async_trait]
impl ClientRepository for RacingClientRepository {
    async fn insert(&self, client: &Client) -> Result<()> {
        self.inner.insert(client).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Client>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>> {
        if !self.lookup_hidden.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_by_email(email).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Client>> {
        self.inner.find_by_name(name).await
    }

    async fn paginate(&self, filter: &ClientFilter, options: &QueryOptions) -> Result<QueryResult<Client>> {
        self.inner.paginate(filter, options).await
    }

    async fn update_by_id(&self, id: &str, patch: &ClientPatch) -> Result<Option<Client>> {
        self.inner.update_by_id(id, patch).await
    }

    async fn update_by_email(&self, email: &str, patch: &ClientPatch) -> Result<Option<Client>> {
        self.inner.update_by_email(email, patch).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.inner.delete(id).await
    }
}

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_inserts_and_links_owner() {
        let f = fixture();
        let user = owner(&f.users).await;

        let outcome = f.service
            .create(new_client("ada@example.com", "Ada").with_user(&user.id))
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(f.clients.len(), 1);
        assert_eq!(outcome.client.user.as_deref(), Some(user.id.as_str()));

        let stored = f.users.get(&user.id).unwrap();
        assert_eq!(stored.customers, vec![outcome.client.id.clone()]);
    }

    #[tokio::test]
    async fn test_create_existing_email_returns_existing_record() {
        let f = fixture();
        let user = owner(&f.users).await;

        let first = f.service
            .create(new_client("ada@example.com", "Ada").with_user(&user.id))
            .await
            .unwrap();
        let second = f.service
            .create(new_client("ADA@example.com", "Someone Else").with_user(&user.id))
            .await
            .unwrap();

        assert!(!second.created);
        assert_eq!(second.client, first.client);
        assert_eq!(f.clients.len(), 1);
        assert_eq!(f.users.get(&user.id).unwrap().customers.len(), 1);
    }

    #[tokio::test]
    async fn test_create_without_user_skips_linking() {
        let f = fixture();
        let outcome = f.service.create(new_client("solo@example.com", "Solo")).await.unwrap();
        assert!(outcome.created);
        assert!(outcome.client.user.is_none());
    }

    #[tokio::test]
    async fn test_create_with_unknown_user_keeps_client() {
        let f = fixture();
        let outcome = f.service
            .create(new_client("ada@example.com", "Ada").with_user("507f1f77bcf86cd799439011"))
            .await
            .unwrap();

        assert!(outcome.created);
        assert!(f.clients.find_by_id(&outcome.client.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_rolls_back_when_linking_fails() {
        let clients = Arc::new(InMemoryClientRepository::new());
        let service = ClientService::new(clients.clone(), Arc::new(FailingUserRepository));

        let err = service
            .create(new_client("ada@example.com", "Ada").with_user("507f1f77bcf86cd799439011"))
            .await
            .unwrap_err();

        assert!(matches!(err, PlatformError::Internal { .. }));
        assert!(clients.is_empty());
    }

    #[tokio::test]
    async fn test_create_losing_race_reports_existing() {
        let inner = InMemoryClientRepository::new();
        let winner = Client::new(new_client("ada@example.com", "Ada"));
        inner.insert(&winner).await.unwrap();

        let clients = Arc::new(RacingClientRepository {
            inner,
            lookup_hidden: AtomicBool::new(false),
        });
        let service = ClientService::new(clients.clone(), Arc::new(InMemoryUserRepository::new()));

        let outcome = service.create(new_client("ada@example.com", "Ada Again")).await.unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.client.id, winner.id);
        assert_eq!(clients.inner.len(), 1);
    }
}

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_lookups() {
        let f = fixture();
        let ada = f.service.create(new_client("ada@example.com", "Ada")).await.unwrap().client;
        f.service.create(new_client("ada2@example.com", "Ada")).await.unwrap();
        f.service.create(new_client("grace@example.com", "Grace")).await.unwrap();

        assert_eq!(f.service.get_by_id(&ada.id).await.unwrap(), Some(ada.clone()));
        assert_eq!(f.service.get_by_email(" Ada@Example.com").await.unwrap(), Some(ada));
        assert_eq!(f.service.get_by_name("Ada").await.unwrap().len(), 2);
        assert!(f.service.get_by_name("Nobody").await.unwrap().is_empty());
        assert!(f.service.get_by_id("507f1f77bcf86cd799439011").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_second_page_in_sort_order() {
        let f = fixture();
        for i in (1..=25).rev() {
            f.service
                .create(new_client(&format!("c{:02}@example.com", i), &format!("client-{:02}", i)))
                .await
                .unwrap();
        }

        let options = QueryOptions::resolve(vec![SortSpec::asc("name")], Some(10), Some(2), PageLimits::default());
        let page = f.service.list(&ClientFilter::default(), &options).await.unwrap();

        let names: Vec<String> = page.results.iter().map(|c| c.name.clone()).collect();
        let expected: Vec<String> = (11..=20).map(|i| format!("client-{:02}", i)).collect();
        assert_eq!(names, expected);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_results, 25);
    }

    #[tokio::test]
    async fn test_list_filters_by_owner() {
        let f = fixture();
        let user = owner(&f.users).await;
        f.service.create(new_client("a@example.com", "A").with_user(&user.id)).await.unwrap();
        f.service.create(new_client("b@example.com", "B")).await.unwrap();

        let filter = ClientFilter { email: None, user: Some(user.id.clone()) };
        let page = f.service.list(&filter, &QueryOptions::default()).await.unwrap();

        assert_eq!(page.total_results, 1);
        assert_eq!(page.results[0].email, "a@example.com");
    }
}

mod update_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_by_id_changes_only_supplied_fields() {
        let f = fixture();
        let ada = f.service.create(new_client("ada@example.com", "Ada")).await.unwrap().client;

        let updated = f.service
            .update_by_id(&ada.id, &ClientPatch::default().with_name("Ada Lovelace"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email, ada.email);
        assert_eq!(updated.description, ada.description);
        assert_eq!(updated.created_at, ada.created_at);
        assert!(updated.updated_at >= ada.updated_at);
    }

    #[tokio::test]
    async fn test_update_by_email() {
        let f = fixture();
        f.service.create(new_client("ada@example.com", "Ada")).await.unwrap();

        let updated = f.service
            .update_by_email("ADA@example.com", &ClientPatch::default().with_email("lovelace@example.com"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.email, "lovelace@example.com");
        assert!(f.service.get_by_email("ada@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let f = fixture();
        let patch = ClientPatch::default().with_name("x");
        assert!(f.service.update_by_id("507f1f77bcf86cd799439011", &patch).await.unwrap().is_none());
        assert!(f.service.update_by_email("nobody@example.com", &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_email_collision_is_duplicate() {
        let f = fixture();
        let ada = f.service.create(new_client("ada@example.com", "Ada")).await.unwrap().client;
        f.service.create(new_client("grace@example.com", "Grace")).await.unwrap();

        let err = f.service
            .update_by_id(&ada.id, &ClientPatch::default().with_email("grace@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn test_empty_patch_rejected() {
        let f = fixture();
        let ada = f.service.create(new_client("ada@example.com", "Ada")).await.unwrap().client;
        let err = f.service.update_by_id(&ada.id, &ClientPatch::default()).await.unwrap_err();
        assert!(matches!(err, PlatformError::Validation { .. }));
    }
}

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let f = fixture();
        let err = f.service.delete_by_id("507f1f77bcf86cd799439011").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_returns_removed_and_unlinks_owner() {
        let f = fixture();
        let user = owner(&f.users).await;
        let ada = f.service
            .create(new_client("ada@example.com", "Ada").with_user(&user.id))
            .await
            .unwrap()
            .client;

        let removed = f.service.delete_by_id(&ada.id).await.unwrap();

        assert_eq!(removed, ada);
        assert!(f.service.get_by_id(&ada.id).await.unwrap().is_none());
        assert!(!f.users.get(&user.id).unwrap().owns(&ada.id));
        assert!(f.service.delete_by_id(&ada.id).await.unwrap_err().is_not_found());
    }
}
