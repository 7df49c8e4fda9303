//! Client Repository

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{doc, Bson, Document},
    options::{FindOptions, ReturnDocument},
};

use super::entity::{Client, ClientFilter, ClientPatch};
use crate::shared::api_common::{QueryOptions, QueryResult};
use crate::shared::error::{is_duplicate_key, PlatformError, Result};

/// Persistence port for clients.
///
/// `insert` and the update methods fail with `PlatformError::Duplicate`
/// when the write would give two clients the same email.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn insert(&self, client: &Client) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Client>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>>;

    async fn find_by_name(&self, name: &str) -> Result<Vec<Client>>;

    /// One page of clients matching `filter`, sorted and sliced per `options`
    async fn paginate(&self, filter: &ClientFilter, options: &QueryOptions) -> Result<QueryResult<Client>>;

    /// Apply `patch` to the client with `id`; returns the updated record
    async fn update_by_id(&self, id: &str, patch: &ClientPatch) -> Result<Option<Client>>;

    /// Apply `patch` to the client with `email`; returns the updated record
    async fn update_by_email(&self, email: &str, patch: &ClientPatch) -> Result<Option<Client>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// MongoDB-backed client repository (collection `clients`)
pub struct MongoClientRepository {
    collection: Collection<Client>,
}

impl MongoClientRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("clients"),
        }
    }

    async fn update_one_where(&self, filter: Document, patch: &ClientPatch) -> Result<Option<Client>> {
        let update = doc! { "$set": patch_to_set_document(patch)? };
        self.collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_write_error(e, patch.email.as_deref().unwrap_or_default()))
    }
}

#[async_trait]
impl ClientRepository for MongoClientRepository {
    async fn insert(&self, client: &Client) -> Result<()> {
        self.collection
            .insert_one(client)
            .await
            .map_err(|e| map_write_error(e, &client.email))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Client>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Client>> {
        let cursor = self.collection.find(doc! { "name": name }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn paginate(&self, filter: &ClientFilter, options: &QueryOptions) -> Result<QueryResult<Client>> {
        let filter = filter_document(filter);
        let total = self.collection.count_documents(filter.clone()).await?;

        let find_options = FindOptions::builder()
            .sort(sort_document(options))
            .skip(options.skip())
            .limit(options.limit as i64)
            .build();

        let cursor = self.collection.find(filter).with_options(find_options).await?;
        let results: Vec<Client> = cursor.try_collect().await?;

        Ok(QueryResult::new(results, options, total))
    }

    async fn update_by_id(&self, id: &str, patch: &ClientPatch) -> Result<Option<Client>> {
        self.update_one_where(doc! { "_id": id }, patch).await
    }

    async fn update_by_email(&self, email: &str, patch: &ClientPatch) -> Result<Option<Client>> {
        self.update_one_where(doc! { "email": email }, patch).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

fn map_write_error(err: mongodb::error::Error, email: &str) -> PlatformError {
    if is_duplicate_key(&err) {
        PlatformError::duplicate("Client", "email", email)
    } else {
        PlatformError::Database(err)
    }
}

/// Build the `$set` document for a patch; `updatedAt` is always refreshed.
pub(crate) fn patch_to_set_document(patch: &ClientPatch) -> Result<Document> {
    let mut set = Document::new();
    if let Some(email) = &patch.email {
        set.insert("email", email.as_str());
    }
    if let Some(name) = &patch.name {
        set.insert("name", name.as_str());
    }
    for (field, value) in [
        ("instagram", &patch.instagram),
        ("facebook", &patch.facebook),
        ("linkedin", &patch.linkedin),
    ] {
        if let Some(link) = value {
            set.insert(field, bson::to_bson(link)?);
        }
    }
    set.insert("updatedAt", Bson::DateTime(bson::DateTime::from_chrono(Utc::now())));
    Ok(set)
}

pub(crate) fn filter_document(filter: &ClientFilter) -> Document {
    let mut query = Document::new();
    if let Some(email) = &filter.email {
        query.insert("email", email.as_str());
    }
    if let Some(user) = &filter.user {
        query.insert("user", user.as_str());
    }
    query
}

/// Sort document for the requested order, with `_id` as the final tie-breaker
/// so pages are stable.
pub(crate) fn sort_document(options: &QueryOptions) -> Document {
    let mut sort = Document::new();
    for spec in &options.sort {
        let field = if spec.field == "id" { "_id" } else { spec.field.as_str() };
        sort.insert(field, spec.direction.as_i32());
    }
    if !sort.contains_key("_id") {
        sort.insert("_id", 1);
    }
    sort
}
