//! User Repository

use async_trait::async_trait;
use mongodb::{
    Collection, Database,
    bson::{doc, oid::ObjectId, Document},
};
use serde::{Deserialize, Serialize};

use super::entity::User;
use crate::shared::error::{PlatformError, Result};

/// Persistence port for users
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Append `client_id` to the user's client list. Returns false when no user matched.
    async fn push_client(&self, user_id: &str, client_id: &str) -> Result<bool>;

    /// Remove `client_id` from the user's client list. Returns false when no user matched.
    async fn pull_client(&self, user_id: &str, client_id: &str) -> Result<bool>;
}

/// Stored form of a user. The `users` collection keys documents by ObjectId
/// and keeps client references as ObjectIds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct UserDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub customers: Vec<ObjectId>,
}

impl TryFrom<&User> for UserDocument {
    type Error = PlatformError;

    fn try_from(user: &User) -> Result<Self> {
        Ok(Self {
            id: parse_object_id("user id", &user.id)?,
            email: user.email.clone(),
            name: user.name.clone(),
            customers: user.customers
                .iter()
                .map(|c| parse_object_id("client id", c))
                .collect::<Result<_>>()?,
        })
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            email: doc.email,
            name: doc.name,
            customers: doc.customers.iter().map(|id| id.to_hex()).collect(),
        }
    }
}

fn parse_object_id(what: &str, raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw)
        .map_err(|_| PlatformError::validation(format!("{} '{}' is not a valid ObjectId", what, raw)))
}

/// `$push` / `$pull` update on the client list
pub(crate) fn customers_update(op: &str, client_id: &str) -> Result<Document> {
    let client_oid = parse_object_id("client id", client_id)?;
    let mut update = Document::new();
    update.insert(op, doc! { "customers": client_oid });
    Ok(update)
}

/// MongoDB-backed user repository (collection `users`)
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    async fn update_customers(&self, op: &str, user_id: &str, client_id: &str) -> Result<bool> {
        // A malformed user id cannot name a stored user
        let Ok(user_oid) = ObjectId::parse_str(user_id) else {
            return Ok(false);
        };
        let result = self.collection
            .update_one(doc! { "_id": user_oid }, customers_update(op, client_id)?)
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        self.collection.insert_one(UserDocument::try_from(user)?).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let found = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(User::from))
    }

    async fn push_client(&self, user_id: &str, client_id: &str) -> Result<bool> {
        self.update_customers("$push", user_id, client_id).await
    }

    async fn pull_client(&self, user_id: &str, client_id: &str) -> Result<bool> {
        self.update_customers("$pull", user_id, client_id).await
    }
}
