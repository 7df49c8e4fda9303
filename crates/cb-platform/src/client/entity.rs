//! Client Entity
//!
//! A customer/contact record, optionally owned by a user.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::shared::ids::IdGenerator;

/// Free-form social profile data (linkedin / instagram / facebook)
pub type SocialLink = serde_json::Map<String, serde_json::Value>;

/// Client entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// ObjectId hex string
    #[serde(rename = "_id")]
    pub id: String,

    /// Unique, normalized (trimmed, lower-case)
    pub email: String,

    pub name: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<SocialLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<SocialLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<SocialLink>,

    /// Owning user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a client
#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub email: String,
    pub name: String,
    pub description: String,
    pub linkedin: Option<SocialLink>,
    pub user: Option<String>,
}

impl NewClient {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            email: normalize_email(&email.into()),
            name: name.into(),
            description: description.into(),
            linkedin: None,
            user: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user = Some(user_id.into());
        self
    }

    pub fn with_linkedin(mut self, linkedin: SocialLink) -> Self {
        self.linkedin = Some(linkedin);
        self
    }
}

impl Client {
    /// Build a new client with a fresh id and timestamps
    pub fn new(input: NewClient) -> Self {
        let now = Utc::now();
        Self {
            id: IdGenerator::generate(),
            email: normalize_email(&input.email),
            name: input.name,
            description: input.description,
            linkedin: input.linkedin,
            instagram: None,
            facebook: None,
            user: input.user,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place. Fields absent from the patch are untouched.
    pub fn apply(&mut self, patch: &ClientPatch) {
        if let Some(email) = &patch.email {
            self.email = normalize_email(email);
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(instagram) = &patch.instagram {
            self.instagram = Some(instagram.clone());
        }
        if let Some(facebook) = &patch.facebook {
            self.facebook = Some(facebook.clone());
        }
        if let Some(linkedin) = &patch.linkedin {
            self.linkedin = Some(linkedin.clone());
        }
        self.updated_at = Utc::now();
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user.as_deref() == Some(user_id)
    }
}

/// Partial update for a client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub instagram: Option<SocialLink>,
    pub facebook: Option<SocialLink>,
    pub linkedin: Option<SocialLink>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.instagram.is_none()
            && self.facebook.is_none()
            && self.linkedin.is_none()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(normalize_email(&email.into()));
        self
    }

    pub fn with_instagram(mut self, instagram: SocialLink) -> Self {
        self.instagram = Some(instagram);
        self
    }
}

/// Selection constraints for list queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub email: Option<String>,
    pub user: Option<String>,
}

impl ClientFilter {
    pub fn matches(&self, client: &Client) -> bool {
        let email_ok = self.email.as_deref().map_or(true, |e| client.email == e);
        let user_ok = self.user.as_deref().map_or(true, |u| client.is_owned_by(u));
        email_ok && user_ok
    }
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn social(handle: &str) -> SocialLink {
        let mut map = SocialLink::new();
        map.insert("handle".to_string(), serde_json::json!(handle));
        map
    }

    #[test]
    fn test_new_client_normalizes_email() {
        let client = Client::new(NewClient::new("  Ada@Example.COM ", "Ada", "Analyst"));
        assert_eq!(client.email, "ada@example.com");
        assert_eq!(client.id.len(), 24);
        assert_eq!(client.created_at, client.updated_at);
    }

    #[test]
    fn test_apply_only_touches_supplied_fields() {
        let mut client = Client::new(
            NewClient::new("ada@example.com", "Ada", "Analyst").with_linkedin(social("ada-l")),
        );
        let before = client.clone();

        client.apply(&ClientPatch::default().with_instagram(social("ada.ig")));

        assert_eq!(client.name, before.name);
        assert_eq!(client.email, before.email);
        assert_eq!(client.description, before.description);
        assert_eq!(client.linkedin, before.linkedin);
        assert_eq!(client.instagram, Some(social("ada.ig")));
        assert!(client.updated_at >= before.updated_at);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ClientPatch::default().is_empty());
        assert!(!ClientPatch::default().with_name("x").is_empty());
    }

    #[test]
    fn test_filter_matches() {
        let client = Client::new(NewClient::new("ada@example.com", "Ada", "Analyst").with_user("u1"));
        assert!(ClientFilter::default().matches(&client));
        assert!(ClientFilter { email: Some("ada@example.com".into()), user: None }.matches(&client));
        assert!(ClientFilter { email: None, user: Some("u1".into()) }.matches(&client));
        assert!(!ClientFilter { email: None, user: Some("u2".into()) }.matches(&client));
    }

    #[test]
    fn test_bson_round_trip_uses_underscore_id() {
        let client = Client::new(NewClient::new("ada@example.com", "Ada", "Analyst"));
        let doc = bson::to_document(&client).unwrap();
        assert_eq!(doc.get_str("_id").unwrap(), client.id);
        assert!(doc.get_datetime("createdAt").is_ok());
        assert!(!doc.contains_key("instagram"));
    }
}
