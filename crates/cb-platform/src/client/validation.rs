//! Client request validation
//!
//! Request shapes accepted by the client endpoints, and their conversion
//! into validated domain inputs. Nothing here touches persistence.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use super::entity::{normalize_email, ClientFilter, ClientPatch, NewClient, SocialLink};
use crate::shared::api_common::{parse_sort_by, PageLimits, QueryOptions};
use crate::shared::error::{PlatformError, Result};
use crate::shared::ids::is_object_id;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

/// Create client request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateClientRequest {
    /// Contact email, unique across clients
    pub email: Option<String>,

    pub name: Option<String>,

    pub description: Option<String>,

    /// Free-form LinkedIn profile object
    #[schema(value_type = Option<Object>)]
    pub linkedin: Option<Value>,

    /// Owning user id
    pub user: Option<String>,
}

impl CreateClientRequest {
    pub fn validate(self) -> Result<NewClient> {
        let email = required_email("email", self.email)?;
        let name = required_text("name", self.name)?;
        let description = required_text("description", self.description)?;

        let mut client = NewClient::new(email, name, description);
        if let Some(linkedin) = social_link("linkedin", self.linkedin)? {
            client = client.with_linkedin(linkedin);
        }
        if let Some(user) = self.user {
            client = client.with_user(validate_object_id("user", &user)?);
        }
        Ok(client)
    }
}

/// Update client request. At least one field must be supplied.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateClientRequest {
    pub email: Option<String>,

    pub name: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub instagram: Option<Value>,

    #[schema(value_type = Option<Object>)]
    pub facebook: Option<Value>,

    #[schema(value_type = Option<Object>)]
    pub linkedin: Option<Value>,
}

impl UpdateClientRequest {
    pub fn validate(self) -> Result<ClientPatch> {
        let patch = ClientPatch {
            email: self.email.map(|e| required_email("email", Some(e))).transpose()?,
            name: self.name.map(|n| required_text("name", Some(n))).transpose()?,
            instagram: social_link("instagram", self.instagram)?,
            facebook: social_link("facebook", self.facebook)?,
            linkedin: social_link("linkedin", self.linkedin)?,
        };

        if patch.is_empty() {
            return Err(PlatformError::validation(
                "body must contain at least one of [email, name, instagram, facebook, linkedin]",
            ));
        }
        Ok(patch)
    }
}

/// Query parameters for listing clients
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct ListClientsQuery {
    /// Only the client with this email
    pub email: Option<String>,

    /// Only clients owned by this user
    pub user_id: Option<String>,

    /// `field:desc,other:asc`
    pub sort_by: Option<String>,

    /// Page size
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,

    /// 1-based page number
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
}

impl ListClientsQuery {
    pub fn validate(self, limits: PageLimits) -> Result<(ClientFilter, QueryOptions)> {
        let filter = ClientFilter {
            // Any text; a malformed email simply matches nothing
            email: self.email
                .map(|e| required_text("email", Some(e)).map(|e| normalize_email(&e)))
                .transpose()?,
            user: self.user_id.map(|u| validate_object_id("userId", &u)).transpose()?,
        };

        let sort = match self.sort_by.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_sort_by(raw)?,
            _ => Vec::new(),
        };
        let limit = parse_integer("limit", self.limit)?;
        let page = parse_integer("page", self.page)?;

        Ok((filter, QueryOptions::resolve(sort, limit, page, limits)))
    }
}

/// Validate a client id path parameter
pub fn validate_client_id(raw: &str) -> Result<String> {
    validate_object_id("clientId", raw)
}

/// Validate and normalize an email path parameter
pub fn validate_email_param(raw: &str) -> Result<String> {
    required_email("email", Some(raw.to_string()))
}

/// Validate a name path parameter
pub fn validate_name_param(raw: &str) -> Result<String> {
    required_text("name", Some(raw.to_string()))
}

fn validate_object_id(field: &str, raw: &str) -> Result<String> {
    let id = raw.trim();
    if !is_object_id(id) {
        return Err(PlatformError::validation(format!(
            "\"{}\" must be a valid id (24 hex characters), got '{}'",
            field, raw
        )));
    }
    // Stored ids are lower-case hex
    Ok(id.to_ascii_lowercase())
}

fn required_text(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(PlatformError::validation(format!("\"{}\" is not allowed to be empty", field))),
        None => Err(PlatformError::validation(format!("\"{}\" is required", field))),
    }
}

fn required_email(field: &str, value: Option<String>) -> Result<String> {
    let email = normalize_email(&required_text(field, value)?);
    if !email_pattern().is_match(&email) {
        return Err(PlatformError::validation(format!("\"{}\" must be a valid email", field)));
    }
    Ok(email)
}

fn social_link(field: &str, value: Option<Value>) -> Result<Option<SocialLink>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(PlatformError::validation(format!("\"{}\" must be of type object", field))),
    }
}

fn parse_integer(field: &str, value: Option<String>) -> Result<Option<i64>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| PlatformError::validation(format!("\"{}\" must be an integer", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "507f1f77bcf86cd799439011";

    fn create_request() -> CreateClientRequest {
        CreateClientRequest {
            email: Some(" Ada@Example.com ".into()),
            name: Some("Ada".into()),
            description: Some("Analyst".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_requires_email_and_name() {
        let mut req = create_request();
        req.email = None;
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("\"email\" is required"));

        let mut req = create_request();
        req.name = Some("   ".into());
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("\"name\""));

        let mut req = create_request();
        req.email = Some("not-an-email".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_normalizes_and_checks_user() {
        let client = create_request().validate().unwrap();
        assert_eq!(client.email, "ada@example.com");

        let mut req = create_request();
        req.user = Some("nope".into());
        assert!(req.validate().unwrap_err().to_string().contains("\"user\""));

        let mut req = create_request();
        req.user = Some(ID.into());
        req.linkedin = Some(json!({"url": "https://linkedin.com/in/ada"}));
        let client = req.validate().unwrap();
        assert_eq!(client.user.as_deref(), Some(ID));
        assert!(client.linkedin.is_some());
    }

    #[test]
    fn test_create_rejects_non_object_social_link() {
        let mut req = create_request();
        req.linkedin = Some(json!("ada"));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_body_is_closed() {
        let body = json!({"email": "a@x.io", "name": "A", "description": "d", "phone": "1"});
        assert!(serde_json::from_value::<CreateClientRequest>(body).is_err());
    }

    #[test]
    fn test_update_needs_one_field() {
        let err = UpdateClientRequest::default().validate().unwrap_err();
        assert!(matches!(err, PlatformError::Validation { .. }));

        let patch = UpdateClientRequest {
            facebook: Some(json!({"page": "ada"})),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(patch.facebook.is_some());
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_list_query_resolution() {
        let query = ListClientsQuery {
            user_id: Some(ID.into()),
            sort_by: Some("name:desc".into()),
            limit: Some("5".into()),
            page: Some("0".into()),
            ..Default::default()
        };
        let (filter, options) = query.validate(PageLimits::default()).unwrap();
        assert_eq!(filter.user.as_deref(), Some(ID));
        assert_eq!(options.limit, 5);
        assert_eq!(options.page, 1);
        assert_eq!(options.sort[0].field, "name");

        let bad = ListClientsQuery { limit: Some("ten".into()), ..Default::default() };
        assert!(bad.validate(PageLimits::default()).is_err());

        let bad = ListClientsQuery { user_id: Some("123".into()), ..Default::default() };
        assert!(bad.validate(PageLimits::default()).is_err());
    }

    #[test]
    fn test_ids_are_lowercased() {
        let upper = ID.to_ascii_uppercase();
        assert_eq!(validate_client_id(&upper).unwrap(), ID);

        let mut req = create_request();
        req.user = Some(upper.clone());
        assert_eq!(req.validate().unwrap().user.as_deref(), Some(ID));

        let query = ListClientsQuery { user_id: Some(upper), ..Default::default() };
        let (filter, _) = query.validate(PageLimits::default()).unwrap();
        assert_eq!(filter.user.as_deref(), Some(ID));
    }

    #[test]
    fn test_list_email_filter_accepts_any_text() {
        let query = ListClientsQuery { email: Some(" Foo ".into()), ..Default::default() };
        let (filter, _) = query.validate(PageLimits::default()).unwrap();
        assert_eq!(filter.email.as_deref(), Some("foo"));

        let empty = ListClientsQuery { email: Some("  ".into()), ..Default::default() };
        assert!(empty.validate(PageLimits::default()).is_err());
    }

    #[test]
    fn test_path_params() {
        assert_eq!(validate_client_id(ID).unwrap(), ID);
        assert!(validate_client_id("xyz").is_err());
        assert_eq!(validate_email_param("A@B.io").unwrap(), "a@b.io");
        assert!(validate_name_param("").is_err());
    }
}
