//! User Entity
//!
//! The owning account. Only the client back-references are managed here.

use crate::shared::ids::IdGenerator;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// ObjectId hex string
    pub id: String,

    pub email: String,

    pub name: String,

    /// Ids of clients owned by this user
    pub customers: Vec<String>,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: IdGenerator::generate(),
            email: email.into(),
            name: name.into(),
            customers: vec![],
        }
    }

    pub fn owns(&self, client_id: &str) -> bool {
        self.customers.iter().any(|c| c == client_id)
    }
}
