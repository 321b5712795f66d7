use std::collections::HashMap;

use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::order::UserId;

/// Contact fields captured when a customer submits an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Object)]
pub struct UserContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
}

impl UserContact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Contact book for order owners, used to address notifications
pub struct UserDirectory {
    contacts: RwLock<HashMap<UserId, UserContact>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            contacts: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the contact for a user
    pub async fn upsert(&self, user_id: UserId, contact: UserContact) {
        let mut contacts = self.contacts.write().await;
        contacts.insert(user_id, contact);
    }

    pub async fn get(&self, user_id: &str) -> Option<UserContact> {
        let contacts = self.contacts.read().await;
        contacts.get(user_id).cloned()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
