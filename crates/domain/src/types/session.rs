//! Session types persisted by the login flow

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_USER_ROLE;

/// Signed-in user, persisted under `userData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub user_id: String,
    pub name: String,
    pub role: String,
}

impl UserData {
    /// User record derived from a successful ServiceNow credential check.
    pub fn from_user_id(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self { name: user_id.clone(), user_id, role: DEFAULT_USER_ROLE.to_string() }
    }
}
