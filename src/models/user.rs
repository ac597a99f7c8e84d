use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use super::timestamp;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub is_verified: bool,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

// Bearer credential issued by POST /auth/login
#[derive(Deserialize, Serialize, Clone)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}
