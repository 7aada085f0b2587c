//! Strategy service wire types
//!
//! Read endpoints are passed through mostly as received: only the fields the
//! CLI displays are typed, everything else lands in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Strategy as returned by create and list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecord {
    #[serde(default)]
    pub id: Value,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StrategyRecord {
    pub fn rule_count(&self) -> usize {
        self.extra
            .get("rules")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Value,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[serde(default)]
    pub id: Value,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Login and registration body
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// How an endpoint reports failures in its response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBody {
    /// Body is the message
    PlainText,
    /// Body is `{"message": "..."}`
    JsonMessage,
    /// Body is not read; the fixed message is used
    Ignored,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

impl ErrorBody {
    /// Extract the user-facing message from a failed response body.
    /// Falls back to `fallback` when the body is empty or not in the
    /// expected shape.
    pub fn message(self, body: &str, fallback: &str) -> String {
        let found = match self {
            ErrorBody::PlainText => Some(body.trim().to_string()),
            ErrorBody::JsonMessage => serde_json::from_str::<MessageBody>(body)
                .ok()
                .and_then(|b| b.message),
            ErrorBody::Ignored => None,
        };
        match found {
            Some(message) if !message.is_empty() => message,
            _ => fallback.to_string(),
        }
    }
}
