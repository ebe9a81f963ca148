//! Types shared by the auth client, the service client and the controller.
//!
//! Wire structs mirror the JSON the REST service speaks (PascalCase keys);
//! the domain types are what the rest of the crate works with.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Bearer token returned by the password grant.
/// Held in memory for the life of the process, never refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short preview safe to put in logs.
    pub fn masked(&self) -> String {
        mask_secret(&self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self.masked())
    }
}

/// Mask all but the first few characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

/// Username and password taken from the settings store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// One field of a work item, shown as `Name: Value` on the detail card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemField {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default, deserialize_with = "lenient_string")]
    pub value: String,
}

/// A pending approval record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalItem {
    #[serde(rename = "WorkItemId")]
    pub id: String,
    /// Object type the item belongs to (menu title)
    #[serde(rename = "ObjectName")]
    pub object_name: String,
    /// Record name (menu subtitle)
    #[serde(rename = "WorkItemName")]
    pub title: String,
    #[serde(rename = "Fields", default)]
    pub fields: Vec<ItemField>,
}

impl ApprovalItem {
    /// Body text of the detail card: one `Name: Value` line per field,
    /// in the order the server sent them.
    pub fn detail_text(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}: {}\n", f.name, f.value))
            .collect()
    }
}

/// What the user decided on the confirm card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// The `Approve` flag sent to the decide endpoint.
    pub fn approve(self) -> bool {
        matches!(self, Decision::Approve)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approved"),
            Decision::Reject => write!(f, "rejected"),
        }
    }
}

/// Body of `GetWorkItems/`.
#[derive(Debug, Clone, Serialize)]
pub struct ListRequest<'a> {
    #[serde(rename = "Username")]
    pub username: &'a str,
}

/// Response of `GetWorkItems/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    #[serde(rename = "WorkItems", default)]
    pub work_items: Vec<ApprovalItem>,
}

/// Body of `ApproveWorkItem/`.
#[derive(Debug, Clone, Serialize)]
pub struct DecideRequest<'a> {
    #[serde(rename = "WorkItemId")]
    pub work_item_id: &'a str,
    #[serde(rename = "Approve")]
    pub approve: bool,
}

/// The subset of the token endpoint's response we read.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Field values are usually strings, but the service passes through whatever
/// the record holds. Numbers and booleans keep their JSON text, null is empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
