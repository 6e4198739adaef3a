use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A person who can be a member of studies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Stored lowercased; lookups are case-insensitive.
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
