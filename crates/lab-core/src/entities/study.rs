use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A hierarchical experiment definition with ordered components.
///
/// Members and components are stored in their own tables and loaded
/// separately.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Study {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free-form JSON configuration, kept as the submitted text.
    pub json_data: Option<String>,
    /// Forbids structural edits while set.
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
