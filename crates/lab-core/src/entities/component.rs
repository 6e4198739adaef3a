use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One ordered step within a study.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Component {
    pub id: String,
    pub study_id: String,
    /// Dense 0-based index within the study.
    pub position: u32,
    pub title: String,
    pub html_file_path: Option<String>,
    pub json_data: Option<String>,
    pub reloadable: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
