use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One execution record of a component within a study result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ComponentResult {
    pub id: String,
    pub study_result_id: String,
    pub component_id: String,
    pub data: Option<String>,
    pub created_at: DateTime<Utc>,
}
