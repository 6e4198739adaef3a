use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One execution record of a study by one worker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudyResult {
    pub id: String,
    /// Fixed at creation.
    pub study_id: String,
    /// `None` only transiently, while the result is being removed.
    pub worker_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
