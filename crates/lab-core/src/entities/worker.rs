use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::WorkerType;

/// An identity (human or automated) that executes studies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Worker {
    pub id: String,
    pub worker_type: WorkerType,
    /// Set for maintenance workers, which act on behalf of a study member.
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
