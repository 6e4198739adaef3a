//! Typed audit detail payloads.
//!
//! Audit actions can carry a structured `detail` JSON blob. These types give
//! the common shapes a schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Direction;

/// Detail for `AuditAction::Reordered`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReorderedDetail {
    pub component_id: String,
    pub direction: Direction,
    pub from: u32,
    pub to: u32,
}

/// Detail for `AuditAction::MembersChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MembersChangedDetail {
    /// User ids after the change.
    pub members: Vec<String>,
    /// Submitted emails with no matching user.
    pub skipped: Vec<String>,
}

/// Detail for `AuditAction::Cloned` and `AuditAction::Imported`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OriginDetail {
    /// Source study id for clones, archive name for imports.
    pub source: String,
    pub components: u32,
}

/// Detail for `AuditAction::Deleted` on a study.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudyRemovedDetail {
    pub study_results: u32,
    pub components: u32,
}

/// Detail for `AuditAction::Detached` (a study result leaving its group).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DetachedDetail {
    pub study_result_id: String,
    pub group_removed: bool,
}
