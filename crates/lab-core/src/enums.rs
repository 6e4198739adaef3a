//! Worker types, reorder directions, entity types, and actions.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// WorkerType
// ---------------------------------------------------------------------------

/// Kind of identity that runs a study.
///
/// The lifecycle rules treat every variant the same; the type only matters
/// for display filtering (maintenance runs are hidden from result listings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerType {
    Plain,
    Mturk,
    MturkSandbox,
    Group,
    /// A study member trying out their own study.
    Maintenance,
}

impl WorkerType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Mturk => "mturk",
            Self::MturkSandbox => "mturk_sandbox",
            Self::Group => "group",
            Self::Maintenance => "maintenance",
        }
    }

    /// Whether results of this worker are hidden from study result listings.
    #[must_use]
    pub const fn is_maintenance(self) -> bool {
        matches!(self, Self::Maintenance)
    }
}

impl fmt::Display for WorkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Direction for moving a component within its study.
///
/// `Up` moves towards position 0, `Down` towards the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Position of the neighbour to swap with, or `None` at the boundary.
    #[must_use]
    pub const fn neighbour(self, position: usize, len: usize) -> Option<usize> {
        match self {
            Self::Up if position > 0 => Some(position - 1),
            Self::Down if position + 1 < len => Some(position + 1),
            Self::Up | Self::Down => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Locked,
    Unlocked,
    MembersChanged,
    Reordered,
    Cloned,
    Imported,
    Exported,
    Detached,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::MembersChanged => "members_changed",
            Self::Reordered => "reordered",
            Self::Cloned => "cloned",
            Self::Imported => "imported",
            Self::Exported => "exported",
            Self::Detached => "detached",
        }
    }

    /// Trail operation recorded alongside this action. `None` for read-only
    /// actions that are audited but change nothing.
    #[must_use]
    pub const fn trail_op(self) -> Option<TrailOp> {
        match self {
            Self::Created | Self::Cloned | Self::Imported => Some(TrailOp::Create),
            Self::Updated => Some(TrailOp::Update),
            Self::Deleted => Some(TrailOp::Delete),
            Self::Locked => Some(TrailOp::Lock),
            Self::Unlocked => Some(TrailOp::Unlock),
            Self::MembersChanged => Some(TrailOp::Members),
            Self::Reordered => Some(TrailOp::Reorder),
            Self::Detached => Some(TrailOp::Detach),
            Self::Exported => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in the audit trail and JSONL trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    User,
    Study,
    Component,
    Worker,
    StudyResult,
    ComponentResult,
    GroupResult,
    Audit,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Study => "study",
            Self::Component => "component",
            Self::Worker => "worker",
            Self::StudyResult => "study_result",
            Self::ComponentResult => "component_result",
            Self::GroupResult => "group_result",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TrailOp
// ---------------------------------------------------------------------------

/// Operation type recorded in JSONL trail files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrailOp {
    Create,
    Update,
    Delete,
    Lock,
    Unlock,
    Reorder,
    Members,
    Detach,
}

impl TrailOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Reorder => "reorder",
            Self::Members => "members",
            Self::Detach => "detach",
        }
    }
}

impl fmt::Display for TrailOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
