//! JSONL trail operation envelope.
//!
//! Every mutation is recorded as a `TrailOperation` in per-actor
//! `{trail_dir}/{actor}.jsonl` files, next to the `audit_trail` table.
//!
//! The `v` field supports schema versioning: trail lines without a `v`
//! field deserialize with `v == 1` via `#[serde(default)]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityType, TrailOp};

/// Default trail version for lines written without one.
const fn default_trail_version() -> u32 {
    1
}

/// A single operation recorded in the JSONL trail.
///
/// The `data` field contains the full entity state for `Create` ops, changed
/// fields for `Update`, and a small detail object for the rest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrailOperation {
    /// Schema version. Defaults to 1.
    #[serde(default = "default_trail_version")]
    pub v: u32,

    /// ISO 8601 timestamp of the operation.
    pub ts: String,

    /// User or worker id that produced this operation.
    pub actor: String,

    /// What kind of mutation this represents.
    pub op: TrailOp,

    /// Which entity type was affected.
    pub entity: EntityType,

    /// ID of the affected entity.
    pub id: String,

    /// Operation payload. Shape depends on `op` and `entity`.
    pub data: serde_json::Value,
}
