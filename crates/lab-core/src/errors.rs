//! Cross-cutting error types.
//!
//! Errors that can originate from any crate in the workspace. Store errors
//! (`DatabaseError`), asset errors (`AssetError`) and the lifecycle taxonomy
//! (`LifecycleError`) live in their respective crates.

use thiserror::Error;

/// Errors that can be raised by any `lab` crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (empty title, malformed JSON, bad exchange file).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The exchange document could not be encoded or decoded.
    #[error("Exchange format error: {0}")]
    Exchange(#[from] serde_json::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Whether this error describes malformed caller input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Exchange(_))
    }
}
