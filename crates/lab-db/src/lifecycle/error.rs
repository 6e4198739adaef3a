//! Lifecycle error taxonomy.

use std::path::PathBuf;

use lab_assets::AssetError;
use lab_core::enums::EntityType;
use lab_core::errors::CoreError;
use thiserror::Error;

use super::cascade::RemovalStage;
use crate::error::DatabaseError;

/// Errors from study and result lifecycle operations.
///
/// `Validation`, `Locked`, `InvalidMembership` and `NotMember` are raised
/// before anything is written. `Partial*` mean the database committed but the
/// asset directory did not follow; they carry the id and path needed to
/// reconcile by hand.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Malformed input: empty title, bad JSON, invalid study file.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Structural mutation attempted on a locked study.
    #[error("Study {study_id} is locked")]
    Locked { study_id: String },

    /// A membership change would leave the study without members.
    #[error("Invalid membership: {0}")]
    InvalidMembership(String),

    /// The acting user is not a member of the study.
    #[error("User {user_id} is not a member of study {study_id}")]
    NotMember { study_id: String, user_id: String },

    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: EntityType, id: String },

    /// Persistence failure. Work committed by earlier transactions stays.
    #[error(transparent)]
    Store(DatabaseError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The study was created but its asset directory was not.
    #[error("Study {study_id} created but asset directory {} failed: {source}", path.display())]
    PartialCreate {
        study_id: String,
        path: PathBuf,
        #[source]
        source: AssetError,
    },

    /// The study and its results are gone but its asset directory remains.
    #[error("Study {study_id} removed but asset directory {} remains: {source}", path.display())]
    PartialRemoval {
        study_id: String,
        path: PathBuf,
        #[source]
        source: AssetError,
    },

    /// The imported study exists but has no asset directory.
    #[error("Study {study_id} imported but assets could not be moved to {}: {source}", path.display())]
    PartialImport {
        study_id: String,
        path: PathBuf,
        #[source]
        source: AssetError,
    },

    /// Result removal stopped; `stage` is the last step that completed.
    #[error("Removal of study result {study_result_id} stopped after {stage}: {source}")]
    Cascade {
        study_result_id: String,
        stage: RemovalStage,
        #[source]
        source: DatabaseError,
    },
}

impl LifecycleError {
    /// Whether the database and the asset directories disagree after this error.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(
            self,
            Self::PartialCreate { .. } | Self::PartialRemoval { .. } | Self::PartialImport { .. }
        )
    }
}

impl From<DatabaseError> for LifecycleError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Store(other),
        }
    }
}

impl From<libsql::Error> for LifecycleError {
    fn from(error: libsql::Error) -> Self {
        Self::Store(DatabaseError::LibSql(error))
    }
}

impl From<CoreError> for LifecycleError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Exchange(e) => Self::Validation(e.to_string()),
            CoreError::NotFound { entity_type, id } => {
                Self::Validation(format!("{entity_type} {id} not found"))
            }
            CoreError::Other(e) => Self::Store(DatabaseError::Other(e)),
        }
    }
}
