//! Service layer orchestrating database mutations with audit and trail.
//!
//! `LabService` wraps `LabDb` (raw database access), `TrailWriter` (JSONL
//! persistence) and the asset collaborators. Repository and lifecycle
//! methods are implemented as `impl LabService` blocks in their own modules.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use lab_assets::{Archiver, AssetStore, LocalAssetStore, ZipArchiver};
use lab_config::LabConfig;
use lab_core::entities::AuditEntry;
use lab_core::enums::{AuditAction, EntityType};
use lab_core::ids::PREFIX_AUDIT;
use lab_core::trail::TrailOperation;
use libsql::{Connection, Transaction};

use crate::LabDb;
use crate::error::DatabaseError;
use crate::lifecycle::LifecycleError;
use crate::repos::audit::append_audit;
use crate::trail::writer::TrailWriter;

/// Orchestrates database mutations with audit trail and JSONL trail.
///
/// Every mutation method follows this protocol:
/// 1. Begin transaction
/// 2. Execute SQL
/// 3. Append audit entry (inside transaction), buffer the trail operation
/// 4. Commit transaction
/// 5. Append buffered trail operations (file I/O)
/// 6. Touch asset directories, if the operation owns any
pub struct LabService {
    db: LabDb,
    trail: TrailWriter,
    assets: Arc<dyn AssetStore>,
    archiver: Arc<dyn Archiver>,
}

/// One audited change, written to `audit_trail` and buffered for the trail.
pub(crate) struct Change<'a> {
    actor: &'a str,
    entity_type: EntityType,
    entity_id: &'a str,
    action: AuditAction,
    detail: Option<serde_json::Value>,
    data: Option<serde_json::Value>,
}

impl<'a> Change<'a> {
    pub(crate) const fn new(
        actor: &'a str,
        entity_type: EntityType,
        entity_id: &'a str,
        action: AuditAction,
    ) -> Self {
        Self {
            actor,
            entity_type,
            entity_id,
            action,
            detail: None,
            data: None,
        }
    }

    /// Audit detail. Also used as the trail payload unless `data` is set.
    pub(crate) fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Trail payload only (e.g. the full entity on create).
    pub(crate) fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Trail operations of one mutation, appended once its transaction commits.
#[derive(Debug, Default)]
pub(crate) struct Journal(Vec<TrailOperation>);

impl LabService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `trail_dir` - Directory for JSONL trail files. Pass `None` to disable
    ///   trail writing.
    /// * `assets` / `archiver` - filesystem collaborators for study directories.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the trail
    /// directory cannot be created.
    pub async fn new_local(
        db_path: &str,
        trail_dir: Option<PathBuf>,
        assets: Arc<dyn AssetStore>,
        archiver: Arc<dyn Archiver>,
    ) -> Result<Self, DatabaseError> {
        let db = LabDb::open_local(db_path).await?;
        let trail = match trail_dir {
            Some(dir) => TrailWriter::new(dir)?,
            None => TrailWriter::disabled(),
        };
        Ok(Self::from_parts(db, trail, assets, archiver))
    }

    /// Open the database, trail and asset root named by the configuration.
    ///
    /// Parent directories of the database file are created as needed.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if any of the three cannot be opened.
    pub async fn from_config(config: &LabConfig) -> Result<Self, LifecycleError> {
        let db_path = config.storage.db_path.as_str();
        if db_path != ":memory:"
            && let Some(parent) = Path::new(db_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| lab_assets::AssetError::from_io(parent, e))?;
        }
        let assets = LocalAssetStore::new(config.storage.assets_path())?;
        Ok(Self::new_local(
            db_path,
            config.storage.trail_path(),
            Arc::new(assets),
            Arc::new(ZipArchiver),
        )
        .await?)
    }

    /// Assemble from already-opened parts (tests, custom collaborators).
    #[must_use]
    pub fn from_parts(
        db: LabDb,
        trail: TrailWriter,
        assets: Arc<dyn AssetStore>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        Self {
            db,
            trail,
            assets,
            archiver,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LabDb {
        &self.db
    }

    /// Access the trail writer.
    #[must_use]
    pub const fn trail(&self) -> &TrailWriter {
        &self.trail
    }

    /// Access the asset directory store.
    #[must_use]
    pub fn assets(&self) -> &dyn AssetStore {
        self.assets.as_ref()
    }

    /// Access the archive service.
    #[must_use]
    pub fn archiver(&self) -> &dyn Archiver {
        self.archiver.as_ref()
    }

    /// Open the transaction of one public mutation.
    pub(crate) async fn begin(&self) -> Result<Transaction, DatabaseError> {
        Ok(self.db.conn().transaction().await?)
    }

    /// Commit and flush the buffered trail.
    ///
    /// Trail failures after a successful commit are logged, not returned:
    /// the database already holds the change.
    pub(crate) async fn commit(
        &self,
        tx: Transaction,
        journal: Journal,
    ) -> Result<(), DatabaseError> {
        tx.commit().await?;
        if let Err(error) = self.trail.append_all(&journal.0) {
            tracing::warn!(%error, ops = journal.0.len(), "trail: append after commit failed");
        }
        Ok(())
    }

    /// Commit on success, roll back on failure.
    pub(crate) async fn finish<T, E>(
        &self,
        tx: Transaction,
        journal: Journal,
        outcome: Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DatabaseError> + std::fmt::Display,
    {
        match outcome {
            Ok(value) => {
                self.commit(tx, journal).await?;
                Ok(value)
            }
            Err(error) => Err(rollback(tx, error).await),
        }
    }

    /// Record an audit row on `conn` and buffer the matching trail operation.
    pub(crate) async fn record(
        &self,
        conn: &Connection,
        journal: &mut Journal,
        change: Change<'_>,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let audit_id = self.db.generate_id(PREFIX_AUDIT).await?;
        append_audit(
            conn,
            &AuditEntry {
                id: audit_id,
                actor_id: Some(change.actor.to_string()),
                entity_type: change.entity_type,
                entity_id: change.entity_id.to_string(),
                action: change.action,
                detail: change.detail.clone(),
                created_at: now,
            },
        )
        .await?;

        if let Some(op) = change.action.trail_op() {
            journal.0.push(TrailOperation {
                v: 1,
                ts: now.to_rfc3339(),
                actor: change.actor.to_string(),
                op,
                entity: change.entity_type,
                id: change.entity_id.to_string(),
                data: change
                    .data
                    .or(change.detail)
                    .unwrap_or_else(|| serde_json::json!({})),
            });
        }
        Ok(())
    }
}

/// Roll back after a failed step and hand the original error back.
pub(crate) async fn rollback<E>(tx: Transaction, error: E) -> E
where
    E: std::fmt::Display,
{
    if let Err(rollback_error) = tx.rollback().await {
        tracing::warn!(%error, %rollback_error, "rollback failed");
    } else {
        tracing::debug!(%error, "rolled back");
    }
    error
}
