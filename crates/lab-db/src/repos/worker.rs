//! Worker repository.
//!
//! A worker's result collection is not stored on the worker: it is the set of
//! `study_results` rows whose `worker_id` points at it.

use chrono::Utc;
use lab_core::entities::{StudyResult, User, Worker};
use lab_core::enums::{AuditAction, EntityType, WorkerType};
use lab_core::ids::PREFIX_WORKER;
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, to_json};
use crate::lifecycle::LifecycleError;
use crate::service::{Change, Journal, LabService};
use crate::store::{self, StoredEntity};

impl StoredEntity for Worker {
    const TABLE: &'static str = "workers";
    const COLUMNS: &'static str = "id, worker_type, user_id, created_at, updated_at";
    const ENTITY_TYPE: EntityType = EntityType::Worker;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            worker_type: parse_enum(&row.get::<String>(1)?)?,
            user_id: get_opt_string(row, 2)?,
            created_at: parse_datetime(&row.get::<String>(3)?)?,
            updated_at: parse_datetime(&row.get::<String>(4)?)?,
        })
    }
}

/// Mark a worker as modified (its result collection changed).
pub(crate) async fn touch_worker_in(conn: &Connection, worker_id: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE workers SET updated_at = ?1 WHERE id = ?2",
        libsql::params![Utc::now().to_rfc3339(), worker_id],
    )
    .await?;
    Ok(())
}

impl LabService {
    /// Register a worker.
    ///
    /// Maintenance workers must belong to a user: they record the user's own
    /// test runs. Other worker types may optionally name a user.
    ///
    /// # Errors
    ///
    /// `Validation` for a maintenance worker without a user, `NotFound` for
    /// an unknown user.
    pub async fn create_worker(
        &self,
        worker_type: WorkerType,
        user: Option<&User>,
    ) -> Result<Worker, LifecycleError> {
        if worker_type.is_maintenance() && user.is_none() {
            return Err(LifecycleError::Validation(
                "a maintenance worker must belong to a user".into(),
            ));
        }
        if let Some(user) = user {
            store::get::<User>(self.db().conn(), &user.id).await?;
        }

        let now = Utc::now();
        let worker = Worker {
            id: self.db().generate_id(PREFIX_WORKER).await?,
            worker_type,
            user_id: user.map(|u| u.id.clone()),
            created_at: now,
            updated_at: now,
        };
        let actor = worker.user_id.clone().unwrap_or_else(|| worker.id.clone());

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            tx.execute(
                "INSERT INTO workers (id, worker_type, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    worker.id.as_str(),
                    worker.worker_type.as_str(),
                    worker.user_id.as_deref(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(&actor, EntityType::Worker, &worker.id, AuditAction::Created)
                    .data(to_json(&worker)?),
            )
            .await
        }
        .await;
        self.finish(tx, journal, step).await?;

        tracing::info!(worker_id = %worker.id, worker_type = %worker.worker_type, "worker: created");
        Ok(worker)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn get_worker(&self, id: &str) -> Result<Worker, DatabaseError> {
        store::get(self.db().conn(), id).await
    }

    /// Workers owned by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_workers_of_user(&self, user_id: &str) -> Result<Vec<Worker>, DatabaseError> {
        store::select(self.db().conn(), "WHERE user_id = ?1 ORDER BY rowid", [user_id]).await
    }

    /// The worker's result collection, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_results_of_worker(
        &self,
        worker_id: &str,
    ) -> Result<Vec<StudyResult>, DatabaseError> {
        store::select(self.db().conn(), "WHERE worker_id = ?1 ORDER BY rowid", [worker_id]).await
    }
}
