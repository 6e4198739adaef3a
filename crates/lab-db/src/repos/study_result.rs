//! Study result repository.
//!
//! Results are ordered by insertion (`rowid`), which is creation order.

use chrono::{DateTime, Utc};
use lab_core::entities::StudyResult;
use lab_core::enums::{EntityType, WorkerType};
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::LabService;
use crate::store::{self, StoredEntity};

impl StoredEntity for StudyResult {
    const TABLE: &'static str = "study_results";
    const COLUMNS: &'static str = "id, study_id, worker_id, created_at";
    const ENTITY_TYPE: EntityType = EntityType::StudyResult;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            study_id: row.get(1)?,
            worker_id: get_opt_string(row, 2)?,
            created_at: parse_datetime(&row.get::<String>(3)?)?,
        })
    }
}

pub(crate) async fn insert_study_result_in(
    conn: &Connection,
    id: String,
    study_id: &str,
    worker_id: &str,
    now: DateTime<Utc>,
) -> Result<StudyResult, DatabaseError> {
    conn.execute(
        "INSERT INTO study_results (id, study_id, worker_id, created_at) VALUES (?1, ?2, ?3, ?4)",
        libsql::params![id.as_str(), study_id, worker_id, now.to_rfc3339()],
    )
    .await?;
    Ok(StudyResult {
        id,
        study_id: study_id.to_string(),
        worker_id: Some(worker_id.to_string()),
        created_at: now,
    })
}

/// Ids of a study's results in creation order.
pub(crate) async fn result_ids_of_study_in(
    conn: &Connection,
    study_id: &str,
) -> Result<Vec<String>, DatabaseError> {
    store::ids(
        conn,
        "SELECT id FROM study_results WHERE study_id = ?1 ORDER BY rowid",
        [study_id],
    )
    .await
}

impl LabService {
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn get_study_result(&self, id: &str) -> Result<StudyResult, DatabaseError> {
        store::get(self.db().conn(), id).await
    }

    /// All results of a study in creation order, whatever produced them.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_results_of_study(
        &self,
        study_id: &str,
    ) -> Result<Vec<StudyResult>, DatabaseError> {
        store::select(self.db().conn(), "WHERE study_id = ?1 ORDER BY rowid", [study_id]).await
    }

    /// Results of a study except those from maintenance workers (members
    /// trying out their own study).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_results_of_study_excluding_maintenance(
        &self,
        study_id: &str,
    ) -> Result<Vec<StudyResult>, DatabaseError> {
        store::select(
            self.db().conn(),
            "WHERE study_id = ?1
               AND (worker_id IS NULL
                    OR worker_id NOT IN (SELECT id FROM workers WHERE worker_type = ?2))
             ORDER BY rowid",
            [study_id, WorkerType::Maintenance.as_str()],
        )
        .await
    }

    /// Number of results of a study, all worker types included.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_results_of_study(&self, study_id: &str) -> Result<u64, DatabaseError> {
        let n = store::scalar(
            self.db().conn(),
            "SELECT COUNT(*) FROM study_results WHERE study_id = ?1",
            [study_id],
        )
        .await?;
        u64::try_from(n).map_err(|_| DatabaseError::InvalidState(format!("negative count {n}")))
    }
}

#[cfg(test)]
mod tests {
    use lab_core::enums::WorkerType;
    use pretty_assertions::assert_eq;

    use crate::error::DatabaseError;
    use crate::test_support::helpers::{test_service, test_study, test_user};

    #[tokio::test]
    async fn results_keep_creation_order() {
        let (svc, _tmp) = test_service().await;
        let owner = test_user(&svc, "ada@example.org").await;
        let study = test_study(&svc, &owner, &["intro"]).await;
        let worker = svc.create_worker(WorkerType::Plain, None).await.unwrap();

        let mut created = Vec::new();
        for _ in 0..3 {
            created.push(svc.create_result(&study.id, &worker.id).await.unwrap().id);
        }

        let listed: Vec<String> = svc
            .find_results_of_study(&study.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, created);
        assert_eq!(svc.count_results_of_study(&study.id).await.unwrap(), 3);

        let fetched = svc.get_study_result(&created[0]).await.unwrap();
        assert_eq!(fetched.worker_id.as_deref(), Some(worker.id.as_str()));
    }

    #[tokio::test]
    async fn unknown_result_is_not_found() {
        let (svc, _tmp) = test_service().await;
        let err = svc.get_study_result("srs-missing").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
