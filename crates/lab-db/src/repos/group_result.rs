//! Group result repository.
//!
//! A group owns its study results through `group_result_members`; the
//! unique `study_result_id` column doubles as the result-to-group lookup.

use chrono::{DateTime, Utc};
use lab_core::entities::{GroupResult, StudyResult};
use lab_core::enums::EntityType;
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::service::LabService;
use crate::store::{self, StoredEntity};

impl StoredEntity for GroupResult {
    const TABLE: &'static str = "group_results";
    const COLUMNS: &'static str = "id, study_id, created_at, updated_at";
    const ENTITY_TYPE: EntityType = EntityType::GroupResult;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            study_id: row.get(1)?,
            created_at: parse_datetime(&row.get::<String>(2)?)?,
            updated_at: parse_datetime(&row.get::<String>(3)?)?,
        })
    }
}

pub(crate) async fn insert_group_result_in(
    conn: &Connection,
    id: String,
    study_id: &str,
    now: DateTime<Utc>,
) -> Result<GroupResult, DatabaseError> {
    conn.execute(
        "INSERT INTO group_results (id, study_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        libsql::params![id.as_str(), study_id, now.to_rfc3339(), now.to_rfc3339()],
    )
    .await?;
    Ok(GroupResult {
        id,
        study_id: study_id.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// The group a study result belongs to, if any.
pub(crate) async fn group_of_result_in(
    conn: &Connection,
    study_result_id: &str,
) -> Result<Option<String>, DatabaseError> {
    let mut ids = store::ids(
        conn,
        "SELECT group_result_id FROM group_result_members WHERE study_result_id = ?1",
        [study_result_id],
    )
    .await?;
    Ok(ids.pop())
}

pub(crate) async fn add_group_member_in(
    conn: &Connection,
    group_result_id: &str,
    study_result_id: &str,
) -> Result<(), DatabaseError> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO group_result_members (group_result_id, study_result_id, joined_at) VALUES (?1, ?2, ?3)",
        libsql::params![group_result_id, study_result_id, now.as_str()],
    )
    .await?;
    touch_group_in(conn, group_result_id).await
}

/// Detach a result from its group. Returns the members left in the group.
pub(crate) async fn remove_group_member_in(
    conn: &Connection,
    group_result_id: &str,
    study_result_id: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "DELETE FROM group_result_members WHERE group_result_id = ?1 AND study_result_id = ?2",
        [group_result_id, study_result_id],
    )
    .await?;
    store::scalar(
        conn,
        "SELECT COUNT(*) FROM group_result_members WHERE group_result_id = ?1",
        [group_result_id],
    )
    .await
}

pub(crate) async fn touch_group_in(conn: &Connection, group_result_id: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE group_results SET updated_at = ?1 WHERE id = ?2",
        libsql::params![Utc::now().to_rfc3339(), group_result_id],
    )
    .await?;
    Ok(())
}

/// Groups of a study that own no results.
pub(crate) async fn empty_groups_of_study_in(
    conn: &Connection,
    study_id: &str,
) -> Result<Vec<String>, DatabaseError> {
    store::ids(
        conn,
        "SELECT id FROM group_results g
         WHERE g.study_id = ?1
           AND NOT EXISTS (SELECT 1 FROM group_result_members m WHERE m.group_result_id = g.id)
         ORDER BY g.rowid",
        [study_id],
    )
    .await
}

impl LabService {
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn get_group_result(&self, id: &str) -> Result<GroupResult, DatabaseError> {
        store::get(self.db().conn(), id).await
    }

    /// Study results owned by a group, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_group_members(
        &self,
        group_result_id: &str,
    ) -> Result<Vec<StudyResult>, DatabaseError> {
        store::select(
            self.db().conn(),
            "WHERE id IN (SELECT study_result_id FROM group_result_members WHERE group_result_id = ?1)
             ORDER BY rowid",
            [group_result_id],
        )
        .await
    }

    /// Group results of a study, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_group_results_of_study(
        &self,
        study_id: &str,
    ) -> Result<Vec<GroupResult>, DatabaseError> {
        store::select(self.db().conn(), "WHERE study_id = ?1 ORDER BY rowid", [study_id]).await
    }

    /// The group a study result belongs to, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_group_of_result(
        &self,
        study_result_id: &str,
    ) -> Result<Option<GroupResult>, DatabaseError> {
        match group_of_result_in(self.db().conn(), study_result_id).await? {
            Some(id) => store::find(self.db().conn(), &id).await,
            None => Ok(None),
        }
    }
}
