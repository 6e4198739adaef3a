//! Component result repository.

use chrono::{DateTime, Utc};
use lab_core::entities::ComponentResult;
use lab_core::enums::EntityType;
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::LabService;
use crate::store::{self, StoredEntity};

impl StoredEntity for ComponentResult {
    const TABLE: &'static str = "component_results";
    const COLUMNS: &'static str = "id, study_result_id, component_id, data, created_at";
    const ENTITY_TYPE: EntityType = EntityType::ComponentResult;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            study_result_id: row.get(1)?,
            component_id: row.get(2)?,
            data: get_opt_string(row, 3)?,
            created_at: parse_datetime(&row.get::<String>(4)?)?,
        })
    }
}

pub(crate) async fn insert_component_result_in(
    conn: &Connection,
    id: String,
    study_result_id: &str,
    component_id: &str,
    data: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ComponentResult, DatabaseError> {
    conn.execute(
        "INSERT INTO component_results (id, study_result_id, component_id, data, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        libsql::params![id.as_str(), study_result_id, component_id, data, now.to_rfc3339()],
    )
    .await?;
    Ok(ComponentResult {
        id,
        study_result_id: study_result_id.to_string(),
        component_id: component_id.to_string(),
        data: data.map(String::from),
        created_at: now,
    })
}

/// Remove every component result of one study result. Returns how many went.
pub(crate) async fn delete_component_results_of_in(
    conn: &Connection,
    study_result_id: &str,
) -> Result<u64, DatabaseError> {
    Ok(conn
        .execute(
            "DELETE FROM component_results WHERE study_result_id = ?1",
            [study_result_id],
        )
        .await?)
}

/// Remove every component result produced from one component.
pub(crate) async fn delete_component_results_of_component_in(
    conn: &Connection,
    component_id: &str,
) -> Result<u64, DatabaseError> {
    Ok(conn
        .execute(
            "DELETE FROM component_results WHERE component_id = ?1",
            [component_id],
        )
        .await?)
}

impl LabService {
    /// Component results of one study result, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_component_results(
        &self,
        study_result_id: &str,
    ) -> Result<Vec<ComponentResult>, DatabaseError> {
        store::select(
            self.db().conn(),
            "WHERE study_result_id = ?1 ORDER BY rowid",
            [study_result_id],
        )
        .await
    }
}
