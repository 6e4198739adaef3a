//! Component repository.
//!
//! Positions are dense and 0-based per study. Writers that change the set of
//! components call [`normalize_positions_in`] before committing.

use chrono::{DateTime, Utc};
use lab_core::draft::ComponentDraft;
use lab_core::entities::Component;
use lab_core::enums::EntityType;
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{
    flag, get_flag, get_opt_string, get_u32, normalize_json, parse_datetime,
};
use crate::service::LabService;
use crate::store::{self, StoredEntity};

impl StoredEntity for Component {
    const TABLE: &'static str = "components";
    const COLUMNS: &'static str = "id, study_id, position, title, html_file_path, json_data, reloadable, active, created_at, updated_at";
    const ENTITY_TYPE: EntityType = EntityType::Component;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            study_id: row.get(1)?,
            position: get_u32(row, 2)?,
            title: row.get(3)?,
            html_file_path: get_opt_string(row, 4)?,
            json_data: get_opt_string(row, 5)?,
            reloadable: get_flag(row, 6)?,
            active: get_flag(row, 7)?,
            created_at: parse_datetime(&row.get::<String>(8)?)?,
            updated_at: parse_datetime(&row.get::<String>(9)?)?,
        })
    }
}

/// Components of a study ordered by position.
pub(crate) async fn components_of_in(
    conn: &Connection,
    study_id: &str,
) -> Result<Vec<Component>, DatabaseError> {
    store::select(conn, "WHERE study_id = ?1 ORDER BY position, rowid", [study_id]).await
}

pub(crate) async fn insert_component_in(
    conn: &Connection,
    id: String,
    study_id: &str,
    position: u32,
    draft: &ComponentDraft,
    now: DateTime<Utc>,
) -> Result<Component, DatabaseError> {
    let component = Component {
        id,
        study_id: study_id.to_string(),
        position,
        title: draft.title.trim().to_string(),
        html_file_path: draft.html_file_path.clone().filter(|p| !p.trim().is_empty()),
        json_data: normalize_json(draft.json_data.as_deref()),
        reloadable: draft.reloadable,
        active: draft.active,
        created_at: now,
        updated_at: now,
    };
    conn.execute(
        "INSERT INTO components (id, study_id, position, title, html_file_path, json_data, reloadable, active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        libsql::params![
            component.id.as_str(),
            component.study_id.as_str(),
            i64::from(component.position),
            component.title.as_str(),
            component.html_file_path.as_deref(),
            component.json_data.as_deref(),
            flag(component.reloadable),
            flag(component.active),
            now.to_rfc3339(),
            now.to_rfc3339()
        ],
    )
    .await?;
    Ok(component)
}

pub(crate) async fn set_position_in(
    conn: &Connection,
    component_id: &str,
    position: usize,
) -> Result<(), DatabaseError> {
    let position = i64::try_from(position)
        .map_err(|_| DatabaseError::InvalidState(format!("position {position} out of range")))?;
    conn.execute(
        "UPDATE components SET position = ?1, updated_at = ?2 WHERE id = ?3",
        libsql::params![position, Utc::now().to_rfc3339(), component_id],
    )
    .await?;
    Ok(())
}

/// Renumber a study's components to 0..N-1, keeping their relative order.
///
/// Rows already at the right position are left alone.
pub(crate) async fn normalize_positions_in(
    conn: &Connection,
    study_id: &str,
) -> Result<Vec<Component>, DatabaseError> {
    let mut components = components_of_in(conn, study_id).await?;
    for (index, component) in components.iter_mut().enumerate() {
        if component.position as usize != index {
            set_position_in(conn, &component.id, index).await?;
            component.position = u32::try_from(index).map_err(|_| {
                DatabaseError::InvalidState(format!("position {index} out of range"))
            })?;
        }
    }
    Ok(components)
}

impl LabService {
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn get_component(&self, id: &str) -> Result<Component, DatabaseError> {
        store::get(self.db().conn(), id).await
    }

    /// Components of a study in order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_components(&self, study_id: &str) -> Result<Vec<Component>, DatabaseError> {
        components_of_in(self.db().conn(), study_id).await
    }
}

#[cfg(test)]
mod tests {
    use lab_core::draft::StudyDraft;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::repos::study::insert_study_in;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn normalize_closes_gaps_and_keeps_order() {
        let (svc, _tmp) = test_service().await;
        let conn = svc.db().conn();
        let study = insert_study_in(conn, "stu-1".into(), &StudyDraft::new("S"), Utc::now())
            .await
            .unwrap();
        for (id, pos) in [("cmp-a", 0), ("cmp-b", 4), ("cmp-c", 7)] {
            insert_component_in(conn, id.into(), &study.id, pos, &ComponentDraft::new(id), Utc::now())
                .await
                .unwrap();
        }

        let normalized = normalize_positions_in(conn, &study.id).await.unwrap();
        let layout: Vec<(String, u32)> = normalized
            .into_iter()
            .map(|c| (c.id, c.position))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("cmp-a".to_string(), 0),
                ("cmp-b".to_string(), 1),
                ("cmp-c".to_string(), 2)
            ]
        );

        let persisted: Vec<u32> = svc
            .find_components(&study.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.position)
            .collect();
        assert_eq!(persisted, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn insert_keeps_draft_flags() {
        let (svc, _tmp) = test_service().await;
        let conn = svc.db().conn();
        insert_study_in(conn, "stu-1".into(), &StudyDraft::new("S"), Utc::now())
            .await
            .unwrap();
        let draft = ComponentDraft::new("task")
            .html_file_path("task.html")
            .reloadable(true);
        let component = insert_component_in(conn, "cmp-1".into(), "stu-1", 0, &draft, Utc::now())
            .await
            .unwrap();
        let fetched = svc.get_component("cmp-1").await.unwrap();
        assert_eq!(fetched, component);
        assert!(fetched.reloadable);
        assert!(fetched.active);
    }
}
