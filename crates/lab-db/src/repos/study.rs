//! Study repository: rows, members, and the field writes composed by the
//! study lifecycle.

use chrono::{DateTime, Utc};
use lab_core::draft::StudyDraft;
use lab_core::entities::{Study, User};
use lab_core::enums::EntityType;
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{flag, get_flag, get_opt_string, normalize_json, parse_datetime};
use crate::service::LabService;
use crate::store::{self, StoredEntity};
use crate::updates::study::StudyUpdate;

impl StoredEntity for Study {
    const TABLE: &'static str = "studies";
    const COLUMNS: &'static str =
        "id, title, description, json_data, locked, created_at, updated_at";
    const ENTITY_TYPE: EntityType = EntityType::Study;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            json_data: get_opt_string(row, 3)?,
            locked: get_flag(row, 4)?,
            created_at: parse_datetime(&row.get::<String>(5)?)?,
            updated_at: parse_datetime(&row.get::<String>(6)?)?,
        })
    }
}

/// Insert an unlocked study built from a validated draft.
pub(crate) async fn insert_study_in(
    conn: &Connection,
    id: String,
    draft: &StudyDraft,
    now: DateTime<Utc>,
) -> Result<Study, DatabaseError> {
    let study = Study {
        id,
        title: draft.title.trim().to_string(),
        description: draft.description.clone(),
        json_data: normalize_json(draft.json_data.as_deref()),
        locked: false,
        created_at: now,
        updated_at: now,
    };
    conn.execute(
        "INSERT INTO studies (id, title, description, json_data, locked, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
        libsql::params![
            study.id.as_str(),
            study.title.as_str(),
            study.description.as_str(),
            study.json_data.as_deref(),
            now.to_rfc3339(),
            now.to_rfc3339()
        ],
    )
    .await?;
    Ok(study)
}

/// Apply the `Some` fields of an update. No-op for an empty update.
pub(crate) async fn update_study_in(
    conn: &Connection,
    study_id: &str,
    update: &StudyUpdate,
) -> Result<(), DatabaseError> {
    let mut sets = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();
    let mut idx = 1;

    if let Some(ref title) = update.title {
        sets.push(format!("title = ?{idx}"));
        params.push(title.trim().into());
        idx += 1;
    }
    if let Some(ref description) = update.description {
        sets.push(format!("description = ?{idx}"));
        params.push(description.as_str().into());
        idx += 1;
    }
    if let Some(ref json_data) = update.json_data {
        sets.push(format!("json_data = ?{idx}"));
        params.push(normalize_json(json_data.as_deref()).into());
        idx += 1;
    }

    if sets.is_empty() {
        return Ok(());
    }

    sets.push(format!("updated_at = ?{idx}"));
    params.push(Utc::now().to_rfc3339().into());
    idx += 1;

    let sql = format!("UPDATE studies SET {} WHERE id = ?{idx}", sets.join(", "));
    params.push(study_id.into());

    conn.execute(&sql, libsql::params_from_iter(params)).await?;
    Ok(())
}

pub(crate) async fn set_locked_in(
    conn: &Connection,
    study_id: &str,
    locked: bool,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE studies SET locked = ?1, updated_at = ?2 WHERE id = ?3",
        libsql::params![flag(locked), Utc::now().to_rfc3339(), study_id],
    )
    .await?;
    Ok(())
}

pub(crate) async fn add_member_in(
    conn: &Connection,
    study_id: &str,
    user_id: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO study_members (study_id, user_id) VALUES (?1, ?2)",
        [study_id, user_id],
    )
    .await?;
    Ok(())
}

pub(crate) async fn clear_members_in(conn: &Connection, study_id: &str) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM study_members WHERE study_id = ?1", [study_id])
        .await?;
    Ok(())
}

impl LabService {
    /// Fetch a study without any membership check.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn get_study(&self, id: &str) -> Result<Study, DatabaseError> {
        store::get(self.db().conn(), id).await
    }

    /// Studies the user is a member of, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_studies_of_user(&self, user_id: &str) -> Result<Vec<Study>, DatabaseError> {
        store::select(
            self.db().conn(),
            "WHERE id IN (SELECT study_id FROM study_members WHERE user_id = ?1) ORDER BY rowid",
            [user_id],
        )
        .await
    }

    /// Members of a study, in registration order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_members(&self, study_id: &str) -> Result<Vec<User>, DatabaseError> {
        store::select(
            self.db().conn(),
            "WHERE id IN (SELECT user_id FROM study_members WHERE study_id = ?1) ORDER BY rowid",
            [study_id],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn is_member(&self, study_id: &str, user_id: &str) -> Result<bool, DatabaseError> {
        let n = store::scalar(
            self.db().conn(),
            "SELECT COUNT(*) FROM study_members WHERE study_id = ?1 AND user_id = ?2",
            [study_id, user_id],
        )
        .await?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::helpers::{test_service, test_user};
    use crate::updates::study::StudyUpdateBuilder;

    async fn seed_study(svc: &LabService, title: &str) -> Study {
        let draft = StudyDraft::new(title).json_data("  ");
        insert_study_in(svc.db().conn(), svc.db().generate_id("stu").await.unwrap(), &draft, Utc::now())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_normalizes_blank_json() {
        let (svc, _tmp) = test_service().await;
        let study = seed_study(&svc, " Stroop ").await;
        assert_eq!(study.title, "Stroop");
        assert_eq!(study.json_data, None);
        assert_eq!(svc.get_study(&study.id).await.unwrap(), study);
    }

    #[tokio::test]
    async fn partial_update_touches_only_given_fields() {
        let (svc, _tmp) = test_service().await;
        let study = seed_study(&svc, "Stroop").await;
        let update = StudyUpdateBuilder::new()
            .json_data(Some(r#"{"trials": 3}"#.into()))
            .build();
        update_study_in(svc.db().conn(), &study.id, &update).await.unwrap();

        let fresh = svc.get_study(&study.id).await.unwrap();
        assert_eq!(fresh.title, "Stroop");
        assert_eq!(fresh.json_data.as_deref(), Some(r#"{"trials": 3}"#));
        assert!(fresh.updated_at >= study.updated_at);
    }

    #[tokio::test]
    async fn membership_roundtrip() {
        let (svc, _tmp) = test_service().await;
        let study = seed_study(&svc, "Stroop").await;
        let ada = test_user(&svc, "ada@example.org").await;
        let bob = test_user(&svc, "bob@example.org").await;

        add_member_in(svc.db().conn(), &study.id, &ada.id).await.unwrap();
        add_member_in(svc.db().conn(), &study.id, &ada.id).await.unwrap();
        add_member_in(svc.db().conn(), &study.id, &bob.id).await.unwrap();
        assert_eq!(svc.find_members(&study.id).await.unwrap(), vec![ada.clone(), bob.clone()]);
        assert!(svc.is_member(&study.id, &bob.id).await.unwrap());
        assert_eq!(svc.find_studies_of_user(&ada.id).await.unwrap(), vec![study.clone()]);

        clear_members_in(svc.db().conn(), &study.id).await.unwrap();
        assert!(!svc.is_member(&study.id, &ada.id).await.unwrap());
    }

    #[tokio::test]
    async fn lock_flag_persists() {
        let (svc, _tmp) = test_service().await;
        let study = seed_study(&svc, "Stroop").await;
        set_locked_in(svc.db().conn(), &study.id, true).await.unwrap();
        assert!(svc.get_study(&study.id).await.unwrap().locked);
    }
}
