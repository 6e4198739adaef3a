//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation, with dynamic filtering.

use lab_core::entities::AuditEntry;
use lab_core::enums::{AuditAction, EntityType};
use libsql::Connection;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::LabService;
use crate::store::StoredEntity;

impl StoredEntity for AuditEntry {
    const TABLE: &'static str = "audit_trail";
    const COLUMNS: &'static str = "id, actor_id, entity_type, entity_id, action, detail, created_at";
    const ENTITY_TYPE: EntityType = EntityType::Audit;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get::<String>(0)?,
            actor_id: get_opt_string(row, 1)?,
            entity_type: parse_enum(&row.get::<String>(2)?)?,
            entity_id: row.get::<String>(3)?,
            action: parse_enum(&row.get::<String>(4)?)?,
            detail: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
            created_at: parse_datetime(&row.get::<String>(6)?)?,
        })
    }
}

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub limit: Option<u32>,
}

/// Append an audit entry on `conn` (usually an open transaction).
///
/// # Errors
///
/// Returns `DatabaseError` if the INSERT fails.
pub(crate) async fn append_audit(conn: &Connection, entry: &AuditEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_trail (id, actor_id, entity_type, entity_id, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            entry.id.as_str(),
            entry.actor_id.as_deref(),
            entry.entity_type.as_str(),
            entry.entity_id.as_str(),
            entry.action.as_str(),
            entry.detail.as_ref().map(std::string::ToString::to_string).as_deref(),
            entry.created_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

impl LabService {
    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ref action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor_id {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        crate::store::select(
            self.db().conn(),
            &format!("{where_clause} ORDER BY created_at DESC, rowid DESC LIMIT {limit}"),
            libsql::params_from_iter(params),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::helpers::test_service;

    async fn seed(svc: &LabService, id: &str, entity_id: &str, action: AuditAction) {
        append_audit(
            svc.db().conn(),
            &AuditEntry {
                id: id.into(),
                actor_id: Some("usr-1".into()),
                entity_type: EntityType::Study,
                entity_id: entity_id.into(),
                action,
                detail: Some(serde_json::json!({"n": 1})),
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn filters_combine() {
        let (svc, _tmp) = test_service().await;
        seed(&svc, "aud-1", "stu-1", AuditAction::Created).await;
        seed(&svc, "aud-2", "stu-1", AuditAction::Locked).await;
        seed(&svc, "aud-3", "stu-2", AuditAction::Created).await;

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let created_stu1 = svc
            .query_audit(&AuditFilter {
                entity_id: Some("stu-1".into()),
                action: Some(AuditAction::Created),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(created_stu1.len(), 1);
        assert_eq!(created_stu1[0].id, "aud-1");
        assert_eq!(created_stu1[0].detail, Some(serde_json::json!({"n": 1})));
    }

    #[tokio::test]
    async fn limit_is_applied() {
        let (svc, _tmp) = test_service().await;
        for i in 0..5 {
            seed(&svc, &format!("aud-{i}"), "stu-1", AuditAction::Updated).await;
        }
        let limited = svc
            .query_audit(&AuditFilter {
                limit: Some(2),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }
}
