//! # lab-db
//!
//! libSQL entity store and the study/result lifecycle built on top of it.
//!
//! Layers, leaves first:
//! - [`store`]: generic read/refresh/delete primitives over any stored entity
//! - [`repos`]: per-entity inserts and lookups, audit trail
//! - [`lifecycle`]: result cascade removal, study lifecycle, import/export
//!
//! Every public mutation runs in one libSQL transaction and records an audit
//! row plus a JSONL trail line. Asset directories are handled by an
//! [`lab_assets::AssetStore`] outside the transaction.

pub mod error;
pub mod helpers;
pub mod lifecycle;
mod migrations;
pub mod repos;
pub mod service;
pub mod store;
pub mod trail;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
///
/// Wraps a libSQL database and its single connection. Provides ID generation.
pub struct LabDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LabDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let lab_db = Self { db, conn };
        lab_db.run_migrations().await?;
        tracing::debug!(path, "db: opened");
        Ok(lab_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"stu-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> LabDb {
        LabDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "users",
            "studies",
            "study_members",
            "components",
            "workers",
            "study_results",
            "component_results",
            "group_results",
            "group_result_members",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("stu").await.unwrap();
        assert!(id.starts_with("stu-"), "ID should start with 'stu-': {id}");
        assert_eq!(
            id.len(),
            12,
            "ID should be 12 chars (3 prefix + 1 dash + 8 hex): {id}"
        );

        let hex_part = &id[4..];
        assert!(
            hex_part.chars().all(|c| c.is_ascii_hexdigit()),
            "Random part should be hex: {hex_part}"
        );
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in lab_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("srs").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO study_results (id, study_id) VALUES ('srs-1', 'stu-missing')",
                (),
            )
            .await;
        assert!(result.is_err(), "dangling study reference must be rejected");
    }

    #[tokio::test]
    async fn group_membership_is_unique_per_result() {
        let db = test_db().await;
        db.conn()
            .execute_batch(
                "INSERT INTO studies (id, title) VALUES ('stu-1', 'S');
                 INSERT INTO study_results (id, study_id) VALUES ('srs-1', 'stu-1');
                 INSERT INTO group_results (id, study_id) VALUES ('grp-1', 'stu-1');
                 INSERT INTO group_results (id, study_id) VALUES ('grp-2', 'stu-1');
                 INSERT INTO group_result_members (group_result_id, study_result_id) VALUES ('grp-1', 'srs-1');",
            )
            .await
            .unwrap();

        let second = db
            .conn()
            .execute(
                "INSERT INTO group_result_members (group_result_id, study_result_id) VALUES ('grp-2', 'srs-1')",
                (),
            )
            .await;
        assert!(second.is_err(), "a result belongs to at most one group");
    }
}
