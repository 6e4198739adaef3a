//! User repository: the user directory consulted by membership changes.

use chrono::Utc;
use lab_core::entities::User;
use lab_core::enums::{AuditAction, EntityType};
use lab_core::ids::PREFIX_USER;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, to_json};
use crate::lifecycle::LifecycleError;
use crate::service::{Change, Journal, LabService};
use crate::store::{self, StoredEntity};

impl StoredEntity for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = "id, email, name, created_at";
    const ENTITY_TYPE: EntityType = EntityType::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            created_at: parse_datetime(&row.get::<String>(3)?)?,
        })
    }
}

/// Emails are stored and matched trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl LabService {
    /// Register a user. The new user is the actor of its own audit entry.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed or already registered email, or a blank name.
    pub async fn create_user(&self, email: &str, name: &str) -> Result<User, LifecycleError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(LifecycleError::Validation(format!(
                "'{email}' is not a valid email address"
            )));
        }
        if name.trim().is_empty() {
            return Err(LifecycleError::Validation("user name must not be empty".into()));
        }
        if self.find_user_by_email(&email).await?.is_some() {
            return Err(LifecycleError::Validation(format!(
                "a user with email {email} already exists"
            )));
        }

        let user = User {
            id: self.db().generate_id(PREFIX_USER).await?,
            email,
            name: name.trim().to_string(),
            created_at: Utc::now(),
        };

        let tx = self.begin().await?;
        let mut journal = Journal::default();
        let step = async {
            tx.execute(
                "INSERT INTO users (id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    user.id.as_str(),
                    user.email.as_str(),
                    user.name.as_str(),
                    user.created_at.to_rfc3339()
                ],
            )
            .await?;
            self.record(
                &tx,
                &mut journal,
                Change::new(&user.id, EntityType::User, &user.id, AuditAction::Created)
                    .data(to_json(&user)?),
            )
            .await
        }
        .await;
        self.finish(tx, journal, step).await?;

        tracing::info!(user_id = %user.id, "user: created");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        store::get(self.db().conn(), id).await
    }

    /// Case-insensitive lookup. `None` if nobody registered the address.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut users: Vec<User> = store::select(
            self.db().conn(),
            "WHERE email = ?1",
            [normalize_email(email)],
        )
        .await?;
        Ok(users.pop())
    }

    /// All users in registration order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_all_users(&self) -> Result<Vec<User>, DatabaseError> {
        store::select(self.db().conn(), "ORDER BY rowid", ()).await
    }
}
