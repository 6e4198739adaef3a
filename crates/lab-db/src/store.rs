//! Generic entity store primitives.
//!
//! Every stored entity declares its table, column list and row mapping via
//! [`StoredEntity`]. The functions here read, refresh and delete any such
//! entity on a given connection, which may be the plain connection or an open
//! transaction (a `libsql::Transaction` derefs to its `Connection`).

use lab_core::enums::EntityType;
use libsql::Connection;

use crate::error::DatabaseError;

/// An entity persisted as one row of one table, keyed by a TEXT `id`.
pub trait StoredEntity: Sized {
    /// Table name.
    const TABLE: &'static str;
    /// Column list in `from_row` order; the first column is always `id`.
    const COLUMNS: &'static str;
    /// Entity kind, for errors and audit entries.
    const ENTITY_TYPE: EntityType;

    fn id(&self) -> &str;

    /// Map one row selected with [`Self::COLUMNS`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a column is missing or malformed.
    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError>;
}

/// Look up an entity by id.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn find<T: StoredEntity>(conn: &Connection, id: &str) -> Result<Option<T>, DatabaseError> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", T::COLUMNS, T::TABLE);
    let mut rows = conn.query(&sql, [id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(T::from_row(&row)?)),
        None => Ok(None),
    }
}

/// Fetch an entity that must exist.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if there is no such row.
pub async fn get<T: StoredEntity>(conn: &Connection, id: &str) -> Result<T, DatabaseError> {
    find(conn, id).await?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: T::ENTITY_TYPE,
        id: id.to_string(),
    })
}

/// Whether a row with this id exists.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn exists<T: StoredEntity>(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", T::TABLE);
    let mut rows = conn.query(&sql, [id]).await?;
    Ok(rows.next().await?.is_some())
}

/// Re-read the persisted state of an in-memory entity.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if the entity has been removed.
pub async fn refresh<T: StoredEntity>(conn: &Connection, entity: &T) -> Result<T, DatabaseError> {
    get(conn, entity.id()).await
}

/// Delete by id. Returns whether a row was removed; deleting twice is not an error.
///
/// # Errors
///
/// Returns `DatabaseError` if the statement fails (e.g. a foreign key still
/// references the row).
pub async fn delete<T: StoredEntity>(conn: &Connection, id: &str) -> Result<bool, DatabaseError> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", T::TABLE);
    let affected = conn.execute(&sql, [id]).await?;
    Ok(affected > 0)
}

/// Select all rows matching a WHERE clause, in the given order.
///
/// `clause` is appended verbatim after `FROM <table>`; values go through `params`.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn select<T: StoredEntity>(
    conn: &Connection,
    clause: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<T>, DatabaseError> {
    let sql = format!("SELECT {} FROM {} {clause}", T::COLUMNS, T::TABLE);
    let mut rows = conn.query(&sql, params).await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(T::from_row(&row)?);
    }
    Ok(out)
}

/// Single integer aggregate (`COUNT(*)` and friends).
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no row.
pub async fn scalar(
    conn: &Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<i64, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

/// Ids returned by a single-column query.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn ids(
    conn: &Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<String>, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(row.get::<String>(0)?);
    }
    Ok(out)
}
