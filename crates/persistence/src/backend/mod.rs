// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-specific connection handling.
//!
//! Only what Diesel cannot express portably lives here: establishing the
//! connection, applying the embedded migrations, engine settings, the
//! last-insert id, and catalog introspection for startup checks.
//!
//! - `sqlite`: `SQLite` (default, and every standard test)
//! - `mysql`: `MySQL`/`MariaDB` (validated via opt-in tests)
//!
//! Audit, questionnaire and operator queries stay in `queries/` and
//! `mutations/` and must run unchanged on both.

pub mod mysql;
pub mod sqlite;

use diesel::{Connection, MysqlConnection, SqliteConnection};
use tracing::info;

use crate::error::PersistenceError;

/// Tables the audit platform cannot start without.
///
/// Checked after migrations so a database left behind by a partial or
/// foreign migration run is refused instead of failing on first use.
pub const AUDIT_SCHEMA_TABLES: &[&str] = &[
    "score_scales",
    "score_scale_values",
    "questionnaires",
    "questionnaire_versions",
    "questions",
    "question_subitems",
    "companies",
    "managers",
    "audits",
    "audit_answers",
    "audit_history",
    "operators",
    "sessions",
];

/// Operations that need raw SQL on one backend or the other.
///
/// Implemented for `SqliteConnection` and `MysqlConnection` so mutation
/// bodies generated by `backend_fn!` can stay generic.
pub trait PersistenceBackend: Connection {
    /// Returns the id of the row most recently inserted on this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError>;

    /// Fails unless the connection enforces foreign keys.
    ///
    /// # Errors
    ///
    /// Returns `ForeignKeyEnforcementNotEnabled` when enforcement is off.
    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError>;

    /// Lists the user tables present in the connected database.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    fn table_names(&mut self) -> Result<Vec<String>, PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        sqlite::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(self)
    }

    fn table_names(&mut self) -> Result<Vec<String>, PersistenceError> {
        sqlite::table_names(self)
    }
}

impl PersistenceBackend for MysqlConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        mysql::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        mysql::verify_foreign_key_enforcement(self)
    }

    fn table_names(&mut self) -> Result<Vec<String>, PersistenceError> {
        mysql::table_names(self)
    }
}

/// Returns the audit schema tables missing from `present`, in schema order.
#[must_use]
pub fn missing_audit_tables(present: &[String]) -> Vec<&'static str> {
    AUDIT_SCHEMA_TABLES
        .iter()
        .copied()
        .filter(|table| !present.iter().any(|name| name.eq_ignore_ascii_case(table)))
        .collect()
}

/// Verifies that every audit schema table exists on `conn`.
///
/// # Errors
///
/// Returns `InitializationError` naming the missing tables, or the catalog
/// query error.
pub fn verify_audit_schema<C: PersistenceBackend>(conn: &mut C) -> Result<(), PersistenceError> {
    let present: Vec<String> = conn.table_names()?;
    let missing: Vec<&'static str> = missing_audit_tables(&present);

    if !missing.is_empty() {
        return Err(PersistenceError::InitializationError(format!(
            "Audit schema is incomplete, missing tables: {}",
            missing.join(", ")
        )));
    }

    info!(tables = AUDIT_SCHEMA_TABLES.len(), "Audit schema verified");
    Ok(())
}
