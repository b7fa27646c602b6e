// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `MySQL`/`MariaDB` connection setup.
//!
//! The server selects this backend when `DATABASE_URL` is set. Its schema
//! comes from `migrations_mysql/`, which must stay equivalent to the
//! `SQLite` migrations table for table and column for column; run
//! `cargo xtask verify-migrations` after touching either directory.
//!
//! The only structural difference between the two is
//! `questionnaires.current_version_id`: `MySQL` adds that foreign key after
//! `questionnaire_versions` exists.
//!
//! Validation against a real server is opt-in. `cargo xtask test-mariadb`
//! starts a container, exports `DATABASE_URL` and `CALLSCORE_TEST_BACKEND`,
//! and runs the ignored tests in `tests/backend_validation_tests.rs`.
//! Building needs the `MySQL` client libraries (`libmysqlclient-dev` or
//! equivalent) and `pkg-config`.

use diesel::dsl::sql;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel::{Connection, MysqlConnection, QueryableByName, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Migrations from `migrations_mysql/`.
pub const MYSQL_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations_mysql");

#[derive(QueryableByName)]
struct ForeignKeyChecks {
    #[diesel(sql_type = Integer)]
    fk_checks: i32,
}

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Returns `LAST_INSERT_ID()` for this connection.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_last_insert_rowid(conn: &mut MysqlConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("LAST_INSERT_ID()")).get_result(conn)?)
}

/// Opens the database at `database_url` and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub fn initialize_database(database_url: &str) -> Result<MysqlConnection, PersistenceError> {
    info!("Opening MySQL database");

    let mut conn: MysqlConnection = MysqlConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    run_migrations(&mut conn).map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;

    Ok(conn)
}

/// Applies pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub fn run_migrations(
    conn: &mut MysqlConnection,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let applied = conn.run_pending_migrations(MYSQL_MIGRATIONS)?;
    info!(applied = applied.len(), "Applied MySQL migrations");
    Ok(())
}

/// Fails unless `@@foreign_key_checks` is on for this session.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` when checks are off, or
/// `QueryFailed` if the variable cannot be read.
pub fn verify_foreign_key_enforcement(conn: &mut MysqlConnection) -> Result<(), PersistenceError> {
    let checks: ForeignKeyChecks =
        diesel::sql_query("SELECT @@foreign_key_checks AS fk_checks")
            .get_result(conn)
            .map_err(|e| {
                PersistenceError::QueryFailed(format!(
                    "Failed to verify foreign key enforcement: {e}"
                ))
            })?;

    if checks.fk_checks != 1 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }

    debug!("MySQL foreign key enforcement is enabled");
    Ok(())
}

/// Lists the base tables of the current schema.
///
/// # Errors
///
/// Returns an error if the catalog query fails.
pub fn table_names(conn: &mut MysqlConnection) -> Result<Vec<String>, PersistenceError> {
    let rows: Vec<TableName> = diesel::sql_query(
        "SELECT TABLE_NAME AS name FROM information_schema.tables \
         WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'",
    )
    .load(conn)?;
    Ok(rows.into_iter().map(|row| row.name).collect())
}
