// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend validation tests for multi-database support.
//!
//! These tests validate that the persistence layer works correctly
//! across different database backends (`SQLite`, MariaDB/MySQL).
//!
//! ## Purpose
//!
//! The purpose of these tests is to ensure:
//! 1. Migrations apply cleanly on all supported backends
//! 2. Foreign key constraints are enforced correctly
//! 3. Unique constraints work as expected
//! 4. Transactions and rollback behavior is consistent
//! 5. Backend-specific behavior is documented and tested
//!
//! ## Test Execution
//!
//! - `SQLite` tests run normally via `cargo test`
//! - MariaDB/MySQL tests are marked `#[ignore]` and run only via `cargo xtask test-mariadb`
//!
//! ## Infrastructure Requirements
//!
//! `MariaDB` tests require:
//! - `DATABASE_URL` environment variable (set by xtask)
//! - `CALLSCORE_TEST_BACKEND=mariadb` environment variable
//! - Running `MariaDB` instance (provisioned by xtask)
//!
//! Tests fail fast if required infrastructure is missing.
//!
//! ## What These Tests Validate
//!
//! These tests focus on **infrastructure and schema compatibility**, not business logic:
//! - Schema creation and migration application
//! - Database constraint enforcement (FK, UNIQUE, CHECK)
//! - Transaction semantics
//! - Backend-specific SQL compatibility
//!
//! Business logic and domain rules are validated by the standard test suite
//! running against `SQLite`. These backend validation tests ensure the
//! persistence layer works correctly on additional databases.
//!
//! ## Adding New Backend Validation Tests
//!
//! When adding a new test:
//! 1. Mark it with `#[ignore]`
//! 2. Call `verify_mariadb_test_environment()` first
//! 3. Use raw SQL to test schema-level behavior
//! 4. Clean up test data if needed (or use transactions)
//! 5. Document what backend-specific behavior is being validated

use diesel::MysqlConnection;
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use std::env;

use crate::backend::mysql;

/// Result type for COUNT queries.
#[derive(QueryableByName)]
struct CountResult {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Result type for `LAST_INSERT_ID` queries.
#[derive(QueryableByName)]
struct LastInsertIdResult {
    #[diesel(sql_type = BigInt)]
    id: i64,
}

/// Helper to get the `MariaDB` connection URL from environment.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set, indicating missing infrastructure.
fn get_mariadb_url() -> String {
    env::var("DATABASE_URL")
        .expect("DATABASE_URL not set - MariaDB tests must be run via `cargo xtask test-mariadb`")
}

/// Helper to verify we're running in the `MariaDB` test environment.
///
/// # Panics
///
/// Panics if `CALLSCORE_TEST_BACKEND` is not set to `mariadb`.
fn verify_mariadb_test_environment() {
    let backend = env::var("CALLSCORE_TEST_BACKEND").expect(
        "CALLSCORE_TEST_BACKEND not set - MariaDB tests must be run via `cargo xtask test-mariadb`",
    );
    assert_eq!(backend, "mariadb", "CALLSCORE_TEST_BACKEND must be 'mariadb'");
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_connection() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = MysqlConnection::establish(&url);
    assert!(
        result.is_ok(),
        "Failed to connect to MariaDB: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_migrations_apply_cleanly() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = mysql::initialize_database(&url);
    assert!(
        result.is_ok(),
        "Failed to initialize MariaDB and run migrations: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_foreign_key_enforcement() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    let result = mysql::verify_foreign_key_enforcement(&mut conn);
    assert!(
        result.is_ok(),
        "Foreign key enforcement verification failed: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_operator_table_constraints() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    // Verify unique constraint on login_name
    diesel::sql_query(
        "INSERT INTO operators (login_name, display_name, password_hash, role, created_at)
         VALUES ('TEST_USER', 'Test User', 'hash', 'Admin', '2026-01-01T00:00:00Z')",
    )
    .execute(&mut conn)
    .expect("Failed to insert test operator");

    let duplicate_result = diesel::sql_query(
        "INSERT INTO operators (login_name, display_name, password_hash, role, created_at)
         VALUES ('TEST_USER', 'Another User', 'hash2', 'Analyst', '2026-01-01T00:00:00Z')",
    )
    .execute(&mut conn);

    assert!(
        duplicate_result.is_err(),
        "Duplicate login_name should fail due to UNIQUE constraint"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_manager_requires_company() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    let result = diesel::sql_query(
        "INSERT INTO managers (company_id, name, created_at)
         VALUES (99999, 'Orphan', '2026-01-01T00:00:00Z')",
    )
    .execute(&mut conn);

    assert!(
        result.is_err(),
        "Inserting a manager with a non-existent company should fail due to foreign key constraint"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_audit_history_foreign_keys() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    let result = diesel::sql_query(
        "INSERT INTO audit_history
         (audit_id, kind, actor_json, cause_json, action_json,
          before_snapshot_json, after_snapshot_json, created_at)
         VALUES (99999, 'CREATED', '{}', '{}', '{}', '{}', '{}', '2026-01-01T00:00:00Z')",
    )
    .execute(&mut conn);

    assert!(
        result.is_err(),
        "History entry for a non-existent audit should fail due to foreign key constraint"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_transaction_rollback() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    conn.begin_test_transaction()
        .expect("Failed to begin transaction");

    diesel::sql_query(
        "INSERT INTO companies (name, created_at)
         VALUES ('Rollback Test', '2026-01-01T00:00:00Z')",
    )
    .execute(&mut conn)
    .expect("Failed to insert company");

    let count: i64 =
        diesel::sql_query("SELECT COUNT(*) as count FROM companies WHERE name = 'Rollback Test'")
            .get_result::<CountResult>(&mut conn)
            .map(|r| r.count)
            .expect("Failed to count companies");

    assert_eq!(count, 1, "Company should exist within transaction");

    // Transaction will rollback when conn is dropped (test transaction mode)
    drop(conn);

    let mut new_conn = mysql::initialize_database(&url).expect("Failed to reconnect to MariaDB");

    let count_after: i64 =
        diesel::sql_query("SELECT COUNT(*) as count FROM companies WHERE name = 'Rollback Test'")
            .get_result::<CountResult>(&mut new_conn)
            .map(|r| r.count)
            .expect("Failed to count companies after rollback");

    assert_eq!(
        count_after, 0,
        "Company should not exist after transaction rollback"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_version_number_unique_per_questionnaire() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    diesel::sql_query(
        "INSERT INTO score_scales (name, is_default, created_at)
         VALUES ('Unique Version Scale', 0, '2026-01-01T00:00:00Z')",
    )
    .execute(&mut conn)
    .expect("Failed to insert scale");

    let scale_id: i64 = diesel::sql_query("SELECT LAST_INSERT_ID() as id")
        .get_result::<LastInsertIdResult>(&mut conn)
        .map(|r| r.id)
        .expect("Failed to get scale_id");

    diesel::sql_query(format!(
        "INSERT INTO questionnaires (name, scale_id, created_at, updated_at)
         VALUES ('Unique Version Test', {scale_id}, '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')"
    ))
    .execute(&mut conn)
    .expect("Failed to insert questionnaire");

    let questionnaire_id: i64 = diesel::sql_query("SELECT LAST_INSERT_ID() as id")
        .get_result::<LastInsertIdResult>(&mut conn)
        .map(|r| r.id)
        .expect("Failed to get questionnaire_id");

    diesel::sql_query(format!(
        "INSERT INTO questionnaire_versions (questionnaire_id, version_number, created_at)
         VALUES ({questionnaire_id}, 1, '2026-01-01T00:00:00Z')"
    ))
    .execute(&mut conn)
    .expect("Failed to insert version");

    let result = diesel::sql_query(format!(
        "INSERT INTO questionnaire_versions (questionnaire_id, version_number, created_at)
         VALUES ({questionnaire_id}, 1, '2026-02-01T00:00:00Z')"
    ))
    .execute(&mut conn);

    assert!(
        result.is_err(),
        "Duplicate version number should fail due to UNIQUE constraint"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_persistence_adapter_round_trip() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut persistence =
        crate::Persistence::new_with_mysql(&url).expect("Failed to open MariaDB persistence");

    let company_id = persistence
        .create_company(&format!("Adapter Test {}", std::process::id()))
        .expect("Failed to create company");
    let company = persistence
        .get_company(company_id)
        .expect("Failed to load company")
        .expect("Company should exist");

    assert!(company.is_active);
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_audit_schema_is_complete() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let mut conn = mysql::initialize_database(&url).expect("Failed to initialize MariaDB database");

    let tables = mysql::table_names(&mut conn).expect("Failed to list MariaDB tables");
    assert!(
        crate::backend::missing_audit_tables(&tables).is_empty(),
        "MariaDB schema is missing audit tables: {tables:?}"
    );
    assert!(crate::backend::verify_audit_schema(&mut conn).is_ok());
}
