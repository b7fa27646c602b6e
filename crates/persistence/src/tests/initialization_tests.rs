// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Every other persistence test opens an in-memory database, so connection
//! setup and migration application are exercised throughout. These tests
//! cover isolation and the integrity checks the constructors run.

use crate::backend::{AUDIT_SCHEMA_TABLES, missing_audit_tables};
use crate::{PersistenceError, SqlitePersistence};

#[test]
fn test_persistence_initialization() {
    let result: Result<SqlitePersistence, PersistenceError> = SqlitePersistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = SqlitePersistence::new_in_memory().unwrap();
    let mut db2 = SqlitePersistence::new_in_memory().unwrap();

    db1.create_operator("op1", "Operator One", "password", "Admin", None)
        .unwrap();

    assert_eq!(db1.count_operators().unwrap(), 1, "db1 should have 1 operator");
    assert_eq!(
        db2.count_operators().unwrap(),
        0,
        "db2 should have 0 operators (isolated)"
    );
}

#[test]
fn test_foreign_key_enforcement_is_enabled() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_manager_for_unknown_company_is_rejected() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let result = persistence.create_manager(999, "Nobody", None);
    assert!(matches!(result, Err(PersistenceError::DatabaseError(_))));
}

#[test]
fn test_file_database_persists_across_connections() {
    let path = std::env::temp_dir().join(format!(
        "callscore_persistence_test_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = SqlitePersistence::new_with_file(&path).unwrap();
        persistence.create_company("Acme Sales").unwrap();
    }

    let mut reopened = SqlitePersistence::new_with_file(&path).unwrap();
    let companies = reopened.list_companies().unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].name, "Acme Sales");

    drop(reopened);
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}

#[test]
fn test_migrated_database_has_full_audit_schema() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    assert!(persistence.verify_audit_schema().is_ok());
}

#[test]
fn test_missing_audit_tables_are_reported_in_schema_order() {
    let present: Vec<String> = AUDIT_SCHEMA_TABLES
        .iter()
        .filter(|table| !matches!(**table, "audit_answers" | "sessions"))
        .map(|table| table.to_uppercase())
        .collect();

    assert_eq!(
        missing_audit_tables(&present),
        vec!["audit_answers", "sessions"]
    );
    assert_eq!(missing_audit_tables(&[]).len(), AUDIT_SCHEMA_TABLES.len());
}
