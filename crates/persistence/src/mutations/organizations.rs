// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Company and manager mutations.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{companies, managers};
use crate::error::PersistenceError;
use crate::timestamp::now_timestamp;

backend_fn! {
/// Creates an active company.
///
/// # Errors
///
/// Returns an error if the name is already taken or the insert fails.
pub fn create_company(conn: &mut _, name: &str) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;
    diesel::insert_into(companies::table)
        .values((
            companies::name.eq(name),
            companies::is_active.eq(1),
            companies::created_at.eq(&now),
        ))
        .execute(conn)?;

    let company_id: i64 = conn.get_last_insert_rowid()?;
    info!(company_id, name, "Created company");
    Ok(company_id)
}
}

backend_fn! {
/// Activates or deactivates a company.
///
/// # Errors
///
/// Returns `NotFound` if the company does not exist.
pub fn set_company_active(
    conn: &mut _,
    company_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(companies::table)
        .filter(companies::company_id.eq(company_id))
        .set(companies::is_active.eq(i32::from(is_active)))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Company {company_id} not found"
        )));
    }
    info!(company_id, is_active, "Updated company status");
    Ok(())
}
}

backend_fn! {
/// Creates an active manager within a company.
///
/// # Errors
///
/// Returns an error if the company does not exist, the name is already
/// used in that company, or the insert fails.
pub fn create_manager(
    conn: &mut _,
    company_id: i64,
    name: &str,
    email: Option<&str>,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;
    diesel::insert_into(managers::table)
        .values((
            managers::company_id.eq(company_id),
            managers::name.eq(name),
            managers::email.eq(email),
            managers::is_active.eq(1),
            managers::created_at.eq(&now),
        ))
        .execute(conn)?;

    let manager_id: i64 = conn.get_last_insert_rowid()?;
    info!(manager_id, company_id, name, "Created manager");
    Ok(manager_id)
}
}

backend_fn! {
/// Activates or deactivates a manager.
///
/// # Errors
///
/// Returns `NotFound` if the manager does not exist.
pub fn set_manager_active(
    conn: &mut _,
    manager_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(managers::table)
        .filter(managers::manager_id.eq(manager_id))
        .set(managers::is_active.eq(i32::from(is_active)))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Manager {manager_id} not found"
        )));
    }
    info!(manager_id, is_active, "Updated manager status");
    Ok(())
}
}
