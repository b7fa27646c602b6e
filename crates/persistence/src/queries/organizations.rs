// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Company and manager queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::{CompanyData, ManagerData};
use crate::diesel_schema::{companies, managers};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = companies)]
struct CompanyRow {
    company_id: i64,
    name: String,
    is_active: i32,
    created_at: String,
}

impl From<CompanyRow> for CompanyData {
    fn from(row: CompanyRow) -> Self {
        Self {
            company_id: row.company_id,
            name: row.name,
            is_active: row.is_active != 0,
            created_at: row.created_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = managers)]
struct ManagerRow {
    manager_id: i64,
    company_id: i64,
    name: String,
    email: Option<String>,
    is_active: i32,
    created_at: String,
}

impl From<ManagerRow> for ManagerData {
    fn from(row: ManagerRow) -> Self {
        Self {
            manager_id: row.manager_id,
            company_id: row.company_id,
            name: row.name,
            email: row.email,
            is_active: row.is_active != 0,
            created_at: row.created_at,
        }
    }
}

backend_fn! {
/// Retrieves a company by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the company is not found.
pub fn get_company(conn: &mut _, company_id: i64) -> Result<Option<CompanyData>, PersistenceError> {
    let result: Result<CompanyRow, diesel::result::Error> = companies::table
        .filter(companies::company_id.eq(company_id))
        .select(CompanyRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(CompanyData::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Lists companies ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_companies(conn: &mut _) -> Result<Vec<CompanyData>, PersistenceError> {
    let rows: Vec<CompanyRow> = companies::table
        .select(CompanyRow::as_select())
        .order_by(companies::name.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(CompanyData::from).collect())
}
}

backend_fn! {
/// Retrieves a manager by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the manager is not found.
pub fn get_manager(conn: &mut _, manager_id: i64) -> Result<Option<ManagerData>, PersistenceError> {
    let result: Result<ManagerRow, diesel::result::Error> = managers::table
        .filter(managers::manager_id.eq(manager_id))
        .select(ManagerRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(ManagerData::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Lists the managers of one company ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_managers(conn: &mut _, company_id: i64) -> Result<Vec<ManagerData>, PersistenceError> {
    let rows: Vec<ManagerRow> = managers::table
        .filter(managers::company_id.eq(company_id))
        .select(ManagerRow::as_select())
        .order_by(managers::name.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(ManagerData::from).collect())
}
}
