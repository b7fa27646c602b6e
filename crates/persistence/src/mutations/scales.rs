// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Score scale mutations.
//!
//! Exactly one scale is the default. Every change to the default flag runs
//! in one transaction that clears the flag everywhere before setting it.

use callscore_domain::ScoreScale;
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{score_scale_values, score_scales};
use crate::error::PersistenceError;
use crate::queries::scales::{count_scales_mysql, count_scales_sqlite};
use crate::timestamp::now_timestamp;

backend_fn! {
/// Inserts a scale row and its values.
///
/// # Errors
///
/// Returns an error if an insert fails.
fn insert_scale(
    conn: &mut _,
    scale: &ScoreScale,
    is_default: bool,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;
    diesel::insert_into(score_scales::table)
        .values((
            score_scales::name.eq(&scale.name),
            score_scales::is_default.eq(i32::from(is_default)),
            score_scales::created_at.eq(&now),
        ))
        .execute(conn)?;
    let scale_id: i64 = conn.get_last_insert_rowid()?;

    for value in &scale.values {
        diesel::insert_into(score_scale_values::table)
            .values((
                score_scale_values::scale_id.eq(scale_id),
                score_scale_values::score_value.eq(value.value),
                score_scale_values::label.eq(&value.label),
                score_scale_values::display_order.eq(value.display_order),
            ))
            .execute(conn)?;
    }

    Ok(scale_id)
}
}

backend_fn! {
/// Clears the default flag on every scale.
///
/// # Errors
///
/// Returns an error if the update fails.
fn clear_default_scale(conn: &mut _) -> Result<(), PersistenceError> {
    diesel::update(score_scales::table)
        .filter(score_scales::is_default.eq(1))
        .set(score_scales::is_default.eq(0))
        .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Marks one scale as the default.
///
/// # Errors
///
/// Returns `NotFound` if the scale does not exist.
fn mark_default_scale(conn: &mut _, scale_id: i64) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(score_scales::table)
        .filter(score_scales::scale_id.eq(scale_id))
        .set(score_scales::is_default.eq(1))
        .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Score scale {scale_id} not found"
        )));
    }
    Ok(())
}
}

/// Creates a scale (`SQLite` version).
///
/// The first scale ever created becomes the default regardless of
/// `scale.is_default`.
///
/// # Errors
///
/// Returns an error if the name is taken or an insert fails. Nothing is
/// written on error.
pub fn create_scale_sqlite(
    conn: &mut SqliteConnection,
    scale: &ScoreScale,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let make_default: bool = scale.is_default || count_scales_sqlite(conn)? == 0;
        if make_default {
            clear_default_scale_sqlite(conn)?;
        }
        let scale_id: i64 = insert_scale_sqlite(conn, scale, make_default)?;
        info!(scale_id, name = %scale.name, is_default = make_default, "Created score scale");
        Ok(scale_id)
    })
}

/// Creates a scale (`MySQL` version).
///
/// The first scale ever created becomes the default regardless of
/// `scale.is_default`.
///
/// # Errors
///
/// Returns an error if the name is taken or an insert fails. Nothing is
/// written on error.
pub fn create_scale_mysql(
    conn: &mut MysqlConnection,
    scale: &ScoreScale,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let make_default: bool = scale.is_default || count_scales_mysql(conn)? == 0;
        if make_default {
            clear_default_scale_mysql(conn)?;
        }
        let scale_id: i64 = insert_scale_mysql(conn, scale, make_default)?;
        info!(scale_id, name = %scale.name, is_default = make_default, "Created score scale");
        Ok(scale_id)
    })
}

/// Makes `scale_id` the only default scale (`SQLite` version).
///
/// # Errors
///
/// Returns `NotFound` if the scale does not exist; the previous default
/// is kept in that case.
pub fn set_default_scale_sqlite(
    conn: &mut SqliteConnection,
    scale_id: i64,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        clear_default_scale_sqlite(conn)?;
        mark_default_scale_sqlite(conn, scale_id)?;
        info!(scale_id, "Default score scale changed");
        Ok(())
    })
}

/// Makes `scale_id` the only default scale (`MySQL` version).
///
/// # Errors
///
/// Returns `NotFound` if the scale does not exist; the previous default
/// is kept in that case.
pub fn set_default_scale_mysql(
    conn: &mut MysqlConnection,
    scale_id: i64,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        clear_default_scale_mysql(conn)?;
        mark_default_scale_mysql(conn, scale_id)?;
        info!(scale_id, "Default score scale changed");
        Ok(())
    })
}
