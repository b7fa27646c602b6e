// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Score scale queries.

use callscore_domain::{ScaleValue, ScoreScale};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::diesel_schema::{score_scale_values, score_scales};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = score_scales)]
struct ScaleRow {
    scale_id: i64,
    name: String,
    is_default: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = score_scale_values)]
struct ScaleValueRow {
    scale_id: i64,
    score_value: f64,
    label: String,
    display_order: i32,
}

fn build_scale(row: ScaleRow, values: Vec<ScaleValueRow>) -> ScoreScale {
    ScoreScale {
        scale_id: Some(row.scale_id),
        name: row.name,
        is_default: row.is_default != 0,
        values: values
            .into_iter()
            .map(|v| ScaleValue {
                value: v.score_value,
                label: v.label,
                display_order: v.display_order,
            })
            .collect(),
    }
}

backend_fn! {
/// Retrieves a scale with its values.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the scale is not found.
pub fn get_scale(conn: &mut _, scale_id: i64) -> Result<Option<ScoreScale>, PersistenceError> {
    let result: Result<ScaleRow, diesel::result::Error> = score_scales::table
        .filter(score_scales::scale_id.eq(scale_id))
        .select(ScaleRow::as_select())
        .first(conn);

    let row: ScaleRow = match result {
        Ok(row) => row,
        Err(diesel::result::Error::NotFound) => return Ok(None),
        Err(e) => return Err(PersistenceError::from(e)),
    };

    let values: Vec<ScaleValueRow> = score_scale_values::table
        .filter(score_scale_values::scale_id.eq(row.scale_id))
        .select(ScaleValueRow::as_select())
        .order_by((
            score_scale_values::display_order.asc(),
            score_scale_values::scale_value_id.asc(),
        ))
        .load(conn)?;
    Ok(Some(build_scale(row, values)))
}
}

backend_fn! {
/// Retrieves the default scale.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no scale exists yet.
pub fn get_default_scale(conn: &mut _) -> Result<Option<ScoreScale>, PersistenceError> {
    let result: Result<ScaleRow, diesel::result::Error> = score_scales::table
        .filter(score_scales::is_default.eq(1))
        .select(ScaleRow::as_select())
        .first(conn);

    let row: ScaleRow = match result {
        Ok(row) => row,
        Err(diesel::result::Error::NotFound) => return Ok(None),
        Err(e) => return Err(PersistenceError::from(e)),
    };

    let values: Vec<ScaleValueRow> = score_scale_values::table
        .filter(score_scale_values::scale_id.eq(row.scale_id))
        .select(ScaleValueRow::as_select())
        .order_by((
            score_scale_values::display_order.asc(),
            score_scale_values::scale_value_id.asc(),
        ))
        .load(conn)?;
    Ok(Some(build_scale(row, values)))
}
}

backend_fn! {
/// Lists all scales with their values, ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_scales(conn: &mut _) -> Result<Vec<ScoreScale>, PersistenceError> {
    let rows: Vec<ScaleRow> = score_scales::table
        .select(ScaleRow::as_select())
        .order_by(score_scales::name.asc())
        .load(conn)?;

    let mut values: Vec<ScaleValueRow> = score_scale_values::table
        .select(ScaleValueRow::as_select())
        .order_by((
            score_scale_values::scale_id.asc(),
            score_scale_values::display_order.asc(),
            score_scale_values::scale_value_id.asc(),
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let (own, rest): (Vec<ScaleValueRow>, Vec<ScaleValueRow>) =
                values.drain(..).partition(|v| v.scale_id == row.scale_id);
            values = rest;
            build_scale(row, own)
        })
        .collect())
}
}

backend_fn! {
/// Counts stored scales.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_scales(conn: &mut _) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    Ok(score_scales::table
        .select(count(score_scales::scale_id))
        .first(conn)?)
}
}
