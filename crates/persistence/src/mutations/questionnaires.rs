// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Questionnaire and version mutations.
//!
//! Versions are written once. After publication only the `is_active` flags
//! of questions and subitems change, and the questionnaire's
//! `current_version_id` pointer moves by compare-and-set.

use callscore_domain::{Category, QuestionDraft};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::ToPrimitive;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{question_subitems, questionnaire_versions, questionnaires, questions};
use crate::error::PersistenceError;
use crate::queries::questionnaires::{
    get_current_version_id_mysql, get_current_version_id_sqlite, max_version_number_mysql,
    max_version_number_sqlite, version_belongs_to_mysql, version_belongs_to_sqlite,
};
use crate::timestamp::now_timestamp;

fn display_order(index: usize) -> Result<i32, PersistenceError> {
    index
        .checked_add(1)
        .and_then(|n| n.to_i32())
        .ok_or_else(|| PersistenceError::Other(format!("Too many entries: {index}")))
}

backend_fn! {
/// Inserts a questionnaire row with no current version.
///
/// # Errors
///
/// Returns an error if the insert fails.
fn insert_questionnaire(
    conn: &mut _,
    name: &str,
    description: Option<&str>,
    scale_id: i64,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;
    diesel::insert_into(questionnaires::table)
        .values((
            questionnaires::name.eq(name),
            questionnaires::description.eq(description),
            questionnaires::scale_id.eq(scale_id),
            questionnaires::is_active.eq(1),
            questionnaires::created_at.eq(&now),
            questionnaires::updated_at.eq(&now),
        ))
        .execute(conn)?;
    Ok(conn.get_last_insert_rowid()?)
}
}

backend_fn! {
/// Inserts a version with its questions and subitems.
///
/// Display order follows the order of `drafts`, starting at 1.
///
/// # Errors
///
/// Returns an error if an insert fails.
fn insert_version_tree(
    conn: &mut _,
    questionnaire_id: i64,
    version_number: i32,
    drafts: &[QuestionDraft],
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;
    diesel::insert_into(questionnaire_versions::table)
        .values((
            questionnaire_versions::questionnaire_id.eq(questionnaire_id),
            questionnaire_versions::version_number.eq(version_number),
            questionnaire_versions::created_at.eq(&now),
        ))
        .execute(conn)?;
    let version_id: i64 = conn.get_last_insert_rowid()?;

    for (q_index, draft) in drafts.iter().enumerate() {
        let category: Category = Category::from_optional(draft.category.as_deref());
        diesel::insert_into(questions::table)
            .values((
                questions::version_id.eq(version_id),
                questions::question_text.eq(draft.text.trim()),
                questions::weight.eq(draft.weight),
                questions::category.eq(category.as_optional()),
                questions::is_active.eq(1),
                questions::has_subitems.eq(i32::from(draft.has_subitems)),
                questions::display_order.eq(display_order(q_index)?),
            ))
            .execute(conn)?;
        let question_id: i64 = conn.get_last_insert_rowid()?;

        for (s_index, subitem) in draft.subitems.iter().enumerate() {
            diesel::insert_into(question_subitems::table)
                .values((
                    question_subitems::question_id.eq(question_id),
                    question_subitems::subitem_text.eq(subitem.text.trim()),
                    question_subitems::weight.eq(subitem.weight),
                    question_subitems::is_active.eq(1),
                    question_subitems::display_order.eq(display_order(s_index)?),
                ))
                .execute(conn)?;
        }
    }

    debug!(
        version_id,
        questionnaire_id,
        version_number,
        questions = drafts.len(),
        "Inserted version tree"
    );
    Ok(version_id)
}
}

backend_fn! {
/// Moves the current-version pointer if it still holds `expected`.
///
/// # Errors
///
/// Returns `Conflict` if the pointer no longer holds `expected`.
fn swap_current_version(
    conn: &mut _,
    questionnaire_id: i64,
    expected: Option<i64>,
    new_version_id: i64,
) -> Result<(), PersistenceError> {
    let now: String = now_timestamp()?;
    let target = questionnaires::table.filter(questionnaires::questionnaire_id.eq(questionnaire_id));
    let values = (
        questionnaires::current_version_id.eq(Some(new_version_id)),
        questionnaires::updated_at.eq(&now),
    );
    let rows: usize = match expected {
        Some(expected_id) => diesel::update(
            target.filter(questionnaires::current_version_id.eq(expected_id)),
        )
        .set(values)
        .execute(conn)?,
        None => diesel::update(target.filter(questionnaires::current_version_id.is_null()))
            .set(values)
            .execute(conn)?,
    };

    if rows == 0 {
        return Err(PersistenceError::Conflict(format!(
            "Current version of questionnaire {questionnaire_id} changed concurrently"
        )));
    }
    Ok(())
}
}

backend_fn! {
/// Activates or deactivates a questionnaire.
///
/// # Errors
///
/// Returns `NotFound` if the questionnaire does not exist.
pub fn set_questionnaire_active(
    conn: &mut _,
    questionnaire_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let now: String = now_timestamp()?;
    let rows: usize = diesel::update(questionnaires::table)
        .filter(questionnaires::questionnaire_id.eq(questionnaire_id))
        .set((
            questionnaires::is_active.eq(i32::from(is_active)),
            questionnaires::updated_at.eq(&now),
        ))
        .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Questionnaire {questionnaire_id} not found"
        )));
    }
    info!(questionnaire_id, is_active, "Updated questionnaire status");
    Ok(())
}
}

backend_fn! {
/// Soft-deletes or restores a question.
///
/// # Errors
///
/// Returns `NotFound` if the question does not exist.
pub fn set_question_active(
    conn: &mut _,
    question_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(questions::table)
        .filter(questions::question_id.eq(question_id))
        .set(questions::is_active.eq(i32::from(is_active)))
        .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Question {question_id} not found"
        )));
    }
    info!(question_id, is_active, "Updated question status");
    Ok(())
}
}

backend_fn! {
/// Soft-deletes or restores a subitem.
///
/// # Errors
///
/// Returns `NotFound` if the subitem does not exist.
pub fn set_subitem_active(
    conn: &mut _,
    subitem_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(question_subitems::table)
        .filter(question_subitems::subitem_id.eq(subitem_id))
        .set(question_subitems::is_active.eq(i32::from(is_active)))
        .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Subitem {subitem_id} not found"
        )));
    }
    info!(subitem_id, is_active, "Updated subitem status");
    Ok(())
}
}

/// Creates a questionnaire with version 1 as its current version (`SQLite` version).
///
/// # Returns
///
/// `(questionnaire_id, version_id)`.
///
/// # Errors
///
/// Returns an error if any insert fails. Nothing is written on error.
pub fn create_questionnaire_sqlite(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<&str>,
    scale_id: i64,
    drafts: &[QuestionDraft],
) -> Result<(i64, i64), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let questionnaire_id: i64 = insert_questionnaire_sqlite(conn, name, description, scale_id)?;
        let version_id: i64 = insert_version_tree_sqlite(conn, questionnaire_id, 1, drafts)?;
        swap_current_version_sqlite(conn, questionnaire_id, None, version_id)?;
        info!(questionnaire_id, version_id, name, "Created questionnaire");
        Ok((questionnaire_id, version_id))
    })
}

/// Creates a questionnaire with version 1 as its current version (`MySQL` version).
///
/// # Returns
///
/// `(questionnaire_id, version_id)`.
///
/// # Errors
///
/// Returns an error if any insert fails. Nothing is written on error.
pub fn create_questionnaire_mysql(
    conn: &mut MysqlConnection,
    name: &str,
    description: Option<&str>,
    scale_id: i64,
    drafts: &[QuestionDraft],
) -> Result<(i64, i64), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let questionnaire_id: i64 = insert_questionnaire_mysql(conn, name, description, scale_id)?;
        let version_id: i64 = insert_version_tree_mysql(conn, questionnaire_id, 1, drafts)?;
        swap_current_version_mysql(conn, questionnaire_id, None, version_id)?;
        info!(questionnaire_id, version_id, name, "Created questionnaire");
        Ok((questionnaire_id, version_id))
    })
}

/// Publishes a new version numbered `max + 1` (`SQLite` version).
///
/// When `make_current` is set the pointer moves from whatever it held when
/// the transaction started.
///
/// # Returns
///
/// `(version_id, version_number)`.
///
/// # Errors
///
/// Returns `NotFound` if the questionnaire does not exist, or an insert
/// error. Nothing is written on error.
pub fn publish_version_sqlite(
    conn: &mut SqliteConnection,
    questionnaire_id: i64,
    drafts: &[QuestionDraft],
    make_current: bool,
) -> Result<(i64, i32), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let current: Option<i64> = get_current_version_id_sqlite(conn, questionnaire_id)?;
        let version_number: i32 =
            callscore::next_version_number(max_version_number_sqlite(conn, questionnaire_id)?);
        let version_id: i64 =
            insert_version_tree_sqlite(conn, questionnaire_id, version_number, drafts)?;
        if make_current {
            swap_current_version_sqlite(conn, questionnaire_id, current, version_id)?;
        }
        info!(
            questionnaire_id,
            version_id, version_number, make_current, "Published questionnaire version"
        );
        Ok((version_id, version_number))
    })
}

/// Publishes a new version numbered `max + 1` (`MySQL` version).
///
/// When `make_current` is set the pointer moves from whatever it held when
/// the transaction started.
///
/// # Returns
///
/// `(version_id, version_number)`.
///
/// # Errors
///
/// Returns `NotFound` if the questionnaire does not exist, or an insert
/// error. Nothing is written on error.
pub fn publish_version_mysql(
    conn: &mut MysqlConnection,
    questionnaire_id: i64,
    drafts: &[QuestionDraft],
    make_current: bool,
) -> Result<(i64, i32), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let current: Option<i64> = get_current_version_id_mysql(conn, questionnaire_id)?;
        let version_number: i32 =
            callscore::next_version_number(max_version_number_mysql(conn, questionnaire_id)?);
        let version_id: i64 =
            insert_version_tree_mysql(conn, questionnaire_id, version_number, drafts)?;
        if make_current {
            swap_current_version_mysql(conn, questionnaire_id, current, version_id)?;
        }
        info!(
            questionnaire_id,
            version_id, version_number, make_current, "Published questionnaire version"
        );
        Ok((version_id, version_number))
    })
}

/// Points a questionnaire at another of its versions (`SQLite` version).
///
/// `expected` is the current version id the caller last read.
///
/// # Errors
///
/// Returns `NotFound` if the version does not belong to the questionnaire,
/// or `Conflict` if the pointer no longer holds `expected`.
pub fn set_current_version_sqlite(
    conn: &mut SqliteConnection,
    questionnaire_id: i64,
    expected: Option<i64>,
    new_version_id: i64,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        if !version_belongs_to_sqlite(conn, new_version_id, questionnaire_id)? {
            return Err(PersistenceError::NotFound(format!(
                "Version {new_version_id} of questionnaire {questionnaire_id} not found"
            )));
        }
        swap_current_version_sqlite(conn, questionnaire_id, expected, new_version_id)?;
        info!(questionnaire_id, ?expected, new_version_id, "Current version changed");
        Ok(())
    })
}

/// Points a questionnaire at another of its versions (`MySQL` version).
///
/// `expected` is the current version id the caller last read.
///
/// # Errors
///
/// Returns `NotFound` if the version does not belong to the questionnaire,
/// or `Conflict` if the pointer no longer holds `expected`.
pub fn set_current_version_mysql(
    conn: &mut MysqlConnection,
    questionnaire_id: i64,
    expected: Option<i64>,
    new_version_id: i64,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        if !version_belongs_to_mysql(conn, new_version_id, questionnaire_id)? {
            return Err(PersistenceError::NotFound(format!(
                "Version {new_version_id} of questionnaire {questionnaire_id} not found"
            )));
        }
        swap_current_version_mysql(conn, questionnaire_id, expected, new_version_id)?;
        info!(questionnaire_id, ?expected, new_version_id, "Current version changed");
        Ok(())
    })
}
