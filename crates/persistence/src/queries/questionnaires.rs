// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Questionnaire and version queries.

use callscore_domain::{Category, Question, QuestionSubitem, Questionnaire, QuestionnaireVersion};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::ToPrimitive;
use std::collections::HashMap;
use tracing::debug;

use crate::data_models::VersionSummary;
use crate::diesel_schema::{question_subitems, questionnaire_versions, questionnaires, questions};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = questionnaires)]
struct QuestionnaireRow {
    questionnaire_id: i64,
    name: String,
    description: Option<String>,
    scale_id: i64,
    current_version_id: Option<i64>,
    is_active: i32,
}

impl From<QuestionnaireRow> for Questionnaire {
    fn from(row: QuestionnaireRow) -> Self {
        Self {
            questionnaire_id: Some(row.questionnaire_id),
            name: row.name,
            description: row.description,
            scale_id: row.scale_id,
            current_version_id: row.current_version_id,
            is_active: row.is_active != 0,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = questionnaire_versions)]
struct VersionRow {
    version_id: i64,
    questionnaire_id: i64,
    version_number: i32,
    created_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = questions)]
struct QuestionRow {
    question_id: i64,
    question_text: String,
    weight: f64,
    category: Option<String>,
    is_active: i32,
    has_subitems: i32,
    display_order: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = question_subitems)]
struct SubitemRow {
    subitem_id: i64,
    question_id: i64,
    subitem_text: String,
    weight: f64,
    is_active: i32,
    display_order: i32,
}

fn build_version(
    version: VersionRow,
    question_rows: Vec<QuestionRow>,
    subitem_rows: Vec<SubitemRow>,
) -> QuestionnaireVersion {
    let mut subitems_by_question: HashMap<i64, Vec<QuestionSubitem>> = HashMap::new();
    for row in subitem_rows {
        subitems_by_question
            .entry(row.question_id)
            .or_default()
            .push(QuestionSubitem {
                subitem_id: row.subitem_id,
                text: row.subitem_text,
                weight: row.weight,
                is_active: row.is_active != 0,
                display_order: row.display_order,
            });
    }

    let questions: Vec<Question> = question_rows
        .into_iter()
        .map(|row| Question {
            question_id: row.question_id,
            text: row.question_text,
            weight: row.weight,
            category: Category::from_optional(row.category.as_deref()),
            is_active: row.is_active != 0,
            has_subitems: row.has_subitems != 0,
            display_order: row.display_order,
            subitems: subitems_by_question
                .remove(&row.question_id)
                .unwrap_or_default(),
        })
        .collect();

    QuestionnaireVersion {
        version_id: version.version_id,
        questionnaire_id: version.questionnaire_id,
        version_number: version.version_number,
        questions,
    }
}

backend_fn! {
/// Retrieves a questionnaire by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the questionnaire is not found.
pub fn get_questionnaire(
    conn: &mut _,
    questionnaire_id: i64,
) -> Result<Option<Questionnaire>, PersistenceError> {
    let result: Result<QuestionnaireRow, diesel::result::Error> = questionnaires::table
        .filter(questionnaires::questionnaire_id.eq(questionnaire_id))
        .select(QuestionnaireRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(Questionnaire::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Lists questionnaires ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_questionnaires(conn: &mut _) -> Result<Vec<Questionnaire>, PersistenceError> {
    let rows: Vec<QuestionnaireRow> = questionnaires::table
        .select(QuestionnaireRow::as_select())
        .order_by((questionnaires::name.asc(), questionnaires::questionnaire_id.asc()))
        .load(conn)?;
    Ok(rows.into_iter().map(Questionnaire::from).collect())
}
}

backend_fn! {
/// Reads the current-version pointer of a questionnaire.
///
/// # Errors
///
/// Returns `NotFound` if the questionnaire does not exist.
pub fn get_current_version_id(
    conn: &mut _,
    questionnaire_id: i64,
) -> Result<Option<i64>, PersistenceError> {
    questionnaires::table
        .filter(questionnaires::questionnaire_id.eq(questionnaire_id))
        .select(questionnaires::current_version_id)
        .first::<Option<i64>>(conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => PersistenceError::NotFound(format!(
                "Questionnaire {questionnaire_id} not found"
            )),
            other => PersistenceError::from(other),
        })
}
}

backend_fn! {
/// Returns the highest version number of a questionnaire, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn max_version_number(
    conn: &mut _,
    questionnaire_id: i64,
) -> Result<Option<i32>, PersistenceError> {
    use diesel::dsl::max;

    Ok(questionnaire_versions::table
        .filter(questionnaire_versions::questionnaire_id.eq(questionnaire_id))
        .select(max(questionnaire_versions::version_number))
        .first::<Option<i32>>(conn)?)
}
}

backend_fn! {
/// Whether a version belongs to a questionnaire.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn version_belongs_to(
    conn: &mut _,
    version_id: i64,
    questionnaire_id: i64,
) -> Result<bool, PersistenceError> {
    use diesel::dsl::count;

    let count: i64 = questionnaire_versions::table
        .filter(questionnaire_versions::version_id.eq(version_id))
        .filter(questionnaire_versions::questionnaire_id.eq(questionnaire_id))
        .select(count(questionnaire_versions::version_id))
        .first(conn)?;
    Ok(count > 0)
}
}

backend_fn! {
/// Lists the versions of a questionnaire, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_versions(
    conn: &mut _,
    questionnaire_id: i64,
) -> Result<Vec<VersionSummary>, PersistenceError> {
    let current: Option<Option<i64>> = questionnaires::table
        .filter(questionnaires::questionnaire_id.eq(questionnaire_id))
        .select(questionnaires::current_version_id)
        .first::<Option<i64>>(conn)
        .optional()?;

    let rows: Vec<VersionRow> = questionnaire_versions::table
        .filter(questionnaire_versions::questionnaire_id.eq(questionnaire_id))
        .select(VersionRow::as_select())
        .order_by(questionnaire_versions::version_number.desc())
        .load(conn)?;

    let version_ids: Vec<i64> = rows.iter().map(|r| r.version_id).collect();
    let question_versions: Vec<i64> = questions::table
        .filter(questions::version_id.eq_any(&version_ids))
        .select(questions::version_id)
        .load(conn)?;

    let current_id: Option<i64> = current.flatten();
    Ok(rows
        .into_iter()
        .map(|row| VersionSummary {
            version_id: row.version_id,
            questionnaire_id: row.questionnaire_id,
            version_number: row.version_number,
            question_count: question_versions
                .iter()
                .filter(|v| **v == row.version_id)
                .count()
                .to_i64()
                .unwrap_or(i64::MAX),
            is_current: current_id == Some(row.version_id),
            created_at: row.created_at,
        })
        .collect())
}
}

backend_fn! {
/// Loads the full question tree of a version.
///
/// Questions and subitems are ordered by display order, inactive ones
/// included.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the version is not found.
pub fn get_version_tree(
    conn: &mut _,
    version_id: i64,
) -> Result<Option<QuestionnaireVersion>, PersistenceError> {
    let result: Result<VersionRow, diesel::result::Error> = questionnaire_versions::table
        .filter(questionnaire_versions::version_id.eq(version_id))
        .select(VersionRow::as_select())
        .first(conn);

    let version: VersionRow = match result {
        Ok(row) => row,
        Err(diesel::result::Error::NotFound) => return Ok(None),
        Err(e) => return Err(PersistenceError::from(e)),
    };

    let question_rows: Vec<QuestionRow> = questions::table
        .filter(questions::version_id.eq(version_id))
        .select(QuestionRow::as_select())
        .order_by((questions::display_order.asc(), questions::question_id.asc()))
        .load(conn)?;

    let question_ids: Vec<i64> = question_rows.iter().map(|q| q.question_id).collect();
    let subitem_rows: Vec<SubitemRow> = question_subitems::table
        .filter(question_subitems::question_id.eq_any(&question_ids))
        .select(SubitemRow::as_select())
        .order_by((
            question_subitems::display_order.asc(),
            question_subitems::subitem_id.asc(),
        ))
        .load(conn)?;

    debug!(
        version_id,
        questions = question_rows.len(),
        subitems = subitem_rows.len(),
        "Loaded version tree"
    );
    Ok(Some(build_version(version, question_rows, subitem_rows)))
}
}

backend_fn! {
/// Returns the scale of the questionnaire a version belongs to.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the version is not found.
pub fn get_scale_id_for_version(
    conn: &mut _,
    version_id: i64,
) -> Result<Option<i64>, PersistenceError> {
    Ok(questionnaire_versions::table
        .inner_join(questionnaires::table)
        .filter(questionnaire_versions::version_id.eq(version_id))
        .select(questionnaires::scale_id)
        .first::<i64>(conn)
        .optional()?)
}
}
