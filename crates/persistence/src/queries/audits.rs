// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit, answer and history queries.

use callscore::AuditState;
use callscore_domain::{
    Audit, AuditAnswer, AuditMetadata, AuditStatus, Category, CompletedAuditSummary, ScoredUnit,
    UnitRef, parse_call_date,
};
use callscore_history::{
    Action, Actor, Cause, HistoryEvent, HistoryKind, StateSnapshot,
};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use std::str::FromStr;
use tracing::debug;

use crate::data_models::{
    ActionData, ActorData, AuditFilter, AuditListRow, CauseData, HistoryRecord, StateSnapshotData,
};
use crate::diesel_schema::{audit_answers, audit_history, audits};
use crate::error::PersistenceError;
use crate::timestamp::parse_timestamp;

#[derive(Queryable, Selectable)]
#[diesel(table_name = audits)]
struct AuditRow {
    audit_id: i64,
    company_id: i64,
    manager_id: Option<i64>,
    analyst_id: i64,
    version_id: i64,
    status: String,
    is_deleted: i32,
    total_score: Option<f64>,
    call_date: Option<String>,
    call_reference: Option<String>,
    summary: Option<String>,
    created_at: String,
    updated_at: String,
    completed_at: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_answers)]
struct AnswerRow {
    question_id: Option<i64>,
    subitem_id: Option<i64>,
    score: Option<f64>,
    comment_text: Option<String>,
    scored_weight: Option<f64>,
    scored_category: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_history)]
struct HistoryRow {
    history_id: i64,
    audit_id: i64,
    kind: String,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    created_at: String,
}

fn parse_status(value: &str) -> Result<AuditStatus, PersistenceError> {
    AuditStatus::from_str(value).map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

fn unit_of(row: &AnswerRow) -> Result<UnitRef, PersistenceError> {
    UnitRef::from_columns(row.question_id, row.subitem_id)
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

fn audit_from_row(row: AuditRow) -> Result<Audit, PersistenceError> {
    let call_date = row
        .call_date
        .as_deref()
        .map(parse_call_date)
        .transpose()
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

    Ok(Audit {
        audit_id: Some(row.audit_id),
        company_id: row.company_id,
        manager_id: row.manager_id,
        analyst_id: row.analyst_id,
        version_id: row.version_id,
        status: parse_status(&row.status)?,
        is_deleted: row.is_deleted != 0,
        total_score: row.total_score,
        metadata: AuditMetadata {
            call_date,
            call_reference: row.call_reference,
            summary: row.summary,
        },
        completed_at: row.completed_at.as_deref().map(parse_timestamp).transpose()?,
    })
}

fn list_row_from(row: AuditRow) -> Result<AuditListRow, PersistenceError> {
    Ok(AuditListRow {
        audit_id: row.audit_id,
        company_id: row.company_id,
        manager_id: row.manager_id,
        analyst_id: row.analyst_id,
        version_id: row.version_id,
        status: parse_status(&row.status)?,
        is_deleted: row.is_deleted != 0,
        total_score: row.total_score,
        call_date: row.call_date,
        call_reference: row.call_reference,
        created_at: row.created_at,
        updated_at: row.updated_at,
        completed_at: row.completed_at,
    })
}

fn history_from_row(row: HistoryRow) -> Result<HistoryRecord, PersistenceError> {
    let actor: ActorData = serde_json::from_str(&row.actor_json)?;
    let cause: CauseData = serde_json::from_str(&row.cause_json)?;
    let action: ActionData = serde_json::from_str(&row.action_json)?;
    let before: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
    let after: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;
    let kind: HistoryKind = HistoryKind::parse(&row.kind).map_err(|kind| {
        PersistenceError::ReconstructionError(format!("Unknown history kind: {kind}"))
    })?;

    let mut event: HistoryEvent = HistoryEvent::new(
        Some(row.audit_id),
        kind,
        Actor::from(actor),
        Cause::new(cause.id, cause.description),
        Action::new(action.name, action.details),
        StateSnapshot::new(before.data),
        StateSnapshot::new(after.data),
    );
    event.event_id = Some(row.history_id);

    Ok(HistoryRecord {
        event,
        created_at: row.created_at,
    })
}

backend_fn! {
/// Loads an audit with its answers.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is invalid.
/// Returns `Ok(None)` if the audit is not found.
pub fn get_audit_state(conn: &mut _, audit_id: i64) -> Result<Option<AuditState>, PersistenceError> {
    let result: Result<AuditRow, diesel::result::Error> = audits::table
        .filter(audits::audit_id.eq(audit_id))
        .select(AuditRow::as_select())
        .first(conn);

    let row: AuditRow = match result {
        Ok(row) => row,
        Err(diesel::result::Error::NotFound) => return Ok(None),
        Err(e) => return Err(PersistenceError::from(e)),
    };

    let answer_rows: Vec<AnswerRow> = audit_answers::table
        .filter(audit_answers::audit_id.eq(audit_id))
        .select(AnswerRow::as_select())
        .order_by(audit_answers::answer_id.asc())
        .load(conn)?;

    let mut answers: Vec<AuditAnswer> = Vec::with_capacity(answer_rows.len());
    for answer in answer_rows {
        answers.push(AuditAnswer::new(unit_of(&answer)?, answer.score, answer.comment_text));
    }

    debug!(audit_id, answers = answers.len(), "Loaded audit state");
    Ok(Some(AuditState {
        audit: audit_from_row(row)?,
        answers,
    }))
}
}

backend_fn! {
/// Loads the scoring frozen at completion, in aggregation order.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is invalid.
/// Returns `Ok(None)` unless the audit exists and is completed.
pub fn get_frozen_units(
    conn: &mut _,
    audit_id: i64,
) -> Result<Option<Vec<ScoredUnit>>, PersistenceError> {
    let status: Option<String> = audits::table
        .filter(audits::audit_id.eq(audit_id))
        .select(audits::status)
        .first::<String>(conn)
        .optional()?;

    match status.as_deref().map(parse_status).transpose()? {
        Some(AuditStatus::Completed) => {}
        _ => return Ok(None),
    }

    let rows: Vec<AnswerRow> = audit_answers::table
        .filter(audit_answers::audit_id.eq(audit_id))
        .filter(audit_answers::scored_included.eq(1))
        .select(AnswerRow::as_select())
        .order_by(audit_answers::scored_position.asc())
        .load(conn)?;

    let mut units: Vec<ScoredUnit> = Vec::with_capacity(rows.len());
    for row in rows {
        let unit: UnitRef = unit_of(&row)?;
        let weight: f64 = row.scored_weight.ok_or_else(|| {
            PersistenceError::ReconstructionError(format!(
                "Frozen answer for {unit} of audit {audit_id} has no weight"
            ))
        })?;
        units.push(ScoredUnit {
            unit,
            category: Category::from_optional(row.scored_category.as_deref()),
            weight,
            score: row.score.unwrap_or(0.0),
            answered: row.score.is_some(),
        });
    }
    Ok(Some(units))
}
}

backend_fn! {
/// Lists audits matching a filter, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is invalid.
pub fn list_audits(conn: &mut _, filter: &AuditFilter) -> Result<Vec<AuditListRow>, PersistenceError> {
    let mut query = audits::table.select(AuditRow::as_select()).into_boxed();
    if let Some(company_id) = filter.company_id {
        query = query.filter(audits::company_id.eq(company_id));
    }
    if let Some(manager_id) = filter.manager_id {
        query = query.filter(audits::manager_id.eq(manager_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(audits::status.eq(status.as_str()));
    }
    if !filter.include_deleted {
        query = query.filter(audits::is_deleted.eq(0));
    }

    let rows: Vec<AuditRow> = query.order_by(audits::audit_id.desc()).load(conn)?;
    rows.into_iter().map(list_row_from).collect()
}
}

backend_fn! {
/// Lists completed, non-deleted audits for reporting, oldest completion first.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is invalid.
pub fn list_completed_audit_summaries(
    conn: &mut _,
    company_id: Option<i64>,
) -> Result<Vec<CompletedAuditSummary>, PersistenceError> {
    let mut query = audits::table
        .filter(audits::status.eq(AuditStatus::Completed.as_str()))
        .filter(audits::is_deleted.eq(0))
        .select((
            audits::audit_id,
            audits::company_id,
            audits::manager_id,
            audits::version_id,
            audits::completed_at,
            audits::total_score,
        ))
        .into_boxed();
    if let Some(company_id) = company_id {
        query = query.filter(audits::company_id.eq(company_id));
    }

    let rows: Vec<(i64, i64, Option<i64>, i64, Option<String>, Option<f64>)> = query
        .order_by((audits::completed_at.asc(), audits::audit_id.asc()))
        .load(conn)?;

    let mut summaries: Vec<CompletedAuditSummary> = Vec::with_capacity(rows.len());
    for (audit_id, company_id, manager_id, version_id, completed_at, total_score) in rows {
        let (Some(completed_at), Some(total_score)) = (completed_at, total_score) else {
            return Err(PersistenceError::ReconstructionError(format!(
                "Completed audit {audit_id} is missing its completion time or score"
            )));
        };
        summaries.push(CompletedAuditSummary {
            audit_id,
            company_id,
            manager_id,
            version_id,
            completed_at: parse_timestamp(&completed_at)?,
            total_score,
        });
    }
    Ok(summaries)
}
}

backend_fn! {
/// Loads the history of an audit in the order it was recorded.
///
/// # Errors
///
/// Returns an error if the database query fails or an entry cannot be
/// deserialized.
pub fn get_audit_history(
    conn: &mut _,
    audit_id: i64,
) -> Result<Vec<HistoryRecord>, PersistenceError> {
    let rows: Vec<HistoryRow> = audit_history::table
        .filter(audit_history::audit_id.eq(audit_id))
        .select(HistoryRow::as_select())
        .order_by(audit_history::history_id.asc())
        .load(conn)?;
    rows.into_iter().map(history_from_row).collect()
}
}
