// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit persistence.
//!
//! A transition is written as one unit: the answer set, the audit row and
//! the history entry commit together or not at all. Completion also freezes
//! the resolved scoring of every answer onto its row (`scored_*` columns).

use callscore::TransitionResult;
use callscore_domain::{Audit, AuditAnswer, ScoredUnit, UnitRef};
use callscore_history::{HistoryEvent, HistoryKind};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::ToPrimitive;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::{audit_answers, audit_history, audits};
use crate::error::PersistenceError;
use crate::timestamp::{format_call_date, format_timestamp, now_timestamp};

/// Splits a unit reference into the two nullable answer columns.
const fn unit_columns(unit: UnitRef) -> (Option<i64>, Option<i64>) {
    match unit {
        UnitRef::Question(id) => (Some(id), None),
        UnitRef::Subitem(id) => (None, Some(id)),
    }
}

/// The frozen scoring of one answer.
struct FrozenColumns {
    included: i32,
    weight: Option<f64>,
    category: Option<String>,
    position: Option<i32>,
}

fn frozen_columns(
    answer: &AuditAnswer,
    scored: Option<&[ScoredUnit]>,
) -> Result<FrozenColumns, PersistenceError> {
    let found = scored.and_then(|units| {
        units
            .iter()
            .enumerate()
            .find(|(_, unit)| unit.unit == answer.unit)
    });
    match found {
        Some((position, unit)) => Ok(FrozenColumns {
            included: 1,
            weight: Some(unit.weight),
            category: unit.category.as_optional().map(str::to_string),
            position: Some(position.to_i32().ok_or_else(|| {
                PersistenceError::Other(format!("Scored position out of range: {position}"))
            })?),
        }),
        None => Ok(FrozenColumns {
            included: 0,
            weight: None,
            category: None,
            position: None,
        }),
    }
}

fn optional_timestamp(
    value: Option<time::OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    value.map(format_timestamp).transpose()
}

backend_fn! {
/// Inserts a new audit row.
///
/// # Errors
///
/// Returns an error if the insert fails.
fn insert_audit(conn: &mut _, audit: &Audit) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;
    let call_date: Option<String> = audit.metadata.call_date.map(format_call_date).transpose()?;

    diesel::insert_into(audits::table)
        .values((
            audits::company_id.eq(audit.company_id),
            audits::manager_id.eq(audit.manager_id),
            audits::analyst_id.eq(audit.analyst_id),
            audits::version_id.eq(audit.version_id),
            audits::status.eq(audit.status.as_str()),
            audits::is_deleted.eq(i32::from(audit.is_deleted)),
            audits::total_score.eq(audit.total_score),
            audits::call_date.eq(call_date),
            audits::call_reference.eq(audit.metadata.call_reference.as_deref()),
            audits::summary.eq(audit.metadata.summary.as_deref()),
            audits::created_at.eq(&now),
            audits::updated_at.eq(&now),
            audits::completed_at.eq(optional_timestamp(audit.completed_at)?),
        ))
        .execute(conn)?;

    Ok(conn.get_last_insert_rowid()?)
}
}

backend_fn! {
/// Writes the mutable fields of an audit row.
///
/// # Errors
///
/// Returns `AuditNotFound` if the row does not exist.
fn update_audit_row(conn: &mut _, audit_id: i64, audit: &Audit) -> Result<(), PersistenceError> {
    let now: String = now_timestamp()?;
    let call_date: Option<String> = audit.metadata.call_date.map(format_call_date).transpose()?;

    let rows: usize = diesel::update(audits::table)
        .filter(audits::audit_id.eq(audit_id))
        .set((
            audits::status.eq(audit.status.as_str()),
            audits::is_deleted.eq(i32::from(audit.is_deleted)),
            audits::total_score.eq(audit.total_score),
            audits::call_date.eq(call_date),
            audits::call_reference.eq(audit.metadata.call_reference.as_deref()),
            audits::summary.eq(audit.metadata.summary.as_deref()),
            audits::updated_at.eq(&now),
            audits::completed_at.eq(optional_timestamp(audit.completed_at)?),
        ))
        .execute(conn)?;

    if rows == 0 {
        return Err(PersistenceError::AuditNotFound(audit_id));
    }
    Ok(())
}
}

backend_fn! {
/// Replaces the whole answer set of an audit.
///
/// When `scored` is present each answer row also records its frozen
/// scoring: whether it was counted, its effective weight, its category and
/// its position in the aggregation order.
///
/// # Errors
///
/// Returns an error if a delete or insert fails.
fn replace_answers(
    conn: &mut _,
    audit_id: i64,
    answers: &[AuditAnswer],
    scored: Option<&[ScoredUnit]>,
) -> Result<usize, PersistenceError> {
    let removed: usize = diesel::delete(audit_answers::table)
        .filter(audit_answers::audit_id.eq(audit_id))
        .execute(conn)?;

    for answer in answers {
        let (question_id, subitem_id) = unit_columns(answer.unit);
        let frozen: FrozenColumns = frozen_columns(answer, scored)?;
        diesel::insert_into(audit_answers::table)
            .values((
                audit_answers::audit_id.eq(audit_id),
                audit_answers::question_id.eq(question_id),
                audit_answers::subitem_id.eq(subitem_id),
                audit_answers::score.eq(answer.score),
                audit_answers::comment_text.eq(answer.comment.as_deref()),
                audit_answers::scored_included.eq(frozen.included),
                audit_answers::scored_weight.eq(frozen.weight),
                audit_answers::scored_category.eq(frozen.category),
                audit_answers::scored_position.eq(frozen.position),
            ))
            .execute(conn)?;
    }

    debug!(audit_id, removed, inserted = answers.len(), "Replaced audit answers");
    Ok(answers.len())
}
}

backend_fn! {
/// Appends a history entry for an audit.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
fn insert_history_event(
    conn: &mut _,
    audit_id: i64,
    event: &HistoryEvent,
) -> Result<i64, PersistenceError> {
    let actor_json: String = serde_json::to_string(&ActorData::from(&event.actor))?;
    let cause_json: String = serde_json::to_string(&CauseData::from(&event.cause))?;
    let action_json: String = serde_json::to_string(&ActionData::from(&event.action))?;
    let before_json: String = serde_json::to_string(&StateSnapshotData::from(&event.before))?;
    let after_json: String = serde_json::to_string(&StateSnapshotData::from(&event.after))?;
    let now: String = now_timestamp()?;

    diesel::insert_into(audit_history::table)
        .values((
            audit_history::audit_id.eq(audit_id),
            audit_history::kind.eq(event.kind.as_str()),
            audit_history::actor_operator_id.eq(event.actor.operator_id),
            audit_history::actor_login_name.eq(event.actor.operator_login_name.as_deref()),
            audit_history::actor_display_name.eq(event.actor.operator_display_name.as_deref()),
            audit_history::actor_json.eq(&actor_json),
            audit_history::cause_json.eq(&cause_json),
            audit_history::action_json.eq(&action_json),
            audit_history::before_snapshot_json.eq(&before_json),
            audit_history::after_snapshot_json.eq(&after_json),
            audit_history::created_at.eq(&now),
        ))
        .execute(conn)?;

    let history_id: i64 = conn.get_last_insert_rowid()?;
    debug!(history_id, audit_id, kind = %event.kind, "Appended audit history");
    Ok(history_id)
}
}

/// Ids written when an audit is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedAudit {
    pub audit_id: i64,
    pub history_id: i64,
}

/// Persists a `CreateAudit` result (`SQLite` version).
///
/// # Errors
///
/// Returns an error if an insert fails. Nothing is written on error.
pub fn persist_created_audit_sqlite(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistedAudit, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let audit_id: i64 = insert_audit_sqlite(conn, &result.new_state.audit)?;
        let history_id: i64 = insert_history_event_sqlite(conn, audit_id, &result.history_event)?;
        info!(audit_id, company_id = result.new_state.audit.company_id, "Created audit");
        Ok(PersistedAudit {
            audit_id,
            history_id,
        })
    })
}

/// Persists a `CreateAudit` result (`MySQL` version).
///
/// # Errors
///
/// Returns an error if an insert fails. Nothing is written on error.
pub fn persist_created_audit_mysql(
    conn: &mut MysqlConnection,
    result: &TransitionResult,
) -> Result<PersistedAudit, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let audit_id: i64 = insert_audit_mysql(conn, &result.new_state.audit)?;
        let history_id: i64 = insert_history_event_mysql(conn, audit_id, &result.history_event)?;
        info!(audit_id, company_id = result.new_state.audit.company_id, "Created audit");
        Ok(PersistedAudit {
            audit_id,
            history_id,
        })
    })
}

/// Persists a transition of an existing audit (`SQLite` version).
///
/// # Returns
///
/// The id of the appended history entry.
///
/// # Errors
///
/// Returns an error if any write fails. Nothing is written on error.
pub fn persist_transition_sqlite(
    conn: &mut SqliteConnection,
    audit_id: i64,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        match (&result.completion, result.history_event.kind) {
            (Some(completion), _) => {
                replace_answers_sqlite(
                    conn,
                    audit_id,
                    &result.new_state.answers,
                    Some(&completion.scored_units),
                )?;
            }
            (None, HistoryKind::Updated) => {
                replace_answers_sqlite(conn, audit_id, &result.new_state.answers, None)?;
            }
            (None, _) => {}
        }
        update_audit_row_sqlite(conn, audit_id, &result.new_state.audit)?;
        let history_id: i64 = insert_history_event_sqlite(conn, audit_id, &result.history_event)?;
        info!(audit_id, history_id, kind = %result.history_event.kind, "Persisted audit transition");
        Ok(history_id)
    })
}

/// Persists a transition of an existing audit (`MySQL` version).
///
/// # Returns
///
/// The id of the appended history entry.
///
/// # Errors
///
/// Returns an error if any write fails. Nothing is written on error.
pub fn persist_transition_mysql(
    conn: &mut MysqlConnection,
    audit_id: i64,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        match (&result.completion, result.history_event.kind) {
            (Some(completion), _) => {
                replace_answers_mysql(
                    conn,
                    audit_id,
                    &result.new_state.answers,
                    Some(&completion.scored_units),
                )?;
            }
            (None, HistoryKind::Updated) => {
                replace_answers_mysql(conn, audit_id, &result.new_state.answers, None)?;
            }
            (None, _) => {}
        }
        update_audit_row_mysql(conn, audit_id, &result.new_state.audit)?;
        let history_id: i64 = insert_history_event_mysql(conn, audit_id, &result.history_event)?;
        info!(audit_id, history_id, kind = %result.history_event.kind, "Persisted audit transition");
        Ok(history_id)
    })
}
