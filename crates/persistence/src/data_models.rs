// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use callscore_domain::AuditStatus;
use callscore_history::{Action, Actor, Cause, HistoryEvent, StateSnapshot};
use serde::{Deserialize, Serialize};

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
    #[serde(default)]
    pub operator_id: Option<i64>,
    #[serde(default)]
    pub operator_login_name: Option<String>,
    #[serde(default)]
    pub operator_display_name: Option<String>,
}

impl From<&Actor> for ActorData {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id.clone(),
            actor_type: actor.actor_type.clone(),
            operator_id: actor.operator_id,
            operator_login_name: actor.operator_login_name.clone(),
            operator_display_name: actor.operator_display_name.clone(),
        }
    }
}

impl From<ActorData> for Actor {
    fn from(data: ActorData) -> Self {
        Self {
            id: data.id,
            actor_type: data.actor_type,
            operator_id: data.operator_id,
            operator_login_name: data.operator_login_name,
            operator_display_name: data.operator_display_name,
        }
    }
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

impl From<&Cause> for CauseData {
    fn from(cause: &Cause) -> Self {
        Self {
            id: cause.id.clone(),
            description: cause.description.clone(),
        }
    }
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

impl From<&Action> for ActionData {
    fn from(action: &Action) -> Self {
        Self {
            name: action.name.clone(),
            details: action.details.clone(),
        }
    }
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

impl From<&StateSnapshot> for StateSnapshotData {
    fn from(snapshot: &StateSnapshot) -> Self {
        Self {
            data: snapshot.data.clone(),
        }
    }
}

/// A stored operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorData {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    /// Set only for `Company` operators.
    pub company_id: Option<i64>,
    pub is_disabled: bool,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub operator_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// A stored company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyData {
    pub company_id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: String,
}

/// A stored manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerData {
    pub manager_id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

/// One version of a questionnaire, without its question tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSummary {
    pub version_id: i64,
    pub questionnaire_id: i64,
    pub version_number: i32,
    pub created_at: String,
    pub question_count: i64,
    pub is_current: bool,
}

/// Filters for listing audits. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub company_id: Option<i64>,
    pub manager_id: Option<i64>,
    pub status: Option<AuditStatus>,
    pub include_deleted: bool,
}

/// One row of an audit listing.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditListRow {
    pub audit_id: i64,
    pub company_id: i64,
    pub manager_id: Option<i64>,
    pub analyst_id: i64,
    pub version_id: i64,
    pub status: AuditStatus,
    pub is_deleted: bool,
    pub total_score: Option<f64>,
    pub call_date: Option<String>,
    pub call_reference: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

/// A persisted history entry with its recording time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub event: HistoryEvent,
    pub created_at: String,
}
