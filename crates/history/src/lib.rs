// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// Operator-initiated actions carry the operator's identity so the history
/// stays readable after the operator is renamed or disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "operator", "system").
    pub actor_type: String,
    /// The operator id, when an operator performed the action.
    pub operator_id: Option<i64>,
    /// The operator login name at the time of the action.
    pub operator_login_name: Option<String>,
    /// The operator display name at the time of the action.
    pub operator_display_name: Option<String>,
}

impl Actor {
    /// Creates a new Actor without operator information.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self {
            id,
            actor_type,
            operator_id: None,
            operator_login_name: None,
            operator_display_name: None,
        }
    }

    /// Creates a new Actor attributed to an operator.
    #[must_use]
    pub const fn with_operator(
        id: String,
        actor_type: String,
        operator_id: i64,
        operator_login_name: String,
        operator_display_name: String,
    ) -> Self {
        Self {
            id,
            actor_type,
            operator_id: Some(operator_id),
            operator_login_name: Some(operator_login_name),
            operator_display_name: Some(operator_display_name),
        }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`CompleteAudit`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A snapshot of audit state at a point in time.
///
/// The data is an opaque, human-readable rendering produced by the core
/// crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// The kind of transition a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Created,
    Updated,
    StatusChanged,
    Deleted,
}

impl HistoryKind {
    /// Converts this kind to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::StatusChanged => "STATUS_CHANGED",
            Self::Deleted => "DELETED",
        }
    }

    /// Parses a stored history kind.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized input.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "CREATED" => Ok(Self::Created),
            "UPDATED" => Ok(Self::Updated),
            "STATUS_CHANGED" => Ok(Self::StatusChanged),
            "DELETED" => Ok(Self::Deleted),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable history entry representing one audit transition.
///
/// Every successful audit transition produces exactly one history event.
/// History is append-only: entries are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEvent {
    /// The database id, `None` until persisted.
    pub event_id: Option<i64>,
    /// The audit this entry belongs to, `None` until the audit is persisted.
    pub audit_id: Option<i64>,
    /// The kind of transition.
    pub kind: HistoryKind,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl HistoryEvent {
    /// Creates a new, unpersisted `HistoryEvent`.
    #[must_use]
    pub const fn new(
        audit_id: Option<i64>,
        kind: HistoryKind,
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            audit_id,
            kind,
            actor,
            cause,
            action,
            before,
            after,
        }
    }

    /// Returns a copy bound to the given audit id.
    #[must_use]
    pub const fn for_audit(mut self, audit_id: i64) -> Self {
        self.audit_id = Some(audit_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> HistoryEvent {
        HistoryEvent::new(
            Some(42),
            HistoryKind::Updated,
            Actor::new(String::from("analyst-7"), String::from("operator")),
            Cause::new(String::from("req-456"), String::from("Answer edit")),
            Action::new(String::from("UpdateAudit"), None),
            StateSnapshot::new(String::from("before-state")),
            StateSnapshot::new(String::from("after-state")),
        )
    }

    #[test]
    fn test_actor_creation_without_operator() {
        let actor: Actor = Actor::new(String::from("system"), String::from("system"));

        assert_eq!(actor.id, "system");
        assert_eq!(actor.actor_type, "system");
        assert_eq!(actor.operator_id, None);
    }

    #[test]
    fn test_actor_with_operator_carries_identity() {
        let actor: Actor = Actor::with_operator(
            String::from("7"),
            String::from("operator"),
            7,
            String::from("jdoe"),
            String::from("Jane Doe"),
        );

        assert_eq!(actor.operator_id, Some(7));
        assert_eq!(actor.operator_login_name.as_deref(), Some("jdoe"));
        assert_eq!(actor.operator_display_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_action_creation_with_details() {
        let action: Action = Action::new(
            String::from("CompleteAudit"),
            Some(String::from("total_score=40")),
        );

        assert_eq!(action.name, "CompleteAudit");
        assert_eq!(action.details, Some(String::from("total_score=40")));
    }

    #[test]
    fn test_history_kind_round_trips_through_strings() {
        for kind in [
            HistoryKind::Created,
            HistoryKind::Updated,
            HistoryKind::StatusChanged,
            HistoryKind::Deleted,
        ] {
            assert_eq!(HistoryKind::parse(kind.as_str()), Ok(kind));
        }
        assert_eq!(HistoryKind::parse("ARCHIVED"), Err(String::from("ARCHIVED")));
        assert_eq!(HistoryKind::StatusChanged.to_string(), "STATUS_CHANGED");
    }

    #[test]
    fn test_history_event_creation_requires_all_fields() {
        let event: HistoryEvent = sample_event();

        assert_eq!(event.event_id, None);
        assert_eq!(event.audit_id, Some(42));
        assert_eq!(event.kind, HistoryKind::Updated);
        assert_eq!(event.actor.id, "analyst-7");
        assert_eq!(event.cause.id, "req-456");
        assert_eq!(event.before.data, "before-state");
        assert_eq!(event.after.data, "after-state");
    }

    #[test]
    fn test_for_audit_binds_audit_id() {
        let mut event: HistoryEvent = sample_event();
        event.audit_id = None;

        let bound: HistoryEvent = event.for_audit(9);
        assert_eq!(bound.audit_id, Some(9));
    }

    #[test]
    fn test_history_event_equality() {
        assert_eq!(sample_event(), sample_event());
        assert_ne!(sample_event(), sample_event().for_audit(1));
    }
}
