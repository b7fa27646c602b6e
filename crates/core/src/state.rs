// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use callscore_domain::{
    Audit, AuditAnswer, CategoryScore, CompletionScore, QuestionnaireVersion, ScoreScale,
    ScoredUnit,
};
use callscore_history::{HistoryEvent, StateSnapshot};

/// The company an audit targets, as seen by the transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyRef {
    pub company_id: i64,
    pub is_active: bool,
}

/// The manager an audit targets, as seen by the transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerRef {
    pub manager_id: i64,
    pub company_id: i64,
    pub is_active: bool,
}

/// Read-only facts a transition is validated against.
///
/// The version is the one pinned by the audit (or, on creation, the one
/// being pinned).
#[derive(Debug, Clone, PartialEq)]
pub struct AuditContext {
    pub version: QuestionnaireVersion,
    pub scale: ScoreScale,
    pub company: CompanyRef,
    pub manager: Option<ManagerRef>,
}

/// The complete state of a single audit.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditState {
    pub audit: Audit,
    pub answers: Vec<AuditAnswer>,
}

impl AuditState {
    /// Creates a state with no answers.
    #[must_use]
    pub const fn new(audit: Audit) -> Self {
        Self {
            audit,
            answers: Vec::new(),
        }
    }

    /// Converts the state to a snapshot for history purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let answered: usize = self.answers.iter().filter(|a| a.score.is_some()).count();
        let total_score: String = self
            .audit
            .total_score
            .map_or_else(|| String::from("none"), |score| format!("{score:.2}"));
        StateSnapshot::new(format!(
            "status={},deleted={},answers={},answered={},total_score={}",
            self.audit.status,
            self.audit.is_deleted,
            self.answers.len(),
            answered,
            total_score
        ))
    }
}

/// Scores produced by completing an audit.
///
/// `scored_units` is frozen onto the answer rows so later questionnaire
/// edits never change a completed audit's breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub score: CompletionScore,
    /// Top of the scale the audit was scored on.
    pub max_scale_value: f64,
    pub scored_units: Vec<ScoredUnit>,
    pub categories: Vec<CategoryScore>,
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: AuditState,
    /// The history entry recording this transition.
    pub history_event: HistoryEvent,
    /// Present only for `CompleteAudit`.
    pub completion: Option<CompletionOutcome>,
}

/// Scores of an audit as presented on read.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditScores {
    /// Weighted average across all scored units as a fraction of the scale
    /// maximum, in `[0, 1]`.
    pub overall: f64,
    /// Completion percentage (0-100, 2 dp).
    pub percentage: f64,
    /// Per-category weighted averages, in scale units.
    pub categories: Vec<CategoryScore>,
    /// Top of the scale `categories` are measured against.
    pub max_scale_value: f64,
}
