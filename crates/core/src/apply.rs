// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{AuditContext, AuditScores, AuditState, CompletionOutcome, TransitionResult};
use callscore_domain::{
    Audit, AuditStatus, DomainError, QuestionnaireVersion, ScoreScale, ScoredUnit,
    aggregate_categories, aggregate_overall, compute_completion_score, fraction_of_scale,
    resolve_scored_units, unanswered_units, validate_answers, validate_manager_company,
};
use callscore_history::{Action, Actor, Cause, HistoryEvent, HistoryKind, StateSnapshot};

/// Applies `CreateAudit`, producing a new draft audit and its `CREATED` entry.
///
/// # Arguments
///
/// * `context` - The company, manager and version being audited
/// * `command` - Must be `Command::CreateAudit`
/// * `analyst_id` - The operator creating the audit
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The command is not `CreateAudit`
/// - The company is inactive
/// - The manager is unknown, inactive, or belongs to another company
/// - The version does not match the context
pub fn apply_create(
    context: &AuditContext,
    command: Command,
    analyst_id: i64,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let name: &'static str = command.name();
    let Command::CreateAudit {
        company_id,
        manager_id,
        version_id,
        metadata,
    } = command
    else {
        return Err(CoreError::UnsupportedCommand(name));
    };

    if context.company.company_id != company_id {
        return Err(DomainError::CompanyNotFound(company_id).into());
    }
    if !context.company.is_active {
        return Err(DomainError::CompanyInactive(company_id).into());
    }

    if let Some(manager_id) = manager_id {
        let manager = context
            .manager
            .filter(|m| m.manager_id == manager_id)
            .ok_or(DomainError::ManagerNotFound(manager_id))?;
        if !manager.is_active {
            return Err(DomainError::ManagerInactive(manager_id).into());
        }
        validate_manager_company(manager_id, manager.company_id, company_id)?;
    }

    if context.version.version_id != version_id {
        return Err(DomainError::VersionNotFound(version_id).into());
    }

    let audit: Audit = Audit::new_draft(company_id, manager_id, analyst_id, version_id, metadata);
    let new_state: AuditState = AuditState::new(audit);

    let action: Action = Action::new(
        String::from("CreateAudit"),
        Some(format!(
            "Created draft audit for company {company_id} on questionnaire version {} (v{})",
            version_id, context.version.version_number
        )),
    );
    let history_event: HistoryEvent = HistoryEvent::new(
        None,
        HistoryKind::Created,
        actor,
        cause,
        action,
        StateSnapshot::new(String::from("none")),
        new_state.to_snapshot(),
    );

    Ok(TransitionResult {
        new_state,
        history_event,
        completion: None,
    })
}

/// Applies a command to an existing audit, producing a new state and one
/// history entry.
///
/// The input state is never modified.
///
/// # Errors
///
/// Returns an error if:
/// - The command is `CreateAudit` (use [`apply_create`])
/// - The context's version is not the audit's pinned version
/// - The command violates a lifecycle or validation rule
#[allow(clippy::too_many_lines)]
pub fn apply(
    context: &AuditContext,
    state: &AuditState,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    if context.version.version_id != state.audit.version_id {
        return Err(DomainError::VersionNotFound(state.audit.version_id).into());
    }

    let before: StateSnapshot = state.to_snapshot();

    match command {
        Command::CreateAudit { .. } => Err(CoreError::UnsupportedCommand(command.name())),
        Command::UpdateAudit { answers, metadata } => {
            state.audit.ensure_editable()?;
            validate_answers(&answers, &context.version, &context.scale)?;

            let mut new_state: AuditState = state.clone();
            let details: String = format!(
                "Replaced {} answer(s) with {}{}",
                state.answers.len(),
                answers.len(),
                if metadata.is_some() {
                    ", metadata updated"
                } else {
                    ""
                }
            );
            new_state.answers = answers;
            if let Some(metadata) = metadata {
                new_state.audit.metadata = metadata;
            }

            let history_event: HistoryEvent = HistoryEvent::new(
                state.audit.audit_id,
                HistoryKind::Updated,
                actor,
                cause,
                Action::new(String::from("UpdateAudit"), Some(details)),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                history_event,
                completion: None,
            })
        }
        Command::CompleteAudit { completed_at } => {
            state.audit.ensure_completable()?;

            let unanswered = unanswered_units(&state.answers, &context.version);
            if !unanswered.is_empty() {
                return Err(DomainError::IncompleteAudit { unanswered }.into());
            }

            let scored_units: Vec<ScoredUnit> =
                resolve_scored_units(&state.answers, &context.version);
            let score = compute_completion_score(&state.answers, &context.version, &context.scale);
            let categories = aggregate_categories(&scored_units);

            let mut new_state: AuditState = state.clone();
            new_state.audit.status = AuditStatus::Completed;
            new_state.audit.total_score = Some(score.percentage);
            new_state.audit.completed_at = Some(completed_at);

            let history_event: HistoryEvent = HistoryEvent::new(
                state.audit.audit_id,
                HistoryKind::StatusChanged,
                actor,
                cause,
                Action::new(
                    String::from("CompleteAudit"),
                    Some(format!(
                        "{} -> {}, total_score={:.2}",
                        state.audit.status,
                        AuditStatus::Completed,
                        score.percentage
                    )),
                ),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                history_event,
                completion: Some(CompletionOutcome {
                    score,
                    max_scale_value: context.scale.max_value(),
                    scored_units,
                    categories,
                }),
            })
        }
        Command::DeleteAudit => {
            state.audit.ensure_deletable()?;

            let mut new_state: AuditState = state.clone();
            new_state.audit.is_deleted = true;

            let history_event: HistoryEvent = HistoryEvent::new(
                state.audit.audit_id,
                HistoryKind::Deleted,
                actor,
                cause,
                Action::new(String::from("DeleteAudit"), None),
                before,
                new_state.to_snapshot(),
            );

            Ok(TransitionResult {
                new_state,
                history_event,
                completion: None,
            })
        }
    }
}

/// Computes the scores shown when an audit is read.
///
/// Completed audits are scored from the units frozen at completion when
/// they are available; drafts are resolved against the live version tree.
#[must_use]
pub fn compute_audit_scores(
    state: &AuditState,
    version: &QuestionnaireVersion,
    scale: &ScoreScale,
    frozen_units: Option<&[ScoredUnit]>,
) -> AuditScores {
    let max_scale_value: f64 = scale.max_value();
    match (state.audit.status, frozen_units) {
        (AuditStatus::Completed, Some(units)) => AuditScores {
            overall: fraction_of_scale(aggregate_overall(units), max_scale_value),
            percentage: state.audit.total_score.unwrap_or(0.0),
            categories: aggregate_categories(units),
            max_scale_value,
        },
        _ => {
            let units: Vec<ScoredUnit> = resolve_scored_units(&state.answers, version);
            let completion = compute_completion_score(&state.answers, version, scale);
            AuditScores {
                overall: fraction_of_scale(aggregate_overall(&units), max_scale_value),
                percentage: state.audit.total_score.unwrap_or(completion.percentage),
                categories: aggregate_categories(&units),
                max_scale_value,
            }
        }
    }
}
