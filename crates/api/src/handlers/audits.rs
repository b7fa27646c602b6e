// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit lifecycle handlers.
//!
//! Every mutation follows the same shape: authorize, load the state and
//! its context, run the command through the core, then persist the
//! transition together with its history entry.

use callscore::{
    AuditContext, AuditScores, AuditState, Command, CompanyRef, ManagerRef, TransitionResult,
    apply, apply_create, compute_audit_scores, current_version_id,
};
use callscore_domain::{
    AuditAnswer, AuditMetadata, AuditStatus, DomainError, Questionnaire, QuestionnaireVersion,
    ScoreScale, ScoredUnit, UnitRef, parse_call_date,
};
use callscore_history::Cause;
use callscore_persistence::{
    AuditFilter, AuditListRow, HistoryRecord, OperatorData, PersistedAudit, SqlitePersistence,
    format_call_date, format_timestamp,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use super::{category_score_info, not_found, questionnaires::load_questionnaire};
use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::capabilities::compute_audit_capabilities;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AnswerInfo, AnswerInput, AuditDetailResponse, AuditHistoryResponse, AuditMetadataInput,
    AuditMutationResponse, AuditSummaryInfo, CompleteAuditResponse, CreateAuditRequest,
    HistoryEntryInfo, ListAuditsRequest, ListAuditsResponse, UpdateAuditRequest,
};

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn to_metadata(input: AuditMetadataInput) -> Result<AuditMetadata, ApiError> {
    let call_date = non_empty(input.call_date)
        .map(|raw| parse_call_date(&raw))
        .transpose()
        .map_err(translate_domain_error)?;
    Ok(AuditMetadata {
        call_date,
        call_reference: non_empty(input.call_reference),
        summary: non_empty(input.summary),
    })
}

fn to_answers(inputs: Vec<AnswerInput>) -> Result<Vec<AuditAnswer>, ApiError> {
    inputs
        .into_iter()
        .map(|input| {
            let unit: UnitRef = UnitRef::from_columns(input.question_id, input.subitem_id)
                .map_err(translate_domain_error)?;
            Ok(AuditAnswer::new(unit, input.score, non_empty(input.comment)))
        })
        .collect()
}

fn load_version(
    persistence: &mut SqlitePersistence,
    version_id: i64,
) -> Result<QuestionnaireVersion, ApiError> {
    persistence
        .get_version_tree(version_id)
        .map_err(|e| translate_persistence_error(e, "Questionnaire version"))?
        .ok_or_else(|| translate_domain_error(DomainError::VersionNotFound(version_id)))
}

pub(crate) fn load_scale_for_version(
    persistence: &mut SqlitePersistence,
    version_id: i64,
) -> Result<ScoreScale, ApiError> {
    let scale_id: i64 = persistence
        .get_scale_id_for_version(version_id)
        .map_err(|e| translate_persistence_error(e, "Score scale"))?
        .ok_or_else(|| translate_domain_error(DomainError::VersionNotFound(version_id)))?;

    persistence
        .get_scale(scale_id)
        .map_err(|e| translate_persistence_error(e, "Score scale"))?
        .ok_or_else(|| not_found("Score scale", format!("Score scale {scale_id} does not exist")))
}

/// Assembles everything the core needs to judge a command.
fn load_context(
    persistence: &mut SqlitePersistence,
    version_id: i64,
    company_id: i64,
    manager_id: Option<i64>,
) -> Result<AuditContext, ApiError> {
    let version: QuestionnaireVersion = load_version(persistence, version_id)?;
    let scale: ScoreScale = load_scale_for_version(persistence, version_id)?;

    let company: CompanyRef = persistence
        .get_company(company_id)
        .map_err(|e| translate_persistence_error(e, "Company"))?
        .map(|c| CompanyRef {
            company_id: c.company_id,
            is_active: c.is_active,
        })
        .ok_or_else(|| translate_domain_error(DomainError::CompanyNotFound(company_id)))?;

    let manager: Option<ManagerRef> = manager_id
        .map(|id| persistence.get_manager(id))
        .transpose()
        .map_err(|e| translate_persistence_error(e, "Manager"))?
        .flatten()
        .map(|m| ManagerRef {
            manager_id: m.manager_id,
            company_id: m.company_id,
            is_active: m.is_active,
        });

    Ok(AuditContext {
        version,
        scale,
        company,
        manager,
    })
}

fn load_state(persistence: &mut SqlitePersistence, audit_id: i64) -> Result<AuditState, ApiError> {
    persistence
        .get_audit_state(audit_id)
        .map_err(|e| translate_persistence_error(e, "Audit"))?
        .ok_or_else(|| not_found("Audit", format!("Audit {audit_id} does not exist")))
}

/// Runs a command against a stored audit and persists the outcome.
fn transition(
    persistence: &mut SqlitePersistence,
    audit_id: i64,
    command: Command,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<TransitionResult, ApiError> {
    let state: AuditState = load_state(persistence, audit_id)?;
    let context: AuditContext = load_context(
        persistence,
        state.audit.version_id,
        state.audit.company_id,
        state.audit.manager_id,
    )?;

    let result: TransitionResult = apply(
        &context,
        &state,
        command,
        authenticated_actor.to_history_actor(operator),
        cause,
    )
    .map_err(translate_core_error)?;

    let history_id: i64 = persistence
        .persist_transition(audit_id, &result)
        .map_err(|e| translate_persistence_error(e, "Audit"))?;
    debug!(audit_id, history_id, "Persisted audit transition");

    Ok(result)
}

fn mutation_response(audit_id: i64, result: &TransitionResult, message: String) -> AuditMutationResponse {
    AuditMutationResponse {
        audit_id,
        company_id: result.new_state.audit.company_id,
        status: result.new_state.audit.status.as_str().to_string(),
        is_deleted: result.new_state.audit.is_deleted,
        message,
    }
}

/// Creates a draft audit against the questionnaire's current version.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not conduct audits
/// - The questionnaire is missing, inactive, or has no current version
/// - The company or manager is missing, inactive, or mismatched
/// - The call date is malformed
pub fn create_audit(
    persistence: &mut SqlitePersistence,
    request: CreateAuditRequest,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<AuditMutationResponse, ApiError> {
    AuthorizationService::authorize_conduct_audits(authenticated_actor, "create_audit")?;

    let questionnaire: Questionnaire = load_questionnaire(persistence, request.questionnaire_id)?;
    if !questionnaire.is_active {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("active_questionnaire"),
            message: format!(
                "Questionnaire '{}' is inactive and cannot be used for new audits",
                questionnaire.name
            ),
        });
    }
    let version_id: i64 = current_version_id(&questionnaire).map_err(translate_domain_error)?;

    let metadata: AuditMetadata = to_metadata(request.metadata)?;
    let context: AuditContext =
        load_context(persistence, version_id, request.company_id, request.manager_id)?;

    let command: Command = Command::CreateAudit {
        company_id: request.company_id,
        manager_id: request.manager_id,
        version_id,
        metadata,
    };
    let result: TransitionResult = apply_create(
        &context,
        command,
        operator.operator_id,
        authenticated_actor.to_history_actor(operator),
        cause,
    )
    .map_err(translate_core_error)?;

    let persisted: PersistedAudit = persistence
        .persist_created_audit(&result)
        .map_err(|e| translate_persistence_error(e, "Audit"))?;

    info!(
        audit_id = persisted.audit_id,
        company_id = request.company_id,
        version_id,
        analyst_id = operator.operator_id,
        "Created draft audit"
    );

    Ok(mutation_response(
        persisted.audit_id,
        &result,
        format!("Draft audit {} created", persisted.audit_id),
    ))
}

/// Replaces the answer set of a draft audit.
///
/// # Errors
///
/// Returns an error if the actor may not conduct audits, the audit is
/// missing, locked or deleted, or an answer is invalid.
pub fn update_audit(
    persistence: &mut SqlitePersistence,
    audit_id: i64,
    request: UpdateAuditRequest,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<AuditMutationResponse, ApiError> {
    AuthorizationService::authorize_conduct_audits(authenticated_actor, "update_audit")?;

    let answers: Vec<AuditAnswer> = to_answers(request.answers)?;
    let metadata: Option<AuditMetadata> = request.metadata.map(to_metadata).transpose()?;
    let answer_count: usize = answers.len();

    let result: TransitionResult = transition(
        persistence,
        audit_id,
        Command::UpdateAudit { answers, metadata },
        authenticated_actor,
        operator,
        cause,
    )?;

    info!(audit_id, answers = answer_count, "Updated draft audit");

    Ok(mutation_response(
        audit_id,
        &result,
        format!("Audit {audit_id} updated"),
    ))
}

/// Completes a draft audit, freezing its score.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not conduct audits
/// - The audit is missing, already completed, or deleted
/// - Any active scorable unit is unanswered
pub fn complete_audit(
    persistence: &mut SqlitePersistence,
    audit_id: i64,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<CompleteAuditResponse, ApiError> {
    AuthorizationService::authorize_conduct_audits(authenticated_actor, "complete_audit")?;

    let completed_at: OffsetDateTime = OffsetDateTime::now_utc();
    let result: TransitionResult = transition(
        persistence,
        audit_id,
        Command::CompleteAudit { completed_at },
        authenticated_actor,
        operator,
        cause,
    )?;

    let completion = result.completion.as_ref().ok_or_else(|| ApiError::Internal {
        message: format!("Completing audit {audit_id} produced no score"),
    })?;
    let audit = &result.new_state.audit;

    info!(
        audit_id,
        company_id = audit.company_id,
        total_score = completion.score.percentage,
        "Completed audit"
    );

    Ok(CompleteAuditResponse {
        audit_id,
        company_id: audit.company_id,
        manager_id: audit.manager_id,
        total_score: completion.score.percentage,
        completed_at: format_timestamp(completed_at)
            .map_err(|e| translate_persistence_error(e, "Audit"))?,
        categories: completion
            .categories
            .iter()
            .map(|c| category_score_info(c, completion.max_scale_value))
            .collect(),
        message: format!(
            "Audit {audit_id} completed with a score of {:.2}%",
            completion.score.percentage
        ),
    })
}

/// Soft-deletes an audit.
///
/// # Errors
///
/// Returns an error if the actor may not conduct audits or the audit is
/// missing or already deleted.
pub fn delete_audit(
    persistence: &mut SqlitePersistence,
    audit_id: i64,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<AuditMutationResponse, ApiError> {
    AuthorizationService::authorize_conduct_audits(authenticated_actor, "delete_audit")?;

    let result: TransitionResult = transition(
        persistence,
        audit_id,
        Command::DeleteAudit,
        authenticated_actor,
        operator,
        cause,
    )?;

    info!(audit_id, deleted_by = %authenticated_actor.id, "Deleted audit");

    Ok(mutation_response(
        audit_id,
        &result,
        format!("Audit {audit_id} deleted"),
    ))
}

/// Returns an audit with its answers, scores and capabilities.
///
/// Completed audits are scored from the snapshot frozen at completion, so
/// later questionnaire edits do not change them.
///
/// # Errors
///
/// Returns an error if the audit does not exist or is outside the actor's
/// scope.
pub fn get_audit(
    persistence: &mut SqlitePersistence,
    audit_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<AuditDetailResponse, ApiError> {
    let state: AuditState = load_state(persistence, audit_id)?;
    AuthorizationService::authorize_view_audit(authenticated_actor, &state.audit)?;

    let version: QuestionnaireVersion = load_version(persistence, state.audit.version_id)?;
    let scale: ScoreScale = load_scale_for_version(persistence, state.audit.version_id)?;

    let frozen: Option<Vec<ScoredUnit>> = if state.audit.status == AuditStatus::Completed {
        persistence
            .get_frozen_units(audit_id)
            .map_err(|e| translate_persistence_error(e, "Audit"))?
    } else {
        None
    };
    let scores: AuditScores = compute_audit_scores(&state, &version, &scale, frozen.as_deref());

    let call_date: Option<String> = state
        .audit
        .metadata
        .call_date
        .map(format_call_date)
        .transpose()
        .map_err(|e| translate_persistence_error(e, "Audit"))?;
    let completed_at: Option<String> = state
        .audit
        .completed_at
        .map(format_timestamp)
        .transpose()
        .map_err(|e| translate_persistence_error(e, "Audit"))?;

    let capabilities = compute_audit_capabilities(authenticated_actor, &state.audit);
    let audit = state.audit;

    Ok(AuditDetailResponse {
        audit_id,
        company_id: audit.company_id,
        manager_id: audit.manager_id,
        analyst_id: audit.analyst_id,
        questionnaire_id: version.questionnaire_id,
        version_id: version.version_id,
        version_number: version.version_number,
        status: audit.status.as_str().to_string(),
        is_deleted: audit.is_deleted,
        call_date,
        call_reference: audit.metadata.call_reference,
        summary: audit.metadata.summary,
        completed_at,
        total_score: audit.total_score,
        overall_ratio: scores.overall,
        percentage: scores.percentage,
        categories: scores
            .categories
            .iter()
            .map(|c| category_score_info(c, scores.max_scale_value))
            .collect(),
        answers: state
            .answers
            .into_iter()
            .map(|a| AnswerInfo {
                question_id: a.unit.question_id(),
                subitem_id: a.unit.subitem_id(),
                score: a.score,
                comment: a.comment,
            })
            .collect(),
        capabilities,
    })
}

/// Lists audits matching a filter.
///
/// `Company` operators are confined to the completed, non-deleted audits
/// of their own company whatever the request says.
///
/// # Errors
///
/// Returns an error if the status filter is unknown or the query fails.
pub fn list_audits(
    persistence: &mut SqlitePersistence,
    request: &ListAuditsRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListAuditsResponse, ApiError> {
    let status: Option<AuditStatus> = request
        .status
        .as_deref()
        .map(str::parse::<AuditStatus>)
        .transpose()
        .map_err(translate_domain_error)?;

    let filter: AuditFilter = match authenticated_actor.role {
        Role::Admin | Role::Analyst => AuditFilter {
            company_id: request.company_id,
            manager_id: request.manager_id,
            status,
            include_deleted: request.include_deleted,
        },
        Role::Company => {
            let own_company: Option<i64> = authenticated_actor.company_id;
            if let Some(requested) = request.company_id {
                AuthorizationService::authorize_view_company(
                    authenticated_actor,
                    requested,
                    "list_audits",
                )?;
            }
            AuditFilter {
                company_id: own_company,
                manager_id: request.manager_id,
                status: Some(AuditStatus::Completed),
                include_deleted: false,
            }
        }
    };

    if authenticated_actor.role == Role::Company && filter.company_id.is_none() {
        return Ok(ListAuditsResponse { audits: Vec::new() });
    }

    let rows: Vec<AuditListRow> = persistence
        .list_audits(&filter)
        .map_err(|e| translate_persistence_error(e, "Audit"))?;

    Ok(ListAuditsResponse {
        audits: rows
            .into_iter()
            .map(|row| AuditSummaryInfo {
                audit_id: row.audit_id,
                company_id: row.company_id,
                manager_id: row.manager_id,
                analyst_id: row.analyst_id,
                version_id: row.version_id,
                status: row.status.as_str().to_string(),
                is_deleted: row.is_deleted,
                total_score: row.total_score,
                call_date: row.call_date,
                call_reference: row.call_reference,
                created_at: row.created_at,
                updated_at: row.updated_at,
                completed_at: row.completed_at,
            })
            .collect(),
    })
}

/// Returns the full history of an audit in recording order.
///
/// # Errors
///
/// Returns an error for `Company` operators or if the audit does not exist.
pub fn get_audit_history(
    persistence: &mut SqlitePersistence,
    audit_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<AuditHistoryResponse, ApiError> {
    AuthorizationService::authorize_view_internal(authenticated_actor, "get_audit_history")?;
    load_state(persistence, audit_id)?;

    let records: Vec<HistoryRecord> = persistence
        .get_audit_history(audit_id)
        .map_err(|e| translate_persistence_error(e, "Audit"))?;

    Ok(AuditHistoryResponse {
        audit_id,
        entries: records
            .into_iter()
            .map(|record| {
                let event = record.event;
                HistoryEntryInfo {
                    event_id: event.event_id,
                    kind: event.kind.as_str().to_string(),
                    action: event.action.name,
                    details: event.action.details,
                    actor_login_name: event.actor.operator_login_name,
                    actor_display_name: event.actor.operator_display_name,
                    cause: event.cause.description,
                    before: event.before.data,
                    after: event.after.data,
                    created_at: record.created_at,
                }
            })
            .collect(),
    })
}
