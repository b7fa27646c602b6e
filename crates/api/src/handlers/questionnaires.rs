// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Questionnaire and score scale administration.

use callscore_domain::{
    Question, QuestionDraft, Questionnaire, QuestionnaireVersion, ScaleValue, ScoreScale,
    SubitemDraft, validate_name, validate_question_draft, validate_scale,
};
use callscore_persistence::{SqlitePersistence, VersionSummary};
use num_traits::ToPrimitive;
use tracing::info;

use super::{not_found, scale_info};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    CreateQuestionnaireRequest, CreateQuestionnaireResponse, CreateScaleRequest,
    ListQuestionnairesResponse, ListScalesResponse, ListVersionsResponse, PublishVersionRequest,
    PublishVersionResponse, QuestionInfo, QuestionInput, QuestionnaireInfo, ScaleInfo,
    SetCurrentVersionRequest, SubitemInfo, VersionInfo, VersionTreeResponse,
};

// ========================================================================
// Score scales
// ========================================================================

/// Creates a score scale.
///
/// The first scale created always becomes the default.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The name is empty or already used
/// - The values are empty, negative or repeated
pub fn create_scale(
    persistence: &mut SqlitePersistence,
    request: CreateScaleRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ScaleInfo, ApiError> {
    AuthorizationService::authorize_manage_questionnaires(authenticated_actor, "create_scale")?;
    validate_name("name", &request.name).map_err(translate_domain_error)?;

    let mut values: Vec<ScaleValue> = Vec::with_capacity(request.values.len());
    for (index, input) in request.values.into_iter().enumerate() {
        let display_order: i32 = index.to_i32().ok_or_else(|| ApiError::InvalidInput {
            field: String::from("values"),
            message: String::from("Too many scale values"),
        })?;
        values.push(ScaleValue {
            value: input.value,
            label: input.label.trim().to_string(),
            display_order,
        });
    }

    let scale: ScoreScale =
        ScoreScale::new(request.name.trim().to_string(), request.is_default, values);
    validate_scale(&scale).map_err(translate_domain_error)?;

    let scale_id: i64 = persistence
        .create_scale(&scale)
        .map_err(|e| translate_persistence_error(e, "Score scale"))?;

    info!(scale_id, created_by = %authenticated_actor.id, "Created score scale");

    load_scale(persistence, scale_id).and_then(scale_info)
}

/// Lists score scales.
///
/// # Errors
///
/// Returns an error for `Company` operators or if the query fails.
pub fn list_scales(
    persistence: &mut SqlitePersistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListScalesResponse, ApiError> {
    AuthorizationService::authorize_view_internal(authenticated_actor, "list_scales")?;

    let scales: Vec<ScoreScale> = persistence
        .list_scales()
        .map_err(|e| translate_persistence_error(e, "Score scale"))?;

    Ok(ListScalesResponse {
        scales: scales
            .into_iter()
            .map(scale_info)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

/// Makes a scale the default, clearing the previous default.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the scale does not
/// exist.
pub fn set_default_scale(
    persistence: &mut SqlitePersistence,
    scale_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ScaleInfo, ApiError> {
    AuthorizationService::authorize_manage_questionnaires(authenticated_actor, "set_default_scale")?;

    persistence
        .set_default_scale(scale_id)
        .map_err(|e| translate_persistence_error(e, "Score scale"))?;

    info!(scale_id, "Changed default score scale");

    load_scale(persistence, scale_id).and_then(scale_info)
}

fn load_scale(persistence: &mut SqlitePersistence, scale_id: i64) -> Result<ScoreScale, ApiError> {
    persistence
        .get_scale(scale_id)
        .map_err(|e| translate_persistence_error(e, "Score scale"))?
        .ok_or_else(|| not_found("Score scale", format!("Score scale {scale_id} does not exist")))
}

// ========================================================================
// Questionnaires
// ========================================================================

fn to_drafts(questions: Vec<QuestionInput>) -> Result<Vec<QuestionDraft>, ApiError> {
    if questions.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("questions"),
            message: String::from("A questionnaire version needs at least one question"),
        });
    }

    let drafts: Vec<QuestionDraft> = questions
        .into_iter()
        .map(|q| QuestionDraft {
            text: q.text.trim().to_string(),
            weight: q.weight,
            category: q
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            has_subitems: q.has_subitems,
            subitems: q
                .subitems
                .into_iter()
                .map(|s| SubitemDraft {
                    text: s.text.trim().to_string(),
                    weight: s.weight,
                })
                .collect(),
        })
        .collect();

    for draft in &drafts {
        validate_question_draft(draft).map_err(translate_domain_error)?;
    }
    Ok(drafts)
}

fn questionnaire_info(questionnaire: Questionnaire) -> Result<QuestionnaireInfo, ApiError> {
    let questionnaire_id: i64 = questionnaire
        .questionnaire_id
        .ok_or_else(|| ApiError::Internal {
            message: format!("Questionnaire '{}' has no id", questionnaire.name),
        })?;
    Ok(QuestionnaireInfo {
        questionnaire_id,
        name: questionnaire.name,
        description: questionnaire.description,
        scale_id: questionnaire.scale_id,
        current_version_id: questionnaire.current_version_id,
        is_active: questionnaire.is_active,
    })
}

fn question_info(question: Question) -> QuestionInfo {
    QuestionInfo {
        question_id: question.question_id,
        category: question.category.as_optional().map(str::to_string),
        text: question.text,
        weight: question.weight,
        is_active: question.is_active,
        has_subitems: question.has_subitems,
        subitems: question
            .subitems
            .into_iter()
            .map(|s| SubitemInfo {
                subitem_id: s.subitem_id,
                text: s.text,
                weight: s.weight,
                is_active: s.is_active,
            })
            .collect(),
    }
}

pub(super) fn load_questionnaire(
    persistence: &mut SqlitePersistence,
    questionnaire_id: i64,
) -> Result<Questionnaire, ApiError> {
    persistence
        .get_questionnaire(questionnaire_id)
        .map_err(|e| translate_persistence_error(e, "Questionnaire"))?
        .ok_or_else(|| {
            not_found(
                "Questionnaire",
                format!("Questionnaire {questionnaire_id} does not exist"),
            )
        })
}

/// Creates a questionnaire together with its first version.
///
/// Without an explicit `scale_id` the default scale is used.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The name is empty or a question is malformed
/// - No scale is given and no default scale exists
pub fn create_questionnaire(
    persistence: &mut SqlitePersistence,
    request: CreateQuestionnaireRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CreateQuestionnaireResponse, ApiError> {
    AuthorizationService::authorize_manage_questionnaires(
        authenticated_actor,
        "create_questionnaire",
    )?;
    validate_name("name", &request.name).map_err(translate_domain_error)?;
    let drafts: Vec<QuestionDraft> = to_drafts(request.questions)?;

    let scale_id: i64 = match request.scale_id {
        Some(scale_id) => {
            load_scale(persistence, scale_id)?;
            scale_id
        }
        None => persistence
            .get_default_scale()
            .map_err(|e| translate_persistence_error(e, "Score scale"))?
            .and_then(|s| s.scale_id)
            .ok_or_else(|| ApiError::DomainRuleViolation {
                rule: String::from("default_scale_required"),
                message: String::from("No scale was given and no default scale exists"),
            })?,
    };

    let description: Option<&str> = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let (questionnaire_id, version_id): (i64, i64) = persistence
        .create_questionnaire(request.name.trim(), description, scale_id, &drafts)
        .map_err(|e| translate_persistence_error(e, "Questionnaire"))?;

    info!(
        questionnaire_id,
        version_id,
        questions = drafts.len(),
        created_by = %authenticated_actor.id,
        "Created questionnaire"
    );

    Ok(CreateQuestionnaireResponse {
        questionnaire_id,
        version_id,
        scale_id,
        message: format!("Questionnaire '{}' created with version 1", request.name.trim()),
    })
}

/// Publishes a new immutable version of a questionnaire.
///
/// Audits already pinned to earlier versions are unaffected.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, a question is malformed,
/// or the questionnaire does not exist.
pub fn publish_questionnaire_version(
    persistence: &mut SqlitePersistence,
    request: PublishVersionRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<PublishVersionResponse, ApiError> {
    AuthorizationService::authorize_manage_questionnaires(authenticated_actor, "publish_version")?;
    let drafts: Vec<QuestionDraft> = to_drafts(request.questions)?;

    let (version_id, version_number): (i64, i32) = persistence
        .publish_version(request.questionnaire_id, &drafts, request.make_current)
        .map_err(|e| translate_persistence_error(e, "Questionnaire"))?;

    info!(
        questionnaire_id = request.questionnaire_id,
        version_id,
        version_number,
        make_current = request.make_current,
        "Published questionnaire version"
    );

    Ok(PublishVersionResponse {
        questionnaire_id: request.questionnaire_id,
        version_id,
        version_number,
        is_current: request.make_current,
        message: format!("Published version {version_number}"),
    })
}

/// Moves the current version pointer if it still has the expected value.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The version does not belong to the questionnaire
/// - The pointer was moved by someone else (`Conflict`)
pub fn set_current_version(
    persistence: &mut SqlitePersistence,
    request: &SetCurrentVersionRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<QuestionnaireInfo, ApiError> {
    AuthorizationService::authorize_manage_questionnaires(
        authenticated_actor,
        "set_current_version",
    )?;

    persistence
        .set_current_version(
            request.questionnaire_id,
            request.expected_current_version_id,
            request.version_id,
        )
        .map_err(|e| translate_persistence_error(e, "Questionnaire version"))?;

    info!(
        questionnaire_id = request.questionnaire_id,
        version_id = request.version_id,
        "Moved current questionnaire version"
    );

    load_questionnaire(persistence, request.questionnaire_id).and_then(questionnaire_info)
}

/// Lists questionnaires, including inactive ones.
///
/// # Errors
///
/// Returns an error for `Company` operators or if the query fails.
pub fn list_questionnaires(
    persistence: &mut SqlitePersistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListQuestionnairesResponse, ApiError> {
    AuthorizationService::authorize_view_internal(authenticated_actor, "list_questionnaires")?;

    let questionnaires: Vec<Questionnaire> = persistence
        .list_questionnaires()
        .map_err(|e| translate_persistence_error(e, "Questionnaire"))?;

    Ok(ListQuestionnairesResponse {
        questionnaires: questionnaires
            .into_iter()
            .map(questionnaire_info)
            .collect::<Result<Vec<_>, _>>()?,
    })
}

/// Lists the versions of a questionnaire, newest first.
///
/// # Errors
///
/// Returns an error for `Company` operators or if the questionnaire does
/// not exist.
pub fn list_questionnaire_versions(
    persistence: &mut SqlitePersistence,
    questionnaire_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListVersionsResponse, ApiError> {
    AuthorizationService::authorize_view_internal(authenticated_actor, "list_versions")?;
    load_questionnaire(persistence, questionnaire_id)?;

    let versions: Vec<VersionSummary> = persistence
        .list_versions(questionnaire_id)
        .map_err(|e| translate_persistence_error(e, "Questionnaire"))?;

    Ok(ListVersionsResponse {
        questionnaire_id,
        versions: versions
            .into_iter()
            .map(|v| VersionInfo {
                version_id: v.version_id,
                version_number: v.version_number,
                created_at: v.created_at,
                question_count: v.question_count,
                is_current: v.is_current,
            })
            .collect(),
    })
}

/// Returns a version's question tree with its scale.
///
/// Inactive questions and subitems are included and flagged.
///
/// # Errors
///
/// Returns an error for `Company` operators or if the version does not
/// exist.
pub fn get_questionnaire_version(
    persistence: &mut SqlitePersistence,
    version_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<VersionTreeResponse, ApiError> {
    AuthorizationService::authorize_view_internal(authenticated_actor, "get_version")?;

    let version: QuestionnaireVersion = persistence
        .get_version_tree(version_id)
        .map_err(|e| translate_persistence_error(e, "Questionnaire version"))?
        .ok_or_else(|| {
            not_found(
                "Questionnaire version",
                format!("Version {version_id} does not exist"),
            )
        })?;
    let questionnaire: Questionnaire = load_questionnaire(persistence, version.questionnaire_id)?;
    let scale: ScaleInfo = scale_info(load_scale(persistence, questionnaire.scale_id)?)?;

    Ok(VersionTreeResponse {
        version_id: version.version_id,
        questionnaire_id: version.questionnaire_id,
        version_number: version.version_number,
        scale,
        questions: version.questions.into_iter().map(question_info).collect(),
    })
}

/// Activates or deactivates a questionnaire.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the questionnaire does
/// not exist.
pub fn set_questionnaire_active(
    persistence: &mut SqlitePersistence,
    questionnaire_id: i64,
    is_active: bool,
    authenticated_actor: &AuthenticatedActor,
) -> Result<QuestionnaireInfo, ApiError> {
    AuthorizationService::authorize_manage_questionnaires(
        authenticated_actor,
        "set_questionnaire_active",
    )?;

    persistence
        .set_questionnaire_active(questionnaire_id, is_active)
        .map_err(|e| translate_persistence_error(e, "Questionnaire"))?;

    info!(questionnaire_id, is_active, "Changed questionnaire activity");

    load_questionnaire(persistence, questionnaire_id).and_then(questionnaire_info)
}

/// Soft-deletes or restores a question.
///
/// Draft audits stop or resume scoring the question; completed audits keep
/// the scoring frozen at completion.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the question does not
/// exist.
pub fn set_question_active(
    persistence: &mut SqlitePersistence,
    question_id: i64,
    is_active: bool,
    authenticated_actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_questionnaires(
        authenticated_actor,
        "set_question_active",
    )?;

    persistence
        .set_question_active(question_id, is_active)
        .map_err(|e| translate_persistence_error(e, "Question"))?;

    info!(question_id, is_active, "Changed question activity");
    Ok(())
}

/// Soft-deletes or restores a subitem.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the subitem does not
/// exist.
pub fn set_subitem_active(
    persistence: &mut SqlitePersistence,
    subitem_id: i64,
    is_active: bool,
    authenticated_actor: &AuthenticatedActor,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_manage_questionnaires(
        authenticated_actor,
        "set_subitem_active",
    )?;

    persistence
        .set_subitem_active(subitem_id, is_active)
        .map_err(|e| translate_persistence_error(e, "Question subitem"))?;

    info!(subitem_id, is_active, "Changed subitem activity");
    Ok(())
}
