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
#![allow(clippy::multiple_crate_versions)]

mod live;
mod session;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use callscore_api::{
    ApiError, AuditDetailResponse, AuditHistoryResponse, AuditMutationResponse,
    BootstrapStatusResponse, ChangePasswordRequest, ChangePasswordResponse, CompanyInfo,
    CompanyStatisticsResponse, CompleteAuditResponse, CreateAuditRequest, CreateCompanyRequest,
    CreateFirstAdminRequest, CreateManagerRequest, CreateOperatorRequest,
    CreateOperatorResponse, CreateQuestionnaireRequest, CreateQuestionnaireResponse,
    CreateScaleRequest, ListAuditsRequest, ListAuditsResponse, ListCompaniesResponse,
    ListManagersResponse, ListOperatorsResponse, ListQuestionnairesResponse, ListScalesResponse,
    ListVersionsResponse, LoginRequest, LoginResponse, ManagerInfo, OperatorStatusResponse,
    PublishVersionRequest, PublishVersionResponse, QuestionnaireInfo, ResetPasswordRequest,
    ResetPasswordResponse, ScaleInfo, SetActiveRequest, SetCurrentVersionRequest,
    UpdateAuditRequest, VersionTreeResponse, WhoAmIResponse,
};
use callscore_persistence::SqlitePersistence;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::live::{LiveEvent, LiveEventBroadcaster, live_events_handler};
use crate::session::{RequestCause, SessionError, SessionOperator, bearer_token};

/// `CallScore` Server - HTTP server for the `CallScore` audit platform
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, conflicts_with = "database_url")]
    database: Option<String>,

    /// `MySQL`/`MariaDB` connection URL. Takes the place of `--database`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Login name of an admin to create when no operators exist yet.
    #[arg(long, requires = "bootstrap_admin_password")]
    bootstrap_admin_login: Option<String>,

    /// Password for the bootstrap admin.
    #[arg(long, env = "CALLSCORE_BOOTSTRAP_ADMIN_PASSWORD")]
    bootstrap_admin_password: Option<String>,

    /// Display name for the bootstrap admin.
    #[arg(long, default_value = "Administrator")]
    bootstrap_admin_display_name: String,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer, serialized behind a mutex.
    persistence: Arc<Mutex<SqlitePersistence>>,
    /// Fan-out for live audit events.
    live: Arc<LiveEventBroadcaster>,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.live)
    }
}

/// Acknowledgement for writes that return no resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteResponse {
    /// Whether the write succeeded.
    success: bool,
    /// Human-readable outcome.
    message: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error while handling request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        let message: String = match err {
            SessionError::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            SessionError::InvalidAuthorizationHeader => {
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'")
            }
            SessionError::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };
        Self {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
    }
}

// ========================================================================
// Bootstrap and authentication
// ========================================================================

/// Handler for GET `/bootstrap/status`.
async fn handle_bootstrap_status(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<BootstrapStatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::check_bootstrap_status(&mut persistence)?))
}

/// Handler for POST `/bootstrap/admin`.
///
/// Creates the first admin. Refused once any operator exists.
async fn handle_create_first_admin(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateFirstAdminRequest>,
) -> Result<Json<CreateOperatorResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling create_first_admin request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::create_first_admin(&mut persistence, req)?))
}

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling login request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::login(&mut persistence, &req)?))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<WriteResponse>, HttpError> {
    let token: &str = bearer_token(&headers)?;
    let mut persistence = app_state.persistence.lock().await;
    callscore_api::logout(&mut persistence, token)?;
    Ok(Json(WriteResponse {
        success: true,
        message: String::from("Logged out"),
    }))
}

/// Handler for GET `/auth/whoami`.
async fn handle_whoami(
    SessionOperator(actor, operator): SessionOperator,
) -> Json<WhoAmIResponse> {
    Json(callscore_api::whoami(&actor, &operator))
}

/// Handler for POST `/auth/password`.
async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(_actor, operator): SessionOperator,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::change_password(
        &mut persistence,
        &req,
        &operator,
    )?))
}

// ========================================================================
// Operators
// ========================================================================

/// Handler for GET `/operators`.
async fn handle_list_operators(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<ListOperatorsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::list_operators(
        &mut persistence,
        &actor,
        &operator,
    )?))
}

/// Handler for POST `/operators`.
async fn handle_create_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<CreateOperatorRequest>,
) -> Result<Json<CreateOperatorResponse>, HttpError> {
    info!(
        actor = %actor.id,
        login_name = %req.login_name,
        role = %req.role,
        "Handling create_operator request"
    );
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::create_operator(
        &mut persistence,
        req,
        &actor,
    )?))
}

/// Handler for POST `/operators/{operator_id}/disable`.
async fn handle_disable_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(operator_id): Path<i64>,
) -> Result<Json<OperatorStatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::disable_operator(
        &mut persistence,
        operator_id,
        &actor,
    )?))
}

/// Handler for POST `/operators/{operator_id}/enable`.
async fn handle_enable_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(operator_id): Path<i64>,
) -> Result<Json<OperatorStatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::enable_operator(
        &mut persistence,
        operator_id,
        &actor,
    )?))
}

/// Handler for POST `/operators/reset_password`.
async fn handle_reset_password(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::reset_password(
        &mut persistence,
        &req,
        &actor,
    )?))
}

// ========================================================================
// Companies and managers
// ========================================================================

/// Handler for GET `/companies`.
async fn handle_list_companies(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
) -> Result<Json<ListCompaniesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::list_companies(&mut persistence, &actor)?))
}

/// Handler for POST `/companies`.
async fn handle_create_company(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<Json<CompanyInfo>, HttpError> {
    info!(actor = %actor.id, name = %req.name, "Handling create_company request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::create_company(
        &mut persistence,
        &req,
        &actor,
    )?))
}

/// Handler for POST `/companies/{company_id}/active`.
async fn handle_set_company_active(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(company_id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<CompanyInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::set_company_active(
        &mut persistence,
        company_id,
        req.is_active,
        &actor,
    )?))
}

/// Handler for GET `/companies/{company_id}/managers`.
async fn handle_list_managers(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(company_id): Path<i64>,
) -> Result<Json<ListManagersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::list_managers(
        &mut persistence,
        company_id,
        &actor,
    )?))
}

/// Handler for POST `/managers`.
async fn handle_create_manager(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<CreateManagerRequest>,
) -> Result<Json<ManagerInfo>, HttpError> {
    info!(
        actor = %actor.id,
        company_id = req.company_id,
        name = %req.name,
        "Handling create_manager request"
    );
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::create_manager(
        &mut persistence,
        &req,
        &actor,
    )?))
}

/// Handler for POST `/managers/{manager_id}/active`.
async fn handle_set_manager_active(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(manager_id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<ManagerInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::set_manager_active(
        &mut persistence,
        manager_id,
        req.is_active,
        &actor,
    )?))
}

/// Handler for GET `/companies/{company_id}/statistics`.
async fn handle_company_statistics(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(company_id): Path<i64>,
) -> Result<Json<CompanyStatisticsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::get_company_statistics(
        &mut persistence,
        company_id,
        &actor,
    )?))
}

/// Handler for GET `/companies/{company_id}/export.csv`.
async fn handle_export_csv(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(company_id): Path<i64>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let csv: String =
        callscore_api::export_completed_audits_csv(&mut persistence, company_id, &actor)?;
    drop(persistence);

    Ok((
        [
            (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"company-{company_id}-audits.csv\""),
            ),
        ],
        csv,
    )
        .into_response())
}

// ========================================================================
// Scales and questionnaires
// ========================================================================

/// Handler for GET `/scales`.
async fn handle_list_scales(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
) -> Result<Json<ListScalesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::list_scales(&mut persistence, &actor)?))
}

/// Handler for POST `/scales`.
async fn handle_create_scale(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<CreateScaleRequest>,
) -> Result<Json<ScaleInfo>, HttpError> {
    info!(actor = %actor.id, name = %req.name, "Handling create_scale request");
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::create_scale(&mut persistence, req, &actor)?))
}

/// Handler for POST `/scales/{scale_id}/default`.
async fn handle_set_default_scale(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(scale_id): Path<i64>,
) -> Result<Json<ScaleInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::set_default_scale(
        &mut persistence,
        scale_id,
        &actor,
    )?))
}

/// Handler for GET `/questionnaires`.
async fn handle_list_questionnaires(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
) -> Result<Json<ListQuestionnairesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::list_questionnaires(
        &mut persistence,
        &actor,
    )?))
}

/// Handler for POST `/questionnaires`.
async fn handle_create_questionnaire(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<CreateQuestionnaireRequest>,
) -> Result<Json<CreateQuestionnaireResponse>, HttpError> {
    info!(
        actor = %actor.id,
        name = %req.name,
        questions = req.questions.len(),
        "Handling create_questionnaire request"
    );
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::create_questionnaire(
        &mut persistence,
        req,
        &actor,
    )?))
}

/// Handler for POST `/questionnaires/{questionnaire_id}/active`.
async fn handle_set_questionnaire_active(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(questionnaire_id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<QuestionnaireInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::set_questionnaire_active(
        &mut persistence,
        questionnaire_id,
        req.is_active,
        &actor,
    )?))
}

/// Handler for GET `/questionnaires/{questionnaire_id}/versions`.
async fn handle_list_versions(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(questionnaire_id): Path<i64>,
) -> Result<Json<ListVersionsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::list_questionnaire_versions(
        &mut persistence,
        questionnaire_id,
        &actor,
    )?))
}

/// Handler for POST `/questionnaires/versions`.
///
/// Publishes a new version and announces it to live listeners.
async fn handle_publish_version(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<PublishVersionRequest>,
) -> Result<Json<PublishVersionResponse>, HttpError> {
    info!(
        actor = %actor.id,
        questionnaire_id = req.questionnaire_id,
        "Handling publish_questionnaire_version request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: PublishVersionResponse =
        callscore_api::publish_questionnaire_version(&mut persistence, req, &actor)?;
    drop(persistence);

    app_state
        .live
        .broadcast(&LiveEvent::QuestionnaireVersionPublished {
            questionnaire_id: response.questionnaire_id,
            version_id: response.version_id,
            version_number: response.version_number,
        });

    Ok(Json(response))
}

/// Handler for POST `/questionnaires/current_version`.
async fn handle_set_current_version(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Json(req): Json<SetCurrentVersionRequest>,
) -> Result<Json<QuestionnaireInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::set_current_version(
        &mut persistence,
        &req,
        &actor,
    )?))
}

/// Handler for GET `/versions/{version_id}`.
async fn handle_get_version(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(version_id): Path<i64>,
) -> Result<Json<VersionTreeResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::get_questionnaire_version(
        &mut persistence,
        version_id,
        &actor,
    )?))
}

/// Handler for POST `/questions/{question_id}/active`.
async fn handle_set_question_active(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(question_id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    callscore_api::set_question_active(&mut persistence, question_id, req.is_active, &actor)?;
    Ok(Json(WriteResponse {
        success: true,
        message: format!("Question {question_id} active: {}", req.is_active),
    }))
}

/// Handler for POST `/subitems/{subitem_id}/active`.
async fn handle_set_subitem_active(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(subitem_id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<WriteResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    callscore_api::set_subitem_active(&mut persistence, subitem_id, req.is_active, &actor)?;
    Ok(Json(WriteResponse {
        success: true,
        message: format!("Subitem {subitem_id} active: {}", req.is_active),
    }))
}

// ========================================================================
// Audits
// ========================================================================

/// Handler for GET `/audits`.
async fn handle_list_audits(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Query(query): Query<ListAuditsRequest>,
) -> Result<Json<ListAuditsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::list_audits(
        &mut persistence,
        &query,
        &actor,
    )?))
}

/// Handler for POST `/audits`.
async fn handle_create_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
    RequestCause(cause): RequestCause,
    Json(req): Json<CreateAuditRequest>,
) -> Result<Json<AuditMutationResponse>, HttpError> {
    info!(
        actor = %actor.id,
        company_id = req.company_id,
        questionnaire_id = req.questionnaire_id,
        "Handling create_audit request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditMutationResponse =
        callscore_api::create_audit(&mut persistence, req, &actor, &operator, cause)?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::AuditCreated {
        audit_id: response.audit_id,
        company_id: response.company_id,
    });

    Ok(Json(response))
}

/// Handler for GET `/audits/{audit_id}`.
async fn handle_get_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(audit_id): Path<i64>,
) -> Result<Json<AuditDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::get_audit(
        &mut persistence,
        audit_id,
        &actor,
    )?))
}

/// Handler for PUT `/audits/{audit_id}`.
///
/// Replaces the draft's answers and, when given, its metadata.
async fn handle_update_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
    RequestCause(cause): RequestCause,
    Path(audit_id): Path<i64>,
    Json(req): Json<UpdateAuditRequest>,
) -> Result<Json<AuditMutationResponse>, HttpError> {
    info!(
        actor = %actor.id,
        audit_id,
        answers = req.answers.len(),
        "Handling update_audit request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditMutationResponse =
        callscore_api::update_audit(&mut persistence, audit_id, req, &actor, &operator, cause)?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::AuditUpdated {
        audit_id: response.audit_id,
        company_id: response.company_id,
    });

    Ok(Json(response))
}

/// Handler for POST `/audits/{audit_id}/complete`.
///
/// On success the final score and breakdown go out to live listeners.
async fn handle_complete_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
    RequestCause(cause): RequestCause,
    Path(audit_id): Path<i64>,
) -> Result<Json<CompleteAuditResponse>, HttpError> {
    info!(actor = %actor.id, audit_id, "Handling complete_audit request");
    let mut persistence = app_state.persistence.lock().await;
    let response: CompleteAuditResponse =
        callscore_api::complete_audit(&mut persistence, audit_id, &actor, &operator, cause)?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::AuditCompleted {
        audit_id: response.audit_id,
        company_id: response.company_id,
        manager_id: response.manager_id,
        total_score: response.total_score,
        categories: response.categories.clone(),
    });

    info!(
        audit_id,
        total_score = response.total_score,
        "Audit completed"
    );

    Ok(Json(response))
}

/// Handler for DELETE `/audits/{audit_id}`.
async fn handle_delete_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator): SessionOperator,
    RequestCause(cause): RequestCause,
    Path(audit_id): Path<i64>,
) -> Result<Json<AuditMutationResponse>, HttpError> {
    warn!(actor = %actor.id, audit_id, "Handling delete_audit request");
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditMutationResponse =
        callscore_api::delete_audit(&mut persistence, audit_id, &actor, &operator, cause)?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::AuditDeleted {
        audit_id: response.audit_id,
        company_id: response.company_id,
    });

    Ok(Json(response))
}

/// Handler for GET `/audits/{audit_id}/history`.
async fn handle_audit_history(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _operator): SessionOperator,
    Path(audit_id): Path<i64>,
) -> Result<Json<AuditHistoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(callscore_api::get_audit_history(
        &mut persistence,
        audit_id,
        &actor,
    )?))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/bootstrap/status", get(handle_bootstrap_status))
        .route("/bootstrap/admin", post(handle_create_first_admin))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/whoami", get(handle_whoami))
        .route("/auth/password", post(handle_change_password))
        .route(
            "/operators",
            get(handle_list_operators).post(handle_create_operator),
        )
        .route(
            "/operators/{operator_id}/disable",
            post(handle_disable_operator),
        )
        .route(
            "/operators/{operator_id}/enable",
            post(handle_enable_operator),
        )
        .route("/operators/reset_password", post(handle_reset_password))
        .route(
            "/companies",
            get(handle_list_companies).post(handle_create_company),
        )
        .route(
            "/companies/{company_id}/active",
            post(handle_set_company_active),
        )
        .route(
            "/companies/{company_id}/managers",
            get(handle_list_managers),
        )
        .route(
            "/companies/{company_id}/statistics",
            get(handle_company_statistics),
        )
        .route(
            "/companies/{company_id}/export.csv",
            get(handle_export_csv),
        )
        .route("/managers", post(handle_create_manager))
        .route(
            "/managers/{manager_id}/active",
            post(handle_set_manager_active),
        )
        .route("/scales", get(handle_list_scales).post(handle_create_scale))
        .route("/scales/{scale_id}/default", post(handle_set_default_scale))
        .route(
            "/questionnaires",
            get(handle_list_questionnaires).post(handle_create_questionnaire),
        )
        .route("/questionnaires/versions", post(handle_publish_version))
        .route(
            "/questionnaires/current_version",
            post(handle_set_current_version),
        )
        .route(
            "/questionnaires/{questionnaire_id}/active",
            post(handle_set_questionnaire_active),
        )
        .route(
            "/questionnaires/{questionnaire_id}/versions",
            get(handle_list_versions),
        )
        .route("/versions/{version_id}", get(handle_get_version))
        .route(
            "/questions/{question_id}/active",
            post(handle_set_question_active),
        )
        .route(
            "/subitems/{subitem_id}/active",
            post(handle_set_subitem_active),
        )
        .route("/audits", get(handle_list_audits).post(handle_create_audit))
        .route(
            "/audits/{audit_id}",
            get(handle_get_audit)
                .put(handle_update_audit)
                .delete(handle_delete_audit),
        )
        .route("/audits/{audit_id}/complete", post(handle_complete_audit))
        .route("/audits/{audit_id}/history", get(handle_audit_history))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing CallScore server");

    let mut persistence: SqlitePersistence = if let Some(url) = &args.database_url {
        info!("Using MySQL/MariaDB database");
        SqlitePersistence::new_with_mysql(url)?
    } else if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    if let (Some(login_name), Some(password)) =
        (&args.bootstrap_admin_login, &args.bootstrap_admin_password)
    {
        match callscore_api::bootstrap_admin(
            &mut persistence,
            login_name,
            &args.bootstrap_admin_display_name,
            password,
        )? {
            Some(operator_id) => info!(operator_id, "Created bootstrap admin"),
            None => info!("Operators already exist; bootstrap admin skipped"),
        }
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        live: Arc::new(LiveEventBroadcaster::new()),
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
