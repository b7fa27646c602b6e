// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for `CallScore`.
//!
//! Every operation exposed to the HTTP server lives here as a plain function
//! taking the persistence adapter, the authenticated actor and the request
//! DTO. Handlers authorize first, translate requests into domain or core
//! values, apply the transition, persist it and return a response DTO.
//!
//! Errors from the lower layers never leak: they are translated into
//! [`ApiError`] variants by the `translate_*` functions in [`error`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod error;
mod handlers;
mod password_policy;
mod report_export;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use capabilities::{
    compute_audit_capabilities, compute_global_capabilities, compute_operator_capabilities,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    bootstrap_admin, change_password, check_bootstrap_status, complete_audit, create_audit,
    create_company, create_first_admin, create_manager, create_operator, create_questionnaire,
    create_scale, delete_audit, disable_operator, enable_operator, get_audit,
    get_audit_history, get_company_statistics, get_questionnaire_version, list_audits,
    list_companies, list_managers, list_operators, list_questionnaire_versions,
    list_questionnaires, list_scales, login, logout, publish_questionnaire_version,
    reset_password, set_company_active, set_current_version, set_default_scale,
    set_manager_active, set_question_active, set_questionnaire_active, set_subitem_active,
    update_audit, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use report_export::export_completed_audits_csv;
pub use request_response::{
    AnswerInfo, AnswerInput, AuditCapabilities, AuditDetailResponse, AuditMetadataInput,
    AuditMutationResponse, AuditSummaryInfo, BootstrapStatusResponse, CategoryAverageInfo,
    CategoryScoreInfo, ChangePasswordRequest, ChangePasswordResponse, CompanyInfo,
    CompanyStatisticsResponse, CompleteAuditResponse, CreateAuditRequest, CreateCompanyRequest,
    CreateFirstAdminRequest, CreateManagerRequest, CreateOperatorRequest,
    CreateOperatorResponse, CreateQuestionnaireRequest, CreateQuestionnaireResponse,
    CreateScaleRequest, GlobalCapabilities, HistoryEntryInfo, ListAuditsRequest,
    ListAuditsResponse, ListCompaniesResponse, ListManagersResponse, ListOperatorsResponse,
    ListQuestionnairesResponse, ListScalesResponse, ListVersionsResponse, LoginRequest,
    LoginResponse, ManagerAverageInfo, ManagerInfo, MonthlyAverageInfo, OperatorCapabilities,
    OperatorInfo, OperatorStatusResponse, PublishVersionRequest, PublishVersionResponse,
    QuestionInfo, QuestionInput, QuestionnaireInfo, ResetPasswordRequest,
    ResetPasswordResponse, ScaleInfo, ScaleValueInfo, ScaleValueInput, ScoreSummaryInfo,
    SetActiveRequest, SetCurrentVersionRequest, SubitemInfo, SubitemInput,
    AuditHistoryResponse, UpdateAuditRequest, VersionInfo, VersionTreeResponse,
    WhoAmIResponse, Capability,
};
