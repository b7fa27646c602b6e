// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Timestamps are RFC 3339 strings in UTC; call dates are `YYYY-MM-DD`.
//! Categories travel as an optional name, `None` meaning uncategorized.

use serde::{Deserialize, Serialize};

// ========================================================================
// Authentication
// ========================================================================

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator password.
    pub password: String,
}

/// API response for successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The session token (opaque).
    pub session_token: String,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
    /// Set for `Company` operators.
    pub company_id: Option<i64>,
    /// Session expiration timestamp.
    pub expires_at: String,
}

/// API response for the "who am I" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
    pub company_id: Option<i64>,
    pub is_disabled: bool,
    /// Global capabilities for this operator.
    pub capabilities: GlobalCapabilities,
}

/// API response describing whether the system still needs its first admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapStatusResponse {
    /// True while no operator exists.
    pub is_bootstrap_mode: bool,
}

/// API request to create the first admin while no operator exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFirstAdminRequest {
    pub login_name: String,
    pub display_name: String,
    pub password: String,
    pub password_confirmation: String,
}

// ========================================================================
// Operators
// ========================================================================

/// API request to create a new operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOperatorRequest {
    pub login_name: String,
    pub display_name: String,
    /// `Admin`, `Analyst` or `Company`.
    pub role: String,
    /// Required for `Company` operators, forbidden otherwise.
    #[serde(default)]
    pub company_id: Option<i64>,
    pub password: String,
    pub password_confirmation: String,
}

/// API response for a successful operator creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOperatorResponse {
    pub operator_id: i64,
    /// The normalized login name.
    pub login_name: String,
    pub display_name: String,
    pub role: String,
    pub company_id: Option<i64>,
}

/// Information about an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorInfo {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub role: String,
    pub company_id: Option<i64>,
    pub is_disabled: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
    /// Target-specific capabilities for this operator instance.
    pub capabilities: OperatorCapabilities,
}

/// API response listing operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOperatorsResponse {
    pub operators: Vec<OperatorInfo>,
}

/// API response after disabling or enabling an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorStatusResponse {
    pub operator_id: i64,
    pub is_disabled: bool,
    pub message: String,
}

/// API request to change the caller's own password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

/// API response for a password change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordResponse {
    pub message: String,
}

/// API request for an admin to reset another operator's password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub operator_id: i64,
    pub new_password: String,
    pub new_password_confirmation: String,
}

/// API response for a password reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordResponse {
    pub operator_id: i64,
    pub message: String,
}

// ========================================================================
// Companies and managers
// ========================================================================

/// API request to toggle an `is_active` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// API request to create a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
}

/// Information about a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub company_id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: String,
}

/// API response listing companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCompaniesResponse {
    pub companies: Vec<CompanyInfo>,
}

/// API request to create a manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateManagerRequest {
    pub company_id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Information about a manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerInfo {
    pub manager_id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
}

/// API response listing the managers of one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListManagersResponse {
    pub company_id: i64,
    pub managers: Vec<ManagerInfo>,
}

// ========================================================================
// Score scales
// ========================================================================

/// One value of a scale being created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleValueInput {
    pub value: f64,
    pub label: String,
}

/// API request to create a score scale.
///
/// Values keep the order they are given in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateScaleRequest {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    pub values: Vec<ScaleValueInput>,
}

/// One value of a stored scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleValueInfo {
    pub value: f64,
    pub label: String,
    pub display_order: i32,
}

/// Information about a score scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleInfo {
    pub scale_id: i64,
    pub name: String,
    pub is_default: bool,
    pub values: Vec<ScaleValueInfo>,
}

/// API response listing score scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListScalesResponse {
    pub scales: Vec<ScaleInfo>,
}

// ========================================================================
// Questionnaires
// ========================================================================

/// A subitem of a question being published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubitemInput {
    pub text: String,
    pub weight: f64,
}

/// A question being published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInput {
    pub text: String,
    pub weight: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub has_subitems: bool,
    #[serde(default)]
    pub subitems: Vec<SubitemInput>,
}

/// API request to create a questionnaire with its first version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateQuestionnaireRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// The scale to score with; the default scale when absent.
    #[serde(default)]
    pub scale_id: Option<i64>,
    pub questions: Vec<QuestionInput>,
}

/// API response for a questionnaire creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQuestionnaireResponse {
    pub questionnaire_id: i64,
    pub version_id: i64,
    pub scale_id: i64,
    pub message: String,
}

/// API request to publish a new version of a questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishVersionRequest {
    pub questionnaire_id: i64,
    pub questions: Vec<QuestionInput>,
    /// Whether new audits should use this version immediately.
    #[serde(default = "default_true")]
    pub make_current: bool,
}

const fn default_true() -> bool {
    true
}

/// API response for a published version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishVersionResponse {
    pub questionnaire_id: i64,
    pub version_id: i64,
    pub version_number: i32,
    pub is_current: bool,
    pub message: String,
}

/// API request to move a questionnaire's current version pointer.
///
/// The move only happens if the pointer still equals
/// `expected_current_version_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCurrentVersionRequest {
    pub questionnaire_id: i64,
    pub expected_current_version_id: Option<i64>,
    pub version_id: i64,
}

/// Information about a questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireInfo {
    pub questionnaire_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub scale_id: i64,
    pub current_version_id: Option<i64>,
    pub is_active: bool,
}

/// API response listing questionnaires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuestionnairesResponse {
    pub questionnaires: Vec<QuestionnaireInfo>,
}

/// Summary of one questionnaire version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version_id: i64,
    pub version_number: i32,
    pub created_at: String,
    pub question_count: i64,
    pub is_current: bool,
}

/// API response listing the versions of a questionnaire, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVersionsResponse {
    pub questionnaire_id: i64,
    pub versions: Vec<VersionInfo>,
}

/// A subitem of a stored question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubitemInfo {
    pub subitem_id: i64,
    pub text: String,
    pub weight: f64,
    pub is_active: bool,
}

/// A stored question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub question_id: i64,
    pub text: String,
    pub weight: f64,
    pub category: Option<String>,
    pub is_active: bool,
    pub has_subitems: bool,
    pub subitems: Vec<SubitemInfo>,
}

/// API response with a full version tree and its scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionTreeResponse {
    pub version_id: i64,
    pub questionnaire_id: i64,
    pub version_number: i32,
    pub scale: ScaleInfo,
    pub questions: Vec<QuestionInfo>,
}

// ========================================================================
// Audits
// ========================================================================

/// Descriptive audit fields as sent by clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditMetadataInput {
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub call_date: Option<String>,
    #[serde(default)]
    pub call_reference: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// API request to start an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAuditRequest {
    pub company_id: i64,
    #[serde(default)]
    pub manager_id: Option<i64>,
    /// The audit pins this questionnaire's current version.
    pub questionnaire_id: i64,
    #[serde(default)]
    pub metadata: AuditMetadataInput,
}

/// One answer as sent by clients.
///
/// Exactly one of `question_id` and `subitem_id` must be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerInput {
    #[serde(default)]
    pub question_id: Option<i64>,
    #[serde(default)]
    pub subitem_id: Option<i64>,
    /// `None` leaves the unit unanswered.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// API request to replace an audit's answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAuditRequest {
    /// The complete new answer set.
    pub answers: Vec<AnswerInput>,
    /// Replaces the metadata when present.
    #[serde(default)]
    pub metadata: Option<AuditMetadataInput>,
}

/// API response after an audit was created, updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMutationResponse {
    pub audit_id: i64,
    pub company_id: i64,
    pub status: String,
    pub is_deleted: bool,
    pub message: String,
}

/// Score of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScoreInfo {
    pub category: Option<String>,
    /// Display label ("Uncategorized" for `None`).
    pub label: String,
    /// Weighted ratio in `[0, 1]`.
    pub score: f64,
    /// `score` as a percentage, 2 dp.
    pub percent: f64,
    pub weight: f64,
    pub count: usize,
}

/// API response after an audit was completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteAuditResponse {
    pub audit_id: i64,
    pub company_id: i64,
    pub manager_id: Option<i64>,
    /// Completion percentage (0-100, 2 dp).
    pub total_score: f64,
    pub completed_at: String,
    pub categories: Vec<CategoryScoreInfo>,
    pub message: String,
}

/// A stored answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerInfo {
    pub question_id: Option<i64>,
    pub subitem_id: Option<i64>,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

/// Per-audit capabilities for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCapabilities {
    pub can_edit: Capability,
    pub can_complete: Capability,
    pub can_delete: Capability,
}

/// API response with an audit, its answers and its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditDetailResponse {
    pub audit_id: i64,
    pub company_id: i64,
    pub manager_id: Option<i64>,
    pub analyst_id: i64,
    pub questionnaire_id: i64,
    pub version_id: i64,
    pub version_number: i32,
    pub status: String,
    pub is_deleted: bool,
    pub call_date: Option<String>,
    pub call_reference: Option<String>,
    pub summary: Option<String>,
    pub completed_at: Option<String>,
    /// Stored completion percentage; `None` for drafts.
    pub total_score: Option<f64>,
    /// Weighted ratio in `[0, 1]`.
    pub overall_ratio: f64,
    /// Completion percentage (0-100, 2 dp).
    pub percentage: f64,
    pub categories: Vec<CategoryScoreInfo>,
    pub answers: Vec<AnswerInfo>,
    pub capabilities: AuditCapabilities,
}

/// Filters for listing audits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAuditsRequest {
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    /// `DRAFT` or `COMPLETED`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

/// One row of an audit listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummaryInfo {
    pub audit_id: i64,
    pub company_id: i64,
    pub manager_id: Option<i64>,
    pub analyst_id: i64,
    pub version_id: i64,
    pub status: String,
    pub is_deleted: bool,
    pub total_score: Option<f64>,
    pub call_date: Option<String>,
    pub call_reference: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

/// API response listing audits, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListAuditsResponse {
    pub audits: Vec<AuditSummaryInfo>,
}

/// One entry of an audit's history timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryInfo {
    pub event_id: Option<i64>,
    /// `CREATED`, `UPDATED`, `STATUS_CHANGED` or `DELETED`.
    pub kind: String,
    pub action: String,
    pub details: Option<String>,
    pub actor_login_name: Option<String>,
    pub actor_display_name: Option<String>,
    pub cause: String,
    pub before: String,
    pub after: String,
    pub created_at: String,
}

/// API response with an audit's history in recording order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditHistoryResponse {
    pub audit_id: i64,
    pub entries: Vec<HistoryEntryInfo>,
}

// ========================================================================
// Statistics
// ========================================================================

/// Overall score statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummaryInfo {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Average of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverageInfo {
    /// `YYYY-MM`.
    pub month: String,
    pub count: usize,
    /// 1 dp.
    pub average: f64,
}

/// Average of one manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerAverageInfo {
    pub manager_id: i64,
    pub manager_name: String,
    pub count: usize,
    pub average: f64,
}

/// Average of one category across audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverageInfo {
    pub category: Option<String>,
    pub label: String,
    pub average_percent: f64,
    pub audits: usize,
}

/// API response with a company's statistics over its completed audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyStatisticsResponse {
    pub company_id: i64,
    pub company_name: String,
    pub summary: ScoreSummaryInfo,
    pub monthly: Vec<MonthlyAverageInfo>,
    pub managers: Vec<ManagerAverageInfo>,
    pub categories: Vec<CategoryAverageInfo>,
}

// ========================================================================
// Capabilities
// ========================================================================

/// Whether an action is permitted.
///
/// Serialized as a JSON boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        bool::deserialize(deserializer).map(Self::from_bool)
    }
}

/// Global capabilities for an authenticated operator.
///
/// Advisory only; every handler still authorizes on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCapabilities {
    pub can_manage_operators: Capability,
    pub can_manage_companies: Capability,
    pub can_manage_questionnaires: Capability,
    pub can_conduct_audits: Capability,
    pub can_view_all_companies: Capability,
    pub can_export_reports: Capability,
}

/// Target-specific capabilities for an operator instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorCapabilities {
    pub can_disable: Capability,
    pub can_reset_password: Capability,
}
