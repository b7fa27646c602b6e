// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use callscore::CoreError;
use callscore_domain::DomainError;
use callscore_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The write lost against existing data or a concurrent writer.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

fn invalid(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

fn rule(name: &str, err: &DomainError) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: name.to_string(),
        message: err.to_string(),
    }
}

fn not_found(resource_type: &str, err: &DomainError) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// Malformed requests become `InvalidInput`, lifecycle rules become
/// `DomainRuleViolation` and missing references become `ResourceNotFound`.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match &err {
        DomainError::EmptyField { field } | DomainError::InvalidWeight { field, .. } => {
            invalid(field, &err)
        }
        DomainError::EmptyScale
        | DomainError::InvalidScaleValue(_)
        | DomainError::DuplicateScaleValue(_) => invalid("values", &err),
        DomainError::ScoreNotOnScale { .. }
        | DomainError::UnknownUnit(_)
        | DomainError::DuplicateAnswer(_)
        | DomainError::DirectAnswerOnSubitemQuestion(_) => invalid("answers", &err),
        DomainError::InvalidQuestionStructure(_) => invalid("questions", &err),
        DomainError::InvalidAuditStatus(_) => invalid("status", &err),
        DomainError::DateParseError { .. } => invalid("call_date", &err),
        DomainError::InvalidStatusTransition { .. } => rule("audit_status_transition", &err),
        DomainError::AuditLocked(_) => rule("completed_audit_locked", &err),
        DomainError::AuditDeleted(_) => rule("deleted_audit_locked", &err),
        DomainError::AuditAlreadyDeleted(_) => rule("single_deletion", &err),
        DomainError::IncompleteAudit { .. } => rule("full_completion", &err),
        DomainError::QuestionnaireHasNoCurrentVersion(_) => rule("current_version_required", &err),
        DomainError::CompanyInactive(_) => rule("active_company", &err),
        DomainError::ManagerInactive(_) => rule("active_manager", &err),
        DomainError::ManagerCompanyMismatch { .. } => rule("manager_belongs_to_company", &err),
        DomainError::VersionNotFound(_) => not_found("Questionnaire version", &err),
        DomainError::CompanyNotFound(_) => not_found("Company", &err),
        DomainError::ManagerNotFound(_) => not_found("Manager", &err),
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::UnsupportedCommand(name) => ApiError::Internal {
            message: format!("Command '{name}' was routed to the wrong transition"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// `resource_type` names what was being read or written, for `NotFound`.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError, resource_type: &str) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message,
        },
        PersistenceError::AuditNotFound(audit_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Audit"),
            message: format!("Audit {audit_id} does not exist"),
        },
        PersistenceError::OperatorNotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Operator"),
            message,
        },
        PersistenceError::Conflict(message) => ApiError::Conflict { message },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
