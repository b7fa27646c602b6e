// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{AuditStatus, UnitRef};

/// Errors that can occur during domain validation.
///
/// Score and weight values are carried as `f64`, so this type is only
/// `PartialEq`.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A required text field is empty after trimming.
    EmptyField {
        /// The name of the offending field.
        field: &'static str,
    },
    /// A weight is not a finite, strictly positive number.
    InvalidWeight {
        /// The name of the offending field.
        field: &'static str,
        /// The rejected weight.
        weight: f64,
    },
    /// A score scale has no values.
    EmptyScale,
    /// A score scale value is negative or not finite.
    InvalidScaleValue(f64),
    /// A score scale lists the same value twice.
    DuplicateScaleValue(f64),
    /// An answer carries a score that is not one of the scale's values.
    ScoreNotOnScale {
        /// The answered unit.
        unit: UnitRef,
        /// The rejected score.
        score: f64,
    },
    /// An answer references a unit that is not part of the audit's version.
    UnknownUnit(UnitRef),
    /// The same unit is answered more than once in one answer set.
    DuplicateAnswer(UnitRef),
    /// A question with subitems was answered directly.
    DirectAnswerOnSubitemQuestion(i64),
    /// A question's subitem layout disagrees with its `has_subitems` flag.
    InvalidQuestionStructure(String),
    /// Unknown audit status string.
    InvalidAuditStatus(String),
    /// The requested status change is not allowed.
    InvalidStatusTransition {
        /// The current status.
        from: AuditStatus,
        /// The requested status.
        to: AuditStatus,
    },
    /// The audit is completed and can no longer be edited.
    AuditLocked(i64),
    /// The audit has been deleted.
    AuditDeleted(i64),
    /// The audit was already deleted.
    AuditAlreadyDeleted(i64),
    /// Completion was requested while scorable units are unanswered.
    IncompleteAudit {
        /// The units still lacking a score.
        unanswered: Vec<UnitRef>,
    },
    /// The questionnaire has no current version to audit against.
    QuestionnaireHasNoCurrentVersion(i64),
    /// The questionnaire version does not exist.
    VersionNotFound(i64),
    /// The company does not exist.
    CompanyNotFound(i64),
    /// The company is inactive and cannot receive new audits.
    CompanyInactive(i64),
    /// The manager does not exist.
    ManagerNotFound(i64),
    /// The manager is inactive and cannot receive new audits.
    ManagerInactive(i64),
    /// The manager does not belong to the audited company.
    ManagerCompanyMismatch {
        /// The manager.
        manager_id: i64,
        /// The company the audit targets.
        company_id: i64,
    },
    /// A date could not be parsed.
    DateParseError {
        /// The rejected input.
        input: String,
        /// Parser message.
        message: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { field } => write!(f, "Field '{field}' cannot be empty"),
            Self::InvalidWeight { field, weight } => {
                write!(f, "Invalid weight for '{field}': {weight}. Must be greater than 0")
            }
            Self::EmptyScale => write!(f, "A score scale must have at least one value"),
            Self::InvalidScaleValue(value) => {
                write!(f, "Invalid scale value: {value}. Must be a finite number >= 0")
            }
            Self::DuplicateScaleValue(value) => {
                write!(f, "Scale value {value} appears more than once")
            }
            Self::ScoreNotOnScale { unit, score } => {
                write!(f, "Score {score} for {unit} is not a value of the score scale")
            }
            Self::UnknownUnit(unit) => {
                write!(f, "{unit} is not part of the audited questionnaire version")
            }
            Self::DuplicateAnswer(unit) => write!(f, "{unit} is answered more than once"),
            Self::DirectAnswerOnSubitemQuestion(question_id) => write!(
                f,
                "Question {question_id} has subitems and must be answered through them"
            ),
            Self::InvalidQuestionStructure(msg) => write!(f, "Invalid question structure: {msg}"),
            Self::InvalidAuditStatus(status) => write!(f, "Invalid audit status: {status}"),
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Cannot transition audit from {from} to {to}")
            }
            Self::AuditLocked(id) => {
                write!(f, "Audit {id} is completed and can no longer be modified")
            }
            Self::AuditDeleted(id) => write!(f, "Audit {id} has been deleted"),
            Self::AuditAlreadyDeleted(id) => write!(f, "Audit {id} is already deleted"),
            Self::IncompleteAudit { unanswered } => write!(
                f,
                "Audit cannot be completed: {} scorable unit(s) unanswered",
                unanswered.len()
            ),
            Self::QuestionnaireHasNoCurrentVersion(id) => {
                write!(f, "Questionnaire {id} has no current version")
            }
            Self::VersionNotFound(id) => write!(f, "Questionnaire version {id} not found"),
            Self::CompanyNotFound(id) => write!(f, "Company {id} not found"),
            Self::CompanyInactive(id) => write!(f, "Company {id} is inactive"),
            Self::ManagerNotFound(id) => write!(f, "Manager {id} not found"),
            Self::ManagerInactive(id) => write!(f, "Manager {id} is inactive"),
            Self::ManagerCompanyMismatch {
                manager_id,
                company_id,
            } => write!(
                f,
                "Manager {manager_id} does not belong to company {company_id}"
            ),
            Self::DateParseError { input, message } => {
                write!(f, "Failed to parse date '{input}': {message}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
