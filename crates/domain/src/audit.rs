// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{AuditStatus, UnitRef};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Free-form descriptive fields of an audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditMetadata {
    /// The date of the audited call.
    pub call_date: Option<Date>,
    /// External reference of the call (recording id, CRM id, ...).
    pub call_reference: Option<String>,
    /// Analyst summary.
    pub summary: Option<String>,
}

/// One scored response.
///
/// `score == None` means the unit is unanswered; it then counts as `0`
/// with full weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditAnswer {
    pub unit: UnitRef,
    pub score: Option<f64>,
    pub comment: Option<String>,
}

impl AuditAnswer {
    #[must_use]
    pub const fn new(unit: UnitRef, score: Option<f64>, comment: Option<String>) -> Self {
        Self {
            unit,
            score,
            comment,
        }
    }
}

/// One evaluation of a call against a pinned questionnaire version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    /// The persisted id, `None` before insertion.
    pub audit_id: Option<i64>,
    pub company_id: i64,
    pub manager_id: Option<i64>,
    /// The operator who created the audit.
    pub analyst_id: i64,
    /// The questionnaire version; never changes after creation.
    pub version_id: i64,
    pub status: AuditStatus,
    pub is_deleted: bool,
    /// Completion percentage (0-100, 2 dp). Written once, at completion.
    pub total_score: Option<f64>,
    pub metadata: AuditMetadata,
    pub completed_at: Option<OffsetDateTime>,
}

impl Audit {
    /// Creates a new, unsaved draft audit.
    #[must_use]
    pub const fn new_draft(
        company_id: i64,
        manager_id: Option<i64>,
        analyst_id: i64,
        version_id: i64,
        metadata: AuditMetadata,
    ) -> Self {
        Self {
            audit_id: None,
            company_id,
            manager_id,
            analyst_id,
            version_id,
            status: AuditStatus::Draft,
            is_deleted: false,
            total_score: None,
            metadata,
            completed_at: None,
        }
    }

    fn id_for_errors(&self) -> i64 {
        self.audit_id.unwrap_or_default()
    }

    /// Checks that answers and metadata may be modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit is deleted or completed.
    pub fn ensure_editable(&self) -> Result<(), DomainError> {
        if self.is_deleted {
            return Err(DomainError::AuditDeleted(self.id_for_errors()));
        }
        if !self.status.is_editable() {
            return Err(DomainError::AuditLocked(self.id_for_errors()));
        }
        Ok(())
    }

    /// Checks that the audit may move to `Completed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit is deleted or not a draft.
    pub fn ensure_completable(&self) -> Result<(), DomainError> {
        if self.is_deleted {
            return Err(DomainError::AuditDeleted(self.id_for_errors()));
        }
        if !self.status.can_transition_to(AuditStatus::Completed) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: AuditStatus::Completed,
            });
        }
        Ok(())
    }

    /// Checks that the audit may be soft-deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit is already deleted.
    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        if self.is_deleted {
            return Err(DomainError::AuditAlreadyDeleted(self.id_for_errors()));
        }
        Ok(())
    }
}

/// Parses a `YYYY-MM-DD` call date.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the input is not a valid date.
pub fn parse_call_date(input: &str) -> Result<Date, DomainError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(input.trim(), &format).map_err(|e| DomainError::DateParseError {
        input: input.to_string(),
        message: e.to_string(),
    })
}
