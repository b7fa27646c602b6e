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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

use callscore_domain::{DomainError, Questionnaire};

// Re-export public types and functions
pub use apply::{apply, apply_create, compute_audit_scores};
pub use command::Command;
pub use error::CoreError;
pub use state::{
    AuditContext, AuditScores, AuditState, CompanyRef, CompletionOutcome, ManagerRef,
    TransitionResult,
};

/// Resolves the version new audits of a questionnaire are pinned to.
///
/// This is a read-only check that does not create history entries.
///
/// # Errors
///
/// Returns an error if the questionnaire has no current version.
pub fn current_version_id(questionnaire: &Questionnaire) -> Result<i64, DomainError> {
    questionnaire
        .current_version_id
        .ok_or(DomainError::QuestionnaireHasNoCurrentVersion(
            questionnaire.questionnaire_id.unwrap_or_default(),
        ))
}

/// Computes the number the next published version of a questionnaire gets.
///
/// Version numbers increase monotonically from 1.
#[must_use]
pub const fn next_version_number(current_max: Option<i32>) -> i32 {
    match current_max {
        Some(max) => max + 1,
        None => 1,
    }
}
