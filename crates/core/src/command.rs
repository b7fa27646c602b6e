// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use callscore_domain::{AuditAnswer, AuditMetadata};
use time::OffsetDateTime;

/// A command represents analyst intent as data only.
///
/// Commands are the only way to request audit state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a draft audit against a questionnaire version.
    CreateAudit {
        /// The audited company.
        company_id: i64,
        /// The audited manager, if any.
        manager_id: Option<i64>,
        /// The questionnaire version to pin.
        version_id: i64,
        /// Initial descriptive fields.
        metadata: AuditMetadata,
    },
    /// Replace the answer set and optionally the metadata.
    UpdateAudit {
        /// The full new answer set.
        answers: Vec<AuditAnswer>,
        /// New metadata; `None` leaves it unchanged.
        metadata: Option<AuditMetadata>,
    },
    /// Score and lock the audit.
    CompleteAudit {
        /// The completion timestamp.
        completed_at: OffsetDateTime,
    },
    /// Soft-delete the audit.
    DeleteAudit,
}

impl Command {
    /// The command name recorded in history.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateAudit { .. } => "CreateAudit",
            Self::UpdateAudit { .. } => "UpdateAudit",
            Self::CompleteAudit { .. } => "CompleteAudit",
            Self::DeleteAudit => "DeleteAudit",
        }
    }
}
