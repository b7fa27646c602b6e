// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities tell a client which actions to offer. They are advisory
//! only and never replace the checks done by each handler.

use callscore_domain::{Audit, AuditStatus};
use callscore_persistence::{OperatorData, SqlitePersistence};

use crate::auth::{AuthenticatedActor, Role};
use crate::request_response::{
    AuditCapabilities, Capability, GlobalCapabilities, OperatorCapabilities,
};

/// Computes global capabilities for an authenticated operator.
#[must_use]
pub const fn compute_global_capabilities(
    actor: &AuthenticatedActor,
    operator: &OperatorData,
) -> GlobalCapabilities {
    if operator.is_disabled {
        return GlobalCapabilities {
            can_manage_operators: Capability::Denied,
            can_manage_companies: Capability::Denied,
            can_manage_questionnaires: Capability::Denied,
            can_conduct_audits: Capability::Denied,
            can_view_all_companies: Capability::Denied,
            can_export_reports: Capability::Denied,
        };
    }

    match actor.role {
        Role::Admin => GlobalCapabilities {
            can_manage_operators: Capability::Allowed,
            can_manage_companies: Capability::Allowed,
            can_manage_questionnaires: Capability::Allowed,
            can_conduct_audits: Capability::Allowed,
            can_view_all_companies: Capability::Allowed,
            can_export_reports: Capability::Allowed,
        },
        Role::Analyst => GlobalCapabilities {
            can_manage_operators: Capability::Denied,
            can_manage_companies: Capability::Denied,
            can_manage_questionnaires: Capability::Denied,
            can_conduct_audits: Capability::Allowed,
            can_view_all_companies: Capability::Allowed,
            can_export_reports: Capability::Allowed,
        },
        // Own company's reports only
        Role::Company => GlobalCapabilities {
            can_manage_operators: Capability::Denied,
            can_manage_companies: Capability::Denied,
            can_manage_questionnaires: Capability::Denied,
            can_conduct_audits: Capability::Denied,
            can_view_all_companies: Capability::Denied,
            can_export_reports: Capability::Allowed,
        },
    }
}

/// Computes target-specific capabilities for an operator instance.
///
/// The last active admin can never be disabled.
///
/// # Errors
///
/// Returns an error if counting admins fails.
pub fn compute_operator_capabilities(
    actor: &AuthenticatedActor,
    actor_operator: &OperatorData,
    target_operator: &OperatorData,
    persistence: &mut SqlitePersistence,
) -> Result<OperatorCapabilities, String> {
    if actor_operator.is_disabled || actor.role != Role::Admin {
        return Ok(OperatorCapabilities {
            can_disable: Capability::Denied,
            can_reset_password: Capability::Denied,
        });
    }

    let is_last_active_admin: bool =
        if target_operator.role == Role::Admin.as_str() && !target_operator.is_disabled {
            let active_admin_count: i64 = persistence
                .count_active_admin_operators()
                .map_err(|e| format!("Failed to count active admins: {e}"))?;
            active_admin_count <= 1
        } else {
            false
        };

    Ok(OperatorCapabilities {
        can_disable: Capability::from_bool(!target_operator.is_disabled && !is_last_active_admin),
        can_reset_password: Capability::Allowed,
    })
}

/// Computes what the actor may do with one audit.
#[must_use]
pub fn compute_audit_capabilities(actor: &AuthenticatedActor, audit: &Audit) -> AuditCapabilities {
    let conducts: bool = matches!(actor.role, Role::Admin | Role::Analyst);
    let is_draft: bool = audit.status == AuditStatus::Draft && !audit.is_deleted;

    AuditCapabilities {
        can_edit: Capability::from_bool(conducts && is_draft),
        can_complete: Capability::from_bool(conducts && is_draft),
        can_delete: Capability::from_bool(conducts && !audit.is_deleted),
    }
}
