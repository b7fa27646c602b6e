// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use callscore_persistence::{OperatorData, SqlitePersistence};
use tracing::info;

use super::not_found;
use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::capabilities::compute_operator_capabilities;
use crate::error::{ApiError, translate_persistence_error};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    ChangePasswordRequest, ChangePasswordResponse, CreateOperatorRequest, CreateOperatorResponse,
    ListOperatorsResponse, OperatorCapabilities, OperatorInfo, OperatorStatusResponse,
    ResetPasswordRequest, ResetPasswordResponse,
};

fn load_operator(
    persistence: &mut SqlitePersistence,
    operator_id: i64,
) -> Result<OperatorData, ApiError> {
    persistence
        .get_operator_by_id(operator_id)
        .map_err(|e| translate_persistence_error(e, "Operator"))?
        .ok_or_else(|| not_found("Operator", format!("Operator with ID {operator_id} not found")))
}

/// Creates a new operator.
///
/// `Company` operators must name an existing company; other roles must not
/// name one.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The role is unknown or the company assignment is inconsistent
/// - The password violates the policy
/// - The login name already exists
pub fn create_operator(
    persistence: &mut SqlitePersistence,
    request: CreateOperatorRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CreateOperatorResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(authenticated_actor, "create_operator")?;

    let role: Role = Role::parse(&request.role).map_err(|_| ApiError::InvalidInput {
        field: String::from("role"),
        message: format!(
            "Invalid role: {}. Must be 'Admin', 'Analyst' or 'Company'",
            request.role
        ),
    })?;

    match (role, request.company_id) {
        (Role::Company, Some(company_id)) => {
            if persistence
                .get_company(company_id)
                .map_err(|e| translate_persistence_error(e, "Company"))?
                .is_none()
            {
                return Err(not_found(
                    "Company",
                    format!("Company {company_id} does not exist"),
                ));
            }
        }
        (Role::Company, None) => {
            return Err(ApiError::InvalidInput {
                field: String::from("company_id"),
                message: String::from("Company operators must belong to a company"),
            });
        }
        (Role::Admin | Role::Analyst, Some(_)) => {
            return Err(ApiError::InvalidInput {
                field: String::from("company_id"),
                message: format!("{role} operators cannot belong to a company"),
            });
        }
        (Role::Admin | Role::Analyst, None) => {}
    }

    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &request.login_name,
        &request.display_name,
    )?;

    let operator_id: i64 = persistence
        .create_operator(
            &request.login_name,
            &request.display_name,
            &request.password,
            role.as_str(),
            request.company_id,
        )
        .map_err(|e| translate_persistence_error(e, "Operator"))?;
    let created: OperatorData = load_operator(persistence, operator_id)?;

    info!(
        operator_id,
        role = %role,
        created_by = %authenticated_actor.id,
        "Created operator"
    );

    Ok(CreateOperatorResponse {
        operator_id,
        login_name: created.login_name,
        display_name: created.display_name,
        role: created.role,
        company_id: created.company_id,
    })
}

/// Lists all operators with per-operator capabilities.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn list_operators(
    persistence: &mut SqlitePersistence,
    authenticated_actor: &AuthenticatedActor,
    actor_operator: &OperatorData,
) -> Result<ListOperatorsResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(authenticated_actor, "list_operators")?;

    let operators: Vec<OperatorData> = persistence
        .list_operators()
        .map_err(|e| translate_persistence_error(e, "Operator"))?;

    let mut infos: Vec<OperatorInfo> = Vec::with_capacity(operators.len());
    for op in operators {
        let capabilities: OperatorCapabilities = compute_operator_capabilities(
            authenticated_actor,
            actor_operator,
            &op,
            persistence,
        )
        .map_err(|message| ApiError::Internal { message })?;

        infos.push(OperatorInfo {
            operator_id: op.operator_id,
            login_name: op.login_name,
            display_name: op.display_name,
            role: op.role,
            company_id: op.company_id,
            is_disabled: op.is_disabled,
            created_at: op.created_at,
            last_login_at: op.last_login_at,
            capabilities,
        });
    }

    Ok(ListOperatorsResponse { operators: infos })
}

/// Disables an operator and ends all of its sessions.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The operator does not exist
/// - The operator is the last active admin
pub fn disable_operator(
    persistence: &mut SqlitePersistence,
    operator_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<OperatorStatusResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(authenticated_actor, "disable_operator")?;

    let target: OperatorData = load_operator(persistence, operator_id)?;

    if target.role == Role::Admin.as_str() && !target.is_disabled {
        let active_admin_count: i64 = persistence
            .count_active_admin_operators()
            .map_err(|e| translate_persistence_error(e, "Operator"))?;
        if active_admin_count <= 1 {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("last_active_admin"),
                message: String::from("Operation would leave the system without an active admin"),
            });
        }
    }

    persistence
        .disable_operator(operator_id)
        .map_err(|e| translate_persistence_error(e, "Operator"))?;
    let ended: usize = persistence
        .delete_sessions_for_operator(operator_id)
        .map_err(|e| translate_persistence_error(e, "Operator"))?;

    info!(
        operator_id,
        sessions_ended = ended,
        disabled_by = %authenticated_actor.id,
        "Disabled operator"
    );

    Ok(OperatorStatusResponse {
        operator_id,
        is_disabled: true,
        message: format!("Operator {} has been disabled", target.login_name),
    })
}

/// Re-enables a disabled operator.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the operator does not
/// exist.
pub fn enable_operator(
    persistence: &mut SqlitePersistence,
    operator_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<OperatorStatusResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(authenticated_actor, "enable_operator")?;

    let target: OperatorData = load_operator(persistence, operator_id)?;
    persistence
        .enable_operator(operator_id)
        .map_err(|e| translate_persistence_error(e, "Operator"))?;

    info!(operator_id, enabled_by = %authenticated_actor.id, "Re-enabled operator");

    Ok(OperatorStatusResponse {
        operator_id,
        is_disabled: false,
        message: format!("Operator {} has been re-enabled", target.login_name),
    })
}

/// Changes the caller's own password and ends all of its sessions.
///
/// # Errors
///
/// Returns an error if:
/// - The current password is incorrect
/// - The new password violates the policy
/// - Database operations fail
pub fn change_password(
    persistence: &mut SqlitePersistence,
    request: &ChangePasswordRequest,
    operator: &OperatorData,
) -> Result<ChangePasswordResponse, ApiError> {
    let password_valid: bool =
        SqlitePersistence::verify_password(&request.current_password, &operator.password_hash)
            .map_err(|e| ApiError::Internal {
                message: format!("Password verification failed: {e}"),
            })?;

    if !password_valid {
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Current password is incorrect"),
        });
    }

    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &operator.login_name,
        &operator.display_name,
    )?;

    persistence
        .update_password(operator.operator_id, &request.new_password)
        .map_err(|e| translate_persistence_error(e, "Operator"))?;
    persistence
        .delete_sessions_for_operator(operator.operator_id)
        .map_err(|e| translate_persistence_error(e, "Operator"))?;

    info!(operator_id = operator.operator_id, "Operator changed their password");

    Ok(ChangePasswordResponse {
        message: String::from("Password changed successfully. All sessions have been invalidated."),
    })
}

/// Resets another operator's password without the old one.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The target operator does not exist
/// - The new password violates the policy
pub fn reset_password(
    persistence: &mut SqlitePersistence,
    request: &ResetPasswordRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ResetPasswordResponse, ApiError> {
    AuthorizationService::authorize_manage_operators(authenticated_actor, "reset_password")?;

    let target: OperatorData = load_operator(persistence, request.operator_id)?;

    PasswordPolicy::default().validate(
        &request.new_password,
        &request.new_password_confirmation,
        &target.login_name,
        &target.display_name,
    )?;

    persistence
        .update_password(request.operator_id, &request.new_password)
        .map_err(|e| translate_persistence_error(e, "Operator"))?;
    persistence
        .delete_sessions_for_operator(request.operator_id)
        .map_err(|e| translate_persistence_error(e, "Operator"))?;

    info!(
        operator_id = request.operator_id,
        reset_by = %authenticated_actor.id,
        "Reset operator password"
    );

    Ok(ResetPasswordResponse {
        operator_id: request.operator_id,
        message: format!(
            "Password reset successfully for operator {}. All sessions have been invalidated.",
            target.login_name
        ),
    })
}
