// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use callscore_persistence::{OperatorData, SessionData, SqlitePersistence};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthenticationService, Role};
use crate::capabilities::compute_global_capabilities;
use crate::error::{ApiError, translate_persistence_error};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    BootstrapStatusResponse, CreateFirstAdminRequest, CreateOperatorResponse, LoginRequest,
    LoginResponse, WhoAmIResponse,
};

/// Authenticates an operator and creates a session.
///
/// # Errors
///
/// Returns an error if:
/// - The credentials are wrong
/// - The operator is disabled
/// - Database operations fail
pub fn login(
    persistence: &mut SqlitePersistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session_token, _authenticated_actor, operator): (
        String,
        AuthenticatedActor,
        OperatorData,
    ) = AuthenticationService::login(persistence, &request.login_name, &request.password)?;

    let session: Option<SessionData> = persistence
        .get_session_by_token(&session_token)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to retrieve session: {e}"),
        })?;

    let expires_at: String = session
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Session not found after creation"),
        })?
        .expires_at;

    Ok(LoginResponse {
        session_token,
        login_name: operator.login_name,
        display_name: operator.display_name,
        role: operator.role,
        company_id: operator.company_id,
        expires_at,
    })
}

/// Logs out by deleting the session.
///
/// # Errors
///
/// Returns an error if the logout fails.
pub fn logout(persistence: &mut SqlitePersistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the current operator's information with global capabilities.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor, operator: &OperatorData) -> WhoAmIResponse {
    WhoAmIResponse {
        operator_id: operator.operator_id,
        login_name: operator.login_name.clone(),
        display_name: operator.display_name.clone(),
        role: operator.role.clone(),
        company_id: operator.company_id,
        is_disabled: operator.is_disabled,
        capabilities: compute_global_capabilities(actor, operator),
    }
}

/// Reports whether the system is still waiting for its first admin.
///
/// # Errors
///
/// Returns an error if database operations fail.
pub fn check_bootstrap_status(
    persistence: &mut SqlitePersistence,
) -> Result<BootstrapStatusResponse, ApiError> {
    let operator_count: i64 = persistence
        .count_operators()
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to count operators: {e}"),
        })?;

    Ok(BootstrapStatusResponse {
        is_bootstrap_mode: operator_count == 0,
    })
}

fn ensure_bootstrap_mode(
    persistence: &mut SqlitePersistence,
    action: &str,
) -> Result<(), ApiError> {
    if check_bootstrap_status(persistence)?.is_bootstrap_mode {
        Ok(())
    } else {
        Err(ApiError::Unauthorized {
            action: action.to_string(),
            required_role: String::from("Bootstrap mode (no operators exist)"),
        })
    }
}

/// Creates the first admin operator.
///
/// Only succeeds while no operator exists; afterwards every operator is
/// created by an admin.
///
/// # Errors
///
/// Returns an error if:
/// - Operators already exist
/// - The password violates the policy
/// - Database operations fail
pub fn create_first_admin(
    persistence: &mut SqlitePersistence,
    request: CreateFirstAdminRequest,
) -> Result<CreateOperatorResponse, ApiError> {
    ensure_bootstrap_mode(persistence, "create_first_admin")?;

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
            Role::Admin.as_str(),
            None,
        )
        .map_err(|e| translate_persistence_error(e, "Operator"))?;

    let operator: OperatorData = persistence
        .get_operator_by_id(operator_id)
        .map_err(|e| translate_persistence_error(e, "Operator"))?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Operator not found after creation"),
        })?;

    info!(operator_id, login_name = %operator.login_name, "Created first admin");

    Ok(CreateOperatorResponse {
        operator_id,
        login_name: operator.login_name,
        display_name: operator.display_name,
        role: operator.role,
        company_id: None,
    })
}

/// Creates an admin from startup configuration if no operator exists yet.
///
/// Returns the new operator id, or `None` when operators already exist.
///
/// # Errors
///
/// Returns an error if the password violates the policy or the insert
/// fails.
pub fn bootstrap_admin(
    persistence: &mut SqlitePersistence,
    login_name: &str,
    display_name: &str,
    password: &str,
) -> Result<Option<i64>, ApiError> {
    if !check_bootstrap_status(persistence)?.is_bootstrap_mode {
        return Ok(None);
    }

    let response: CreateOperatorResponse = create_first_admin(
        persistence,
        CreateFirstAdminRequest {
            login_name: login_name.to_string(),
            display_name: display_name.to_string(),
            password: password.to_string(),
            password_confirmation: password.to_string(),
        },
    )?;
    Ok(Some(response.operator_id))
}
