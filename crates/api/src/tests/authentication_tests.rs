// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for login, sessions and the bootstrap flow.

use super::helpers::{TEST_PASSWORD, setup};
use crate::error::ApiError;
use crate::request_response::{CreateFirstAdminRequest, LoginRequest};
use crate::{
    AuthenticationService, Capability, Role, bootstrap_admin, check_bootstrap_status,
    create_first_admin, disable_operator, login, logout, whoami,
};
use callscore_persistence::SqlitePersistence;

#[test]
fn test_login_creates_a_valid_session() {
    let mut fixture = setup();

    let response = login(
        &mut fixture.persistence,
        &LoginRequest {
            login_name: String::from("analyst"),
            password: String::from(TEST_PASSWORD),
        },
    )
    .unwrap();

    assert_eq!(response.login_name, "ANALYST");
    assert_eq!(response.role, "Analyst");
    assert!(response.session_token.starts_with("cs_"));

    let (actor, operator) =
        AuthenticationService::validate_session(&mut fixture.persistence, &response.session_token)
            .unwrap();
    assert_eq!(actor.role, Role::Analyst);
    assert_eq!(operator.operator_id, fixture.analyst.operator.operator_id);
    assert!(operator.last_login_at.is_some());
}

#[test]
fn test_login_errors_do_not_reveal_unknown_logins() {
    let mut fixture = setup();

    let wrong_password = login(
        &mut fixture.persistence,
        &LoginRequest {
            login_name: String::from("analyst"),
            password: String::from("not-the-password"),
        },
    );
    let unknown_login = login(
        &mut fixture.persistence,
        &LoginRequest {
            login_name: String::from("nobody"),
            password: String::from(TEST_PASSWORD),
        },
    );

    match (wrong_password, unknown_login) {
        (
            Err(ApiError::AuthenticationFailed { reason: first }),
            Err(ApiError::AuthenticationFailed { reason: second }),
        ) => assert_eq!(first, second),
        other => panic!("Expected two AuthenticationFailed errors, got: {other:?}"),
    }
}

#[test]
fn test_logout_invalidates_the_session() {
    let mut fixture = setup();
    let response = login(
        &mut fixture.persistence,
        &LoginRequest {
            login_name: String::from("admin"),
            password: String::from(TEST_PASSWORD),
        },
    )
    .unwrap();

    logout(&mut fixture.persistence, &response.session_token).unwrap();

    let result =
        AuthenticationService::validate_session(&mut fixture.persistence, &response.session_token);
    assert!(result.is_err());
}

#[test]
fn test_disabling_an_operator_ends_its_sessions() {
    let mut fixture = setup();
    let response = login(
        &mut fixture.persistence,
        &LoginRequest {
            login_name: String::from("analyst"),
            password: String::from(TEST_PASSWORD),
        },
    )
    .unwrap();

    disable_operator(
        &mut fixture.persistence,
        fixture.analyst.operator.operator_id,
        &fixture.admin.actor,
    )
    .unwrap();

    let result =
        AuthenticationService::validate_session(&mut fixture.persistence, &response.session_token);
    assert!(result.is_err());

    let relogin = login(
        &mut fixture.persistence,
        &LoginRequest {
            login_name: String::from("analyst"),
            password: String::from(TEST_PASSWORD),
        },
    );
    assert!(matches!(
        relogin,
        Err(ApiError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_whoami_reports_role_capabilities() {
    let fixture = setup();

    let admin = whoami(&fixture.admin.actor, &fixture.admin.operator);
    let client = whoami(&fixture.client.actor, &fixture.client.operator);

    assert_eq!(admin.capabilities.can_manage_operators, Capability::Allowed);
    assert_eq!(client.capabilities.can_manage_operators, Capability::Denied);
    assert_eq!(client.capabilities.can_conduct_audits, Capability::Denied);
    assert_eq!(client.capabilities.can_export_reports, Capability::Allowed);
    assert_eq!(client.company_id, Some(fixture.company_id));
}

#[test]
fn test_bootstrap_mode_until_first_admin_exists() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    assert!(
        check_bootstrap_status(&mut persistence)
            .unwrap()
            .is_bootstrap_mode
    );

    let created = create_first_admin(
        &mut persistence,
        CreateFirstAdminRequest {
            login_name: String::from("root"),
            display_name: String::from("First Admin"),
            password: String::from(TEST_PASSWORD),
            password_confirmation: String::from(TEST_PASSWORD),
        },
    )
    .unwrap();
    assert_eq!(created.role, "Admin");
    assert!(
        !check_bootstrap_status(&mut persistence)
            .unwrap()
            .is_bootstrap_mode
    );

    let second = create_first_admin(
        &mut persistence,
        CreateFirstAdminRequest {
            login_name: String::from("intruder"),
            display_name: String::from("Second Admin"),
            password: String::from(TEST_PASSWORD),
            password_confirmation: String::from(TEST_PASSWORD),
        },
    );
    assert!(matches!(second, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_bootstrap_admin_is_skipped_once_operators_exist() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let first = bootstrap_admin(&mut persistence, "root", "First Admin", TEST_PASSWORD).unwrap();
    let second = bootstrap_admin(&mut persistence, "root2", "Other Admin", TEST_PASSWORD).unwrap();

    assert!(first.is_some());
    assert_eq!(second, None);
    assert_eq!(persistence.count_operators().unwrap(), 1);
}

#[test]
fn test_bootstrap_admin_enforces_password_policy() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let result = bootstrap_admin(&mut persistence, "root", "First Admin", "short");

    assert!(matches!(
        result,
        Err(ApiError::PasswordPolicyViolation { .. })
    ));
    assert_eq!(persistence.count_operators().unwrap(), 0);
}
