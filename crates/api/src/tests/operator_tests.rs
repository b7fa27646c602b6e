// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for operator management API handlers.

use super::helpers::{TEST_PASSWORD, setup};
use crate::error::ApiError;
use crate::request_response::{
    ChangePasswordRequest, CreateOperatorRequest, LoginRequest, ResetPasswordRequest,
};
use crate::{
    Capability, change_password, create_operator, disable_operator, enable_operator,
    list_operators, login, reset_password,
};

fn operator_request(login_name: &str, role: &str, company_id: Option<i64>) -> CreateOperatorRequest {
    CreateOperatorRequest {
        login_name: login_name.to_string(),
        display_name: String::from("New Operator"),
        role: role.to_string(),
        company_id,
        password: String::from(TEST_PASSWORD),
        password_confirmation: String::from(TEST_PASSWORD),
    }
}

#[test]
fn test_create_operator_requires_admin() {
    let mut fixture = setup();

    let result = create_operator(
        &mut fixture.persistence,
        operator_request("newbie", "Analyst", None),
        &fixture.analyst.actor,
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_create_company_operator_requires_company() {
    let mut fixture = setup();

    let missing = create_operator(
        &mut fixture.persistence,
        operator_request("viewer", "Company", None),
        &fixture.admin.actor,
    );
    match missing {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "company_id"),
        other => panic!("Expected InvalidInput error, got: {other:?}"),
    }

    let unknown = create_operator(
        &mut fixture.persistence,
        operator_request("viewer", "Company", Some(9999)),
        &fixture.admin.actor,
    );
    assert!(matches!(unknown, Err(ApiError::ResourceNotFound { .. })));

    let created = create_operator(
        &mut fixture.persistence,
        operator_request("viewer", "Company", Some(fixture.other_company_id)),
        &fixture.admin.actor,
    )
    .unwrap();
    assert_eq!(created.company_id, Some(fixture.other_company_id));
    assert_eq!(created.login_name, "VIEWER");
}

#[test]
fn test_create_analyst_with_company_is_rejected() {
    let mut fixture = setup();

    let result = create_operator(
        &mut fixture.persistence,
        operator_request("newbie", "Analyst", Some(fixture.company_id)),
        &fixture.admin.actor,
    );

    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_create_operator_rejects_unknown_role() {
    let mut fixture = setup();

    let result = create_operator(
        &mut fixture.persistence,
        operator_request("newbie", "Supervisor", None),
        &fixture.admin.actor,
    );

    match result {
        Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "role"),
        other => panic!("Expected InvalidInput error, got: {other:?}"),
    }
}

#[test]
fn test_create_operator_rejects_duplicate_login() {
    let mut fixture = setup();

    let result = create_operator(
        &mut fixture.persistence,
        operator_request("Analyst", "Analyst", None),
        &fixture.admin.actor,
    );

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_create_operator_enforces_password_policy() {
    let mut fixture = setup();
    let mut request = operator_request("newbie", "Analyst", None);
    request.password = String::from("alllowercase");
    request.password_confirmation = String::from("alllowercase");

    let result = create_operator(&mut fixture.persistence, request, &fixture.admin.actor);

    assert!(matches!(
        result,
        Err(ApiError::PasswordPolicyViolation { .. })
    ));
}

#[test]
fn test_last_active_admin_cannot_be_disabled() {
    let mut fixture = setup();

    let result = disable_operator(
        &mut fixture.persistence,
        fixture.admin.operator.operator_id,
        &fixture.admin.actor,
    );

    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, "last_active_admin"),
        other => panic!("Expected DomainRuleViolation error, got: {other:?}"),
    }

    let listed = list_operators(
        &mut fixture.persistence,
        &fixture.admin.actor,
        &fixture.admin.operator,
    )
    .unwrap();
    let admin = listed
        .operators
        .iter()
        .find(|o| o.operator_id == fixture.admin.operator.operator_id)
        .unwrap();
    assert_eq!(admin.capabilities.can_disable, Capability::Denied);
}

#[test]
fn test_disable_and_enable_operator() {
    let mut fixture = setup();
    let analyst_id = fixture.analyst.operator.operator_id;

    let disabled =
        disable_operator(&mut fixture.persistence, analyst_id, &fixture.admin.actor).unwrap();
    assert!(disabled.is_disabled);

    let enabled =
        enable_operator(&mut fixture.persistence, analyst_id, &fixture.admin.actor).unwrap();
    assert!(!enabled.is_disabled);

    let stored = fixture
        .persistence
        .get_operator_by_id(analyst_id)
        .unwrap()
        .unwrap();
    assert!(!stored.is_disabled);
}

#[test]
fn test_change_password_requires_current_password() {
    let mut fixture = setup();

    let result = change_password(
        &mut fixture.persistence,
        &ChangePasswordRequest {
            current_password: String::from("wrong-password"),
            new_password: String::from("Another-Secret-77"),
            new_password_confirmation: String::from("Another-Secret-77"),
        },
        &fixture.analyst.operator,
    );

    assert!(matches!(
        result,
        Err(ApiError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_change_password_then_login_with_new_password() {
    let mut fixture = setup();

    change_password(
        &mut fixture.persistence,
        &ChangePasswordRequest {
            current_password: String::from(TEST_PASSWORD),
            new_password: String::from("Another-Secret-77"),
            new_password_confirmation: String::from("Another-Secret-77"),
        },
        &fixture.analyst.operator,
    )
    .unwrap();

    let old = login(
        &mut fixture.persistence,
        &LoginRequest {
            login_name: String::from("analyst"),
            password: String::from(TEST_PASSWORD),
        },
    );
    assert!(old.is_err());

    let new = login(
        &mut fixture.persistence,
        &LoginRequest {
            login_name: String::from("analyst"),
            password: String::from("Another-Secret-77"),
        },
    );
    assert!(new.is_ok());
}

#[test]
fn test_reset_password_requires_admin() {
    let mut fixture = setup();

    let result = reset_password(
        &mut fixture.persistence,
        &ResetPasswordRequest {
            operator_id: fixture.client.operator.operator_id,
            new_password: String::from("Another-Secret-77"),
            new_password_confirmation: String::from("Another-Secret-77"),
        },
        &fixture.analyst.actor,
    );
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));

    let reset = reset_password(
        &mut fixture.persistence,
        &ResetPasswordRequest {
            operator_id: fixture.client.operator.operator_id,
            new_password: String::from("Another-Secret-77"),
            new_password_confirmation: String::from("Another-Secret-77"),
        },
        &fixture.admin.actor,
    )
    .unwrap();
    assert_eq!(reset.operator_id, fixture.client.operator.operator_id);
}
