// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]

mod audit_tests;
mod backend_validation_tests;
mod initialization_tests;

use crate::SqlitePersistence;
use callscore::{AuditContext, CompanyRef, ManagerRef};
use callscore_domain::{QuestionDraft, ScaleValue, ScoreScale, SubitemDraft};
use callscore_history::{Actor, Cause};

pub fn create_test_actor(operator_id: i64) -> Actor {
    Actor::with_operator(
        operator_id.to_string(),
        String::from("operator"),
        operator_id,
        String::from("ANALYST"),
        String::from("Test Analyst"),
    )
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

/// Met = 1, Partial = 0.5, Not met = 0.
pub fn create_test_scale(name: &str, is_default: bool) -> ScoreScale {
    ScoreScale::new(
        name.to_string(),
        is_default,
        vec![
            ScaleValue {
                value: 1.0,
                label: String::from("Met"),
                display_order: 0,
            },
            ScaleValue {
                value: 0.5,
                label: String::from("Partial"),
                display_order: 1,
            },
            ScaleValue {
                value: 0.0,
                label: String::from("Not met"),
                display_order: 2,
            },
        ],
    )
}

/// Greeting (w1, Opening); Pitch (w2, Pitch) with Clarity and Value;
/// Closing (w1, no category).
pub fn create_test_drafts() -> Vec<QuestionDraft> {
    vec![
        QuestionDraft {
            text: String::from("Greeting"),
            weight: 1.0,
            category: Some(String::from("Opening")),
            has_subitems: false,
            subitems: Vec::new(),
        },
        QuestionDraft {
            text: String::from("Pitch"),
            weight: 2.0,
            category: Some(String::from("Pitch")),
            has_subitems: true,
            subitems: vec![
                SubitemDraft {
                    text: String::from("Clarity"),
                    weight: 1.0,
                },
                SubitemDraft {
                    text: String::from("Value"),
                    weight: 1.0,
                },
            ],
        },
        QuestionDraft {
            text: String::from("Closing"),
            weight: 1.0,
            category: None,
            has_subitems: false,
            subitems: Vec::new(),
        },
    ]
}

/// Ids of a fully seeded database.
pub struct Seeded {
    pub scale_id: i64,
    pub company_id: i64,
    pub manager_id: i64,
    pub analyst_id: i64,
    pub questionnaire_id: i64,
    pub version_id: i64,
}

/// Seeds one scale, company, manager, analyst and questionnaire.
pub fn seed(persistence: &mut SqlitePersistence) -> Seeded {
    let scale_id = persistence
        .create_scale(&create_test_scale("Default", true))
        .unwrap();
    let company_id = persistence.create_company("Acme Sales").unwrap();
    let manager_id = persistence
        .create_manager(company_id, "Dana Reyes", Some("dana@acme.test"))
        .unwrap();
    let analyst_id = persistence
        .create_operator("analyst", "Test Analyst", "password", "Analyst", None)
        .unwrap();
    let (questionnaire_id, version_id) = persistence
        .create_questionnaire(
            "Outbound calls",
            Some("Standard outbound script"),
            scale_id,
            &create_test_drafts(),
        )
        .unwrap();

    Seeded {
        scale_id,
        company_id,
        manager_id,
        analyst_id,
        questionnaire_id,
        version_id,
    }
}

/// Loads the context a transition on `version_id` is validated against.
pub fn load_context(
    persistence: &mut SqlitePersistence,
    version_id: i64,
    company_id: i64,
    manager_id: Option<i64>,
) -> AuditContext {
    let version = persistence.get_version_tree(version_id).unwrap().unwrap();
    let scale_id = persistence
        .get_scale_id_for_version(version_id)
        .unwrap()
        .unwrap();
    let scale = persistence.get_scale(scale_id).unwrap().unwrap();
    let company = persistence.get_company(company_id).unwrap().unwrap();
    let manager = manager_id.map(|id| persistence.get_manager(id).unwrap().unwrap());

    AuditContext {
        version,
        scale,
        company: CompanyRef {
            company_id: company.company_id,
            is_active: company.is_active,
        },
        manager: manager.map(|m| ManagerRef {
            manager_id: m.manager_id,
            company_id: m.company_id,
            is_active: m.is_active,
        }),
    }
}
