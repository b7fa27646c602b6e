// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use callscore_history::Cause;
use callscore_persistence::{OperatorData, SqlitePersistence};

use crate::request_response::{
    AnswerInput, AuditMetadataInput, CreateAuditRequest, CreateQuestionnaireRequest,
    CreateScaleRequest, QuestionInput, ScaleValueInput, SubitemInput, UpdateAuditRequest,
    VersionTreeResponse,
};
use crate::{
    AuthenticatedActor, complete_audit, create_audit, create_questionnaire, create_scale,
    get_questionnaire_version, update_audit,
};

/// Satisfies the default password policy.
pub const TEST_PASSWORD: &str = "Correct-Horse-42";

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-1"), String::from("API request"))
}

/// An operator together with the actor derived from it.
pub struct TestOperator {
    pub actor: AuthenticatedActor,
    pub operator: OperatorData,
}

fn add_operator(
    persistence: &mut SqlitePersistence,
    login_name: &str,
    display_name: &str,
    role: &str,
    company_id: Option<i64>,
) -> TestOperator {
    let operator_id = persistence
        .create_operator(login_name, display_name, TEST_PASSWORD, role, company_id)
        .unwrap();
    let operator = persistence.get_operator_by_id(operator_id).unwrap().unwrap();
    TestOperator {
        actor: AuthenticatedActor::from_operator(&operator).unwrap(),
        operator,
    }
}

/// Unit ids of the seeded questionnaire's first version.
pub struct QuestionIds {
    pub greeting: i64,
    pub pitch: i64,
    pub clarity: i64,
    pub value: i64,
    pub closing: i64,
}

/// A seeded database with one operator per role.
pub struct Fixture {
    pub persistence: SqlitePersistence,
    pub admin: TestOperator,
    pub analyst: TestOperator,
    pub client: TestOperator,
    pub scale_id: i64,
    pub company_id: i64,
    pub other_company_id: i64,
    pub manager_id: i64,
    pub other_manager_id: i64,
    pub questionnaire_id: i64,
    pub version_id: i64,
    pub questions: QuestionIds,
}

/// Greeting (w1, Opening); Pitch (w2, Pitch) with Clarity and Value;
/// Closing (w1, no category).
pub fn standard_questions() -> Vec<QuestionInput> {
    vec![
        QuestionInput {
            text: String::from("Greeting"),
            weight: 1.0,
            category: Some(String::from("Opening")),
            has_subitems: false,
            subitems: Vec::new(),
        },
        QuestionInput {
            text: String::from("Pitch"),
            weight: 2.0,
            category: Some(String::from("Pitch")),
            has_subitems: true,
            subitems: vec![
                SubitemInput {
                    text: String::from("Clarity"),
                    weight: 1.0,
                },
                SubitemInput {
                    text: String::from("Value"),
                    weight: 1.0,
                },
            ],
        },
        QuestionInput {
            text: String::from("Closing"),
            weight: 1.0,
            category: None,
            has_subitems: false,
            subitems: Vec::new(),
        },
    ]
}

/// Met = 1, Partial = 0.5, Not met = 0.
pub fn standard_scale_request(name: &str) -> CreateScaleRequest {
    CreateScaleRequest {
        name: name.to_string(),
        is_default: true,
        values: vec![
            ScaleValueInput {
                value: 1.0,
                label: String::from("Met"),
            },
            ScaleValueInput {
                value: 0.5,
                label: String::from("Partial"),
            },
            ScaleValueInput {
                value: 0.0,
                label: String::from("Not met"),
            },
        ],
    }
}

fn question_ids(tree: &VersionTreeResponse) -> QuestionIds {
    let find = |text: &str| {
        tree.questions
            .iter()
            .find(|q| q.text == text)
            .unwrap()
    };
    let pitch = find("Pitch");
    let subitem = |text: &str| {
        pitch
            .subitems
            .iter()
            .find(|s| s.text == text)
            .unwrap()
            .subitem_id
    };
    QuestionIds {
        greeting: find("Greeting").question_id,
        pitch: pitch.question_id,
        clarity: subitem("Clarity"),
        value: subitem("Value"),
        closing: find("Closing").question_id,
    }
}

pub fn setup() -> Fixture {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let company_id = persistence.create_company("Acme Sales").unwrap();
    let other_company_id = persistence.create_company("Globex Outbound").unwrap();
    let manager_id = persistence
        .create_manager(company_id, "Dana Reyes", Some("dana@acme.test"))
        .unwrap();
    let other_manager_id = persistence
        .create_manager(other_company_id, "Sam Ortiz", None)
        .unwrap();

    let admin = add_operator(&mut persistence, "admin", "Test Admin", "Admin", None);
    let analyst = add_operator(&mut persistence, "analyst", "Test Analyst", "Analyst", None);
    let client = add_operator(
        &mut persistence,
        "client",
        "Acme Viewer",
        "Company",
        Some(company_id),
    );

    let scale_id = create_scale(
        &mut persistence,
        standard_scale_request("Three point"),
        &admin.actor,
    )
    .unwrap()
    .scale_id;

    let created = create_questionnaire(
        &mut persistence,
        CreateQuestionnaireRequest {
            name: String::from("Outbound calls"),
            description: Some(String::from("Standard outbound script")),
            scale_id: None,
            questions: standard_questions(),
        },
        &admin.actor,
    )
    .unwrap();

    let tree = get_questionnaire_version(&mut persistence, created.version_id, &admin.actor)
        .unwrap();
    let questions = question_ids(&tree);

    Fixture {
        persistence,
        admin,
        analyst,
        client,
        scale_id,
        company_id,
        other_company_id,
        manager_id,
        other_manager_id,
        questionnaire_id: created.questionnaire_id,
        version_id: created.version_id,
        questions,
    }
}

pub fn question_answer(question_id: i64, score: Option<f64>) -> AnswerInput {
    AnswerInput {
        question_id: Some(question_id),
        subitem_id: None,
        score,
        comment: None,
    }
}

pub fn subitem_answer(subitem_id: i64, score: Option<f64>) -> AnswerInput {
    AnswerInput {
        question_id: None,
        subitem_id: Some(subitem_id),
        score,
        comment: None,
    }
}

/// Greeting 1, Clarity 0.5, Value 0, Closing 1: 3 of 6 points.
pub fn full_answers(questions: &QuestionIds) -> Vec<AnswerInput> {
    vec![
        question_answer(questions.greeting, Some(1.0)),
        subitem_answer(questions.clarity, Some(0.5)),
        subitem_answer(questions.value, Some(0.0)),
        question_answer(questions.closing, Some(1.0)),
    ]
}

pub fn create_request(fixture: &Fixture) -> CreateAuditRequest {
    CreateAuditRequest {
        company_id: fixture.company_id,
        manager_id: Some(fixture.manager_id),
        questionnaire_id: fixture.questionnaire_id,
        metadata: AuditMetadataInput {
            call_date: Some(String::from("2026-03-14")),
            call_reference: Some(String::from("CRM-1001")),
            summary: None,
        },
    }
}

/// Creates a draft audit as the analyst and returns its id.
pub fn create_draft(fixture: &mut Fixture) -> i64 {
    let request = create_request(fixture);
    create_audit(
        &mut fixture.persistence,
        request,
        &fixture.analyst.actor,
        &fixture.analyst.operator,
        create_test_cause(),
    )
    .unwrap()
    .audit_id
}

/// Creates, fully answers and completes an audit.
pub fn create_completed(fixture: &mut Fixture, answers: Vec<AnswerInput>) -> i64 {
    let audit_id = create_draft(fixture);
    update_audit(
        &mut fixture.persistence,
        audit_id,
        UpdateAuditRequest {
            answers,
            metadata: None,
        },
        &fixture.analyst.actor,
        &fixture.analyst.operator,
        create_test_cause(),
    )
    .unwrap();
    complete_audit(
        &mut fixture.persistence,
        audit_id,
        &fixture.analyst.actor,
        &fixture.analyst.operator,
        create_test_cause(),
    )
    .unwrap();
    audit_id
}
