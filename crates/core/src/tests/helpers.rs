// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{AuditContext, AuditState, CompanyRef, ManagerRef};
use callscore_domain::{
    Audit, AuditAnswer, AuditMetadata, Category, Question, QuestionSubitem, QuestionnaireVersion,
    ScaleValue, ScoreScale, UnitRef,
};
use callscore_history::{Actor, Cause};
use time::OffsetDateTime;
use time::macros::datetime;

pub const COMPANY_ID: i64 = 1;
pub const MANAGER_ID: i64 = 5;
pub const ANALYST_ID: i64 = 9;
pub const VERSION_ID: i64 = 10;

pub fn create_test_actor() -> Actor {
    Actor::with_operator(
        String::from("9"),
        String::from("operator"),
        ANALYST_ID,
        String::from("analyst"),
        String::from("Test Analyst"),
    )
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Analyst request"))
}

pub fn completed_at() -> OffsetDateTime {
    datetime!(2026-02-10 14:30 UTC)
}

fn scale() -> ScoreScale {
    ScoreScale {
        scale_id: Some(1),
        name: String::from("Default"),
        is_default: true,
        values: vec![
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
    }
}

fn question(id: i64, weight: f64, category: &str, is_active: bool) -> Question {
    Question {
        question_id: id,
        text: format!("Question {id}"),
        weight,
        category: Category::Named(category.to_string()),
        is_active,
        has_subitems: false,
        display_order: 0,
        subitems: Vec::new(),
    }
}

fn subitem(id: i64) -> QuestionSubitem {
    QuestionSubitem {
        subitem_id: id,
        text: format!("Subitem {id}"),
        weight: 1.0,
        is_active: true,
        display_order: 0,
    }
}

/// Greeting (1, w1, Opening); Pitch (2, w2, Pitch) with subitems 21 and 22;
/// an inactive question (3, w5, Closing).
pub fn create_test_version() -> QuestionnaireVersion {
    let mut pitch = question(2, 2.0, "Pitch", true);
    pitch.has_subitems = true;
    pitch.subitems = vec![subitem(21), subitem(22)];
    QuestionnaireVersion {
        version_id: VERSION_ID,
        questionnaire_id: 100,
        version_number: 1,
        questions: vec![
            question(1, 1.0, "Opening", true),
            pitch,
            question(3, 5.0, "Closing", false),
        ],
    }
}

pub fn create_test_context() -> AuditContext {
    AuditContext {
        version: create_test_version(),
        scale: scale(),
        company: CompanyRef {
            company_id: COMPANY_ID,
            is_active: true,
        },
        manager: Some(ManagerRef {
            manager_id: MANAGER_ID,
            company_id: COMPANY_ID,
            is_active: true,
        }),
    }
}

pub fn create_draft_state() -> AuditState {
    let mut audit = Audit::new_draft(
        COMPANY_ID,
        Some(MANAGER_ID),
        ANALYST_ID,
        VERSION_ID,
        AuditMetadata::default(),
    );
    audit.audit_id = Some(77);
    AuditState::new(audit)
}

/// Greeting = 1, Clarity = 0.5, Value = 0.
pub fn full_answers() -> Vec<AuditAnswer> {
    vec![
        AuditAnswer::new(UnitRef::Question(1), Some(1.0), None),
        AuditAnswer::new(
            UnitRef::Subitem(21),
            Some(0.5),
            Some(String::from("Hesitant")),
        ),
        AuditAnswer::new(UnitRef::Subitem(22), Some(0.0), None),
    ]
}

pub fn answered_state() -> AuditState {
    let mut state = create_draft_state();
    state.answers = full_answers();
    state
}

/// The standard context with every scale value multiplied by ten.
pub fn ten_point_context() -> AuditContext {
    let mut context = create_test_context();
    for value in &mut context.scale.values {
        value.value *= 10.0;
    }
    context
}

/// `answered_state` with every score multiplied by ten.
pub fn ten_point_answered_state() -> AuditState {
    let mut state = answered_state();
    for answer in &mut state.answers {
        answer.score = answer.score.map(|score| score * 10.0);
    }
    state
}
