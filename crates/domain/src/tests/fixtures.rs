// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AuditAnswer, Category, Question, QuestionSubitem, QuestionnaireVersion, ScaleValue,
    ScoreScale, UnitRef,
};

pub fn default_scale() -> ScoreScale {
    ScoreScale {
        scale_id: Some(1),
        name: String::from("Met / Partial / Not met"),
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

/// A 10 / 5 / 0 scale, for checking that percentages do not assume a top
/// value of 1.
pub fn ten_point_scale() -> ScoreScale {
    ScoreScale {
        scale_id: Some(2),
        name: String::from("Ten point"),
        is_default: false,
        values: vec![
            ScaleValue {
                value: 10.0,
                label: String::from("Excellent"),
                display_order: 0,
            },
            ScaleValue {
                value: 5.0,
                label: String::from("Adequate"),
                display_order: 1,
            },
            ScaleValue {
                value: 0.0,
                label: String::from("Missing"),
                display_order: 2,
            },
        ],
    }
}

pub fn question(id: i64, weight: f64, category: Option<&str>, display_order: i32) -> Question {
    Question {
        question_id: id,
        text: format!("Question {id}"),
        weight,
        category: Category::from_optional(category),
        is_active: true,
        has_subitems: false,
        display_order,
        subitems: Vec::new(),
    }
}

pub fn subitem(id: i64, weight: f64, display_order: i32) -> QuestionSubitem {
    QuestionSubitem {
        subitem_id: id,
        text: format!("Subitem {id}"),
        weight,
        is_active: true,
        display_order,
    }
}

/// Greeting (w1, Opening), Pitch (w2, Pitch) with subitems Clarity (21, w1)
/// and Value (22, w1), and an inactive question (w5, Closing).
pub fn sample_version() -> QuestionnaireVersion {
    let greeting = question(1, 1.0, Some("Opening"), 0);
    let mut pitch = question(2, 2.0, Some("Pitch"), 1);
    pitch.has_subitems = true;
    pitch.subitems = vec![subitem(21, 1.0, 0), subitem(22, 1.0, 1)];
    let mut retired = question(3, 5.0, Some("Closing"), 2);
    retired.is_active = false;

    QuestionnaireVersion {
        version_id: 10,
        questionnaire_id: 100,
        version_number: 1,
        questions: vec![greeting, pitch, retired],
    }
}

/// Greeting = 1, Clarity = 0.5, Value = 0, inactive question = 1.
pub fn sample_answers() -> Vec<AuditAnswer> {
    vec![
        answer(UnitRef::Question(1), Some(1.0)),
        answer(UnitRef::Subitem(21), Some(0.5)),
        answer(UnitRef::Subitem(22), Some(0.0)),
        answer(UnitRef::Question(3), Some(1.0)),
    ]
}

pub fn answer(unit: UnitRef, score: Option<f64>) -> AuditAnswer {
    AuditAnswer::new(unit, score, None)
}
