// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{Category, UnitRef};
use serde::{Deserialize, Serialize};

/// Tolerance used when matching a submitted score against scale values.
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// One discrete value of a score scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleValue {
    /// The numeric score.
    pub value: f64,
    /// Label shown to analysts (e.g. "Met").
    pub label: String,
    /// Ordering within the scale.
    pub display_order: i32,
}

/// A named set of discrete score values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreScale {
    /// The persisted id, `None` before insertion.
    pub scale_id: Option<i64>,
    pub name: String,
    /// Exactly one scale is the default at any time.
    pub is_default: bool,
    pub values: Vec<ScaleValue>,
}

impl ScoreScale {
    /// Creates an unsaved scale.
    #[must_use]
    pub const fn new(name: String, is_default: bool, values: Vec<ScaleValue>) -> Self {
        Self {
            scale_id: None,
            name,
            is_default,
            values,
        }
    }

    /// The highest value on the scale, or `0` for an empty scale.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .map(|v| v.value)
            .fold(0.0_f64, f64::max)
    }

    /// Whether `score` is one of the scale's values.
    #[must_use]
    pub fn contains(&self, score: f64) -> bool {
        self.values
            .iter()
            .any(|v| (v.value - score).abs() <= SCORE_TOLERANCE)
    }
}

/// A logical audit template.
///
/// Its question sets live in immutable versions; `current_version_id` points
/// at the one new audits are created against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub questionnaire_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub scale_id: i64,
    pub current_version_id: Option<i64>,
    pub is_active: bool,
}

/// A subitem of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSubitem {
    pub subitem_id: i64,
    pub text: String,
    pub weight: f64,
    pub is_active: bool,
    pub display_order: i32,
}

/// A question of a questionnaire version.
///
/// When `has_subitems` is set the question is scored only through its
/// active subitems. Otherwise it is itself the scorable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_id: i64,
    pub text: String,
    pub weight: f64,
    pub category: Category,
    pub is_active: bool,
    pub has_subitems: bool,
    pub display_order: i32,
    /// Subitems in display order.
    pub subitems: Vec<QuestionSubitem>,
}

/// An immutable snapshot of a question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireVersion {
    pub version_id: i64,
    pub questionnaire_id: i64,
    /// Monotonically increasing per questionnaire, starting at 1.
    pub version_number: i32,
    /// Questions in display order.
    pub questions: Vec<Question>,
}

/// An active scorable unit of a version together with its resolved weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorableUnit {
    pub unit: UnitRef,
    pub category: Category,
    pub weight: f64,
}

impl QuestionnaireVersion {
    /// Looks up a question by id.
    #[must_use]
    pub fn question(&self, question_id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }

    /// Looks up a subitem by id, returning it with its parent question.
    #[must_use]
    pub fn subitem(&self, subitem_id: i64) -> Option<(&Question, &QuestionSubitem)> {
        self.questions.iter().find_map(|q| {
            q.subitems
                .iter()
                .find(|s| s.subitem_id == subitem_id)
                .map(|s| (q, s))
        })
    }

    /// Whether the unit belongs to this version, active or not.
    #[must_use]
    pub fn contains_unit(&self, unit: UnitRef) -> bool {
        match unit {
            UnitRef::Question(id) => self.question(id).is_some(),
            UnitRef::Subitem(id) => self.subitem(id).is_some(),
        }
    }

    /// Lists every active scorable unit in tree order.
    ///
    /// A question with subitems yields one unit per active subitem, weighted
    /// `question.weight * subitem.weight`.
    #[must_use]
    pub fn scorable_units(&self) -> Vec<ScorableUnit> {
        let mut units = Vec::new();
        for question in self.questions.iter().filter(|q| q.is_active) {
            if question.has_subitems {
                for subitem in question.subitems.iter().filter(|s| s.is_active) {
                    units.push(ScorableUnit {
                        unit: UnitRef::Subitem(subitem.subitem_id),
                        category: question.category.clone(),
                        weight: question.weight * subitem.weight,
                    });
                }
            } else {
                units.push(ScorableUnit {
                    unit: UnitRef::Question(question.question_id),
                    category: question.category.clone(),
                    weight: question.weight,
                });
            }
        }
        units
    }
}

/// Input for a new subitem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubitemDraft {
    pub text: String,
    pub weight: f64,
}

/// Input for a new question when publishing a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub text: String,
    pub weight: f64,
    pub category: Option<String>,
    pub has_subitems: bool,
    pub subitems: Vec<SubitemDraft>,
}
