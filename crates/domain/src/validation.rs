// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::audit::AuditAnswer;
use crate::error::DomainError;
use crate::questionnaire::{QuestionDraft, QuestionnaireVersion, SCORE_TOLERANCE, ScoreScale};
use crate::types::UnitRef;
use std::collections::HashSet;

/// Validates that a required text field is not blank.
///
/// # Errors
///
/// Returns `DomainError::EmptyField` if the value is empty after trimming.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::EmptyField { field });
    }
    Ok(())
}

/// Validates that a weight is finite and strictly positive.
///
/// # Errors
///
/// Returns `DomainError::InvalidWeight` otherwise.
pub fn validate_weight(field: &'static str, weight: f64) -> Result<(), DomainError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(DomainError::InvalidWeight { field, weight });
    }
    Ok(())
}

/// Validates a score scale before it is stored.
///
/// # Errors
///
/// Returns an error if:
/// - The scale name is empty
/// - The scale has no values
/// - A value is negative or not finite
/// - A value appears twice
/// - A value label is empty
pub fn validate_scale(scale: &ScoreScale) -> Result<(), DomainError> {
    validate_name("scale name", &scale.name)?;
    if scale.values.is_empty() {
        return Err(DomainError::EmptyScale);
    }
    for (i, value) in scale.values.iter().enumerate() {
        if !value.value.is_finite() || value.value < 0.0 {
            return Err(DomainError::InvalidScaleValue(value.value));
        }
        validate_name("scale value label", &value.label)?;
        if scale.values[..i]
            .iter()
            .any(|earlier| (earlier.value - value.value).abs() <= SCORE_TOLERANCE)
        {
            return Err(DomainError::DuplicateScaleValue(value.value));
        }
    }
    Ok(())
}

/// Validates one question of a version about to be published.
///
/// # Errors
///
/// Returns an error if the text is empty, a weight is invalid, or the
/// subitem list disagrees with `has_subitems`.
pub fn validate_question_draft(question: &QuestionDraft) -> Result<(), DomainError> {
    validate_name("question text", &question.text)?;
    validate_weight("question weight", question.weight)?;

    if question.has_subitems && question.subitems.is_empty() {
        return Err(DomainError::InvalidQuestionStructure(format!(
            "question '{}' is marked as having subitems but has none",
            question.text.trim()
        )));
    }
    if !question.has_subitems && !question.subitems.is_empty() {
        return Err(DomainError::InvalidQuestionStructure(format!(
            "question '{}' has subitems but is not marked as having them",
            question.text.trim()
        )));
    }

    for subitem in &question.subitems {
        validate_name("subitem text", &subitem.text)?;
        validate_weight("subitem weight", subitem.weight)?;
    }
    Ok(())
}

/// Validates a full answer set against the audit's pinned version.
///
/// This is the write-time check. The aggregator itself stays tolerant of
/// unknown units.
///
/// # Errors
///
/// Returns an error if:
/// - An answer references a unit outside the version
/// - A question with subitems is answered directly
/// - A unit is answered twice
/// - A score is not one of the scale's values
pub fn validate_answers(
    answers: &[AuditAnswer],
    version: &QuestionnaireVersion,
    scale: &ScoreScale,
) -> Result<(), DomainError> {
    let mut seen: HashSet<UnitRef> = HashSet::with_capacity(answers.len());
    for answer in answers {
        match answer.unit {
            UnitRef::Question(id) => match version.question(id) {
                None => return Err(DomainError::UnknownUnit(answer.unit)),
                Some(q) if q.has_subitems => {
                    return Err(DomainError::DirectAnswerOnSubitemQuestion(id));
                }
                Some(_) => {}
            },
            UnitRef::Subitem(id) => {
                if version.subitem(id).is_none() {
                    return Err(DomainError::UnknownUnit(answer.unit));
                }
            }
        }

        if !seen.insert(answer.unit) {
            return Err(DomainError::DuplicateAnswer(answer.unit));
        }

        if let Some(score) = answer.score
            && !scale.contains(score)
        {
            return Err(DomainError::ScoreNotOnScale {
                unit: answer.unit,
                score,
            });
        }
    }
    Ok(())
}

/// Validates that a manager belongs to the audited company.
///
/// # Errors
///
/// Returns `DomainError::ManagerCompanyMismatch` otherwise.
pub const fn validate_manager_company(
    manager_id: i64,
    manager_company_id: i64,
    company_id: i64,
) -> Result<(), DomainError> {
    if manager_company_id != company_id {
        return Err(DomainError::ManagerCompanyMismatch {
            manager_id,
            company_id,
        });
    }
    Ok(())
}
