// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Weighted score aggregation.
//!
//! The resolver walks a questionnaire version and turns an answer set into
//! [`ScoredUnit`]s carrying effective weights. The aggregators fold those
//! units into weighted averages, overall and per category.
//!
//! Aggregated scores are in scale units, within `[0, max_scale_value]`.
//! On a scale whose top value is `1` (the usual 1 / 0.5 / 0 scale) that is
//! already the `[0, 1]` ratio; [`fraction_of_scale`] and
//! [`scale_percentage`] put any scale on that basis.
//!
//! All arithmetic is full-precision `f64`. Rounding happens only in
//! [`compute_completion_score`] and in the reporting rollups.
//!
//! Units are always accumulated in version tree order, so the same answers
//! and tree produce bit-identical results regardless of answer order.

use crate::audit::AuditAnswer;
use crate::questionnaire::{Question, QuestionSubitem, QuestionnaireVersion, ScoreScale};
use crate::types::{Category, UnitRef};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// An answer resolved against the version tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredUnit {
    pub unit: UnitRef,
    pub category: Category,
    /// Effective weight: the question weight, or question x subitem weight.
    pub weight: f64,
    /// The answered score, `0` when unanswered.
    pub score: f64,
    pub answered: bool,
}

/// Aggregated score of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    /// Weighted average `sum(score * weight) / sum(weight)`, in scale units.
    pub score: f64,
    /// Total effective weight of the category.
    pub weight: f64,
    /// Number of scored units in the category.
    pub count: usize,
}

/// The persisted completion score of an audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionScore {
    /// `sum(score * weight)` over the scored units.
    pub achieved: f64,
    /// `sum(weight * max_scale_value)` over every active unit of the version.
    pub max_possible: f64,
    /// `achieved / max_possible` as a percentage, rounded to 2 decimals.
    pub percentage: f64,
}

#[derive(Clone, Copy)]
struct TreeEntry<'a> {
    position: (usize, usize),
    question: &'a Question,
    subitem: Option<&'a QuestionSubitem>,
}

fn index_tree(version: &QuestionnaireVersion) -> HashMap<UnitRef, TreeEntry<'_>> {
    let mut index = HashMap::new();
    for (qi, question) in version.questions.iter().enumerate() {
        index.insert(
            UnitRef::Question(question.question_id),
            TreeEntry {
                position: (qi, 0),
                question,
                subitem: None,
            },
        );
        for (si, subitem) in question.subitems.iter().enumerate() {
            index.insert(
                UnitRef::Subitem(subitem.subitem_id),
                TreeEntry {
                    position: (qi, si + 1),
                    question,
                    subitem: Some(subitem),
                },
            );
        }
    }
    index
}

/// Resolves answers into scored units.
///
/// An answer is skipped when:
/// - its unit is not in the version
/// - its question is inactive
/// - it answers a question that has subitems directly
/// - it answers a subitem that is inactive (or whose question has no subitems)
///
/// The result is ordered by position in the version tree.
#[must_use]
pub fn resolve_scored_units(
    answers: &[AuditAnswer],
    version: &QuestionnaireVersion,
) -> Vec<ScoredUnit> {
    let index = index_tree(version);
    let mut resolved: Vec<((usize, usize), ScoredUnit)> = Vec::with_capacity(answers.len());

    for answer in answers {
        let Some(entry) = index.get(&answer.unit) else {
            continue;
        };
        if !entry.question.is_active {
            continue;
        }
        let weight = match entry.subitem {
            None if entry.question.has_subitems => continue,
            None => entry.question.weight,
            Some(_) if !entry.question.has_subitems => continue,
            Some(subitem) if !subitem.is_active => continue,
            Some(subitem) => entry.question.weight * subitem.weight,
        };
        resolved.push((
            entry.position,
            ScoredUnit {
                unit: answer.unit,
                category: entry.question.category.clone(),
                weight,
                score: answer.score.unwrap_or(0.0),
                answered: answer.score.is_some(),
            },
        ));
    }

    resolved.sort_by_key(|(position, _)| *position);
    resolved.into_iter().map(|(_, unit)| unit).collect()
}

/// Folds scored units into `sum(score * weight) / sum(weight)`.
///
/// Returns exactly `0.0` when the total weight is zero.
#[must_use]
pub fn aggregate_overall(units: &[ScoredUnit]) -> f64 {
    let (weighted, weight) = units.iter().fold((0.0_f64, 0.0_f64), |(ws, w), unit| {
        (unit.score.mul_add(unit.weight, ws), w + unit.weight)
    });
    ratio(weighted, weight)
}

/// Partitions scored units by category.
///
/// Categories appear in order of first appearance. Categories whose total
/// weight is zero are omitted.
#[must_use]
pub fn aggregate_categories(units: &[ScoredUnit]) -> Vec<CategoryScore> {
    let mut buckets: Vec<(Category, f64, f64, usize)> = Vec::new();
    for unit in units {
        let bucket = if let Some(pos) = buckets.iter().position(|b| b.0 == unit.category) {
            &mut buckets[pos]
        } else {
            buckets.push((unit.category.clone(), 0.0, 0.0, 0));
            let last = buckets.len() - 1;
            &mut buckets[last]
        };
        bucket.1 = unit.score.mul_add(unit.weight, bucket.1);
        bucket.2 += unit.weight;
        bucket.3 += 1;
    }

    buckets
        .into_iter()
        .filter(|(_, _, weight, _)| *weight > 0.0)
        .map(|(category, weighted, weight, count)| CategoryScore {
            category,
            score: ratio(weighted, weight),
            weight,
            count,
        })
        .collect()
}

/// Weighted average score of an answer set, in scale units.
///
/// The result lies in `[0, max_scale_value]`, which is the `[0, 1]` ratio
/// for a scale topping out at `1`. Use [`fraction_of_scale`] to compare
/// results across scales.
#[must_use]
pub fn compute_overall_score(answers: &[AuditAnswer], version: &QuestionnaireVersion) -> f64 {
    aggregate_overall(&resolve_scored_units(answers, version))
}

/// Per-category weighted averages of an answer set, in scale units.
#[must_use]
pub fn compute_category_scores(
    answers: &[AuditAnswer],
    version: &QuestionnaireVersion,
) -> Vec<CategoryScore> {
    aggregate_categories(&resolve_scored_units(answers, version))
}

/// The completion percentage written to the audit at completion.
#[must_use]
pub fn compute_completion_score(
    answers: &[AuditAnswer],
    version: &QuestionnaireVersion,
    scale: &ScoreScale,
) -> CompletionScore {
    let units = resolve_scored_units(answers, version);
    let max_value = scale.max_value();
    let max_possible = version
        .scorable_units()
        .iter()
        .fold(0.0_f64, |acc, unit| unit.weight.mul_add(max_value, acc));
    completion_from_units(&units, max_possible)
}

/// Builds a completion score from already-resolved units.
#[must_use]
pub fn completion_from_units(units: &[ScoredUnit], max_possible: f64) -> CompletionScore {
    let achieved = units
        .iter()
        .fold(0.0_f64, |acc, unit| unit.score.mul_add(unit.weight, acc));
    let percentage = if max_possible > 0.0 {
        round_to(achieved / max_possible * 100.0, 2)
    } else {
        0.0
    };
    CompletionScore {
        achieved,
        max_possible,
        percentage,
    }
}

/// Active scorable units without a non-null score, in tree order.
#[must_use]
pub fn unanswered_units(answers: &[AuditAnswer], version: &QuestionnaireVersion) -> Vec<UnitRef> {
    let answered: HashSet<UnitRef> = answers
        .iter()
        .filter(|a| a.score.is_some())
        .map(|a| a.unit)
        .collect();
    version
        .scorable_units()
        .into_iter()
        .map(|u| u.unit)
        .filter(|unit| !answered.contains(unit))
        .collect()
}

/// Expresses a score in scale units as a fraction of the scale maximum.
///
/// Returns exactly `0.0` when the maximum is not positive.
#[must_use]
pub fn fraction_of_scale(score: f64, max_scale_value: f64) -> f64 {
    ratio(score, max_scale_value)
}

/// Expresses a score in scale units as a percentage of the scale maximum,
/// rounded to 2 decimals.
///
/// This is the basis of [`CompletionScore::percentage`], so a category
/// scoring full marks reads `100` on every scale.
#[must_use]
pub fn scale_percentage(score: f64, max_scale_value: f64) -> f64 {
    round_to(fraction_of_scale(score, max_scale_value) * 100.0, 2)
}

/// Rounds half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10.0_f64.powi(decimals);
    (value * factor).round() / factor
}

fn ratio(weighted: f64, weight: f64) -> f64 {
    if weight > 0.0 { weighted / weight } else { 0.0 }
}
