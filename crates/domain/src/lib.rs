// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod audit;
mod error;
mod questionnaire;
mod reporting;
mod scoring;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use audit::{Audit, AuditAnswer, AuditMetadata, parse_call_date};
pub use error::DomainError;
pub use questionnaire::{
    Question, QuestionDraft, QuestionSubitem, Questionnaire, QuestionnaireVersion,
    SCORE_TOLERANCE, ScaleValue, ScorableUnit, ScoreScale, SubitemDraft,
};
pub use reporting::{
    AuditBreakdown, CategoryAverage, CompletedAuditSummary, ManagerAverage, MonthlyAverage, ScoreSummary,
    aggregate_category_breakdowns, manager_averages, monthly_trend, summarize_scores,
};
pub use scoring::{
    CategoryScore, CompletionScore, ScoredUnit, aggregate_categories, aggregate_overall,
    completion_from_units, compute_category_scores, compute_completion_score,
    compute_overall_score, fraction_of_scale, resolve_scored_units, round_to, scale_percentage,
    unanswered_units,
};
pub use types::{AuditStatus, Category, UnitRef};
pub use validation::{
    validate_answers, validate_manager_company, validate_name, validate_question_draft,
    validate_scale, validate_weight,
};
