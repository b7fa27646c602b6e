// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::scoring::{CategoryScore, fraction_of_scale, round_to};
use crate::types::Category;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// The reporting view of one completed, non-deleted audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedAuditSummary {
    pub audit_id: i64,
    pub company_id: i64,
    pub manager_id: Option<i64>,
    /// The questionnaire version the audit was scored against.
    pub version_id: i64,
    pub completed_at: OffsetDateTime,
    /// Completion percentage (0-100).
    pub total_score: f64,
}

/// Count, average and range of a set of completion percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub count: usize,
    /// Rounded to 2 decimals.
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Average completion percentage of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub year: i32,
    pub month: u8,
    pub count: usize,
    /// Rounded to 1 decimal.
    pub average: f64,
}

/// Average completion percentage of one manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerAverage {
    pub manager_id: i64,
    pub count: usize,
    /// Rounded to 2 decimals.
    pub average: f64,
}

/// Average of one category across several audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverage {
    pub category: Category,
    /// Mean category percentage of the scale maximum, rounded to 2 decimals.
    pub average_percent: f64,
    /// Number of audits the category appeared in.
    pub audits: usize,
}

fn mean(sum: f64, count: usize) -> f64 {
    count
        .to_f64()
        .filter(|c| *c > 0.0)
        .map_or(0.0, |c| sum / c)
}

/// Summarizes completion percentages.
///
/// An empty input yields all zeros.
#[must_use]
pub fn summarize_scores(audits: &[CompletedAuditSummary]) -> ScoreSummary {
    if audits.is_empty() {
        return ScoreSummary {
            count: 0,
            average: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }

    let sum: f64 = audits.iter().map(|a| a.total_score).sum();
    let min = audits
        .iter()
        .map(|a| a.total_score)
        .fold(f64::INFINITY, f64::min);
    let max = audits
        .iter()
        .map(|a| a.total_score)
        .fold(f64::NEG_INFINITY, f64::max);

    ScoreSummary {
        count: audits.len(),
        average: round_to(mean(sum, audits.len()), 2),
        min,
        max,
    }
}

/// Groups audits by the calendar month of completion, oldest first.
#[must_use]
pub fn monthly_trend(audits: &[CompletedAuditSummary]) -> Vec<MonthlyAverage> {
    let mut months: BTreeMap<(i32, u8), (f64, usize)> = BTreeMap::new();
    for audit in audits {
        let key = (audit.completed_at.year(), u8::from(audit.completed_at.month()));
        let entry = months.entry(key).or_insert((0.0, 0));
        entry.0 += audit.total_score;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|((year, month), (sum, count))| MonthlyAverage {
            year,
            month,
            count,
            average: round_to(mean(sum, count), 1),
        })
        .collect()
}

/// Averages completion percentages per manager, ordered by manager id.
///
/// Audits without a manager are not attributed to anyone.
#[must_use]
pub fn manager_averages(audits: &[CompletedAuditSummary]) -> Vec<ManagerAverage> {
    let mut managers: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for audit in audits {
        if let Some(manager_id) = audit.manager_id {
            let entry = managers.entry(manager_id).or_insert((0.0, 0));
            entry.0 += audit.total_score;
            entry.1 += 1;
        }
    }

    managers
        .into_iter()
        .map(|(manager_id, (sum, count))| ManagerAverage {
            manager_id,
            count,
            average: round_to(mean(sum, count), 2),
        })
        .collect()
}

/// The frozen category breakdown of one audit and the top of the scale it
/// was scored on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditBreakdown {
    pub max_scale_value: f64,
    pub categories: Vec<CategoryScore>,
}

/// Averages category scores across audit breakdowns.
///
/// Each category score is first taken as a fraction of its own audit's
/// scale maximum, so audits scored on different scales average on the same
/// 0-100 basis as the completion percentage. Categories keep the order in
/// which they are first seen.
#[must_use]
pub fn aggregate_category_breakdowns(breakdowns: &[AuditBreakdown]) -> Vec<CategoryAverage> {
    let mut totals: Vec<(Category, f64, usize)> = Vec::new();
    for breakdown in breakdowns {
        for category in &breakdown.categories {
            let fraction: f64 = fraction_of_scale(category.score, breakdown.max_scale_value);
            match totals.iter_mut().find(|t| t.0 == category.category) {
                Some(total) => {
                    total.1 += fraction;
                    total.2 += 1;
                }
                None => totals.push((category.category.clone(), fraction, 1)),
            }
        }
    }

    totals
        .into_iter()
        .map(|(category, sum, audits)| CategoryAverage {
            category,
            average_percent: round_to(mean(sum, audits) * 100.0, 2),
            audits,
        })
        .collect()
}
