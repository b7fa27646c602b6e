// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashMap;

use callscore_domain::{
    AuditBreakdown, CategoryAverage, CompletedAuditSummary, ScoreSummary, ScoredUnit,
    aggregate_categories, aggregate_category_breakdowns, manager_averages, monthly_trend,
    summarize_scores,
};
use callscore_persistence::{CompanyData, ManagerData, SqlitePersistence};
use tracing::{debug, warn};

use super::audits::load_scale_for_version;
use super::organizations::load_company;
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_persistence_error};
use crate::request_response::{
    CategoryAverageInfo, CompanyStatisticsResponse, ManagerAverageInfo, MonthlyAverageInfo,
    ScoreSummaryInfo,
};

/// Loads the category breakdown of each completed audit from its frozen
/// scoring, together with the top of the scale its version is scored on.
///
/// Takes `(audit_id, version_id)` pairs. Audits without a frozen snapshot
/// are skipped.
pub(crate) fn category_breakdowns(
    persistence: &mut SqlitePersistence,
    audits: &[(i64, i64)],
) -> Result<Vec<(i64, AuditBreakdown)>, ApiError> {
    let mut scale_maxima: HashMap<i64, f64> = HashMap::new();
    let mut breakdowns: Vec<(i64, AuditBreakdown)> = Vec::with_capacity(audits.len());
    for &(audit_id, version_id) in audits {
        let units: Option<Vec<ScoredUnit>> = persistence
            .get_frozen_units(audit_id)
            .map_err(|e| translate_persistence_error(e, "Audit"))?;
        let Some(units) = units else {
            warn!(
                audit_id,
                "Completed audit has no frozen scoring; skipping category breakdown"
            );
            continue;
        };

        let max_scale_value: f64 = match scale_maxima.get(&version_id) {
            Some(max) => *max,
            None => {
                let max: f64 = load_scale_for_version(persistence, version_id)?.max_value();
                scale_maxima.insert(version_id, max);
                max
            }
        };

        breakdowns.push((
            audit_id,
            AuditBreakdown {
                max_scale_value,
                categories: aggregate_categories(&units),
            },
        ));
    }
    Ok(breakdowns)
}

/// Loads a company's managers keyed by id.
pub(crate) fn manager_names(
    persistence: &mut SqlitePersistence,
    company_id: i64,
) -> Result<HashMap<i64, String>, ApiError> {
    let managers: Vec<ManagerData> = persistence
        .list_managers(company_id)
        .map_err(|e| translate_persistence_error(e, "Manager"))?;
    Ok(managers
        .into_iter()
        .map(|m| (m.manager_id, m.name))
        .collect())
}

/// Computes a company's score statistics over its completed audits.
///
/// Deleted and draft audits never contribute.
///
/// # Errors
///
/// Returns an error if the actor may not view the company or it does not
/// exist.
pub fn get_company_statistics(
    persistence: &mut SqlitePersistence,
    company_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CompanyStatisticsResponse, ApiError> {
    AuthorizationService::authorize_view_company(
        authenticated_actor,
        company_id,
        "get_company_statistics",
    )?;
    let company: CompanyData = load_company(persistence, company_id)?;

    let audits: Vec<CompletedAuditSummary> = persistence
        .list_completed_audit_summaries(Some(company_id))
        .map_err(|e| translate_persistence_error(e, "Audit"))?;
    debug!(company_id, audits = audits.len(), "Computing company statistics");

    let summary: ScoreSummary = summarize_scores(&audits);
    let names: HashMap<i64, String> = manager_names(persistence, company_id)?;

    let audit_versions: Vec<(i64, i64)> =
        audits.iter().map(|a| (a.audit_id, a.version_id)).collect();
    let breakdowns: Vec<AuditBreakdown> = category_breakdowns(persistence, &audit_versions)?
        .into_iter()
        .map(|(_, breakdown)| breakdown)
        .collect();
    let categories: Vec<CategoryAverage> = aggregate_category_breakdowns(&breakdowns);

    Ok(CompanyStatisticsResponse {
        company_id,
        company_name: company.name,
        summary: ScoreSummaryInfo {
            count: summary.count,
            average: summary.average,
            min: summary.min,
            max: summary.max,
        },
        monthly: monthly_trend(&audits)
            .into_iter()
            .map(|m| MonthlyAverageInfo {
                month: format!("{:04}-{:02}", m.year, m.month),
                count: m.count,
                average: m.average,
            })
            .collect(),
        managers: manager_averages(&audits)
            .into_iter()
            .map(|m| ManagerAverageInfo {
                manager_id: m.manager_id,
                manager_name: names
                    .get(&m.manager_id)
                    .cloned()
                    .unwrap_or_else(|| format!("Manager {}", m.manager_id)),
                count: m.count,
                average: m.average,
            })
            .collect(),
        categories: categories
            .into_iter()
            .map(|c| CategoryAverageInfo {
                label: c.category.label().to_string(),
                category: c.category.as_optional().map(str::to_string),
                average_percent: c.average_percent,
                audits: c.audits,
            })
            .collect(),
    })
}
