// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV export of a company's completed audits.
//!
//! One row per completed, non-deleted audit. After the fixed columns the
//! export carries one percentage column per category seen in any exported
//! audit, ordered by label. Named categories are headed `category: <name>`
//! and the bucket for questions without one is headed `uncategorized`, so a
//! category literally named "Uncategorized" keeps its own column. An audit
//! that has no units in a category leaves that cell empty.
//!
//! Category cells are percentages of the audit's scale maximum, the same
//! basis as `total_score`.

use std::collections::HashMap;

use callscore_domain::{AuditBreakdown, AuditStatus, Category, CategoryScore, scale_percentage};
use callscore_persistence::{AuditFilter, AuditListRow, SqlitePersistence};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_persistence_error};
use crate::handlers::{category_breakdowns, manager_names};

const FIXED_COLUMNS: [&str; 7] = [
    "audit_id",
    "completed_at",
    "manager_id",
    "manager_name",
    "call_date",
    "call_reference",
    "total_score",
];

const UNCATEGORIZED_COLUMN: &str = "uncategorized";

fn category_column(category: &Category) -> String {
    match category {
        Category::Named(name) => format!("category: {name}"),
        Category::Uncategorized => UNCATEGORIZED_COLUMN.to_string(),
    }
}

/// Every category of the breakdowns, ordered by label with the
/// `Uncategorized` bucket after a same-labelled named category.
fn export_columns<'a>(breakdowns: impl Iterator<Item = &'a AuditBreakdown>) -> Vec<Category> {
    let mut columns: Vec<Category> = Vec::new();
    for category in breakdowns.flat_map(|b| b.categories.iter().map(|c| &c.category)) {
        if !columns.contains(category) {
            columns.push(category.clone());
        }
    }
    columns.sort_by(|a, b| {
        let bucket = |c: &Category| matches!(c, Category::Uncategorized);
        a.label()
            .cmp(b.label())
            .then_with(|| bucket(a).cmp(&bucket(b)))
    });
    columns
}

fn csv_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write CSV export: {err}"),
    }
}

/// Renders a company's completed audits as CSV.
///
/// # Errors
///
/// Returns an error if the actor may not view the company, the company
/// does not exist, or a query fails.
pub fn export_completed_audits_csv(
    persistence: &mut SqlitePersistence,
    company_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<String, ApiError> {
    AuthorizationService::authorize_view_company(
        authenticated_actor,
        company_id,
        "export_completed_audits",
    )?;
    if persistence
        .get_company(company_id)
        .map_err(|e| translate_persistence_error(e, "Company"))?
        .is_none()
    {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Company"),
            message: format!("Company {company_id} does not exist"),
        });
    }

    let rows: Vec<AuditListRow> = persistence
        .list_audits(&AuditFilter {
            company_id: Some(company_id),
            manager_id: None,
            status: Some(AuditStatus::Completed),
            include_deleted: false,
        })
        .map_err(|e| translate_persistence_error(e, "Audit"))?;

    let names: HashMap<i64, String> = manager_names(persistence, company_id)?;
    let audit_versions: Vec<(i64, i64)> =
        rows.iter().map(|r| (r.audit_id, r.version_id)).collect();
    let breakdowns: HashMap<i64, AuditBreakdown> =
        category_breakdowns(persistence, &audit_versions)?
            .into_iter()
            .collect();

    let columns: Vec<Category> = export_columns(breakdowns.values());

    let mut writer = csv::Writer::from_writer(Vec::new());

    let header: Vec<String> = FIXED_COLUMNS
        .iter()
        .map(|c| (*c).to_string())
        .chain(columns.iter().map(category_column))
        .collect();
    writer.write_record(&header).map_err(csv_error)?;

    for row in &rows {
        let mut record: Vec<String> = vec![
            row.audit_id.to_string(),
            row.completed_at.clone().unwrap_or_default(),
            row.manager_id.map(|id| id.to_string()).unwrap_or_default(),
            row.manager_id
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or_default(),
            row.call_date.clone().unwrap_or_default(),
            row.call_reference.clone().unwrap_or_default(),
            row.total_score
                .map(|s| format!("{s:.2}"))
                .unwrap_or_default(),
        ];

        let breakdown: Option<&AuditBreakdown> = breakdowns.get(&row.audit_id);
        for column in &columns {
            let cell: String = breakdown
                .and_then(|b| {
                    b.categories
                        .iter()
                        .find(|c: &&CategoryScore| c.category == *column)
                        .map(|c| scale_percentage(c.score, b.max_scale_value))
                })
                .map(|percent| format!("{percent:.2}"))
                .unwrap_or_default();
            record.push(cell);
        }

        writer.write_record(&record).map_err(csv_error)?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(csv_error)?;
    let output: String = String::from_utf8(bytes).map_err(csv_error)?;

    info!(
        company_id,
        audits = rows.len(),
        categories = columns.len(),
        "Exported completed audits"
    );

    Ok(output)
}
