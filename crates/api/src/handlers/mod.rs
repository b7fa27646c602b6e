// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Each handler takes the persistence adapter and the authenticated actor,
//! enforces authorization before touching any data, and returns a response
//! DTO or an [`ApiError`](crate::ApiError).

mod audits;
mod authentication;
mod operators;
mod organizations;
mod questionnaires;
mod statistics;

pub use audits::{
    complete_audit, create_audit, delete_audit, get_audit, get_audit_history, list_audits,
    update_audit,
};
pub use authentication::{
    bootstrap_admin, check_bootstrap_status, create_first_admin, login, logout, whoami,
};
pub use operators::{
    change_password, create_operator, disable_operator, enable_operator, list_operators,
    reset_password,
};
pub use organizations::{
    create_company, create_manager, list_companies, list_managers, set_company_active,
    set_manager_active,
};
pub use questionnaires::{
    create_questionnaire, create_scale, get_questionnaire_version, list_questionnaire_versions,
    list_questionnaires, list_scales, publish_questionnaire_version, set_current_version,
    set_default_scale, set_question_active, set_questionnaire_active, set_subitem_active,
};
pub use statistics::get_company_statistics;
pub(crate) use statistics::{category_breakdowns, manager_names};

use callscore_domain::{CategoryScore, ScoreScale, scale_percentage};

use crate::error::ApiError;
use crate::request_response::{CategoryScoreInfo, ScaleInfo, ScaleValueInfo};

/// Presents a category score; `percent` is relative to the scale maximum.
pub(crate) fn category_score_info(
    score: &CategoryScore,
    max_scale_value: f64,
) -> CategoryScoreInfo {
    CategoryScoreInfo {
        category: score.category.as_optional().map(str::to_string),
        label: score.category.label().to_string(),
        score: score.score,
        percent: scale_percentage(score.score, max_scale_value),
        weight: score.weight,
        count: score.count,
    }
}

pub(crate) fn scale_info(scale: ScoreScale) -> Result<ScaleInfo, ApiError> {
    let scale_id: i64 = scale.scale_id.ok_or_else(|| ApiError::Internal {
        message: format!("Scale '{}' has no id", scale.name),
    })?;
    Ok(ScaleInfo {
        scale_id,
        name: scale.name,
        is_default: scale.is_default,
        values: scale
            .values
            .into_iter()
            .map(|v| ScaleValueInfo {
                value: v.value,
                label: v.label,
                display_order: v.display_order,
            })
            .collect(),
    })
}

fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message,
    }
}
