// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `audits`: Audit state, frozen scoring, listings, reporting and history
//! - `operators`: Operator and session queries
//! - `organizations`: Companies and managers
//! - `questionnaires`: Questionnaires, versions and version trees
//! - `scales`: Score scales
//!
//! ## Backend-Specific Functions
//!
//! All query functions are generated in backend-specific monomorphic versions:
//! - Functions suffixed with `_sqlite` for `SQLite`
//! - Functions suffixed with `_mysql` for `MySQL`/`MariaDB`
//!
//! The `Persistence` adapter in `lib.rs` dispatches to the appropriate version
//! based on the active backend connection.

pub mod audits;
pub mod operators;
pub mod organizations;
pub mod questionnaires;
pub mod scales;

pub use audits::{
    get_audit_history_mysql, get_audit_history_sqlite, get_audit_state_mysql,
    get_audit_state_sqlite, get_frozen_units_mysql, get_frozen_units_sqlite, list_audits_mysql,
    list_audits_sqlite, list_completed_audit_summaries_mysql,
    list_completed_audit_summaries_sqlite,
};
pub use operators::{
    count_active_admin_operators_mysql, count_active_admin_operators_sqlite,
    count_operators_mysql, count_operators_sqlite, get_operator_by_id_mysql,
    get_operator_by_id_sqlite, get_operator_by_login_mysql, get_operator_by_login_sqlite,
    get_session_by_token_mysql, get_session_by_token_sqlite, list_operators_mysql,
    list_operators_sqlite, verify_password,
};
pub use organizations::{
    get_company_mysql, get_company_sqlite, get_manager_mysql, get_manager_sqlite,
    list_companies_mysql, list_companies_sqlite, list_managers_mysql, list_managers_sqlite,
};
pub use questionnaires::{
    get_questionnaire_mysql, get_questionnaire_sqlite, get_scale_id_for_version_mysql,
    get_scale_id_for_version_sqlite, get_version_tree_mysql, get_version_tree_sqlite,
    list_questionnaires_mysql, list_questionnaires_sqlite, list_versions_mysql,
    list_versions_sqlite,
};
pub use scales::{
    get_default_scale_mysql, get_default_scale_sqlite, get_scale_mysql, get_scale_sqlite,
    list_scales_mysql, list_scales_sqlite,
};
