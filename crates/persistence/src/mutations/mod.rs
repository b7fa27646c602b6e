// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//! Leaf mutations are generated for both backends by `backend_fn!`; the
//! transactional orchestrators that call them are written once per backend.
//!
//! ## Module Organization
//!
//! - `audits`: Audit rows, answer sets, frozen scoring and history
//! - `operators`: Operator and session mutations
//! - `organizations`: Companies and managers
//! - `questionnaires`: Questionnaires, versions and the current-version pointer
//! - `scales`: Score scales and the default flag

pub mod audits;
pub mod operators;
pub mod organizations;
pub mod questionnaires;
pub mod scales;

pub use audits::{
    PersistedAudit, persist_created_audit_mysql, persist_created_audit_sqlite,
    persist_transition_mysql, persist_transition_sqlite,
};
pub use operators::{
    create_operator_mysql, create_operator_sqlite, create_session_mysql, create_session_sqlite,
    delete_expired_sessions_mysql, delete_expired_sessions_sqlite, delete_session_mysql,
    delete_session_sqlite, delete_sessions_for_operator_mysql,
    delete_sessions_for_operator_sqlite, disable_operator_mysql, disable_operator_sqlite,
    enable_operator_mysql, enable_operator_sqlite, update_last_login_mysql,
    update_last_login_sqlite, update_password_mysql, update_password_sqlite,
    update_session_activity_mysql, update_session_activity_sqlite,
};
pub use organizations::{
    create_company_mysql, create_company_sqlite, create_manager_mysql, create_manager_sqlite,
    set_company_active_mysql, set_company_active_sqlite, set_manager_active_mysql,
    set_manager_active_sqlite,
};
pub use questionnaires::{
    create_questionnaire_mysql, create_questionnaire_sqlite, publish_version_mysql,
    publish_version_sqlite, set_current_version_mysql, set_current_version_sqlite,
    set_question_active_mysql, set_question_active_sqlite, set_questionnaire_active_mysql,
    set_questionnaire_active_sqlite, set_subitem_active_mysql, set_subitem_active_sqlite,
};
pub use scales::{
    create_scale_mysql, create_scale_sqlite, set_default_scale_mysql, set_default_scale_sqlite,
};
