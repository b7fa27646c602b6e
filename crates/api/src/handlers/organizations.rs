// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use callscore_domain::validate_name;
use callscore_persistence::{CompanyData, ManagerData, SqlitePersistence};
use tracing::info;

use super::not_found;
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    CompanyInfo, CreateCompanyRequest, CreateManagerRequest, ListCompaniesResponse,
    ListManagersResponse, ManagerInfo,
};

fn company_info(company: CompanyData) -> CompanyInfo {
    CompanyInfo {
        company_id: company.company_id,
        name: company.name,
        is_active: company.is_active,
        created_at: company.created_at,
    }
}

fn manager_info(manager: ManagerData) -> ManagerInfo {
    ManagerInfo {
        manager_id: manager.manager_id,
        company_id: manager.company_id,
        name: manager.name,
        email: manager.email,
        is_active: manager.is_active,
    }
}

pub(super) fn load_company(
    persistence: &mut SqlitePersistence,
    company_id: i64,
) -> Result<CompanyData, ApiError> {
    persistence
        .get_company(company_id)
        .map_err(|e| translate_persistence_error(e, "Company"))?
        .ok_or_else(|| not_found("Company", format!("Company {company_id} does not exist")))
}

/// Creates a company.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the name is empty, or a
/// company with the same name exists.
pub fn create_company(
    persistence: &mut SqlitePersistence,
    request: &CreateCompanyRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CompanyInfo, ApiError> {
    AuthorizationService::authorize_manage_organization(authenticated_actor, "create_company")?;
    validate_name("name", &request.name).map_err(translate_domain_error)?;

    let company_id: i64 = persistence
        .create_company(request.name.trim())
        .map_err(|e| translate_persistence_error(e, "Company"))?;

    info!(company_id, created_by = %authenticated_actor.id, "Created company");

    load_company(persistence, company_id).map(company_info)
}

/// Lists companies.
///
/// `Company` operators only see their own company.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_companies(
    persistence: &mut SqlitePersistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListCompaniesResponse, ApiError> {
    let companies: Vec<CompanyData> = persistence
        .list_companies()
        .map_err(|e| translate_persistence_error(e, "Company"))?;

    Ok(ListCompaniesResponse {
        companies: companies
            .into_iter()
            .filter(|c| authenticated_actor.can_view_company(c.company_id))
            .map(company_info)
            .collect(),
    })
}

/// Activates or deactivates a company.
///
/// Inactive companies keep their audits but cannot receive new ones.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the company does not
/// exist.
pub fn set_company_active(
    persistence: &mut SqlitePersistence,
    company_id: i64,
    is_active: bool,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CompanyInfo, ApiError> {
    AuthorizationService::authorize_manage_organization(authenticated_actor, "set_company_active")?;

    persistence
        .set_company_active(company_id, is_active)
        .map_err(|e| translate_persistence_error(e, "Company"))?;

    info!(company_id, is_active, "Changed company activity");

    load_company(persistence, company_id).map(company_info)
}

/// Creates a manager within a company.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The name is empty
/// - The company does not exist
/// - The company already has a manager with this name
pub fn create_manager(
    persistence: &mut SqlitePersistence,
    request: &CreateManagerRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ManagerInfo, ApiError> {
    AuthorizationService::authorize_manage_organization(authenticated_actor, "create_manager")?;
    validate_name("name", &request.name).map_err(translate_domain_error)?;
    load_company(persistence, request.company_id)?;

    let email: Option<&str> = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    let manager_id: i64 = persistence
        .create_manager(request.company_id, request.name.trim(), email)
        .map_err(|e| translate_persistence_error(e, "Manager"))?;

    info!(manager_id, company_id = request.company_id, "Created manager");

    persistence
        .get_manager(manager_id)
        .map_err(|e| translate_persistence_error(e, "Manager"))?
        .map(manager_info)
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Manager not found after creation"),
        })
}

/// Lists the managers of a company, including inactive ones.
///
/// # Errors
///
/// Returns an error if the actor may not view the company or it does not
/// exist.
pub fn list_managers(
    persistence: &mut SqlitePersistence,
    company_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListManagersResponse, ApiError> {
    AuthorizationService::authorize_view_company(authenticated_actor, company_id, "list_managers")?;
    load_company(persistence, company_id)?;

    let managers: Vec<ManagerData> = persistence
        .list_managers(company_id)
        .map_err(|e| translate_persistence_error(e, "Manager"))?;

    Ok(ListManagersResponse {
        company_id,
        managers: managers.into_iter().map(manager_info).collect(),
    })
}

/// Activates or deactivates a manager.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the manager does not
/// exist.
pub fn set_manager_active(
    persistence: &mut SqlitePersistence,
    manager_id: i64,
    is_active: bool,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ManagerInfo, ApiError> {
    AuthorizationService::authorize_manage_organization(authenticated_actor, "set_manager_active")?;

    persistence
        .set_manager_active(manager_id, is_active)
        .map_err(|e| translate_persistence_error(e, "Manager"))?;

    info!(manager_id, is_active, "Changed manager activity");

    persistence
        .get_manager(manager_id)
        .map_err(|e| translate_persistence_error(e, "Manager"))?
        .map(manager_info)
        .ok_or_else(|| not_found("Manager", format!("Manager {manager_id} does not exist")))
}
