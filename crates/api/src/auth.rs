// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use callscore_domain::{Audit, AuditStatus};
use callscore_history::Actor;
use callscore_persistence::{
    OperatorData, PersistenceError, SessionData, SqlitePersistence, format_timestamp,
    parse_timestamp,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// Operator roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Manages questionnaires, scales, companies, managers and operators.
    ///
    /// Admins may also do everything an analyst may do.
    Admin,
    /// Conducts audits: create, edit, complete and delete them.
    ///
    /// Analysts may read every company's audits and statistics.
    Analyst,
    /// Read-only access to the completed audits and statistics of one
    /// company.
    Company,
}

impl Role {
    /// The stored role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Analyst => "Analyst",
            Self::Company => "Company",
        }
    }

    /// Parses a stored role name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a known role.
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Analyst" => Ok(Self::Analyst),
            "Company" => Ok(Self::Company),
            other => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {other}"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated operator with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The login name of this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
    /// The company a `Company` operator is scoped to.
    pub company_id: Option<i64>,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: String, role: Role, company_id: Option<i64>) -> Self {
        Self {
            id,
            role,
            company_id,
        }
    }

    /// Builds the actor from a stored operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role is unknown.
    pub fn from_operator(operator: &OperatorData) -> Result<Self, AuthError> {
        let role: Role = Role::parse(&operator.role)?;
        Ok(Self::new(
            operator.login_name.clone(),
            role,
            operator.company_id,
        ))
    }

    /// Converts this actor into a history actor with operator information.
    #[must_use]
    pub fn to_history_actor(&self, operator: &OperatorData) -> Actor {
        let actor_type: String = self.role.as_str().to_lowercase();
        Actor::with_operator(
            self.id.clone(),
            actor_type,
            operator.operator_id,
            operator.login_name.clone(),
            operator.display_name.clone(),
        )
    }

    /// Whether this actor may read data belonging to `company_id`.
    #[must_use]
    pub fn can_view_company(&self, company_id: i64) -> bool {
        match self.role {
            Role::Admin | Role::Analyst => true,
            Role::Company => self.company_id == Some(company_id),
        }
    }
}

/// Authorization service for role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Analyst | Role::Company => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Checks if an actor may create, disable, enable or reset operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_manage_operators(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require_admin(actor, action)
    }

    /// Checks if an actor may create or deactivate companies and managers.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_manage_organization(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require_admin(actor, action)
    }

    /// Checks if an actor may author questionnaires and score scales.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_manage_questionnaires(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require_admin(actor, action)
    }

    /// Checks if an actor may create, edit, complete or delete audits.
    ///
    /// # Errors
    ///
    /// Returns an error for `Company` operators.
    pub fn authorize_conduct_audits(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Analyst => Ok(()),
            Role::Company => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Analyst"),
            }),
        }
    }

    /// Checks if an actor may read questionnaire definitions and drafts.
    ///
    /// # Errors
    ///
    /// Returns an error for `Company` operators.
    pub fn authorize_view_internal(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::authorize_conduct_audits(actor, action)
    }

    /// Checks if an actor may read a company's statistics and exports.
    ///
    /// # Errors
    ///
    /// Returns an error if a `Company` operator asks for another company.
    pub fn authorize_view_company(
        actor: &AuthenticatedActor,
        company_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.can_view_company(company_id) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Analyst or own Company"),
            })
        }
    }

    /// Checks if an actor may read one audit.
    ///
    /// `Company` operators only see completed, non-deleted audits of their
    /// own company.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit is outside the actor's scope.
    pub fn authorize_view_audit(actor: &AuthenticatedActor, audit: &Audit) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Analyst => Ok(()),
            Role::Company => {
                let visible: bool = actor.company_id == Some(audit.company_id)
                    && audit.status == AuditStatus::Completed
                    && !audit.is_deleted;
                if visible {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: String::from("view_audit"),
                        required_role: String::from("Analyst"),
                    })
                }
            }
        }
    }
}

/// Session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Verifies credentials and creates a session.
    ///
    /// Unknown logins and wrong passwords produce the same error.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `operator_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub fn login(
        persistence: &mut SqlitePersistence,
        login_name: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedActor, OperatorData), AuthError> {
        let invalid = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid login name or password"),
        };

        let operator: OperatorData = persistence
            .get_operator_by_login(login_name)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(invalid)?;

        let password_ok: bool = SqlitePersistence::verify_password(password, &operator.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_ok {
            warn!(login_name = %operator.login_name, "Rejected login with wrong password");
            return Err(invalid());
        }

        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let authenticated_actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: String =
            format_timestamp(OffsetDateTime::now_utc() + Self::DEFAULT_SESSION_EXPIRATION)
                .map_err(Self::map_persistence_error)?;

        persistence
            .create_session(&session_token, operator.operator_id, &expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(operator.operator_id)
            .map_err(Self::map_persistence_error)?;

        info!(
            operator_id = operator.operator_id,
            role = %authenticated_actor.role,
            "Operator logged in"
        );

        Ok((session_token, authenticated_actor, operator))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// Expired sessions are removed as they are encountered.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or expired, or if the
    /// operator was disabled after the session was created.
    pub fn validate_session(
        persistence: &mut SqlitePersistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, OperatorData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            parse_timestamp(&session.expires_at).map_err(Self::map_persistence_error)?;
        if OffsetDateTime::now_utc() > expires_at {
            debug!(session_id = session.session_id, "Removing expired session");
            persistence
                .delete_session(session_token)
                .map_err(Self::map_persistence_error)?;
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let operator: OperatorData = persistence
            .get_operator_by_id(session.operator_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Operator not found"),
            })?;

        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let authenticated_actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        Ok((authenticated_actor, operator))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(persistence: &mut SqlitePersistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })
    }

    /// Generates an opaque session token from 128 random bits.
    fn generate_session_token() -> String {
        format!(
            "cs_{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionExpired(msg) | PersistenceError::SessionNotFound(msg) => {
                AuthError::AuthenticationFailed { reason: msg }
            }
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}
