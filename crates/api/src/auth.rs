// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Sessions are established upstream. By the time a request reaches this
//! layer the session middleware has resolved it into a scope (`lead`, `user`
//! or `admin`) and an actor id, which arrive as trusted headers.

use clark_audit::Actor;
use clark_domain::{AdminId, CustomerId};

use crate::error::AuthError;

/// Header carrying the authenticated scope.
pub const SCOPE_HEADER: &str = "x-clark-scope";

/// Header carrying the authenticated actor id.
pub const ACTOR_ID_HEADER: &str = "x-clark-actor-id";

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A prospective customer without a completed registration.
    ///
    /// Leads may:
    /// - view and follow their contracts through analysis
    /// - upload documents
    /// - accept offers
    Lead,
    /// A registered customer.
    ///
    /// Users may do everything a lead may, and additionally enroll in payback.
    User,
    /// Back-office staff. Admins drive reviews, opportunities and jobs.
    Admin,
}

impl Role {
    /// Returns the scope name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lead" => Ok(Self::Lead),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(AuthError::AuthenticationFailed {
                reason: format!("Unknown scope '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The customer id for leads and users, the admin id for admins.
    pub id: i64,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    /// Resolves the trusted scope headers into an actor.
    ///
    /// # Arguments
    ///
    /// * `scope` - Value of [`SCOPE_HEADER`]
    /// * `actor_id` - Value of [`ACTOR_ID_HEADER`]
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if either header is missing,
    /// the scope is unknown, or the id is not a positive integer.
    pub fn from_scope(scope: Option<&str>, actor_id: Option<&str>) -> Result<Self, AuthError> {
        let role: Role = scope
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("Missing {SCOPE_HEADER} header"),
            })?
            .parse()?;
        let raw: &str = actor_id.ok_or_else(|| AuthError::AuthenticationFailed {
            reason: format!("Missing {ACTOR_ID_HEADER} header"),
        })?;
        let id: i64 = raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("Invalid actor id '{raw}'"),
            })?;
        Ok(Self::new(id, role))
    }

    /// Returns true for leads and users.
    #[must_use]
    pub const fn is_customer(&self) -> bool {
        matches!(self.role, Role::Lead | Role::User)
    }

    /// The actor as a customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` if the actor is an admin.
    pub fn customer_id(&self, action: &str) -> Result<CustomerId, AuthError> {
        if self.is_customer() {
            Ok(CustomerId::new(self.id))
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Lead or User"),
            })
        }
    }

    /// The actor as an admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` unless the actor is an admin.
    pub fn admin_id(&self, action: &str) -> Result<AdminId, AuthError> {
        match self.role {
            Role::Admin => Ok(AdminId::new(self.id)),
            Role::Lead | Role::User => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        match self.role {
            Role::Admin => Actor::admin(AdminId::new(self.id)),
            Role::Lead | Role::User => Actor::customer(CustomerId::new(self.id)),
        }
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that a lead or user is acting on their own behalf.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is an admin.
    pub fn authorize_customer_action(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<CustomerId, AuthError> {
        actor.customer_id(action)
    }

    /// Checks that the actor may enroll in payback.
    ///
    /// Only registered users may enroll; leads must finish registration first.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor has the User role.
    pub fn authorize_payback_enrollment(
        actor: &AuthenticatedActor,
    ) -> Result<CustomerId, AuthError> {
        match actor.role {
            Role::User => Ok(CustomerId::new(actor.id)),
            Role::Lead | Role::Admin => Err(AuthError::Unauthorized {
                action: String::from("enroll_payback"),
                required_role: String::from("User"),
            }),
        }
    }

    /// Checks that the actor is an admin.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor has the Admin role.
    pub fn authorize_admin_action(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<AdminId, AuthError> {
        actor.admin_id(action)
    }
}
