// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for scope resolution and role checks.

use super::helpers::{CUSTOMER, create_test_admin, create_test_lead, create_test_user};
use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::error::{ApiError, AuthError};
use clark_domain::AdminId;

#[test]
fn test_from_scope_resolves_each_role() {
    let lead = AuthenticatedActor::from_scope(Some("lead"), Some("7")).unwrap();
    let user = AuthenticatedActor::from_scope(Some(" User "), Some("7")).unwrap();
    let admin = AuthenticatedActor::from_scope(Some("admin"), Some("3")).unwrap();

    assert_eq!(lead.role, Role::Lead);
    assert_eq!(user.role, Role::User);
    assert_eq!(admin, AuthenticatedActor::new(3, Role::Admin));
}

#[test]
fn test_from_scope_requires_both_headers() {
    assert!(matches!(
        AuthenticatedActor::from_scope(None, Some("7")),
        Err(AuthError::AuthenticationFailed { .. })
    ));
    assert!(matches!(
        AuthenticatedActor::from_scope(Some("user"), None),
        Err(AuthError::AuthenticationFailed { .. })
    ));
}

#[test]
fn test_from_scope_rejects_unknown_scope_and_bad_ids() {
    assert!(AuthenticatedActor::from_scope(Some("insurer"), Some("7")).is_err());
    assert!(AuthenticatedActor::from_scope(Some("user"), Some("abc")).is_err());
    assert!(AuthenticatedActor::from_scope(Some("user"), Some("0")).is_err());
    assert!(AuthenticatedActor::from_scope(Some("user"), Some("-4")).is_err());
}

#[test]
fn test_customer_actions_accept_leads_and_users() {
    assert_eq!(
        AuthorizationService::authorize_customer_action(&create_test_lead(), "list").unwrap(),
        CUSTOMER
    );
    assert_eq!(
        AuthorizationService::authorize_customer_action(&create_test_user(), "list").unwrap(),
        CUSTOMER
    );
}

#[test]
fn test_customer_actions_reject_admins() {
    let result =
        AuthorizationService::authorize_customer_action(&create_test_admin(), "accept_offer");

    match result {
        Err(AuthError::Unauthorized { action, .. }) => assert_eq!(action, "accept_offer"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[test]
fn test_payback_enrollment_requires_registered_user() {
    assert!(AuthorizationService::authorize_payback_enrollment(&create_test_user()).is_ok());
    assert!(AuthorizationService::authorize_payback_enrollment(&create_test_lead()).is_err());
    assert!(AuthorizationService::authorize_payback_enrollment(&create_test_admin()).is_err());
}

#[test]
fn test_admin_actions_reject_customers() {
    assert_eq!(
        AuthorizationService::authorize_admin_action(&create_test_admin(), "x").unwrap(),
        AdminId::new(3)
    );

    let err: ApiError = AuthorizationService::authorize_admin_action(&create_test_user(), "x")
        .unwrap_err()
        .into();
    assert!(matches!(err, ApiError::Unauthorized { required_role, .. } if required_role == "Admin"));
}

#[test]
fn test_audit_actor_reflects_role() {
    assert_eq!(create_test_admin().to_audit_actor().actor_type, "admin");
    assert_eq!(create_test_lead().to_audit_actor().actor_type, "customer");
    assert_eq!(create_test_user().to_audit_actor().id, "7");
}
