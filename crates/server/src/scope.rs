// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request extractors for the trusted scope headers.
//!
//! The session layer in front of this server authenticates the caller and
//! sets [`SCOPE_HEADER`] and [`ACTOR_ID_HEADER`]. These extractors only turn
//! the headers into an [`AuthenticatedActor`]; role checks stay in the API
//! handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use clark_api::{
    ACTOR_ID_HEADER, ApiError, AuthenticatedActor, AuthorizationService, SCOPE_HEADER,
};
use clark_domain::CustomerId;
use time::OffsetDateTime;
use tracing::debug;

use crate::HttpError;

/// Header carrying the caller's request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|value| value.to_str().ok())
}

/// Extractor for the authenticated actor.
///
/// # Errors
///
/// Rejects with 401 if either header is missing or malformed.
pub struct ScopedActor(pub AuthenticatedActor);

impl<S: Send + Sync> FromRequestParts<S> for ScopedActor {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor: AuthenticatedActor = AuthenticatedActor::from_scope(
            header(parts, SCOPE_HEADER),
            header(parts, ACTOR_ID_HEADER),
        )
        .map_err(|err| {
            debug!(error = %err, "scope headers rejected");
            HttpError::from(ApiError::from(err))
        })?;
        Ok(Self(actor))
    }
}

/// Extractor for a lead or user acting on their own behalf.
pub struct CustomerScope(pub CustomerId);

impl<S: Send + Sync> FromRequestParts<S> for CustomerScope {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ScopedActor(actor) = ScopedActor::from_request_parts(parts, state).await?;
        let customer_id: CustomerId =
            AuthorizationService::authorize_customer_action(&actor, "messenger")
                .map_err(|err| HttpError::from(ApiError::from(err)))?;
        Ok(Self(customer_id))
    }
}

/// The caller's request id, or a generated one.
pub struct RequestId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id: String = header(parts, REQUEST_ID_HEADER)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(
                || format!("req-{}", OffsetDateTime::now_utc().unix_timestamp_nanos()),
                str::to_string,
            );
        Ok(Self(id))
    }
}
