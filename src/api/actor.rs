//! Extracts the acting user from request headers.
//!
//! Authentication happens upstream; this service trusts the `X-Actor-Id`
//! and `X-Actor-Role` headers it is given.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::models::{ActorContext, EmployeeId, Role};

use super::response::ApiErrorResponse;

/// Header carrying the acting employee's id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the acting employee's role (`admin` or `staff`).
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The caller's [`ActorContext`], read from headers.
///
/// Rejects with 401 when either header is missing or unreadable.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub ActorContext);

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiErrorResponse> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| ApiErrorResponse::unauthorized(format!("missing header: {}", name)))?
        .to_str()
        .map_err(|_| ApiErrorResponse::unauthorized(format!("unreadable header: {}", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id: EmployeeId = header(parts, ACTOR_ID_HEADER)?
            .trim()
            .parse()
            .map_err(|_| ApiErrorResponse::unauthorized("X-Actor-Id must be a numeric employee id"))?;
        let role: Role = header(parts, ACTOR_ROLE_HEADER)?
            .parse()
            .map_err(ApiErrorResponse::unauthorized)?;

        Ok(Actor(ActorContext { actor_id, role }))
    }
}
