//! Acting-user extraction.
//!
//! Authentication itself lives in front of this service; the gateway
//! forwards the authenticated user's id in the `x-user-id` header. This
//! extractor is the contract with that boundary: a missing or malformed
//! header rejects the request before any handler logic runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sisocc_types::UserId;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user performing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| {
                ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header"))
            })?
            .to_str()
            .map_err(|_| {
                ApiError::Unauthorized(format!("invalid {USER_ID_HEADER} header"))
            })?;

        let id = Uuid::parse_str(value).map_err(|_| {
            ApiError::Unauthorized(format!("{USER_ID_HEADER} is not a valid UUID"))
        })?;

        Ok(Self(UserId::from(id)))
    }
}
