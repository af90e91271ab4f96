use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::UserId;

use super::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const TOKEN_ID_HEADER: &str = "x-token-id";

/// Caller identity as forwarded by the authenticating gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub token_id: Option<i64>,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        };

        let user_id = header(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("missing x-user-id header"))?
            .parse::<i64>()
            .map_err(|_| ApiError::unauthorized("x-user-id must be an integer"))?;
        let token_id = match header(TOKEN_ID_HEADER) {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| ApiError::bad_request("x-token-id must be an integer"))?,
            ),
            None => None,
        };

        Ok(Self {
            user_id: UserId::new(user_id),
            token_id,
        })
    }
}
