//! Shopper identity extraction.
//!
//! Authentication happens upstream; this binary trusts the identity headers
//! the gateway forwards: `x-user-id` for signed-in users, `x-session-key`
//! for anonymous sessions. Requests with neither are rejected.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use atelier_core::UserId;
use atelier_shop::db::CartOwner;

use crate::error::AppError;

const USER_HEADER: &str = "x-user-id";
const SESSION_HEADER: &str = "x-session-key";

/// The current shopper, resolved from trusted gateway headers.
#[derive(Debug, Clone)]
pub enum Shopper {
    User(UserId),
    Anonymous(String),
}

impl Shopper {
    /// The cart owner key for this shopper.
    #[must_use]
    pub fn cart_owner(&self) -> CartOwner {
        match self {
            Self::User(id) => CartOwner::User(*id),
            Self::Anonymous(key) => CartOwner::Session(key.clone()),
        }
    }

    /// The user id, if signed in.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Anonymous(_) => None,
        }
    }
}

impl<S> FromRequestParts<S> for Shopper
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(raw) = parts.headers.get(USER_HEADER) {
            let id = raw
                .to_str()
                .ok()
                .and_then(|s| s.parse::<i32>().ok())
                .ok_or_else(|| {
                    AppError::Unauthorized(format!("malformed {USER_HEADER} header"))
                })?;
            return Ok(Self::User(UserId::new(id)));
        }
        if let Some(raw) = parts.headers.get(SESSION_HEADER) {
            let key = raw.to_str().map_err(|_| {
                AppError::Unauthorized(format!("malformed {SESSION_HEADER} header"))
            })?;
            if !key.is_empty() {
                return Ok(Self::Anonymous(key.to_owned()));
            }
        }
        Err(AppError::Unauthorized(
            "missing shopper identity headers".to_owned(),
        ))
    }
}

/// Like [`Shopper`] but requires a signed-in user.
#[derive(Debug, Clone, Copy)]
pub struct SignedInUser(pub UserId);

impl<S> FromRequestParts<S> for SignedInUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shopper = Shopper::from_request_parts(parts, state).await?;
        shopper
            .user_id()
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("sign-in required".to_owned()))
    }
}
