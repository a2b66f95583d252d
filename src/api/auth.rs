//! Authorization gate.
//!
//! Sessions are issued by the application's auth provider and stored in the
//! `sessions` table. A request carries its token either as a bearer token or in the
//! `session_token` cookie. Only unexpired sessions of `OWNER` accounts pass.

use crate::{
    api::AppState,
    entities::{Role, Session, User, session, user},
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// The authenticated caller of a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Id of the signed-in user
    pub user_id: i64,
    /// Access level of the signed-in user
    pub role: Role,
}

impl Identity {
    /// Whether this identity may use the admin dashboard.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}

/// Extracts the session token from the `Authorization` header or the session cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
            .map(|(_, value)| value)
    })
}

/// Resolves a session token to the identity it was issued to.
///
/// Returns `None` for unknown or expired tokens.
pub async fn resolve_session(db: &DatabaseConnection, token: &str) -> Result<Option<Identity>> {
    let found = Session::find()
        .filter(session::Column::SessionToken.eq(token))
        .find_also_related(User)
        .one(db)
        .await?;

    let Some((session, Some(account))) = found else {
        return Ok(None);
    };

    if session.expires <= Utc::now() {
        debug!("Session for user {} has expired", session.user_id);
        return Ok(None);
    }

    Ok(Some(identity_of(&account)))
}

/// Checks that the token belongs to an active `OWNER` session.
///
/// # Errors
/// [`Error::AccessDenied`] for missing, expired or non-owner sessions;
/// [`Error::Database`] if the lookup itself fails.
pub async fn authorize_owner(db: &DatabaseConnection, token: Option<&str>) -> Result<Identity> {
    let Some(token) = token else {
        debug!("Request without session token");
        return Err(Error::AccessDenied);
    };

    match resolve_session(db, token).await? {
        Some(identity) if identity.is_owner() => Ok(identity),
        Some(identity) => {
            warn!("User {} attempted admin access without OWNER role", identity.user_id);
            Err(Error::AccessDenied)
        }
        None => Err(Error::AccessDenied),
    }
}

fn identity_of(account: &user::Model) -> Identity {
    Identity {
        user_id: account.id,
        role: account.role,
    }
}

/// Extractor for handlers reserved to dashboard operators.
#[derive(Clone, Debug)]
pub struct Operator(pub Identity);

impl FromRequestParts<AppState> for Operator {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let identity = authorize_owner(&state.db, session_token(&parts.headers)).await?;
        Ok(Self(identity))
    }
}
