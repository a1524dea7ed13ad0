use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::session::{self, SESSION_COOKIE};
use crate::db;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::state::SharedState;

/// The signed-in staff member behind a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only an Administrator may do this".to_string(),
            ))
        }
    }

    /// "Administrator Budi" style phrase for activity descriptions.
    pub fn describe(&self) -> String {
        format!("{} {}", self.role.label(), self.name)
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        AuthUser {
            user_id: user.id,
            username: user.username,
            name: user.name,
            role: user.role,
        }
    }
}

/// Session token from the `Authorization: Bearer` header, falling back to the cookie.
pub fn token_from_parts(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(auth_header) = parts.headers.get("authorization") {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(Some(token.to_string()));
        }
    }

    let jar = CookieJar::from_headers(&parts.headers);
    Ok(jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?
            .ok_or_else(|| AppError::Unauthorized("You are not logged in".to_string()))?;

        let claims = session::decode_token(&token, &state.config.session_secret)
            .map_err(|_| AppError::Unauthorized("Session is invalid or expired".to_string()))?;

        // Role and name come from the current account row, not the token, so a
        // demotion or deletion takes effect on the next request.
        let user = db::users::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

        Ok(user.into())
    }
}

/// Like `AuthUser`, but a missing or bad session yields `None` instead of a rejection.
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<SharedState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}
