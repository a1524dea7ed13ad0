use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::{AuthUser, MaybeAuthUser};
use crate::auth::password;
use crate::auth::session::{Claims, SESSION_COOKIE, encode_token};
use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::middleware::activity;
use crate::models::{ActivityAction, Role, User};
use crate::routes::users::validate_profile;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SetupRequest {
    pub username: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

fn session_cookie(token: &str, config: &Config) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(config.session_hours))
        .build();

    CookieJar::new().add(cookie)
}

fn clear_session_cookie() -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(cookie)
}

fn issue_session(
    user: User,
    config: &Config,
    message: &str,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let claims = Claims::for_user(&user, config.session_hours);
    let token = encode_token(&claims, &config.session_secret).map_err(AppError::Internal)?;

    Ok((
        session_cookie(&token, config),
        Json(SessionResponse {
            success: true,
            message: message.to_string(),
            token,
            user,
        }),
    ))
}

/// Create the first Administrator. Only works while no account exists.
pub async fn setup(
    State(state): State<SharedState>,
    Json(req): Json<SetupRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let username = req.username.trim();
    let name = req.name.trim();
    validate_profile(username, name)?;
    password::check_length(&req.password).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    // Advisory lock prevents two concurrent setups from both seeing an empty table
    let mut tx = state.pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(1)")
        .execute(&mut *tx)
        .await?;

    let count = db::users::count_all(&mut *tx).await?;
    if count > 0 {
        return Err(AppError::Forbidden(
            "Setup has already been completed. Ask an Administrator for an account.".to_string(),
        ));
    }

    let user = db::users::create(&mut *tx, username, name, &pw_hash, Role::Administrator)
        .await
        .map_err(|e| AppError::unique_or_db(e, "Username is already taken"))?;

    tx.commit().await?;

    tracing::info!(username = %user.username, "Initial administrator created");

    let actor = AuthUser {
        user_id: user.id,
        username: user.username.clone(),
        name: user.name.clone(),
        role: user.role,
    };
    activity::record(
        &state.pool,
        &actor,
        ActivityAction::CreateUser,
        &format!("Initial Administrator account {} was created.", user.username),
    )
    .await;

    issue_session(user, &state.config, "Administrator account created")
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let username = req.username.trim();
    if username.chars().count() < 3 || password::check_length(&req.password).is_err() {
        return Err(AppError::BadRequest(
            "Invalid input. Check your details and try again.".to_string(),
        ));
    }

    if let Err(retry_after) = state.login_limiter.check(username) {
        tracing::warn!(username, "Login rate limited");
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {} minute(s).",
            retry_after.div_ceil(60).max(1)
        )));
    }

    let Some(user) = db::users::find_by_username(&state.pool, username).await? else {
        state.login_limiter.record_failure(username);
        return Err(AppError::Unauthorized("Username not found".to_string()));
    };

    if user.role != req.role {
        return Err(AppError::Unauthorized(
            "Role does not match this account".to_string(),
        ));
    }

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(username);
        return Err(AppError::Unauthorized("Wrong password".to_string()));
    }
    state.login_limiter.reset(username);

    let actor = AuthUser {
        user_id: user.id,
        username: user.username.clone(),
        name: user.name.clone(),
        role: user.role,
    };
    activity::record(
        &state.pool,
        &actor,
        ActivityAction::Login,
        &activity::login_details(&actor),
    )
    .await;

    issue_session(user, &state.config, "Logged in")
}

pub async fn logout(
    State(state): State<SharedState>,
    MaybeAuthUser(auth): MaybeAuthUser,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(actor) = auth {
        activity::record(
            &state.pool,
            &actor,
            ActivityAction::Logout,
            &activity::logout_details(&actor),
        )
        .await;
    }

    (
        clear_session_cookie(),
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<User>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
    Ok(Json(user))
}
