use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::middleware::activity;
use crate::models::{ActivityAction, Role, User};
use crate::state::SharedState;

const MIN_USERNAME_LEN: usize = 3;
const MIN_NAME_LEN: usize = 5;

#[derive(Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub username: String,
    pub name: String,
    pub role: Role,
    /// Left out or blank keeps the current password.
    #[serde(default)]
    pub password: Option<String>,
}

pub fn validate_profile(username: &str, name: &str) -> Result<(), AppError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::BadRequest(
            "Username cannot contain spaces".to_string(),
        ));
    }
    if name.chars().count() < MIN_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = db::users::list_all(&state.pool).await?;
    Ok(Json(users))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    let username = req.username.trim();
    let name = req.name.trim();
    validate_profile(username, name)?;
    password::check_length(&req.password).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let user = db::users::create(&state.pool, username, name, &pw_hash, req.role)
        .await
        .map_err(|e| AppError::unique_or_db(e, "Username is already taken"))?;

    activity::record(
        &state.pool,
        &auth,
        ActivityAction::CreateUser,
        &format!(
            "{} added {} {} ({}).",
            auth.describe(),
            user.role.label(),
            user.name,
            user.username
        ),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "User created",
        "user": user,
    })))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    let username = req.username.trim();
    let name = req.name.trim();
    validate_profile(username, name)?;

    let new_password = req.password.as_deref().filter(|p| !p.is_empty());
    let pw_hash = match new_password {
        Some(pw) => {
            password::check_length(pw).map_err(AppError::BadRequest)?;
            Some(password::hash(pw).map_err(AppError::Internal)?)
        }
        None => None,
    };

    let user = db::users::update(&state.pool, id, username, name, req.role, pw_hash.as_deref())
        .await
        .map_err(|e| AppError::unique_or_db(e, "Username is already taken"))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    activity::record(
        &state.pool,
        &auth,
        ActivityAction::UpdateUser,
        &format!("{} updated the account of {}.", auth.describe(), user.name),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "User updated",
        "user": user,
    })))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.role == Role::Administrator {
        return Err(AppError::BadRequest(
            "Administrator accounts cannot be deleted".to_string(),
        ));
    }

    let removed = db::users::delete(&state.pool, id).await?;
    if removed == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    activity::record(
        &state.pool,
        &auth,
        ActivityAction::DeleteUser,
        &format!("{} deleted the account of {}.", auth.describe(), user.name),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "User deleted",
    })))
}
