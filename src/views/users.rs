use askama::Template;
use axum::extract::State;
use axum::response::Html;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Role;
use crate::state::SharedState;
use crate::views::{NavInfo, local_time, render};

#[derive(Template)]
#[template(path = "users.html")]
struct UsersTemplate {
    nav: Option<NavInfo>,
    users: Vec<UserRow>,
}

struct UserRow {
    id: String,
    username: String,
    name: String,
    role: &'static str,
    /// Administrators cannot be deleted.
    deletable: bool,
    created_at: String,
}

pub async fn index(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Html<String>, AppError> {
    let offset = state.config.utc_offset;
    let users = db::users::list_all(&state.pool)
        .await?
        .into_iter()
        .map(|u| UserRow {
            id: u.id.to_string(),
            username: u.username,
            name: u.name,
            role: u.role.label(),
            deletable: u.role != Role::Administrator,
            created_at: local_time(u.created_at, offset),
        })
        .collect();

    let template = UsersTemplate {
        nav: Some(NavInfo::from(&auth)),
        users,
    };
    render(&template)
}
