use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::auth::session::{self, SESSION_COOKIE};
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;
use crate::views::{NavInfo, render};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    nav: Option<NavInfo>,
    /// No account exists yet; show the first-administrator form instead.
    needs_setup: bool,
}

pub async fn root() -> Redirect {
    Redirect::to("/dashboard")
}

pub async fn login_page(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    // Already signed in
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if session::decode_token(cookie.value(), &state.config.session_secret).is_ok() {
            return Ok(Redirect::to("/dashboard").into_response());
        }
    }

    let needs_setup = db::users::count_all(&state.pool).await? == 0;
    let template = LoginTemplate {
        nav: None,
        needs_setup,
    };
    Ok(render(&template)?.into_response())
}
