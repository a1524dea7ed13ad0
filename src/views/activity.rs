use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::routes::activity::{ActivityParams, load_page};
use crate::state::SharedState;
use crate::views::{NavInfo, local_time, render};

#[derive(Template)]
#[template(path = "activity.html")]
struct ActivityTemplate {
    nav: Option<NavInfo>,
    error: Option<String>,
    start_date: String,
    end_date: String,
    per_page: i64,
    entries: Vec<ActivityRow>,
    total: i64,
    page: i64,
    total_pages: i64,
    prev_page: Option<i64>,
    next_page: Option<i64>,
}

struct ActivityRow {
    at: String,
    actor: String,
    role: &'static str,
    action: String,
    details: String,
}

pub async fn index(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ActivityParams>,
) -> Result<Html<String>, AppError> {
    let offset = state.config.utc_offset;
    let (page, error) = match load_page(&state, &params).await {
        Ok(page) => (Some(page), None),
        Err(AppError::BadRequest(msg)) => (None, Some(msg)),
        Err(e) => return Err(e),
    };

    let (entries, total, current, total_pages, per_page) = match page {
        Some(p) => (
            p.logs
                .into_iter()
                .map(|e| ActivityRow {
                    at: local_time(e.created_at, offset),
                    actor: e.user_name.unwrap_or_else(|| "Deleted user".to_string()),
                    role: e.user_role.map(|r| r.label()).unwrap_or("-"),
                    action: e.action,
                    details: e.details,
                })
                .collect(),
            p.total,
            p.page,
            p.total_pages,
            p.per_page,
        ),
        None => (Vec::new(), 0, 1, 0, params.per_page.unwrap_or(5)),
    };

    let template = ActivityTemplate {
        nav: Some(NavInfo::from(&auth)),
        error,
        start_date: params.start_date.unwrap_or_default(),
        end_date: params.end_date.unwrap_or_default(),
        per_page,
        entries,
        total,
        page: current,
        total_pages,
        prev_page: (current > 1).then(|| current - 1),
        next_page: (current < total_pages).then(|| current + 1),
    };
    render(&template)
}
