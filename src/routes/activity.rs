use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::ledger::period::DateRange;
use crate::middleware::activity;
use crate::models::ActivityEntry;
use crate::state::SharedState;

const DEFAULT_PER_PAGE: i64 = 5;
const MAX_PER_PAGE: i64 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivityPage {
    pub logs: Vec<ActivityEntry>,
    pub total: i64,
    pub total_pages: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Purge expired entries, then return one page of what is left.
pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ActivityParams>,
) -> Result<Json<ActivityPage>, AppError> {
    let page = load_page(&state, &params).await?;
    Ok(Json(page))
}

pub async fn load_page(
    state: &SharedState,
    params: &ActivityParams,
) -> Result<ActivityPage, AppError> {
    let range = DateRange::parse(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        state.config.utc_offset,
    )
    .map_err(AppError::BadRequest)?;

    activity::purge_expired(&state.pool).await?;

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let offset = (page - 1).saturating_mul(per_page);

    let (logs, total) = db::activity::list(&state.pool, &range, per_page, offset).await?;
    let total_pages = (total + per_page - 1) / per_page;

    Ok(ActivityPage {
        logs,
        total,
        total_pages,
        page,
        per_page,
    })
}
