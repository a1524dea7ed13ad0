use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::transactions::ListFilter;
use crate::error::AppError;
use crate::ledger::period::{DateRange, local_day};
use crate::ledger::stats::{self, DashboardStats};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn stats(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = load_stats(&state, &params).await?;
    Ok(Json(stats))
}

/// Shared with the dashboard page.
pub async fn load_stats(
    state: &SharedState,
    params: &StatsParams,
) -> Result<DashboardStats, AppError> {
    let offset = state.config.utc_offset;
    let filter = ListFilter {
        range: DateRange::parse(params.start_date.as_deref(), params.end_date.as_deref(), offset)
            .map_err(AppError::BadRequest)?,
        query: None,
    };

    let rows = db::transactions::list(&state.pool, &filter).await?;
    let today = local_day(Utc::now(), offset);

    Ok(stats::compute(&rows, today, offset))
}
