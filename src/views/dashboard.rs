use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::routes::dashboard::{StatsParams, load_stats};
use crate::state::SharedState;
use crate::views::{NavInfo, liters, render, rupiah};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    nav: Option<NavInfo>,
    error: Option<String>,
    start_date: String,
    end_date: String,
    total_money: String,
    fitrah_money: String,
    total_rice: String,
    muzakki_count: usize,
    breakdown: Vec<(&'static str, String)>,
    daily: Vec<DailyRow>,
}

struct DailyRow {
    label: String,
    total: String,
    rice: String,
}

pub async fn index(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<StatsParams>,
) -> Result<Html<String>, AppError> {
    let (stats, error) = match load_stats(&state, &params).await {
        Ok(stats) => (stats, None),
        Err(AppError::BadRequest(msg)) => {
            let fallback = load_stats(&state, &StatsParams::default()).await?;
            (fallback, Some(msg))
        }
        Err(e) => return Err(e),
    };

    let b = &stats.breakdown;
    let breakdown = vec![
        ("Zakat Fitrah (Uang)", rupiah(b.fitrah_uang)),
        ("Zakat Fitrah (Beras)", liters(b.fitrah_beras)),
        ("Zakat Mal", rupiah(b.mal)),
        ("Infaq", rupiah(b.infaq)),
        ("Sodaqoh", rupiah(b.sodaqoh)),
    ];

    let template = DashboardTemplate {
        nav: Some(NavInfo::from(&auth)),
        error,
        start_date: params.start_date.unwrap_or_default(),
        end_date: params.end_date.unwrap_or_default(),
        total_money: rupiah(stats.total_money),
        fitrah_money: rupiah(stats.fitrah_money),
        total_rice: liters(stats.total_rice),
        muzakki_count: stats.muzakki_count,
        breakdown,
        daily: stats
            .daily
            .iter()
            .map(|d| DailyRow {
                label: d.label.clone(),
                total: rupiah(d.total),
                rice: liters(d.rice),
            })
            .collect(),
    };
    render(&template)
}
