use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::ledger::grouping::{LedgerEntry, LedgerPage};
use crate::routes::transactions::{LedgerParams, load_ledger};
use crate::state::SharedState;
use crate::views::{NavInfo, liters, local_time, render, rupiah};

#[derive(Template)]
#[template(path = "transactions.html")]
struct TransactionsTemplate {
    nav: Option<NavInfo>,
    error: Option<String>,
    start_date: String,
    end_date: String,
    query: String,
    rows: Vec<LedgerRow>,
    total: usize,
    current_page: usize,
    total_pages: usize,
    prev_page: Option<usize>,
    next_page: Option<usize>,
}

struct LedgerRow {
    id: i64,
    code: String,
    /// Empty for rows recorded without a receipt.
    receipt_id: String,
    names: String,
    kind: &'static str,
    total: String,
    infaq: String,
    rice: String,
    description: String,
    recorded_at: String,
    row_count: usize,
}

impl LedgerRow {
    fn new(entry: LedgerEntry, offset: chrono::FixedOffset) -> Self {
        LedgerRow {
            id: entry.id,
            code: entry.receipt_code,
            receipt_id: entry.receipt_id.unwrap_or_default(),
            names: entry.names.join(", "),
            kind: entry.kind.label(),
            total: rupiah(entry.total_amount),
            infaq: rupiah(entry.infaq_amount),
            rice: liters(entry.total_rice),
            description: entry.description.unwrap_or_default(),
            recorded_at: local_time(entry.created_at, offset),
            row_count: entry.row_count,
        }
    }
}

pub async fn index(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<LedgerParams>,
) -> Result<Html<String>, AppError> {
    let (page, error) = match load_ledger(&state, &params).await {
        Ok(page) => (Some(page), None),
        Err(AppError::BadRequest(msg)) => (None, Some(msg)),
        Err(e) => return Err(e),
    };

    let offset = state.config.utc_offset;
    let (rows, total, current_page, total_pages) = match page {
        Some(LedgerPage { data, metadata }) => (
            data.into_iter().map(|e| LedgerRow::new(e, offset)).collect(),
            metadata.total,
            metadata.current_page,
            metadata.total_pages,
        ),
        None => (Vec::new(), 0, 1, 0),
    };

    let template = TransactionsTemplate {
        nav: Some(NavInfo::from(&auth)),
        error,
        start_date: params.start_date.unwrap_or_default(),
        end_date: params.end_date.unwrap_or_default(),
        query: params.query.unwrap_or_default(),
        rows,
        total,
        current_page,
        total_pages,
        prev_page: (current_page > 1).then(|| current_page - 1),
        next_page: (current_page < total_pages).then(|| current_page + 1),
    };
    render(&template)
}
