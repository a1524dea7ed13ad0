use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::transactions::ListFilter;
use crate::error::AppError;
use crate::ledger::batch::{self, BatchPlan, BatchRequest};
use crate::ledger::grouping::{self, LEDGER_PAGE_SIZE, LedgerPage};
use crate::ledger::period::DateRange;
use crate::ledger::receipt::{self, EditDraft, ReceiptSummary};
use crate::ledger::{MAX_AMOUNT, MAX_RICE_LITERS};
use crate::middleware::activity;
use crate::models::{ActivityAction, NewTransaction, Transaction, TransactionType};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct LedgerParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub query: Option<String>,
    pub page: Option<usize>,
}

/// Body of the single-row create and update endpoints.
#[derive(Deserialize)]
pub struct TransactionInput {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub amount_rice: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    pub muzakki_name: String,
    #[serde(default)]
    pub payment_amount: Option<i64>,
    #[serde(default)]
    pub change_amount: Option<i64>,
}

impl TransactionInput {
    fn into_row(self) -> Result<NewTransaction, String> {
        let muzakki_name = self.muzakki_name.trim().to_string();
        if muzakki_name.is_empty() {
            return Err("Muzakki name is required".to_string());
        }
        if self.amount < 0
            || self.payment_amount.is_some_and(|p| p < 0)
            || self.change_amount.is_some_and(|c| c < 0)
        {
            return Err("Amounts cannot be negative".to_string());
        }
        if [self.amount, self.payment_amount.unwrap_or(0), self.change_amount.unwrap_or(0)]
            .iter()
            .any(|a| *a > MAX_AMOUNT)
        {
            return Err(format!("Amount cannot exceed {MAX_AMOUNT}"));
        }

        let amount_rice = match self.kind {
            TransactionType::FitrahBeras => {
                let liters = self.amount_rice.unwrap_or(0.0);
                if !(liters.is_finite() && liters > 0.0) {
                    return Err("Rice amount must be greater than zero".to_string());
                }
                if liters > MAX_RICE_LITERS {
                    return Err("Rice amount is too large".to_string());
                }
                Some(liters)
            }
            _ => None,
        };

        Ok(NewTransaction {
            kind: self.kind,
            amount: self.amount,
            amount_rice,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            muzakki_name,
            receipt_id: None,
            payment_amount: self.payment_amount,
            change_amount: self.change_amount,
        })
    }
}

/// The receipt a row belongs to, or just the row when it has none.
async fn rows_of(pool: &PgPool, id: i64) -> Result<Vec<Transaction>, AppError> {
    let row = db::transactions::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    match row.receipt_id.as_deref() {
        Some(receipt_id) => Ok(db::transactions::list_by_receipt(pool, receipt_id).await?),
        None => Ok(vec![row]),
    }
}

fn batch_details(actor: &AuthUser, verb: &str, plan: &BatchPlan, kind: TransactionType) -> String {
    let payers = plan.rows.iter().filter(|r| !r.kind.is_infaq()).count();
    format!(
        "{} {verb} receipt {} for {payers} muzakki ({}).",
        actor.describe(),
        grouping::receipt_code(Some(plan.receipt_id.as_str()), 0),
        kind.label()
    )
}

/// Receipt-grouped, filtered and paginated ledger.
pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<LedgerParams>,
) -> Result<Json<LedgerPage>, AppError> {
    let page = load_ledger(&state, &params).await?;
    Ok(Json(page))
}

/// Shared with the ledger page.
pub async fn load_ledger(
    state: &SharedState,
    params: &LedgerParams,
) -> Result<LedgerPage, AppError> {
    let filter = ListFilter {
        range: DateRange::parse(
            params.start_date.as_deref(),
            params.end_date.as_deref(),
            state.config.utc_offset,
        )
        .map_err(AppError::BadRequest)?,
        query: params.query.clone(),
    };

    let rows = db::transactions::list(&state.pool, &filter).await?;
    let entries = grouping::group_by_receipt(&rows);

    Ok(grouping::paginate(
        entries,
        params.page.unwrap_or(1),
        LEDGER_PAGE_SIZE,
    ))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<TransactionInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let row = req.into_row().map_err(AppError::BadRequest)?;
    let transaction = db::transactions::insert(&state.pool, &row, auth.user_id).await?;

    activity::record(
        &state.pool,
        &auth,
        ActivityAction::CreateTransaction,
        &format!(
            "{} recorded {} from {} ({}).",
            auth.describe(),
            transaction.kind.label(),
            transaction.muzakki_name,
            grouping::receipt_code(None, transaction.id)
        ),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Transaction recorded",
        "transaction": transaction,
    })))
}

pub async fn create_batch(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let plan = batch::plan(&req, batch::new_receipt_id()).map_err(AppError::BadRequest)?;

    let mut tx = state.pool.begin().await?;
    for row in &plan.rows {
        db::transactions::insert(&mut *tx, row, auth.user_id).await?;
    }
    tx.commit().await?;

    tracing::info!(receipt_id = %plan.receipt_id, rows = plan.rows.len(), "Batch recorded");

    activity::record(
        &state.pool,
        &auth,
        ActivityAction::CreateTransaction,
        &batch_details(&auth, "recorded", &plan, req.kind),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("{} transaction(s) recorded", plan.rows.len()),
        "receipt_id": plan.receipt_id,
        "count": plan.rows.len(),
        "totals": plan.totals,
    })))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = db::transactions::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;
    Ok(Json(transaction))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<TransactionInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let row = req.into_row().map_err(AppError::BadRequest)?;
    let transaction = db::transactions::update(&state.pool, id, &row, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    activity::record(
        &state.pool,
        &auth,
        ActivityAction::UpdateTransaction,
        &format!(
            "{} updated {} from {} ({}).",
            auth.describe(),
            transaction.kind.label(),
            transaction.muzakki_name,
            grouping::receipt_code(transaction.receipt_id.as_deref(), transaction.id)
        ),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Transaction updated",
        "transaction": transaction,
    })))
}

/// Replace every row of the receipt that row `id` belongs to.
pub async fn update_batch(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut tx = state.pool.begin().await?;

    let original = db::transactions::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    let receipt_id = original
        .receipt_id
        .clone()
        .unwrap_or_else(batch::new_receipt_id);
    let plan = batch::plan(&req, receipt_id).map_err(AppError::BadRequest)?;

    let removed = match original.receipt_id.as_deref() {
        Some(existing) => db::transactions::delete_by_receipt(&mut *tx, existing).await?,
        None => db::transactions::delete(&mut *tx, id).await?,
    };

    for row in &plan.rows {
        db::transactions::insert(&mut *tx, row, auth.user_id).await?;
    }
    db::transactions::restore_origin(
        &mut *tx,
        &plan.receipt_id,
        original.created_at,
        original.created_by,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        receipt_id = %plan.receipt_id,
        removed,
        written = plan.rows.len(),
        "Batch rewritten"
    );

    activity::record(
        &state.pool,
        &auth,
        ActivityAction::UpdateTransaction,
        &batch_details(&auth, "updated", &plan, req.kind),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Transaction updated",
        "receipt_id": plan.receipt_id,
        "count": plan.rows.len(),
        "totals": plan.totals,
    })))
}

/// Delete row `id`. A row that belongs to a receipt takes the whole receipt
/// with it, so no receipt is ever left partial.
pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    let mut tx = state.pool.begin().await?;
    let transaction = db::transactions::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    let removed = match transaction.receipt_id.as_deref() {
        Some(receipt_id) => db::transactions::delete_by_receipt(&mut *tx, receipt_id).await?,
        None => db::transactions::delete(&mut *tx, id).await?,
    };
    if removed == 0 {
        return Err(AppError::NotFound("Transaction not found".to_string()));
    }
    tx.commit().await?;

    let code = grouping::receipt_code(transaction.receipt_id.as_deref(), transaction.id);
    let details = match transaction.receipt_id {
        Some(_) => format!("{} deleted receipt {code} ({removed} rows).", auth.describe()),
        None => format!(
            "{} deleted {} from {} ({code}).",
            auth.describe(),
            transaction.kind.label(),
            transaction.muzakki_name,
        ),
    };
    activity::record(&state.pool, &auth, ActivityAction::DeleteTransaction, &details).await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("{removed} transaction(s) deleted"),
        "count": removed,
    })))
}

pub async fn receipt_rows(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(receipt_id): Path<String>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let rows = db::transactions::list_by_receipt(&state.pool, &receipt_id).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound("Receipt not found".to_string()));
    }
    Ok(Json(rows))
}

pub async fn delete_receipt(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(receipt_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    let mut tx = state.pool.begin().await?;
    let removed = db::transactions::delete_by_receipt(&mut *tx, &receipt_id).await?;
    if removed == 0 {
        return Err(AppError::NotFound("Receipt not found".to_string()));
    }
    tx.commit().await?;

    activity::record(
        &state.pool,
        &auth,
        ActivityAction::DeleteTransaction,
        &format!(
            "{} deleted receipt {} ({removed} rows).",
            auth.describe(),
            grouping::receipt_code(Some(receipt_id.as_str()), 0)
        ),
    )
    .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("{removed} transaction(s) deleted"),
        "count": removed,
    })))
}

/// Data for the printable receipt of row `id`.
pub async fn receipt(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ReceiptSummary>, AppError> {
    let rows = rows_of(&state.pool, id).await?;

    let officer_name = match rows.first().and_then(|r| r.created_by) {
        Some(user_id) => db::users::find_by_id(&state.pool, user_id)
            .await?
            .map(|u| u.name),
        None => None,
    };

    receipt::summarize(&rows, officer_name)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
}

pub async fn draft(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<EditDraft>, AppError> {
    let rows = rows_of(&state.pool, id).await?;
    receipt::draft(&rows)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Receipt has no zakat rows to edit".to_string()))
}
