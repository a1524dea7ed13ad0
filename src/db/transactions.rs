use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::like_pattern;
use crate::ledger::period::DateRange;
use crate::models::{NewTransaction, Transaction};

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub range: DateRange,
    /// Case-insensitive substring of the receipt id or payer name.
    pub query: Option<String>,
}

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    row: &NewTransaction,
    actor: Uuid,
) -> Result<Transaction, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        "INSERT INTO transactions
            (type, amount, amount_rice, description, muzakki_name, receipt_id,
             payment_amount, change_amount, created_by, updated_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) RETURNING *",
    )
    .bind(row.kind)
    .bind(row.amount)
    .bind(row.amount_rice)
    .bind(row.description.as_deref())
    .bind(&row.muzakki_name)
    .bind(row.receipt_id.as_deref())
    .bind(row.payment_amount)
    .bind(row.change_amount)
    .bind(actor)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Rows of one receipt in the order they were written.
pub async fn list_by_receipt<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    receipt_id: &str,
) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE receipt_id = $1 ORDER BY id ASC",
    )
    .bind(receipt_id)
    .fetch_all(executor)
    .await
}

/// Filtered rows, newest first.
pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<Transaction>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM transactions WHERE TRUE");

    if let Some(from) = filter.range.from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(until) = filter.range.until {
        builder.push(" AND created_at < ").push_bind(until);
    }
    if let Some(query) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = like_pattern(query);
        builder
            .push(" AND (receipt_id ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR muzakki_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    builder.push(" ORDER BY created_at DESC, id DESC");

    builder.build_query_as::<Transaction>().fetch_all(pool).await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    row: &NewTransaction,
    actor: Uuid,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        "UPDATE transactions
         SET type = $2, amount = $3, amount_rice = $4, description = $5, muzakki_name = $6,
             payment_amount = $7, change_amount = $8, updated_by = $9, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(row.kind)
    .bind(row.amount)
    .bind(row.amount_rice)
    .bind(row.description.as_deref())
    .bind(&row.muzakki_name)
    .bind(row.payment_amount)
    .bind(row.change_amount)
    .bind(actor)
    .fetch_optional(pool)
    .await
}

pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_receipt<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    receipt_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM transactions WHERE receipt_id = $1")
        .bind(receipt_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Carry the original creation stamp over to rows rewritten under `receipt_id`.
pub async fn restore_origin<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    receipt_id: &str,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE transactions SET created_at = $2, created_by = $3 WHERE receipt_id = $1",
    )
    .bind(receipt_id)
    .bind(created_at)
    .bind(created_by)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
