use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::ledger::period::DateRange;
use crate::models::ActivityEntry;

pub async fn log(
    pool: &PgPool,
    user_id: Option<Uuid>,
    action: &str,
    details: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO activity_logs (user_id, action, details) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(action)
        .bind(details)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_before(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM activity_logs WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// One page of entries, newest first, plus the total matching the range.
pub async fn list(
    pool: &PgPool,
    range: &DateRange,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ActivityEntry>, i64), sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT a.id, a.user_id, u.name AS user_name, u.role AS user_role,
                a.action, a.details, a.created_at
         FROM activity_logs a LEFT JOIN users u ON u.id = a.user_id WHERE TRUE",
    );
    push_range(&mut builder, range);
    builder
        .push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let entries = builder
        .build_query_as::<ActivityEntry>()
        .fetch_all(pool)
        .await?;

    let mut count: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM activity_logs a WHERE TRUE");
    push_range(&mut count, range);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    Ok((entries, total))
}

fn push_range(builder: &mut QueryBuilder<'_, Postgres>, range: &DateRange) {
    if let Some(from) = range.from {
        builder.push(" AND a.created_at >= ").push_bind(from);
    }
    if let Some(until) = range.until {
        builder.push(" AND a.created_at < ").push_bind(until);
    }
}
