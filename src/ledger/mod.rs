//! Ledger logic that needs no I/O: date filters, batch planning, receipt
//! grouping, dashboard statistics and receipt summaries.
//!
//! Handlers load rows through `db::transactions` and hand them to these
//! functions, so everything here is unit tested without a database.

pub mod batch;
pub mod grouping;
pub mod period;
pub mod receipt;
pub mod stats;

/// Largest rupiah amount accepted on a single row or batch. Keeps every
/// aggregate far from `i64` overflow.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Largest rice quantity, in liters, accepted per row.
pub const MAX_RICE_LITERS: f64 = 1_000_000.0;

/// Sum rupiah amounts, clamping at `i64::MAX` instead of overflowing.
pub fn money_sum(amounts: impl IntoIterator<Item = i64>) -> i64 {
    amounts.into_iter().fold(0i64, i64::saturating_add)
}


#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::models::{Transaction, TransactionType};

    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    pub fn row(
        id: i64,
        kind: TransactionType,
        amount: i64,
        rice: Option<f64>,
        name: &str,
        receipt: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id,
            kind,
            amount,
            amount_rice: rice,
            description: None,
            muzakki_name: name.to_string(),
            receipt_id: receipt.map(str::to_string),
            payment_amount: None,
            change_amount: None,
            created_by: None,
            updated_by: None,
            created_at,
            updated_at: created_at,
        }
    }
}
