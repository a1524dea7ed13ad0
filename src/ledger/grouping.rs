use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Transaction, TransactionType};

pub const LEDGER_PAGE_SIZE: usize = 10;

/// One line of the ledger: either a whole receipt or a lone legacy row.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Most recent row of the receipt; used for edit and print links.
    pub id: i64,
    pub receipt_id: Option<String>,
    pub receipt_code: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub names: Vec<String>,
    pub total_amount: i64,
    pub infaq_amount: i64,
    pub total_rice: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_batch: bool,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerPage {
    pub data: Vec<LedgerEntry>,
    pub metadata: PageMeta,
}

/// Short code printed on receipts: first segment of the receipt id, or the
/// zero-padded row id for rows recorded without one.
pub fn receipt_code(receipt_id: Option<&str>, id: i64) -> String {
    match receipt_id.and_then(|r| r.split('-').next()).filter(|s| !s.is_empty()) {
        Some(segment) => segment.to_string(),
        None => format!("TX-{id:06}"),
    }
}

/// Merge rows sharing a receipt id into one entry, newest first.
///
/// `rows` are expected newest first; the first row seen for a receipt
/// supplies the entry's id, timestamp and description.
pub fn group_by_receipt(rows: &[Transaction]) -> Vec<LedgerEntry> {
    let mut entries: Vec<LedgerEntry> = Vec::new();
    let mut by_receipt: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let Some(receipt_id) = row.receipt_id.as_deref() else {
            entries.push(singleton(row));
            continue;
        };

        let idx = *by_receipt.entry(receipt_id).or_insert_with(|| {
            entries.push(LedgerEntry {
                id: row.id,
                receipt_id: Some(receipt_id.to_string()),
                receipt_code: receipt_code(Some(receipt_id), row.id),
                kind: row.kind,
                names: Vec::new(),
                total_amount: 0,
                infaq_amount: 0,
                total_rice: 0.0,
                description: row.description.clone(),
                created_at: row.created_at,
                is_batch: true,
                row_count: 0,
            });
            entries.len() - 1
        });

        let entry = &mut entries[idx];
        entry.row_count += 1;
        if !row.muzakki_name.is_empty() && !entry.names.contains(&row.muzakki_name) {
            entry.names.push(row.muzakki_name.clone());
        }
        entry.total_amount = entry.total_amount.saturating_add(row.amount);
        if row.kind.is_infaq() {
            entry.infaq_amount = entry.infaq_amount.saturating_add(row.amount);
        } else {
            entry.kind = row.kind;
            entry.total_rice += row.amount_rice.unwrap_or(0.0);
        }
    }

    // stable: ties keep input order
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries
}

fn singleton(row: &Transaction) -> LedgerEntry {
    LedgerEntry {
        id: row.id,
        receipt_id: None,
        receipt_code: receipt_code(None, row.id),
        kind: row.kind,
        names: if row.muzakki_name.is_empty() {
            Vec::new()
        } else {
            vec![row.muzakki_name.clone()]
        },
        total_amount: row.amount,
        infaq_amount: if row.kind.is_infaq() { row.amount } else { 0 },
        total_rice: row.amount_rice.unwrap_or(0.0),
        description: row.description.clone(),
        created_at: row.created_at,
        is_batch: false,
        row_count: 1,
    }
}

/// Slice out page `page` (1-based; values below 1 count as 1).
pub fn paginate(entries: Vec<LedgerEntry>, page: usize, page_size: usize) -> LedgerPage {
    let page_size = page_size.max(1);
    let page = page.max(1);
    let total = entries.len();
    let total_pages = total.div_ceil(page_size);
    let data = entries
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    LedgerPage {
        data,
        metadata: PageMeta {
            total,
            total_pages,
            current_page: page,
            page_size,
        },
    }
}
