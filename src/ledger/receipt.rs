use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ledger::grouping::receipt_code;
use crate::ledger::money_sum;
use crate::models::{Transaction, TransactionType};

/// Everything printed on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptSummary {
    pub code: String,
    pub receipt_id: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub names: Vec<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub total_zakat_money: i64,
    pub total_rice: f64,
    pub infaq_amount: i64,
    pub total_paid: i64,
    pub payment_amount: i64,
    pub change_amount: i64,
    pub officer_name: Option<String>,
}

/// Values that pre-fill the batch edit form for an existing receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditDraft {
    pub receipt_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub muzakki_count: usize,
    pub names: Vec<String>,
    pub amount_per_person: i64,
    pub rice_per_person: f64,
    pub infaq_amount: i64,
    pub payment_amount: i64,
}

/// Summarize the rows of one receipt, in insertion order.
/// Returns `None` for an empty slice.
pub fn summarize(rows: &[Transaction], officer_name: Option<String>) -> Option<ReceiptSummary> {
    let first = rows.first()?;

    let zakat: Vec<&Transaction> = rows.iter().filter(|t| !t.kind.is_infaq()).collect();
    let kind = zakat.first().map(|t| t.kind).unwrap_or(TransactionType::Infaq);

    let mut names: Vec<String> = Vec::new();
    let source: Vec<&Transaction> = if zakat.is_empty() {
        rows.iter().collect()
    } else {
        zakat.clone()
    };
    for t in source {
        if !t.muzakki_name.is_empty() && !names.contains(&t.muzakki_name) {
            names.push(t.muzakki_name.clone());
        }
    }

    let total_zakat_money = money_sum(
        zakat
            .iter()
            .filter(|t| t.kind != TransactionType::FitrahBeras)
            .map(|t| t.amount),
    );
    let total_rice: f64 = rows
        .iter()
        .filter(|t| t.kind == TransactionType::FitrahBeras)
        .map(|t| t.amount_rice.unwrap_or(0.0))
        .sum();
    let infaq_amount = money_sum(rows.iter().filter(|t| t.kind.is_infaq()).map(|t| t.amount));
    let total_paid = total_zakat_money.saturating_add(infaq_amount);

    Some(ReceiptSummary {
        code: receipt_code(first.receipt_id.as_deref(), first.id),
        receipt_id: first.receipt_id.clone(),
        issued_at: first.created_at,
        names,
        kind,
        total_zakat_money,
        total_rice,
        infaq_amount,
        total_paid,
        payment_amount: first
            .payment_amount
            .filter(|p| *p > 0)
            .unwrap_or(total_paid),
        change_amount: first.change_amount.unwrap_or(0),
        officer_name,
    })
}

/// Rebuild the batch form values. `None` when the receipt has no zakat rows.
pub fn draft(rows: &[Transaction]) -> Option<EditDraft> {
    let zakat: Vec<&Transaction> = rows.iter().filter(|t| !t.kind.is_infaq()).collect();
    let first = *zakat.first()?;

    let total_zakat = money_sum(zakat.iter().map(|t| t.amount));
    let infaq_amount = rows
        .iter()
        .find(|t| t.kind.is_infaq())
        .map(|t| t.amount)
        .unwrap_or(0);

    Some(EditDraft {
        receipt_id: first.receipt_id.clone(),
        kind: first.kind,
        muzakki_count: zakat.len(),
        names: zakat.iter().map(|t| t.muzakki_name.clone()).collect(),
        amount_per_person: first.amount,
        rice_per_person: first.amount_rice.unwrap_or(0.0),
        infaq_amount,
        payment_amount: first
            .payment_amount
            .unwrap_or(total_zakat.saturating_add(infaq_amount)),
    })
}
