use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "transaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    FitrahUang,
    FitrahBeras,
    Mal,
    Infaq,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::FitrahUang => "Zakat Fitrah (Uang)",
            TransactionType::FitrahBeras => "Zakat Fitrah (Beras)",
            TransactionType::Mal => "Zakat Mal",
            TransactionType::Infaq => "Infaq",
        }
    }

    pub fn is_infaq(&self) -> bool {
        matches!(self, TransactionType::Infaq)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: i64,
    pub amount_rice: Option<f64>,
    pub description: Option<String>,
    pub muzakki_name: String,
    pub receipt_id: Option<String>,
    pub payment_amount: Option<i64>,
    pub change_amount: Option<i64>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row ready to be inserted. Produced by batch planning or the single-row form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub amount: i64,
    pub amount_rice: Option<f64>,
    pub description: Option<String>,
    pub muzakki_name: String,
    pub receipt_id: Option<String>,
    pub payment_amount: Option<i64>,
    pub change_amount: Option<i64>,
}
