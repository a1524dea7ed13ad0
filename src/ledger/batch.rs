use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{MAX_AMOUNT, MAX_RICE_LITERS};
use crate::models::{NewTransaction, TransactionType};

/// Payer recorded on an infaq row when the batch carries no name.
pub const ANONYMOUS_DONOR: &str = "Hamba Allah";

pub const INFAQ_DESCRIPTION: &str = "Additional infaq recorded with the zakat batch";

/// Payload of the batch form: several payers paying the same zakat, plus an
/// optional infaq on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub muzakki_names: Vec<String>,
    #[serde(default)]
    pub amount_per_person: i64,
    #[serde(default)]
    pub rice_per_person: f64,
    #[serde(default)]
    pub infaq_amount: i64,
    #[serde(default)]
    pub payment_amount: i64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchTotals {
    pub zakat_money: i64,
    pub zakat_rice: f64,
    pub infaq_amount: i64,
    pub amount_due: i64,
    pub payment_amount: i64,
    pub change_amount: i64,
}

#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub receipt_id: String,
    pub rows: Vec<NewTransaction>,
    pub totals: BatchTotals,
}

pub fn new_receipt_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validate a batch request and lay out the rows to insert under `receipt_id`.
///
/// One row per payer, plus one `INFAQ` row when `infaq_amount > 0`. A `MAL`
/// batch is a single lump sum, so only its first row carries the amount.
pub fn plan(req: &BatchRequest, receipt_id: String) -> Result<BatchPlan, String> {
    if req.kind.is_infaq() {
        return Err("Infaq cannot be recorded as a zakat batch".to_string());
    }

    let names: Vec<String> = req
        .muzakki_names
        .iter()
        .map(|n| n.trim().to_string())
        .collect();
    if names.is_empty() {
        return Err("At least one muzakki name is required".to_string());
    }
    if names.iter().any(|n| n.is_empty()) {
        return Err("Every muzakki name must be filled in".to_string());
    }

    if req.amount_per_person < 0 || req.infaq_amount < 0 || req.payment_amount < 0 {
        return Err("Amounts cannot be negative".to_string());
    }
    if [req.amount_per_person, req.infaq_amount, req.payment_amount]
        .iter()
        .any(|a| *a > MAX_AMOUNT)
    {
        return Err(too_large());
    }
    if req.kind == TransactionType::FitrahBeras {
        if !(req.rice_per_person.is_finite() && req.rice_per_person > 0.0) {
            return Err("Rice per person must be greater than zero".to_string());
        }
        if req.rice_per_person > MAX_RICE_LITERS {
            return Err("Rice per person is too large".to_string());
        }
    }

    let count = names.len() as i64;
    let zakat_money = match req.kind {
        TransactionType::FitrahUang => req
            .amount_per_person
            .checked_mul(count)
            .filter(|total| *total <= MAX_AMOUNT)
            .ok_or_else(too_large)?,
        TransactionType::Mal => req.amount_per_person,
        TransactionType::FitrahBeras | TransactionType::Infaq => 0,
    };
    let zakat_rice = match req.kind {
        TransactionType::FitrahBeras => req.rice_per_person * names.len() as f64,
        _ => 0.0,
    };
    let amount_due = zakat_money
        .checked_add(req.infaq_amount)
        .filter(|due| *due <= MAX_AMOUNT)
        .ok_or_else(too_large)?;

    if amount_due > 0 && req.payment_amount < amount_due {
        return Err(format!(
            "Payment received ({}) is less than the amount due ({amount_due})",
            req.payment_amount
        ));
    }
    let change_amount = req.payment_amount - amount_due;

    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Zakat payment for {count} person(s)"));

    let mut rows = Vec::with_capacity(names.len() + 1);
    for (i, name) in names.iter().enumerate() {
        let (amount, amount_rice) = match req.kind {
            TransactionType::FitrahBeras => (0, Some(req.rice_per_person)),
            TransactionType::Mal if i > 0 => (0, None),
            _ => (req.amount_per_person, None),
        };
        rows.push(NewTransaction {
            kind: req.kind,
            amount,
            amount_rice,
            description: Some(description.clone()),
            muzakki_name: name.clone(),
            receipt_id: Some(receipt_id.clone()),
            payment_amount: Some(req.payment_amount),
            change_amount: Some(change_amount),
        });
    }

    if req.infaq_amount > 0 {
        let donor = names
            .first()
            .cloned()
            .unwrap_or_else(|| ANONYMOUS_DONOR.to_string());
        rows.push(NewTransaction {
            kind: TransactionType::Infaq,
            amount: req.infaq_amount,
            amount_rice: None,
            description: Some(INFAQ_DESCRIPTION.to_string()),
            muzakki_name: donor,
            receipt_id: Some(receipt_id.clone()),
            payment_amount: Some(req.payment_amount),
            change_amount: Some(change_amount),
        });
    }

    Ok(BatchPlan {
        receipt_id,
        rows,
        totals: BatchTotals {
            zakat_money,
            zakat_rice,
            infaq_amount: req.infaq_amount,
            amount_due,
            payment_amount: req.payment_amount,
            change_amount,
        },
    })
}

fn too_large() -> String {
    format!("Amount cannot exceed {MAX_AMOUNT}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: TransactionType, names: &[&str]) -> BatchRequest {
        BatchRequest {
            kind,
            muzakki_names: names.iter().map(|n| n.to_string()).collect(),
            amount_per_person: 40_000,
            rice_per_person: 3.5,
            infaq_amount: 0,
            payment_amount: 0,
            description: None,
        }
    }

    #[test]
    fn fitrah_uang_with_infaq_adds_one_infaq_row() {
        let mut req = request(TransactionType::FitrahUang, &["Ahmad", "Siti", "Umar"]);
        req.infaq_amount = 10_000;
        req.payment_amount = 150_000;

        let plan = plan(&req, "r-1".to_string()).unwrap();

        assert_eq!(plan.rows.len(), 4);
        assert!(plan.rows.iter().all(|r| r.receipt_id.as_deref() == Some("r-1")));
        assert_eq!(plan.rows[3].kind, TransactionType::Infaq);
        assert_eq!(plan.rows[3].amount, 10_000);
        assert_eq!(plan.rows[3].muzakki_name, "Ahmad");
        assert_eq!(plan.totals.amount_due, 130_000);
        assert_eq!(plan.totals.change_amount, 20_000);
        assert!(plan.rows.iter().all(|r| r.change_amount == Some(20_000)));
        assert_eq!(
            plan.rows[0].description.as_deref(),
            Some("Zakat payment for 3 person(s)")
        );
    }

    #[test]
    fn mal_amount_is_carried_by_first_row_only() {
        let mut req = request(TransactionType::Mal, &["Hasan", "Husain"]);
        req.amount_per_person = 2_500_000;
        req.payment_amount = 2_500_000;

        let plan = plan(&req, new_receipt_id()).unwrap();

        let amounts: Vec<i64> = plan.rows.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![2_500_000, 0]);
        assert_eq!(plan.totals.zakat_money, 2_500_000);
        assert_eq!(plan.totals.change_amount, 0);
    }

    #[test]
    fn fitrah_beras_rows_carry_rice_and_no_money() {
        let req = request(TransactionType::FitrahBeras, &["Aisyah", "Fatimah"]);

        let plan = plan(&req, "r-2".to_string()).unwrap();

        assert_eq!(plan.rows.len(), 2);
        for row in &plan.rows {
            assert_eq!(row.amount, 0);
            assert_eq!(row.amount_rice, Some(3.5));
        }
        assert_eq!(plan.totals.amount_due, 0);
        assert_eq!(plan.totals.zakat_rice, 7.0);
    }

    #[test]
    fn names_are_trimmed() {
        let mut req = request(TransactionType::FitrahUang, &["  Ahmad "]);
        req.payment_amount = 40_000;
        let plan = plan(&req, "r".to_string()).unwrap();
        assert_eq!(plan.rows[0].muzakki_name, "Ahmad");
    }

    #[test]
    fn blank_name_is_rejected() {
        let req = request(TransactionType::FitrahBeras, &["Ahmad", "   "]);
        assert!(plan(&req, "r".to_string()).is_err());
    }

    #[test]
    fn empty_names_are_rejected() {
        let req = request(TransactionType::FitrahBeras, &[]);
        assert!(plan(&req, "r".to_string()).is_err());
    }

    #[test]
    fn infaq_is_not_a_batch_type() {
        let req = request(TransactionType::Infaq, &["Ahmad"]);
        assert!(plan(&req, "r".to_string()).is_err());
    }

    #[test]
    fn underpayment_is_rejected() {
        let mut req = request(TransactionType::FitrahUang, &["Ahmad", "Siti"]);
        req.payment_amount = 50_000;
        let err = plan(&req, "r".to_string()).unwrap_err();
        assert!(err.contains("less than the amount due"));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let mut req = request(TransactionType::FitrahUang, &["Ahmad"]);
        req.infaq_amount = -1;
        assert!(plan(&req, "r".to_string()).is_err());
    }

    #[test]
    fn amounts_above_the_cap_are_rejected() {
        let mut req = request(TransactionType::Mal, &["Hasan"]);
        req.amount_per_person = MAX_AMOUNT;
        req.payment_amount = MAX_AMOUNT;
        assert!(plan(&req, "r".to_string()).is_ok());

        req.payment_amount = MAX_AMOUNT + 1;
        assert!(plan(&req, "r".to_string()).unwrap_err().contains("cannot exceed"));

        req.payment_amount = MAX_AMOUNT;
        req.infaq_amount = 1;
        assert!(plan(&req, "r".to_string()).is_err());
    }

    #[test]
    fn per_person_total_above_the_cap_is_rejected() {
        let mut req = request(TransactionType::FitrahUang, &["A", "B"]);
        req.amount_per_person = MAX_AMOUNT / 2 + 1;
        req.payment_amount = MAX_AMOUNT;
        assert!(plan(&req, "r".to_string()).unwrap_err().contains("cannot exceed"));

        let mut rice = request(TransactionType::FitrahBeras, &["A"]);
        rice.rice_per_person = MAX_RICE_LITERS * 2.0;
        assert!(plan(&rice, "r".to_string()).is_err());
    }

    #[test]
    fn receipt_ids_are_unique() {
        assert_ne!(new_receipt_id(), new_receipt_id());
    }
}
