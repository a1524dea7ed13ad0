use std::collections::{BTreeMap, HashSet};

use chrono::{Days, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::ledger::period::local_day;
use crate::models::{Transaction, TransactionType};

pub const SERIES_DAYS: u64 = 7;

/// Per-type totals. `FITRAH_BERAS` is in liters, everything else in rupiah.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Breakdown {
    #[serde(rename = "FITRAH_UANG")]
    pub fitrah_uang: i64,
    #[serde(rename = "FITRAH_BERAS")]
    pub fitrah_beras: f64,
    #[serde(rename = "MAL")]
    pub mal: i64,
    #[serde(rename = "INFAQ")]
    pub infaq: i64,
    /// Reserved; never recorded.
    #[serde(rename = "SODAQOH")]
    pub sodaqoh: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub label: String,
    pub total: i64,
    pub rice: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_money: i64,
    pub total_rice: f64,
    pub muzakki_count: usize,
    pub fitrah_money: i64,
    pub breakdown: Breakdown,
    pub daily: Vec<DailyPoint>,
}

/// Aggregate the filtered rows for the dashboard cards and the 7-day chart.
pub fn compute(rows: &[Transaction], today: NaiveDate, offset: FixedOffset) -> DashboardStats {
    let mut total_money = 0i64;
    let mut total_rice = 0.0f64;
    let mut payers: HashSet<&str> = HashSet::new();
    let mut breakdown = Breakdown::default();

    let mut series: BTreeMap<NaiveDate, (i64, f64)> = (0..SERIES_DAYS)
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|day| (day, (0, 0.0)))
        .collect();

    for row in rows {
        let rice = row.amount_rice.unwrap_or(0.0);
        total_money = total_money.saturating_add(row.amount);
        total_rice += rice;
        payers.insert(row.muzakki_name.as_str());

        match row.kind {
            TransactionType::FitrahUang => {
                breakdown.fitrah_uang = breakdown.fitrah_uang.saturating_add(row.amount)
            }
            TransactionType::FitrahBeras => breakdown.fitrah_beras += rice,
            TransactionType::Mal => breakdown.mal = breakdown.mal.saturating_add(row.amount),
            TransactionType::Infaq => breakdown.infaq = breakdown.infaq.saturating_add(row.amount),
        }

        if let Some((money, liters)) = series.get_mut(&local_day(row.created_at, offset)) {
            *money = money.saturating_add(row.amount);
            *liters += rice;
        }
    }

    let daily = series
        .into_iter()
        .map(|(date, (total, rice))| DailyPoint {
            date,
            label: date.format("%d %b").to_string(),
            total,
            rice,
        })
        .collect();

    DashboardStats {
        total_money,
        total_rice,
        muzakki_count: payers.len(),
        fitrah_money: total_money
            .saturating_sub(breakdown.mal)
            .saturating_sub(breakdown.infaq)
            .saturating_sub(breakdown.sodaqoh),
        breakdown,
        daily,
    }
}
