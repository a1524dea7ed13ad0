pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod transactions;
pub mod users;

use askama::Template;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, FixedOffset, Utc};

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(auth::root))
        .route("/login", get(auth::login_page))
        .route("/dashboard", get(dashboard::index))
        .route("/transactions", get(transactions::index))
        .route("/activity", get(activity::index))
        .route("/users", get(users::index))
}

/// Header bar contents for signed-in pages.
pub struct NavInfo {
    pub name: String,
    pub role_label: &'static str,
    pub is_admin: bool,
}

impl From<&AuthUser> for NavInfo {
    fn from(auth: &AuthUser) -> Self {
        NavInfo {
            name: auth.name.clone(),
            role_label: auth.role.label(),
            is_admin: auth.is_admin(),
        }
    }
}

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Internal(format!("Template error: {e}")))
}

/// `1250000` -> `Rp 1.250.000`
pub fn rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}Rp {grouped}")
}

pub fn liters(value: f64) -> String {
    format!("{} L", (value * 100.0).round() / 100.0)
}

pub fn local_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d %b %Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupiah_groups_thousands() {
        assert_eq!(rupiah(0), "Rp 0");
        assert_eq!(rupiah(950), "Rp 950");
        assert_eq!(rupiah(40_000), "Rp 40.000");
        assert_eq!(rupiah(1_250_000), "Rp 1.250.000");
        assert_eq!(rupiah(-5_000), "-Rp 5.000");
    }

    #[test]
    fn liters_trim_trailing_zeros() {
        assert_eq!(liters(3.5), "3.5 L");
        assert_eq!(liters(7.0), "7 L");
        assert_eq!(liters(2.504), "2.5 L");
    }

    #[test]
    fn local_time_applies_offset() {
        let at = DateTime::parse_from_rfc3339("2026-03-20T20:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(local_time(at, wib), "21 Mar 2026 03:30");
    }
}
