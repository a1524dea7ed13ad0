pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod transactions;
pub mod users;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/setup", post(auth::setup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        // Transactions
        .route(
            "/api/v1/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/v1/transactions/batch", post(transactions::create_batch))
        .route(
            "/api/v1/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/api/v1/transactions/{id}/batch", put(transactions::update_batch))
        .route("/api/v1/transactions/{id}/receipt", get(transactions::receipt))
        .route("/api/v1/transactions/{id}/draft", get(transactions::draft))
        // Receipts
        .route(
            "/api/v1/receipts/{receipt_id}",
            get(transactions::receipt_rows).delete(transactions::delete_receipt),
        )
        // Reporting
        .route("/api/v1/dashboard", get(dashboard::stats))
        .route("/api/v1/activity", get(activity::list))
        // Users
        .route("/api/v1/users", get(users::list).post(users::create))
        .route(
            "/api/v1/users/{id}",
            put(users::update).delete(users::delete),
        )
}
