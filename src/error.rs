use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failure of a ledger, account or session request. Every variant renders as
/// `{"success": false, "error": "..."}` so the pages' fetch helper can show
/// the message as-is.
#[derive(Debug)]
pub enum AppError {
    /// Unknown transaction, receipt or staff account.
    NotFound(String),
    /// No session, an expired token, or a failed login.
    Unauthorized(String),
    /// Signed in, but the action needs an Administrator.
    Forbidden(String),
    /// Form or query input the ledger refuses: bad dates, amounts, names.
    BadRequest(String),
    /// Username already taken.
    Conflict(String),
    /// Too many failed logins from one client.
    RateLimited(String),
    /// Hashing, token signing or template rendering broke. Logged, never shown.
    Internal(String),
    /// Logged, never shown.
    Database(sqlx::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "not found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "forbidden: {msg}"),
            AppError::BadRequest(msg) => write!(f, "rejected input: {msg}"),
            AppError::Conflict(msg) => write!(f, "conflict: {msg}"),
            AppError::RateLimited(msg) => write!(f, "login locked: {msg}"),
            AppError::Internal(msg) => write!(f, "internal: {msg}"),
            AppError::Database(err) => write!(f, "database: {err}"),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Staff accounts are the only unique column users can collide on, so a
    /// unique violation becomes `Conflict(conflict_msg)`. Anything else stays
    /// a database failure.
    pub fn unique_or_db(err: sqlx::Error, conflict_msg: &str) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(conflict_msg.to_string())
            }
            _ => AppError::Database(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the committee member. Server-side failures are replaced
    /// by a generic line after being logged.
    fn public_message(self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::RateLimited(msg) => msg,
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                "Internal server error".to_string()
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database query failed");
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({ "success": false, "error": self.public_message() });
        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}
