use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::auth::extractor::AuthUser;
use crate::models::ActivityAction;

/// Activity rows older than this are purged on the next listing.
pub const RETENTION_DAYS: i64 = 90;

/// Record an activity entry. Called explicitly in handlers after mutations;
/// a failed write is logged and never fails the request.
pub async fn record(pool: &PgPool, actor: &AuthUser, action: ActivityAction, details: &str) {
    if let Err(e) = crate::db::activity::log(pool, Some(actor.user_id), action.code(), details).await
    {
        tracing::error!(action = action.code(), "Failed to record activity: {e}");
    }
}

/// Delete entries past retention. Runs before every activity listing.
pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now() - Duration::days(RETENTION_DAYS);
    let removed = crate::db::activity::delete_before(pool, cutoff).await?;
    if removed > 0 {
        tracing::info!("Purged {removed} activity entries older than {RETENTION_DAYS} days");
    }
    Ok(removed)
}

pub fn login_details(actor: &AuthUser) -> String {
    format!("{} just logged in.", actor.describe())
}

pub fn logout_details(actor: &AuthUser) -> String {
    format!("{} just logged out.", actor.describe())
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::Role;

    #[test]
    fn details_name_role_and_person() {
        let actor = AuthUser {
            user_id: Uuid::now_v7(),
            username: "budi".to_string(),
            name: "Budi Santoso".to_string(),
            role: Role::PanitiaZis,
        };
        assert_eq!(login_details(&actor), "Panitia ZIS Budi Santoso just logged in.");
        assert_eq!(logout_details(&actor), "Panitia ZIS Budi Santoso just logged out.");
    }
}
