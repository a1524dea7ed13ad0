use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    Login,
    Logout,
    CreateTransaction,
    UpdateTransaction,
    DeleteTransaction,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl ActivityAction {
    pub fn code(&self) -> &'static str {
        match self {
            ActivityAction::Login => "LOGIN",
            ActivityAction::Logout => "LOGOUT",
            ActivityAction::CreateTransaction => "CREATE_TRANSACTION",
            ActivityAction::UpdateTransaction => "UPDATE_TRANSACTION",
            ActivityAction::DeleteTransaction => "DELETE_TRANSACTION",
            ActivityAction::CreateUser => "CREATE_USER",
            ActivityAction::UpdateUser => "UPDATE_USER",
            ActivityAction::DeleteUser => "DELETE_USER",
        }
    }
}

/// An activity row joined with its actor.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub user_role: Option<Role>,
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}
