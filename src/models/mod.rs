pub mod activity_log;
pub mod transaction;
pub mod user;

pub use activity_log::{ActivityAction, ActivityEntry};
pub use transaction::{NewTransaction, Transaction, TransactionType};
pub use user::{Role, User};
