pub mod activity;
pub mod auth_redirect;
