//! Account routes

pub mod api;

pub use api::{api_accounts, api_version};
