//! Settings routes

pub mod api;

pub use api::{api_prefetch, api_settings, api_update_settings};
