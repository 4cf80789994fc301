//! Route modules for the API server
//!
//! - charts: expense, monthly and net worth chart data
//! - accounts: account list and ledger version
//! - settings: ledger settings, cache state and prefetch
//!
//! Each module has a mod.rs with exports and an api.rs with the handlers.

pub mod accounts;
pub mod charts;
pub mod settings;
