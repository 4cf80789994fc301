//! Chart routes

pub mod api;

pub use api::{api_expense_chart, api_expense_totals, api_monthly_chart, api_net_worth};
