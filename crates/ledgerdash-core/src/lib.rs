//! Core ledger processing for the dashboard
//!
//! Date spans, ledger invocation, balance queries, the month-keyed cache and
//! chart aggregation. Everything that touches the ledger executable goes
//! through an injected [`ProcessRunner`].

pub mod aggregate;
pub mod cache;
pub mod calendar;
pub mod dashboard;
pub mod error;
pub mod invoke;
pub mod query;
pub mod reports;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use aggregate::{
    aggregate_periods, aggregate_snapshot, category_for, category_totals, net_worth_series,
};
pub use cache::{CacheStats, LedgerCache};
pub use calendar::{CalendarDate, PeriodKind};
pub use dashboard::{Dashboard, DashboardOptions};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use invoke::{
    invoke, LedgerInvocation, LedgerSettings, ProcessRunner, RunnerRef, SystemRunner,
};
pub use query::LedgerClient;
pub use reports::{CategoryTotals, ChartData, ChartSeries, NetWorthSeries};
pub use types::{AccountBalances, MonthKey};
