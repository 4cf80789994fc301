//! Dashboard charts built from cached ledger queries

use ledgerdash_config::DashboardConfig;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::aggregate::{aggregate_periods, aggregate_snapshot, category_totals, net_worth_series};
use crate::cache::LedgerCache;
use crate::calendar::{CalendarDate, PeriodKind};
use crate::error::{CoreError, CoreResult};
use crate::reports::{CategoryTotals, ChartData, NetWorthSeries};
use crate::types::AccountBalances;

/// Options applied to every chart
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub collect_bottom_level: bool,
    pub expense_prefix: String,
    pub net_worth_prefixes: Vec<String>,
    pub prefetch_months: u32,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for DashboardOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            collect_bottom_level: config.collect_bottom_level,
            expense_prefix: config.expense_prefix.clone(),
            net_worth_prefixes: config.net_worth_prefixes.clone(),
            prefetch_months: config.prefetch_months,
        }
    }
}

pub struct Dashboard {
    cache: Arc<LedgerCache>,
    options: DashboardOptions,
}

impl Dashboard {
    pub fn new(cache: Arc<LedgerCache>, options: DashboardOptions) -> Self {
        Self { cache, options }
    }

    pub fn cache(&self) -> &Arc<LedgerCache> {
        &self.cache
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    /// Expense balances over the period containing `date`.
    ///
    /// Months go through the cache, which holds every account. Weeks and
    /// years are queried directly with the expense filter handed to ledger.
    pub async fn expenses(
        &self,
        period: PeriodKind,
        date: CalendarDate,
    ) -> CoreResult<AccountBalances> {
        let balances = match period {
            PeriodKind::Month => self.cache.get_per_period_balance(date).await?,
            PeriodKind::Week | PeriodKind::Year => {
                let start = date.span_start(period);
                let end = start.span_next(period);
                let filter = self.expense_filter();
                self.cache
                    .client()
                    .query_balance_range_filtered(
                        &self.cache.settings(),
                        Some(&filter),
                        &start.format(None),
                        &end.format(None),
                    )
                    .await?
            }
        };
        Ok(balances.filter_prefix(&self.options.expense_prefix))
    }

    /// Account pattern for `ledger bal`, anchored at the expense root
    fn expense_filter(&self) -> String {
        format!("^{}", self.options.expense_prefix.trim_end_matches(':'))
    }

    /// Stacked expense chart for one period
    pub async fn expense_chart(
        &self,
        period: PeriodKind,
        date: CalendarDate,
        collect_bottom_level: Option<bool>,
    ) -> CoreResult<ChartData> {
        let expenses = self.expenses(period, date).await?;
        Ok(aggregate_snapshot(&expenses, self.collect(collect_bottom_level)))
    }

    /// Expense totals per category for one period
    pub async fn expense_totals(
        &self,
        period: PeriodKind,
        date: CalendarDate,
        collect_bottom_level: Option<bool>,
    ) -> CoreResult<CategoryTotals> {
        let expenses = self.expenses(period, date).await?;
        category_totals(&expenses, self.collect(collect_bottom_level))
    }

    /// Expenses of each month of `year`, one slot per month
    pub async fn monthly_expense_chart(
        &self,
        year: i32,
        collect_bottom_level: Option<bool>,
    ) -> CoreResult<ChartData> {
        let (labels, snapshots) = self.months_of(year, false).await?;
        let expenses: Vec<AccountBalances> = snapshots
            .iter()
            .map(|s| s.filter_prefix(&self.options.expense_prefix))
            .collect();
        aggregate_periods(&expenses, &labels, self.collect(collect_bottom_level))
    }

    /// Net worth at the end of each month of `year`
    pub async fn net_worth(&self, year: i32) -> CoreResult<NetWorthSeries> {
        let (labels, snapshots) = self.months_of(year, true).await?;
        net_worth_series(&snapshots, &labels, &self.options.net_worth_prefixes)
    }

    /// Warm the cache for the trailing months before `today`
    pub async fn prefetch(&self, today: CalendarDate) -> CoreResult<()> {
        self.cache.prefetch(today, self.options.prefetch_months).await
    }

    fn collect(&self, requested: Option<bool>) -> bool {
        requested.unwrap_or(self.options.collect_bottom_level)
    }

    /// Month labels and balances for January to December, queried concurrently
    async fn months_of(
        &self,
        year: i32,
        cumulative: bool,
    ) -> CoreResult<(Vec<String>, Vec<AccountBalances>)> {
        let first = CalendarDate::new(year, 1, 1)?;
        let months: Vec<CalendarDate> =
            (0..12).map(|i| first.advance(PeriodKind::Month, i)).collect();

        let mut tasks = JoinSet::new();
        for (slot, month) in months.iter().copied().enumerate() {
            let cache = Arc::clone(&self.cache);
            tasks.spawn(async move {
                let balances = if cumulative {
                    cache.get_cumulative_balance(month).await
                } else {
                    cache.get_per_period_balance(month).await
                };
                (slot, balances)
            });
        }

        let mut snapshots = vec![AccountBalances::new(); months.len()];
        while let Some(joined) = tasks.join_next().await {
            let (slot, balances) = joined.map_err(|e| CoreError::InternalError {
                message: format!("monthly query task failed: {}", e),
            })?;
            snapshots[slot] = balances?;
        }

        let labels = months.iter().map(|m| m.format(Some(PeriodKind::Month))).collect();
        Ok((labels, snapshots))
    }
}
