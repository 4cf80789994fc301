//! Memoized balance queries
//!
//! Two maps keyed by calendar month: balances over the month itself and
//! balances from the epoch up to the end of the month. The distinct account
//! list is memoized next to them. Entries live until the whole cache is
//! cleared, which happens when the journal path changes.
//!
//! Each key owns a [`OnceCell`], so concurrent requests for the same month
//! share one ledger invocation. A failed query leaves its cell empty and the
//! next request runs it again.

use indexmap::IndexSet;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tokio::task::JoinSet;

use crate::calendar::{CalendarDate, PeriodKind};
use crate::error::{CoreError, CoreResult};
use crate::invoke::LedgerSettings;
use crate::query::LedgerClient;
use crate::types::{AccountBalances, MonthKey};

/// First year covered by cumulative balances
pub const DEFAULT_EPOCH_YEAR: i32 = 1970;

type Slot<T> = Arc<OnceCell<T>>;

struct CacheState {
    settings: LedgerSettings,
    per_period: HashMap<MonthKey, Slot<AccountBalances>>,
    cumulative: HashMap<MonthKey, Slot<AccountBalances>>,
    accounts: Slot<Vec<String>>,
}

impl CacheState {
    fn new(settings: LedgerSettings) -> Self {
        Self {
            settings,
            per_period: HashMap::new(),
            cumulative: HashMap::new(),
            accounts: Arc::default(),
        }
    }

    fn reset(&mut self) {
        // In-flight computations keep their old cells and land nowhere
        self.per_period = HashMap::new();
        self.cumulative = HashMap::new();
        self.accounts = Arc::default();
    }
}

#[derive(Debug, Clone, Copy)]
enum BalanceKind {
    PerPeriod,
    Cumulative,
}

/// Entry counts, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub per_period_entries: usize,
    pub cumulative_entries: usize,
    pub accounts_cached: bool,
}

pub struct LedgerCache {
    client: LedgerClient,
    epoch_year: i32,
    state: Mutex<CacheState>,
}

impl LedgerCache {
    pub fn new(client: LedgerClient, settings: LedgerSettings) -> Self {
        Self {
            client,
            epoch_year: DEFAULT_EPOCH_YEAR,
            state: Mutex::new(CacheState::new(settings)),
        }
    }

    pub fn with_epoch_year(mut self, epoch_year: i32) -> Self {
        self.epoch_year = epoch_year;
        self
    }

    pub fn client(&self) -> &LedgerClient {
        &self.client
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> LedgerSettings {
        self.lock().settings.clone()
    }

    /// Balances over the month containing `date`; the day is ignored
    pub async fn get_per_period_balance(&self, date: CalendarDate) -> CoreResult<AccountBalances> {
        self.get_balance(BalanceKind::PerPeriod, date).await
    }

    /// Balances from the epoch year to the end of the month containing `date`
    pub async fn get_cumulative_balance(&self, date: CalendarDate) -> CoreResult<AccountBalances> {
        self.get_balance(BalanceKind::Cumulative, date).await
    }

    async fn get_balance(
        &self,
        kind: BalanceKind,
        date: CalendarDate,
    ) -> CoreResult<AccountBalances> {
        let key = MonthKey::from(date);
        let (slot, settings) = {
            let mut state = self.lock();
            let map = match kind {
                BalanceKind::PerPeriod => &mut state.per_period,
                BalanceKind::Cumulative => &mut state.cumulative,
            };
            let slot = map.entry(key).or_default().clone();
            (slot, state.settings.clone())
        };

        let start = match kind {
            BalanceKind::PerPeriod => {
                date.span_start(PeriodKind::Month).format(Some(PeriodKind::Month))
            }
            BalanceKind::Cumulative => self.epoch_year.to_string(),
        };
        let end = date.span_next(PeriodKind::Month).format(Some(PeriodKind::Month));

        let balances = slot
            .get_or_try_init(|| async {
                log::debug!("Cache miss for {:?} {}/{}", kind, key.year, key.month);
                self.client.query_balance_range(&settings, &start, &end).await
            })
            .await?;
        Ok(balances.clone())
    }

    /// Distinct account names, first-seen order
    pub async fn get_accounts(&self) -> CoreResult<Vec<String>> {
        let (slot, settings) = {
            let state = self.lock();
            (state.accounts.clone(), state.settings.clone())
        };

        let accounts = slot
            .get_or_try_init(|| async {
                let accounts = self.client.query_accounts(&settings).await?;
                let distinct: IndexSet<String> = accounts.into_iter().collect();
                Ok::<_, CoreError>(distinct.into_iter().collect())
            })
            .await?;
        Ok(accounts.clone())
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().reset();
        log::info!("Ledger cache cleared");
    }

    /// Replace the settings, clearing the cache iff the journal path changed.
    ///
    /// Returns whether the cache was cleared.
    pub fn update_settings(&self, settings: LedgerSettings) -> bool {
        let mut state = self.lock();
        let file_changed = state.settings.file_path != settings.file_path;
        state.settings = settings;
        if file_changed {
            state.reset();
            log::info!("Ledger file changed, cache cleared");
        }
        file_changed
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            per_period_entries: state.per_period.values().filter(|s| s.initialized()).count(),
            cumulative_entries: state.cumulative.values().filter(|s| s.initialized()).count(),
            accounts_cached: state.accounts.initialized(),
        }
    }

    /// Warm the cache: the account list plus `months` trailing months of
    /// per-period and cumulative balances, counting back from the month of
    /// `today`.
    ///
    /// Every query runs concurrently and all of them finish before this
    /// returns. Failures are collected into [`CoreError::PrefetchFailed`];
    /// the successful ones stay cached.
    pub async fn prefetch(self: &Arc<Self>, today: CalendarDate, months: u32) -> CoreResult<()> {
        let mut tasks = JoinSet::new();

        let cache = Arc::clone(self);
        tasks.spawn(async move {
            cache
                .get_accounts()
                .await
                .map(|_| ())
                .map_err(|e| format!("accounts: {}", e))
        });

        let mut date = today.span_start(PeriodKind::Month);
        for _ in 0..months {
            let label = date.format(Some(PeriodKind::Month));

            let cache = Arc::clone(self);
            let period_label = label.clone();
            tasks.spawn(async move {
                cache
                    .get_per_period_balance(date)
                    .await
                    .map(|_| ())
                    .map_err(|e| format!("balance for {}: {}", period_label, e))
            });

            let cache = Arc::clone(self);
            tasks.spawn(async move {
                cache
                    .get_cumulative_balance(date)
                    .await
                    .map(|_| ())
                    .map_err(|e| format!("cumulative balance to {}: {}", label, e))
            });

            date = date.span_prev(PeriodKind::Month);
        }

        let total = tasks.len();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(failure)) => failures.push(failure),
                Err(e) => failures.push(format!("prefetch task failed: {}", e)),
            }
        }

        if failures.is_empty() {
            log::info!("Prefetched {} ledger queries", total);
            Ok(())
        } else {
            log::warn!("{} of {} prefetch queries failed", failures.len(), total);
            Err(CoreError::PrefetchFailed { failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::LedgerInvocation;
    use crate::testing::FakeRunner;
    use rust_decimal::Decimal;
    use std::path::PathBuf;

    fn settings(file: &str) -> LedgerSettings {
        LedgerSettings::new("/bin/ledger", Some(PathBuf::from(file)))
    }

    fn cache_with(runner: Arc<FakeRunner>) -> Arc<LedgerCache> {
        Arc::new(LedgerCache::new(LedgerClient::new(runner), settings("a.ledger")))
    }

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::new(y, m, d).unwrap()
    }

    fn period(invocation: &LedgerInvocation) -> Option<&str> {
        let i = invocation.args.iter().position(|a| a == "--period")?;
        invocation.args.get(i + 1).map(String::as_str)
    }

    #[tokio::test]
    async fn test_per_period_hit_and_miss() {
        let runner = FakeRunner::fixed("Expenses:Food,$12.50\n");
        let cache = cache_with(runner.clone());

        let first = cache.get_per_period_balance(date(2024, 3, 5)).await.unwrap();
        assert_eq!(first.get("Expenses:Food"), Some(Decimal::new(1250, 2)));
        assert_eq!(runner.calls(), 1);
        assert!(runner.commands()[0].contains("'from 2024/3 to 2024/4'"));

        let second = cache.get_per_period_balance(date(2024, 3, 28)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(runner.calls(), 1);
    }

    #[tokio::test]
    async fn test_cumulative_range_starts_at_epoch() {
        let runner = FakeRunner::fixed("Assets:Cash,$100\n");
        let cache = cache_with(runner.clone());

        cache.get_cumulative_balance(date(2024, 12, 1)).await.unwrap();
        assert!(runner.commands()[0].contains("'from 1970 to 2025/1'"));

        // Separate map from the per-period balances
        cache.get_per_period_balance(date(2024, 12, 1)).await.unwrap();
        assert_eq!(runner.calls(), 2);
    }

    #[tokio::test]
    async fn test_epoch_year_is_configurable() {
        let runner = FakeRunner::fixed("");
        let cache = LedgerCache::new(LedgerClient::new(runner.clone()), settings("a.ledger"))
            .with_epoch_year(2000);
        cache.get_cumulative_balance(date(2024, 1, 1)).await.unwrap();
        assert!(runner.commands()[0].contains("'from 2000 to 2024/2'"));
    }

    #[tokio::test]
    async fn test_file_change_clears_cache() {
        let runner = FakeRunner::fixed("Expenses:Food,$1\n");
        let cache = cache_with(runner.clone());

        cache.get_per_period_balance(date(2024, 3, 1)).await.unwrap();
        assert!(cache.update_settings(settings("b.ledger")));
        cache.get_per_period_balance(date(2024, 3, 1)).await.unwrap();
        assert_eq!(runner.calls(), 2);
        assert!(runner.commands()[1].contains("-f b.ledger"));
    }

    #[tokio::test]
    async fn test_exe_change_keeps_cache() {
        let runner = FakeRunner::fixed("Expenses:Food,$1\n");
        let cache = cache_with(runner.clone());

        cache.get_per_period_balance(date(2024, 3, 1)).await.unwrap();
        let moved = LedgerSettings::new("/usr/local/bin/ledger", Some(PathBuf::from("a.ledger")));
        assert!(!cache.update_settings(moved.clone()));
        assert_eq!(cache.settings(), moved);

        cache.get_per_period_balance(date(2024, 3, 1)).await.unwrap();
        assert_eq!(runner.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_invocation() {
        let runner = FakeRunner::fixed("Expenses:Food,$1\n");
        let cache = cache_with(runner.clone());

        let (a, b, c) = tokio::join!(
            cache.get_per_period_balance(date(2024, 3, 1)),
            cache.get_per_period_balance(date(2024, 3, 15)),
            cache.get_per_period_balance(date(2024, 3, 31)),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert!(c.is_ok());
        assert_eq!(runner.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let runner = FakeRunner::failing("Error: cannot read journal");
        let cache = cache_with(runner.clone());

        let err = cache.get_per_period_balance(date(2024, 3, 1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: cannot read journal");
        assert!(cache.get_per_period_balance(date(2024, 3, 1)).await.is_err());
        assert_eq!(runner.calls(), 2);
        assert_eq!(cache.stats().per_period_entries, 0);
    }

    #[tokio::test]
    async fn test_accounts_deduplicated() {
        let runner = FakeRunner::fixed("Expenses:Food\nAssets:Cash\nExpenses:Food\n");
        let cache = cache_with(runner.clone());

        let accounts = cache.get_accounts().await.unwrap();
        assert_eq!(accounts, vec!["Expenses:Food", "Assets:Cash"]);
        cache.get_accounts().await.unwrap();
        assert_eq!(runner.calls(), 1);

        cache.clear();
        cache.get_accounts().await.unwrap();
        assert_eq!(runner.calls(), 2);
    }

    #[tokio::test]
    async fn test_prefetch_issues_all_queries() {
        let runner = FakeRunner::fixed("Expenses:Food,$1\n");
        let cache = cache_with(runner.clone());

        cache.prefetch(date(2024, 3, 17), 12).await.unwrap();
        assert_eq!(runner.calls(), 25);
        assert_eq!(
            cache.stats(),
            CacheStats {
                per_period_entries: 12,
                cumulative_entries: 12,
                accounts_cached: true,
            }
        );

        // Oldest prefetched month is April of the previous year
        cache.get_per_period_balance(date(2023, 4, 1)).await.unwrap();
        assert_eq!(runner.calls(), 25);
    }

    #[tokio::test]
    async fn test_prefetch_failure_keeps_successes() {
        let runner = FakeRunner::new(|invocation| match period(invocation) {
            Some("from 2024/2 to 2024/3") => Err(CoreError::ProcessError {
                command: invocation.command_line(),
                message: "bad month".to_string(),
            }),
            _ => Ok("Expenses:Food,$1\n".to_string()),
        });
        let cache = cache_with(runner.clone());

        let err = cache.prefetch(date(2024, 3, 1), 3).await.unwrap_err();
        match err {
            CoreError::PrefetchFailed { failures } => {
                assert_eq!(failures, vec!["balance for 2024/2: bad month".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let stats = cache.stats();
        assert_eq!(stats.per_period_entries, 2);
        assert_eq!(stats.cumulative_entries, 3);
        assert!(stats.accounts_cached);
    }
}
