//! Balance queries against the ledger executable
//!
//! Each query builds the argument list, runs it through the injected
//! [`ProcessRunner`] and reads the output with `ledgerdash-parser`.

use ledgerdash_parser::{parse_account_list, parse_balance_output};

use crate::error::CoreResult;
use crate::invoke::{LedgerInvocation, LedgerSettings, RunnerRef};
use crate::types::AccountBalances;

/// Row format asked of `ledger bal`, one `account,amount` per line
pub const BALANCE_FORMAT: &str = "%(account),%(amount)\n";

#[derive(Clone)]
pub struct LedgerClient {
    runner: RunnerRef,
}

impl LedgerClient {
    pub fn new(runner: RunnerRef) -> Self {
        Self { runner }
    }

    async fn run(&self, settings: &LedgerSettings, args: Vec<String>) -> CoreResult<String> {
        let invocation = LedgerInvocation::new(settings, args);
        self.runner.run(&invocation).await
    }

    /// Every account name ledger knows, as emitted
    pub async fn query_accounts(&self, settings: &LedgerSettings) -> CoreResult<Vec<String>> {
        let output = self.run(settings, vec!["accounts".to_string()]).await?;
        Ok(parse_account_list(&output))
    }

    /// Balances of every account over `[start, end)`
    pub async fn query_balance_range(
        &self,
        settings: &LedgerSettings,
        start: &str,
        end: &str,
    ) -> CoreResult<AccountBalances> {
        self.query_balance_range_filtered(settings, None, start, end).await
    }

    /// Balances over `[start, end)`, restricted to accounts matching `filter`
    pub async fn query_balance_range_filtered(
        &self,
        settings: &LedgerSettings,
        filter: Option<&str>,
        start: &str,
        end: &str,
    ) -> CoreResult<AccountBalances> {
        let output = self.run(settings, balance_args(filter, start, end)).await?;
        let records = parse_balance_output(&output)?;
        log::trace!("{} balance records for {} to {}", records.len(), start, end);
        AccountBalances::collate(records)
    }

    /// `ledger --version`, trimmed
    pub async fn version(&self, settings: &LedgerSettings) -> CoreResult<String> {
        let output = self.run(settings, vec!["--version".to_string()]).await?;
        Ok(output.trim().to_string())
    }
}

pub(crate) fn balance_args(filter: Option<&str>, start: &str, end: &str) -> Vec<String> {
    let mut args = vec!["bal".to_string()];
    if let Some(filter) = filter {
        args.push(filter.to_string());
    }
    args.extend([
        "--period".to_string(),
        format!("from {} to {}", start, end),
        "--format".to_string(),
        BALANCE_FORMAT.to_string(),
        "--flat".to_string(),
        "--basis".to_string(),
    ]);
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::testing::FakeRunner;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn settings() -> LedgerSettings {
        LedgerSettings::new("/bin/ledger", Some("main.ledger".into()))
    }

    #[test]
    fn test_balance_args() {
        assert_eq!(
            balance_args(Some("^Expenses"), "2024/3", "2024/4"),
            vec![
                "bal",
                "^Expenses",
                "--period",
                "from 2024/3 to 2024/4",
                "--format",
                "%(account),%(amount)\n",
                "--flat",
                "--basis",
            ]
        );
        assert_eq!(balance_args(None, "2024", "2025")[1], "--period");
    }

    #[tokio::test]
    async fn test_query_accounts_keeps_order() {
        let runner = FakeRunner::fixed("Assets:Cash\n\nExpenses:Food\nAssets:Cash\n");
        let client = LedgerClient::new(runner.clone());
        let accounts = client.query_accounts(&settings()).await.unwrap();
        assert_eq!(accounts, vec!["Assets:Cash", "Expenses:Food", "Assets:Cash"]);
        assert_eq!(runner.commands(), vec!["/bin/ledger -f main.ledger accounts"]);
    }

    #[tokio::test]
    async fn test_query_balance_range_collates() {
        let runner =
            FakeRunner::fixed("Expenses:Food,$10\nExpenses:Food,$5.50\nAssets:Cash,$1,000\n");
        let client = LedgerClient::new(runner.clone());
        let balances = client
            .query_balance_range(&settings(), "2024/3", "2024/4")
            .await
            .unwrap();
        assert_eq!(balances.get("Expenses:Food"), Some(Decimal::new(1550, 2)));
        assert_eq!(runner.calls(), 1);
        assert!(runner.commands()[0].contains("--period 'from 2024/3 to 2024/4'"));
    }

    #[tokio::test]
    async fn test_parse_failure_becomes_core_error() {
        let client = LedgerClient::new(FakeRunner::fixed("Expenses:Food,abc\n"));
        let err = client
            .query_balance_range(&settings(), "2024/3", "2024/4")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_overflowing_report_becomes_parse_error() {
        let client = LedgerClient::new(FakeRunner::fixed(
            "Assets:Big,79228162514264337593543950335\nAssets:Big,1\n",
        ));
        let err = client
            .query_balance_range(&settings(), "2024/3", "2024/4")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_process_error_propagates() {
        let runner: Arc<FakeRunner> = FakeRunner::failing("Error: file not found");
        let client = LedgerClient::new(runner);
        let err = client.query_accounts(&settings()).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: file not found");
    }

    #[tokio::test]
    async fn test_version_trimmed() {
        let client = LedgerClient::new(FakeRunner::fixed("Ledger 3.3.2\n"));
        assert_eq!(client.version(&settings()).await.unwrap(), "Ledger 3.3.2");
    }
}
