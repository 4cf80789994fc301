//! Records produced from ledger report output

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One `account,amount` line of a balance report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// Colon-delimited account path, e.g. `Expenses:Food:Groceries`
    pub account: String,
    pub amount: Decimal,
}

impl BalanceRecord {
    pub fn new(account: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account: account.into(),
            amount,
        }
    }
}
