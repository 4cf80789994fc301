//! Basic types shared by the query layer, the cache and the aggregator

use indexmap::map::Entry;
use indexmap::IndexMap;
use ledgerdash_parser::BalanceRecord;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::calendar::CalendarDate;
use crate::error::{CoreError, CoreResult};

/// Cache key: one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl From<CalendarDate> for MonthKey {
    fn from(date: CalendarDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// Summed amount per account path, iterated in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AccountBalances {
    entries: IndexMap<String, Decimal>,
}

impl AccountBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum records sharing an account into one entry
    pub fn collate(records: impl IntoIterator<Item = BalanceRecord>) -> CoreResult<Self> {
        Self::from_entries(records.into_iter().map(|r| (r.account, r.amount)))
    }

    /// Collate an already collated mapping again; the result equals `other`
    pub fn collate_from(other: &AccountBalances) -> CoreResult<Self> {
        Self::from_entries(other.iter().map(|(account, amount)| (account.to_string(), amount)))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Decimal)>) -> CoreResult<Self> {
        let mut balances = Self::new();
        for (account, amount) in entries {
            balances.add(account, amount)?;
        }
        Ok(balances)
    }

    /// Add `amount` to `account`, appending the account if it is new
    pub fn add(&mut self, account: String, amount: Decimal) -> CoreResult<()> {
        match self.entries.entry(account) {
            Entry::Occupied(mut entry) => {
                let sum = entry
                    .get()
                    .checked_add(amount)
                    .ok_or_else(|| amount_overflow(entry.key()))?;
                entry.insert(sum);
            }
            Entry::Vacant(entry) => {
                entry.insert(amount);
            }
        }
        Ok(())
    }

    pub fn get(&self, account: &str) -> Option<Decimal> {
        self.entries.get(account).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(account, amount)| (account.as_str(), *amount))
    }

    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Accounts whose path starts with `prefix`, order kept
    pub fn filter_prefix(&self, prefix: &str) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(account, _)| account.starts_with(prefix))
            .map(|(account, amount)| (account.clone(), *amount))
            .collect();
        Self { entries }
    }
}

/// Sum past the decimal range
pub(crate) fn amount_overflow(label: &str) -> CoreError {
    CoreError::ParseError {
        message: format!("Amount overflow for {}", label),
    }
}
