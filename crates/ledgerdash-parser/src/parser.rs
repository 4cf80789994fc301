//! Line parser for `ledger bal --format "%(account),%(amount)\n"` output

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ParseError;
use crate::types::BalanceRecord;

/// Parser for the comma-delimited balance report
pub struct BalanceOutputParser;

impl BalanceOutputParser {
    /// Parse a whole report, keeping line order
    pub fn parse(content: &str) -> Result<Vec<BalanceRecord>, ParseError> {
        let mut records = Vec::new();

        for line in content.trim().lines() {
            if let Some(record) = Self::parse_line(line)? {
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Parse a single line.
    ///
    /// Only the first comma separates the account from the amount, the rest
    /// belongs to the amount (`Expenses:Rent,$1,200.00`). Lines without a
    /// comma, or with an empty account or amount, yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<BalanceRecord>, ParseError> {
        let Some((account, amount)) = line.split_once(',') else {
            log::trace!("Skipping report line without separator: {:?}", line);
            return Ok(None);
        };

        let account = account.trim();
        let amount = amount.trim();
        if account.is_empty() || amount.is_empty() {
            log::trace!("Skipping incomplete report line: {:?}", line);
            return Ok(None);
        }

        let value = parse_amount(amount).ok_or_else(|| match commodity_of(amount) {
            Some(commodity) => ParseError::UnsupportedCommodity {
                line: line.to_string(),
                amount: amount.to_string(),
                commodity: commodity.to_string(),
            },
            None => ParseError::InvalidAmount {
                line: line.to_string(),
                amount: amount.to_string(),
            },
        })?;

        Ok(Some(BalanceRecord::new(account, value)))
    }
}

/// Parse an amount such as `$1,234.56` or `-$12.00`.
///
/// Thousands separators and dollar signs are removed before parsing.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text.chars().filter(|&c| c != ',' && c != '$').collect();
    Decimal::from_str(cleaned.trim()).ok()
}

/// Commodity symbol of an amount such as `10 EUR` or `AAPL 5`
fn commodity_of(amount: &str) -> Option<&str> {
    let mut parts = amount.split_whitespace();
    let (first, second) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let (number, commodity) = if parse_amount(first).is_some() {
        (first, second)
    } else {
        (second, first)
    };
    let symbol = commodity.trim_matches('"');
    let is_symbol = !symbol.is_empty() && !symbol.chars().any(|c| c.is_ascii_digit());
    (parse_amount(number).is_some() && is_symbol).then_some(symbol)
}

/// Parse `ledger accounts` output: one account per line, blank lines dropped
pub fn parse_account_list(content: &str) -> Vec<String> {
    content
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
