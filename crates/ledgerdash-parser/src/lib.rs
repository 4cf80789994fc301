//! Parser for ledger CLI report output
//!
//! ledger owns the journal format; this crate only reads the text its
//! reports print, one `account,amount` record per line.

pub mod error;
pub mod parser;
pub mod types;

pub use error::ParseError;
pub use parser::{parse_account_list, parse_amount, BalanceOutputParser};
pub use types::BalanceRecord;

/// Parse a balance report into records, in output order
pub fn parse_balance_output(content: &str) -> Result<Vec<BalanceRecord>, ParseError> {
    BalanceOutputParser::parse(content)
}
