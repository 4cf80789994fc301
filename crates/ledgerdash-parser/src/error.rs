//! Error types for ledgerdash-parser

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid amount '{amount}' in line '{line}'")]
    InvalidAmount { line: String, amount: String },

    #[error("Unsupported commodity '{commodity}' in line '{line}'")]
    UnsupportedCommodity {
        line: String,
        amount: String,
        commodity: String,
    },
}
