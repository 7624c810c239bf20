//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its kind enum and database functions
//! - The atomic insert-plus-balance-update write path
//! - The route handlers for listing and creating transactions

mod core;
mod create_endpoint;
mod list_endpoint;

pub use core::{
    DEFAULT_TRANSACTION_LIMIT, NewTransaction, Transaction, TransactionEntry, TransactionId,
    TransactionKind, create_transaction_table, map_transaction_row,
};
pub use create_endpoint::create_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;

#[cfg(test)]
pub use core::{count_transactions, create_transaction};
