//! Account management for the finance tracker.
//!
//! This module contains everything related to accounts:
//! - The `Account` model and its database functions
//! - The route handlers for listing and creating accounts

mod core;
mod create_endpoint;
mod list_endpoint;

pub use core::{
    Account, AccountId, NewAccount, create_account_table, get_total_account_balance,
    map_account_row,
};
pub use create_endpoint::create_account_endpoint;
pub use list_endpoint::list_accounts_endpoint;

#[cfg(test)]
pub use core::{create_account, get_account, list_accounts};
