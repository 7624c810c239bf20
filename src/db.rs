//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    account::create_account_table,
    category::{create_category_table, seed_default_categories},
    transaction::create_transaction_table,
};

/// Create the tables for the domain models and seed the default categories.
///
/// Initialization is idempotent: tables are created with `IF NOT EXISTS` and
/// the default categories are only inserted when the category table is empty,
/// so running this against an existing database changes nothing.
///
/// # Errors
/// Returns an error if the schema could not be created or seeded.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_table(&sql_transaction)?;
    create_category_table(&sql_transaction)?;
    create_transaction_table(&sql_transaction)?;

    seed_default_categories(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}
