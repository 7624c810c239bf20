//! Defines the core data model and database queries for accounts.

use rusqlite::{Connection, Row, params};
use serde::Serialize;

use crate::{Error, database_id::DatabaseId};

/// Alias for the integer type used for account IDs.
pub type AccountId = DatabaseId;

/// A named store of monetary value with a running balance.
///
/// The balance is only ever changed by posting transactions against the
/// account, starting from the balance supplied at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The display name of the account.
    pub name: String,
    /// The account type, e.g. "checking", "savings", "credit" or "cash".
    ///
    /// Stored as an opaque string, display conventions are a client concern.
    #[serde(rename = "type")]
    pub kind: String,
    /// The current balance in dollars.
    pub balance: f64,
    /// An opaque display color tag, e.g. "#3b82f6".
    pub color: Option<String>,
    /// An opaque display icon tag, e.g. "wallet".
    pub icon: Option<String>,
    /// When the account was created, as recorded by the database.
    pub created_at: String,
}

/// The data required to create an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    /// The display name of the account.
    pub name: String,
    /// The account type, e.g. "checking".
    pub kind: String,
    /// The starting balance in dollars.
    pub balance: f64,
    /// An opaque display color tag.
    pub color: Option<String>,
    /// An opaque display icon tag.
    pub icon: Option<String>,
}

/// Create the table for storing accounts.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            balance REAL NOT NULL DEFAULT 0,
            color TEXT,
            icon TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        (),
    )?;

    Ok(())
}

/// Convert a database row into an [Account].
///
/// The row must contain the columns `id, name, kind, balance, color, icon,
/// created_at` in that order.
pub fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        balance: row.get(3)?,
        color: row.get(4)?,
        icon: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Get all accounts, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn list_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, balance, color, icon, created_at
            FROM account
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map([], map_account_row)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Create a new account in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyAccountName] if `name` is empty,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(new_account: NewAccount, connection: &Connection) -> Result<Account, Error> {
    if new_account.name.trim().is_empty() {
        return Err(Error::EmptyAccountName);
    }

    connection.execute(
        "INSERT INTO account (name, kind, balance, color, icon) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_account.name,
            new_account.kind,
            new_account.balance,
            new_account.color,
            new_account.icon
        ],
    )?;

    let id = connection.last_insert_rowid();

    // Fetch the row back so the response carries the database's creation timestamp.
    get_account(id, connection)
}

/// Retrieve a single account by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a valid account, or
/// [Error::SqlError] if there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, balance, color, icon, created_at
            FROM account WHERE id = ?1",
        )?
        .query_row(params![id], map_account_row)
        .map_err(Error::from)
}

/// Get the total balance across all accounts.
///
/// Returns zero when there are no accounts.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_total_account_balance(connection: &Connection) -> Result<f64, Error> {
    let mut stmt = connection.prepare("SELECT COALESCE(SUM(balance), 0) FROM account")?;

    let total: f64 = stmt.query_row([], |row| row.get(0))?;

    Ok(total)
}



#[cfg(test)]
mod list_accounts_tests {
    use rusqlite::Connection;

    use super::{NewAccount, create_account, create_account_table, list_accounts};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_account_table(&conn).unwrap();
        conn
    }

    #[test]
    fn returns_empty_list_for_no_accounts() {
        let conn = get_test_connection();

        let accounts = list_accounts(&conn).unwrap();

        assert_eq!(accounts, []);
    }

    #[test]
    fn returns_accounts_newest_first() {
        let conn = get_test_connection();

        for name in ["first", "second", "third"] {
            create_account(
                NewAccount {
                    name: name.to_owned(),
                    kind: "cash".to_owned(),
                    balance: 0.0,
                    color: None,
                    icon: None,
                },
                &conn,
            )
            .unwrap();
        }

        let accounts = list_accounts(&conn).unwrap();

        let names: Vec<&str> = accounts
            .iter()
            .map(|account| account.name.as_str())
            .collect();
        assert_eq!(names, ["third", "second", "first"]);
    }
}
