//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    account::AccountId,
    category::{CategoryId, get_category_kind},
    database_id::DatabaseId,
};

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = DatabaseId;

/// The number of transactions returned by a listing when the client does not
/// ask for a specific limit.
pub const DEFAULT_TRANSACTION_LIMIT: i64 = 100;

/// Whether a transaction (or category) records money earned or money spent.
///
/// Transaction amounts are stored unsigned, the kind gives the sign: income
/// increases the owning account's balance, expense decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money flowing into an account.
    Income,
    /// Money flowing out of an account.
    Expense,
}

impl TransactionKind {
    /// The wire representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Apply the kind's sign to an unsigned `amount`.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidTransactionKind(other.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// A single dated monetary movement affecting exactly one account and one
/// category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The unsigned amount of money moved in this transaction.
    pub amount: f64,
    /// Optional text detailing the transaction.
    pub description: Option<String>,
    /// The ID of the account the transaction was posted against.
    pub account_id: AccountId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The calendar date when the transaction happened.
    ///
    /// Distinct from `created_at`, which records when the row was inserted.
    pub date: Date,
    /// When the transaction was recorded, as reported by the database.
    pub created_at: String,
}

/// A transaction joined with the display fields of its account and category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionEntry {
    /// The transaction itself.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The name of the owning account.
    pub account_name: String,
    /// The name of the owning category.
    pub category_name: String,
    /// The icon tag of the owning category.
    pub category_icon: Option<String>,
    /// The color tag of the owning category.
    pub category_color: Option<String>,
}

/// The data required to create a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The unsigned amount of money moved, must be a positive number.
    pub amount: f64,
    /// Optional text detailing the transaction.
    pub description: Option<String>,
    /// The ID of the account to post the transaction against.
    pub account_id: AccountId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The calendar date when the transaction happened.
    pub date: Date,
}

/// Create the table for storing transactions.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            kind TEXT NOT NULL,
            amount REAL NOT NULL,
            description TEXT,
            account_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(account_id) REFERENCES account(id),
            FOREIGN KEY(category_id) REFERENCES category(id)
        )",
        (),
    )?;

    Ok(())
}

/// Convert a database row into a [Transaction].
///
/// The row must contain the columns `id, kind, amount, description,
/// account_id, category_id, date, created_at` in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        kind: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        account_id: row.get(4)?,
        category_id: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_transaction_entry_row(row: &Row) -> Result<TransactionEntry, rusqlite::Error> {
    Ok(TransactionEntry {
        transaction: map_transaction_row(row)?,
        account_name: row.get(8)?,
        category_name: row.get(9)?,
        category_icon: row.get(10)?,
        category_color: row.get(11)?,
    })
}

/// Create a new transaction in the database and adjust the owning account's
/// balance by the signed amount.
///
/// Both writes happen inside a single SQL transaction: either the row is
/// inserted and the balance updated, or neither change is visible.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a positive number,
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - [Error::CategoryKindMismatch] if the transaction type does not agree with
///   the category's type,
/// - [Error::InvalidAccount] if the account ID does not refer to a real account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let amount = new_transaction.amount;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    // Dropping the SQL transaction without committing rolls everything back,
    // so the early returns below cannot leave an orphaned row or a half
    // applied balance update.
    let sql_transaction = connection.transaction()?;

    let category_kind = get_category_kind(new_transaction.category_id, &sql_transaction)?;
    if category_kind != new_transaction.kind {
        return Err(Error::CategoryKindMismatch {
            transaction: new_transaction.kind,
            category: category_kind,
        });
    }

    let updated_rows = sql_transaction.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2",
        params![
            new_transaction.kind.signed(amount),
            new_transaction.account_id
        ],
    )?;

    if updated_rows == 0 {
        return Err(Error::InvalidAccount(new_transaction.account_id));
    }

    sql_transaction.execute(
        "INSERT INTO \"transaction\" (kind, amount, description, account_id, category_id, date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new_transaction.kind,
            amount,
            new_transaction.description,
            new_transaction.account_id,
            new_transaction.category_id,
            new_transaction.date
        ],
    )?;

    let id = sql_transaction.last_insert_rowid();

    let transaction = sql_transaction
        .prepare(
            "SELECT id, kind, amount, description, account_id, category_id, date, created_at
            FROM \"transaction\" WHERE id = ?1",
        )?
        .query_row(params![id], map_transaction_row)?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Get up to `limit` transactions joined with account and category display
/// fields, newest first.
///
/// Transactions are ordered by transaction date descending, then by creation
/// time descending.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    connection: &Connection,
    limit: i64,
) -> Result<Vec<TransactionEntry>, Error> {
    connection
        .prepare(
            "SELECT
                t.id, t.kind, t.amount, t.description, t.account_id, t.category_id,
                t.date, t.created_at,
                a.name, c.name, c.icon, c.color
            FROM \"transaction\" t
            INNER JOIN account a ON t.account_id = a.id
            INNER JOIN category c ON t.category_id = c.id
            ORDER BY t.date DESC, t.created_at DESC, t.id DESC
            LIMIT ?1",
        )?
        .query_map(params![limit], map_transaction_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Count the transactions in the database.
pub fn count_transactions(connection: &Connection) -> Result<i64, Error> {
    let count = connection
        .prepare("SELECT COUNT(*) FROM \"transaction\"")?
        .query_row([], |row| row.get(0))?;

    Ok(count)
}

#[cfg(test)]
mod transaction_kind_tests {
    use crate::Error;

    use super::TransactionKind;

    #[test]
    fn parses_wire_strings() {
        assert_eq!("income".parse(), Ok(TransactionKind::Income));
        assert_eq!("expense".parse(), Ok(TransactionKind::Expense));
    }

    #[test]
    fn rejects_unknown_strings() {
        let maybe_kind = "transfer".parse::<TransactionKind>();

        assert_eq!(
            maybe_kind,
            Err(Error::InvalidTransactionKind("transfer".to_owned()))
        );
    }

    #[test]
    fn signs_amounts_by_kind() {
        assert_eq!(TransactionKind::Income.signed(25.0), 25.0);
        assert_eq!(TransactionKind::Expense.signed(25.0), -25.0);
    }
}



#[cfg(test)]
mod list_transactions_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        account::{AccountId, NewAccount, create_account},
        db::initialize,
    };

    use super::{NewTransaction, TransactionKind, create_transaction, list_transactions};

    const SALARY_CATEGORY: i64 = 1;
    const FOOD_CATEGORY: i64 = 5;

    fn get_test_connection_with_account() -> (Connection, AccountId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let account = create_account(
            NewAccount {
                name: "Wallet".to_owned(),
                kind: "cash".to_owned(),
                balance: 0.0,
                color: None,
                icon: None,
            },
            &conn,
        )
        .unwrap();

        (conn, account.id)
    }

    fn insert_transaction(
        conn: &mut Connection,
        account_id: AccountId,
        kind: TransactionKind,
        category_id: i64,
        date: time::Date,
    ) {
        create_transaction(
            NewTransaction {
                kind,
                amount: 10.0,
                description: None,
                account_id,
                category_id,
                date,
            },
            conn,
        )
        .unwrap();
    }

    #[test]
    fn returns_empty_list_for_no_transactions() {
        let (conn, _) = get_test_connection_with_account();

        let transactions = list_transactions(&conn, 100).unwrap();

        assert_eq!(transactions, []);
    }

    #[test]
    fn joins_account_and_category_display_fields() {
        let (mut conn, account_id) = get_test_connection_with_account();
        insert_transaction(
            &mut conn,
            account_id,
            TransactionKind::Expense,
            FOOD_CATEGORY,
            date!(2024 - 06 - 01),
        );

        let transactions = list_transactions(&conn, 100).unwrap();

        assert_eq!(transactions.len(), 1);
        let entry = &transactions[0];
        assert_eq!(entry.account_name, "Wallet");
        assert_eq!(entry.category_name, "Food");
        assert_eq!(entry.category_icon.as_deref(), Some("utensils"));
        assert_eq!(entry.category_color.as_deref(), Some("#ef4444"));
    }

    #[test]
    fn orders_by_date_then_creation_descending() {
        let (mut conn, account_id) = get_test_connection_with_account();

        insert_transaction(
            &mut conn,
            account_id,
            TransactionKind::Expense,
            FOOD_CATEGORY,
            date!(2024 - 06 - 01),
        );
        insert_transaction(
            &mut conn,
            account_id,
            TransactionKind::Income,
            SALARY_CATEGORY,
            date!(2024 - 06 - 15),
        );
        insert_transaction(
            &mut conn,
            account_id,
            TransactionKind::Expense,
            FOOD_CATEGORY,
            date!(2024 - 06 - 15),
        );

        let transactions = list_transactions(&conn, 100).unwrap();

        let dates: Vec<time::Date> = transactions
            .iter()
            .map(|entry| entry.transaction.date)
            .collect();
        assert_eq!(
            dates,
            [
                date!(2024 - 06 - 15),
                date!(2024 - 06 - 15),
                date!(2024 - 06 - 01)
            ]
        );
        // Same-date transactions come back most recently created first.
        assert_eq!(transactions[0].transaction.id, 3);
        assert_eq!(transactions[1].transaction.id, 2);
    }

    #[test]
    fn respects_the_limit() {
        let (mut conn, account_id) = get_test_connection_with_account();

        for _ in 0..5 {
            insert_transaction(
                &mut conn,
                account_id,
                TransactionKind::Expense,
                FOOD_CATEGORY,
                date!(2024 - 06 - 01),
            );
        }

        let transactions = list_transactions(&conn, 3).unwrap();

        assert_eq!(transactions.len(), 3);
    }
}
