//! Defines the core data model and database queries for categories.

use rusqlite::{Connection, Row, params};
use serde::Serialize;

use crate::{Error, database_id::DatabaseId, transaction::TransactionKind};

/// Alias for the integer type used for category IDs.
pub type CategoryId = DatabaseId;

/// A named classification of income or expense, used to tag transactions.
///
/// Categories are seeded once at first startup and are immutable afterwards,
/// there is no update or delete path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: String,
    /// Whether the category classifies income or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// An opaque display icon tag, e.g. "utensils".
    pub icon: Option<String>,
    /// An opaque display color tag, e.g. "#ef4444".
    pub color: Option<String>,
    /// When the category was created, as recorded by the database.
    pub created_at: String,
}

/// The fixed category set inserted the first time the database is initialized.
pub const DEFAULT_CATEGORIES: [(&str, TransactionKind, &str, &str); 12] = [
    ("Salary", TransactionKind::Income, "briefcase", "#10b981"),
    ("Freelance", TransactionKind::Income, "laptop", "#06b6d4"),
    (
        "Investments",
        TransactionKind::Income,
        "trending-up",
        "#8b5cf6",
    ),
    (
        "Other income",
        TransactionKind::Income,
        "plus-circle",
        "#22c55e",
    ),
    ("Food", TransactionKind::Expense, "utensils", "#ef4444"),
    ("Transport", TransactionKind::Expense, "car", "#f59e0b"),
    ("Housing", TransactionKind::Expense, "home", "#3b82f6"),
    ("Health", TransactionKind::Expense, "heart", "#ec4899"),
    ("Entertainment", TransactionKind::Expense, "film", "#a855f7"),
    ("Education", TransactionKind::Expense, "book", "#6366f1"),
    ("Clothing", TransactionKind::Expense, "shirt", "#14b8a6"),
    (
        "Other expenses",
        TransactionKind::Expense,
        "minus-circle",
        "#f87171",
    ),
];

/// Create the table for storing categories.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            icon TEXT,
            color TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        (),
    )?;

    Ok(())
}

/// Insert the default category set if the category table is empty.
///
/// Running this against a non-empty table inserts nothing, so repeated
/// initialization does not duplicate rows.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let count: i64 = connection
        .prepare("SELECT COUNT(*) FROM category")?
        .query_row([], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    let mut statement =
        connection.prepare("INSERT INTO category (name, kind, icon, color) VALUES (?1, ?2, ?3, ?4)")?;

    for (name, kind, icon, color) in DEFAULT_CATEGORIES {
        statement.execute(params![name, kind, icon, color])?;
    }

    Ok(())
}

/// Convert a database row into a [Category].
///
/// The row must contain the columns `id, name, kind, icon, color, created_at`
/// in that order.
pub fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        icon: row.get(3)?,
        color: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Get all categories, ordered by name ascending.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn list_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, icon, color, created_at
            FROM category
            ORDER BY name ASC",
        )?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Get the type of the category with `id`.
///
/// # Errors
/// Returns [Error::InvalidCategory] if `id` does not refer to a valid
/// category, or [Error::SqlError] if there is some other SQL error.
pub fn get_category_kind(id: CategoryId, connection: &Connection) -> Result<TransactionKind, Error> {
    connection
        .prepare("SELECT kind FROM category WHERE id = ?1")?
        .query_row(params![id], |row| row.get(0))
        .map_err(|error| match error {
            // A 'not found' error does not make sense while validating a
            // reference, so we instead report the foreign key as invalid.
            rusqlite::Error::QueryReturnedNoRows => Error::InvalidCategory(id),
            error => error.into(),
        })
}

/// Count the categories in the database.
pub fn count_categories(connection: &Connection) -> Result<i64, Error> {
    let count = connection
        .prepare("SELECT COUNT(*) FROM category")?
        .query_row([], |row| row.get(0))?;

    Ok(count)
}
