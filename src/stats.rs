//! Aggregate statistics derived from the current account and transaction state.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, account::get_total_account_balance, timezone::get_local_offset,
    transaction::TransactionKind,
};

/// Derived aggregate figures computed on demand from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// The number of accounts.
    pub total_accounts: i64,
    /// The sum of all account balances, zero if there are no accounts.
    pub total_balance: f64,
    /// The sum of income transaction amounts dated in the current calendar month.
    pub monthly_income: f64,
    /// The sum of expense transaction amounts dated in the current calendar month.
    pub monthly_expense: f64,
}

/// The year-month prefix of `date` in the same form dates are stored, e.g.
/// "2024-06" for any day in June 2024.
fn month_prefix(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

fn sum_for_month(
    kind: TransactionKind,
    prefix: &str,
    connection: &Connection,
) -> Result<f64, Error> {
    let total = connection
        .prepare(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
            WHERE kind = ?1 AND date LIKE ?2",
        )?
        .query_row(params![kind, format!("{prefix}%")], |row| row.get(0))?;

    Ok(total)
}

/// Compute the aggregate statistics, with the monthly figures covering the
/// calendar month that `today` falls in.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn compute_stats(connection: &Connection, today: Date) -> Result<Stats, Error> {
    let total_accounts = connection
        .prepare("SELECT COUNT(*) FROM account")?
        .query_row([], |row| row.get(0))?;
    let total_balance = get_total_account_balance(connection)?;

    let prefix = month_prefix(today);
    let monthly_income = sum_for_month(TransactionKind::Income, &prefix, connection)?;
    let monthly_expense = sum_for_month(TransactionKind::Expense, &prefix, connection)?;

    Ok(Stats {
        total_accounts,
        total_balance,
        monthly_income,
        monthly_expense,
    })
}

/// The state needed to compute stats.
#[derive(Debug, Clone)]
pub struct GetStatsState {
    /// The database connection for reading accounts and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical timezone used to decide which month "now" falls in.
    pub local_timezone: String,
}

impl FromRef<AppState> for GetStatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for computing the aggregate statistics on demand.
pub async fn get_stats_endpoint(State(state): State<GetStatsState>) -> Response {
    let Some(offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezone(state.local_timezone).into_response();
    };
    let today = OffsetDateTime::now_utc().to_offset(offset).date();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match compute_stats(&connection, today) {
        Ok(stats) => Json(stats).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod compute_stats_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        account::{NewAccount, create_account, list_accounts},
        db::initialize,
        transaction::{NewTransaction, TransactionKind, create_transaction},
    };

    use super::{Stats, compute_stats};

    const SALARY_CATEGORY: i64 = 1;
    const FOOD_CATEGORY: i64 = 5;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_account(name: &str, balance: f64, conn: &Connection) -> i64 {
        create_account(
            NewAccount {
                name: name.to_owned(),
                kind: "checking".to_owned(),
                balance,
                color: None,
                icon: None,
            },
            conn,
        )
        .unwrap()
        .id
    }

    fn insert_transaction(
        kind: TransactionKind,
        amount: f64,
        account_id: i64,
        date: time::Date,
        conn: &mut Connection,
    ) {
        let category_id = match kind {
            TransactionKind::Income => SALARY_CATEGORY,
            TransactionKind::Expense => FOOD_CATEGORY,
        };

        create_transaction(
            NewTransaction {
                kind,
                amount,
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
    fn returns_zeroes_for_empty_database() {
        let conn = get_test_connection();

        let stats = compute_stats(&conn, date!(2024 - 06 - 15)).unwrap();

        assert_eq!(
            stats,
            Stats {
                total_accounts: 0,
                total_balance: 0.0,
                monthly_income: 0.0,
                monthly_expense: 0.0,
            }
        );
    }

    #[test]
    fn expense_in_current_month_is_counted_and_balance_updated() {
        let mut conn = get_test_connection();
        let account_id = insert_account("Wallet", 100.0, &conn);

        insert_transaction(
            TransactionKind::Expense,
            30.0,
            account_id,
            date!(2024 - 06 - 01),
            &mut conn,
        );

        let stats = compute_stats(&conn, date!(2024 - 06 - 15)).unwrap();

        assert_eq!(stats.total_accounts, 1);
        assert_eq!(stats.total_balance, 70.0);
        assert_eq!(stats.monthly_income, 0.0);
        assert_eq!(stats.monthly_expense, 30.0);
    }

    #[test]
    fn transactions_in_other_months_are_excluded() {
        let mut conn = get_test_connection();
        let account_id = insert_account("Wallet", 0.0, &conn);

        insert_transaction(
            TransactionKind::Income,
            500.0,
            account_id,
            date!(2024 - 05 - 31),
            &mut conn,
        );
        insert_transaction(
            TransactionKind::Income,
            200.0,
            account_id,
            date!(2024 - 06 - 01),
            &mut conn,
        );
        insert_transaction(
            TransactionKind::Expense,
            50.0,
            account_id,
            date!(2023 - 06 - 15),
            &mut conn,
        );

        let stats = compute_stats(&conn, date!(2024 - 06 - 15)).unwrap();

        assert_eq!(stats.monthly_income, 200.0);
        assert_eq!(stats.monthly_expense, 0.0);
        assert_eq!(stats.total_balance, 650.0);
    }

    #[test]
    fn total_balance_matches_the_sum_of_listed_accounts() {
        let mut conn = get_test_connection();
        let first = insert_account("Wallet", 100.0, &conn);
        insert_account("Savings", 900.0, &conn);

        insert_transaction(
            TransactionKind::Expense,
            25.0,
            first,
            date!(2024 - 06 - 02),
            &mut conn,
        );

        let stats = compute_stats(&conn, date!(2024 - 06 - 15)).unwrap();
        let listed_total: f64 = list_accounts(&conn)
            .unwrap()
            .iter()
            .map(|account| account.balance)
            .sum();

        assert_eq!(stats.total_balance, listed_total);
    }

    #[test]
    fn stats_serialize_with_camel_case_keys() {
        let stats = Stats {
            total_accounts: 1,
            total_balance: 70.0,
            monthly_income: 0.0,
            monthly_expense: 30.0,
        };

        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["totalAccounts"], 1);
        assert_eq!(json["totalBalance"], 70.0);
        assert_eq!(json["monthlyIncome"], 0.0);
        assert_eq!(json["monthlyExpense"], 30.0);
    }
}
