//! Defines the endpoint for listing transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    transaction::core::{DEFAULT_TRANSACTION_LIMIT, list_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsParams {
    /// The maximum number of transactions to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_TRANSACTION_LIMIT
}

/// SQLite treats a negative LIMIT as "no limit", so non-positive values fall
/// back to the default instead of returning the whole table.
fn effective_limit(limit: i64) -> i64 {
    if limit <= 0 { DEFAULT_TRANSACTION_LIMIT } else { limit }
}

/// A route handler for listing transactions joined with account and category
/// display fields, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(params): Query<ListTransactionsParams>,
) -> Response {
    let limit = effective_limit(params.limit);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match list_transactions(&connection, limit) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_response(),
    }
}
