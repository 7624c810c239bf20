//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::AccountId,
    category::CategoryId,
    transaction::core::{NewTransaction, TransactionKind, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionPayload {
    /// The transaction type, "income" or "expense".
    ///
    /// Kept as a string so unknown values produce the crate's own validation
    /// error instead of a generic deserialization failure.
    #[serde(rename = "type")]
    pub kind: String,
    /// The unsigned amount of money moved in this transaction.
    pub amount: f64,
    /// Optional text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// The ID of the account to post the transaction against.
    pub account_id: AccountId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The calendar date when the transaction happened.
    pub date: Date,
}

/// A route handler for creating a new transaction.
///
/// On success the referenced account's balance has been adjusted by the
/// signed amount and the created transaction is returned.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Json(payload): Json<TransactionPayload>,
) -> Response {
    let kind: TransactionKind = match payload.kind.parse() {
        Ok(kind) => kind,
        Err(error) => return error.into_response(),
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let new_transaction = NewTransaction {
        kind,
        amount: payload.amount,
        description: payload.description,
        account_id: payload.account_id,
        category_id: payload.category_id,
        date: payload.date,
    };

    match create_transaction(new_transaction, &mut connection) {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(error) => error.into_response(),
    }
}
