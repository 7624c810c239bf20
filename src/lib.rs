//! Centavo is a self-hosted tracker for personal finances.
//!
//! This library provides a JSON REST API for managing monetary accounts,
//! categorized income/expense transactions, and the aggregate statistics
//! derived from them. All state lives in a single SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod account;
mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod routing;
mod stats;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

use crate::{account::AccountId, category::CategoryId, transaction::TransactionKind};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create an account name.
    #[error("account name cannot be empty")]
    EmptyAccountName,

    /// A transaction amount that is not a positive number was used to create
    /// a transaction.
    ///
    /// Amounts are unsigned, the direction of the money flow is given by the
    /// transaction type.
    #[error("{0} is not a valid transaction amount, the amount must be a positive number")]
    InvalidAmount(f64),

    /// A string other than "income" or "expense" was used as a transaction type.
    #[error("\"{0}\" is not a valid transaction type, expected \"income\" or \"expense\"")]
    InvalidTransactionKind(String),

    /// The transaction type did not agree with the type of the referenced category.
    #[error("transaction type {transaction} does not match the category type {category}")]
    CategoryKindMismatch {
        /// The type that the client supplied for the transaction.
        transaction: TransactionKind,
        /// The type of the referenced category.
        category: TransactionKind,
    },

    /// The account ID used to create a transaction did not match a valid account.
    #[error("the account ID {0} does not refer to a valid account")]
    InvalidAccount(AccountId),

    /// The category ID used to create a transaction did not match a valid category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// An error occurred while getting the local offset from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::EmptyAccountName
            | Error::InvalidAmount(_)
            | Error::InvalidTransactionKind(_)
            | Error::CategoryKindMismatch { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::InvalidAccount(_) | Error::InvalidCategory(_) | Error::NotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Error::InvalidTimezone(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            // Storage errors are not intended to be shown to the client.
            Error::DatabaseLockError | Error::SqlError(_) => {
                tracing::error!("An unexpected error occurred: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "something went wrong, check the server logs".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
