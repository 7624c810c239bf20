//! Defines the endpoint for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer};

use crate::{
    AppState, Error,
    account::core::{NewAccount, create_account},
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct AccountPayload {
    /// The display name of the account.
    pub name: String,
    /// The account type, e.g. "checking".
    #[serde(rename = "type")]
    pub kind: String,
    /// The starting balance in dollars.
    ///
    /// Defaults to zero when absent or not a number.
    #[serde(default, deserialize_with = "lenient_balance")]
    pub balance: f64,
    /// An opaque display color tag.
    #[serde(default)]
    pub color: Option<String>,
    /// An opaque display icon tag.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Coerce the starting balance to a number.
///
/// Accepts a JSON number or a numeric string, anything else (including null)
/// falls back to zero rather than rejecting the request.
fn lenient_balance<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    let balance = match value {
        Some(serde_json::Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(text)) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };

    Ok(balance)
}

/// A route handler for creating a new account, responds with the created
/// account on success.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Json(payload): Json<AccountPayload>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let new_account = NewAccount {
        name: payload.name,
        kind: payload.kind,
        balance: payload.balance,
        color: payload.color,
        icon: payload.icon,
    };

    match create_account(new_account, &connection) {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(error) => error.into_response(),
    }
}
