//! Defines the endpoint for listing accounts.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, account::core::list_accounts};

/// The state needed to list accounts.
#[derive(Debug, Clone)]
pub struct ListAccountsState {
    /// The database connection for reading accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListAccountsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all accounts, newest first.
pub async fn list_accounts_endpoint(State(state): State<ListAccountsState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match list_accounts(&connection) {
        Ok(accounts) => Json(accounts).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;

    use crate::{
        account::{NewAccount, create_account, list_accounts_endpoint},
        db::initialize,
    };

    use super::ListAccountsState;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[tokio::test]
    async fn returns_accounts_as_json() {
        let conn = get_test_connection();
        let want = create_account(
            NewAccount {
                name: "Wallet".to_owned(),
                kind: "cash".to_owned(),
                balance: 100.0,
                color: None,
                icon: Some("wallet".to_owned()),
            },
            &conn,
        )
        .unwrap();
        let state = ListAccountsState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let response = list_accounts_endpoint(State(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let accounts: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0]["id"], want.id);
        assert_eq!(accounts[0]["name"], "Wallet");
        assert_eq!(accounts[0]["type"], "cash");
        assert_eq!(accounts[0]["balance"], 100.0);
        assert_eq!(accounts[0]["icon"], "wallet");
    }

    #[tokio::test]
    async fn returns_empty_json_array_for_no_accounts() {
        let state = ListAccountsState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let response = list_accounts_endpoint(State(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let accounts: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();

        assert!(accounts.is_empty());
    }
}
