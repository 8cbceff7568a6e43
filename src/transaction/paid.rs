//! Endpoint for marking a transaction as paid or unpaid from the ledger.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::UserID,
    category::get_category,
    transaction::{
        TransactionId, core::toggle_paid, create::TransactionState, ledger::transaction_row,
    },
};

/// Flip the paid status of a transaction and return its updated ledger row.
pub async fn toggle_paid_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction = match toggle_paid(transaction_id, user_id, &connection) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::error!("Could not toggle paid status of transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    let category_name = transaction.category_id.and_then(|category_id| {
        get_category(category_id, user_id, &connection)
            .inspect_err(|error| {
                tracing::error!("Could not get category {category_id}: {error}")
            })
            .ok()
            .map(|category| category.name.to_string())
    });

    transaction_row(&transaction, category_name.as_deref()).into_response()
}
