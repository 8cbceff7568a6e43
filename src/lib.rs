//! Nest Egg is a web app for tracking personal income, expenses, savings goals
//! and shopping lists.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod goal;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod month_window;
mod navigation;
mod not_found;
mod pagination;
mod profile;
mod routing;
mod shopping;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Money;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    alert::Alert, category::CategoryId, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
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

/// Parse a count typed into a form, e.g. a number of months.
///
/// Blank input gives `None` so callers can apply their own default.
///
/// # Errors
/// Returns [Error::InvalidNumber] if the input is not a non-negative whole number.
pub(crate) fn parse_whole_number(raw: &str) -> Result<Option<u32>, Error> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse()
        .map(Some)
        .map_err(|_| Error::InvalidNumber(trimmed.to_owned()))
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an unknown email or the wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token in the cookie has passed its expiry time.
    #[error("the session has expired")]
    SessionExpired,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email address is already used by another account.
    #[error("an account with this email address already exists")]
    DuplicateEmail,

    /// A monetary amount was negative, had more than two decimal places, or
    /// was not a number.
    #[error("\"{0}\" is not a valid amount, enter a positive number with at most two decimal places")]
    InvalidAmount(String),

    /// A form field that takes a count, such as a number of months, was not
    /// a whole number.
    #[error("\"{0}\" is not a whole number")]
    InvalidNumber(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The user already has a category with the same name and type.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID used for a transaction does not refer to one of the
    /// user's categories of the same type.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// An empty string was used to create a goal name.
    #[error("Goal name cannot be empty")]
    EmptyGoalName,

    /// A goal was given a target amount of zero.
    #[error("Target amount must be greater than zero")]
    InvalidTargetAmount,

    /// A goal was given zero months to complete.
    #[error("Months to complete must be at least 1")]
    InvalidMonthsToComplete,

    /// The number of months for a recurring transaction is outside the
    /// accepted range.
    #[error("Recurring months must be between 1 and {max}, got {0}", max = transaction::MAX_RECURRING_MONTHS)]
    InvalidRecurringMonths(u32),

    /// Month arithmetic produced a date outside the supported calendar range.
    #[error("the date is outside the supported range")]
    DateOutOfRange,

    /// An empty string was used to create a shopping list name.
    #[error("List name cannot be empty")]
    EmptyShoppingListName,

    /// An empty string was used to create a shopping item name.
    #[error("Item name cannot be empty")]
    EmptyItemName,

    /// A shopping item quantity was less than one.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// An empty string was used for the profile name.
    #[error("Name cannot be empty")]
    EmptyProfileName,

    /// The photo URL is not an http(s) URL.
    #[error("\"{0}\" is not a valid photo URL, it must start with http:// or https://")]
    InvalidPhotoUrl(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to update a contribution that does not exist
    #[error("tried to update a contribution that is not in the database")]
    UpdateMissingContribution,

    /// Tried to delete a contribution that does not exist
    #[error("tried to delete a contribution that is not in the database")]
    DeleteMissingContribution,

    /// Tried to delete a shopping list that does not exist
    #[error("tried to delete a shopping list that is not in the database")]
    DeleteMissingShoppingList,

    /// Tried to update a shopping item that does not exist
    #[error("tried to update a shopping item that is not in the database")]
    UpdateMissingShoppingItem,

    /// Tried to delete a shopping item that does not exist
    #[error("tried to delete a shopping item that is not in the database")]
    DeleteMissingShoppingItem,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
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
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for HTMX requests.
    fn into_alert_response(self) -> Response {
        let (status, message, details) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings",
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                "Invalid category",
                format!("Could not find a matching category with the ID {category_id:?}"),
            ),
            Error::DuplicateCategoryName(name) => (
                StatusCode::BAD_REQUEST,
                "Duplicate category",
                format!(
                    "The category \"{name}\" already exists. Choose a different name, \
                    or delete the existing category."
                ),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "Not found",
                "The requested item could not be found. \
                Try refreshing the page to see if it has been deleted."
                    .to_owned(),
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                "Could not update transaction",
                "The transaction could not be found.".to_owned(),
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingGoal => (
                StatusCode::NOT_FOUND,
                "Could not delete goal",
                "The goal could not be found. \
                Try refreshing the page to see if the goal has already been deleted."
                    .to_owned(),
            ),
            Error::UpdateMissingContribution => (
                StatusCode::NOT_FOUND,
                "Could not update contribution",
                "The contribution could not be found. No changes were made.".to_owned(),
            ),
            Error::DeleteMissingContribution => (
                StatusCode::NOT_FOUND,
                "Could not delete contribution",
                "The contribution could not be found. \
                Try refreshing the page to see if the contribution has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingShoppingList => (
                StatusCode::NOT_FOUND,
                "Could not delete list",
                "The shopping list could not be found. \
                Try refreshing the page to see if the list has already been deleted."
                    .to_owned(),
            ),
            Error::UpdateMissingShoppingItem => (
                StatusCode::NOT_FOUND,
                "Could not update item",
                "The item could not be found.".to_owned(),
            ),
            Error::DeleteMissingShoppingItem => (
                StatusCode::NOT_FOUND,
                "Could not delete item",
                "The item could not be found. \
                Try refreshing the page to see if the item has already been deleted."
                    .to_owned(),
            ),
            Error::DatabaseLockError | Error::SqlError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not save changes",
                "No changes were made. Try again or check the server logs.".to_owned(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.".to_owned(),
            ),
        };

        Alert::Error {
            message: message.to_owned(),
            details,
        }
        .into_response_with_status(status)
    }
}
