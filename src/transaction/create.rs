//! The page and endpoint for creating transactions, including recurring series.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of failing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, HeadElement, base, dollar_input_styles,
        loading_spinner,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        TransactionType,
        core::create_transactions,
        form::{TransactionForm, TransactionFormDefaults, recurrence_fields, transaction_form_fields},
        ledger::ledger_url,
    },
};

/// The state needed by the transaction pages and endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the page for creating a transaction, dated today by default.
pub async fn get_new_transaction_page(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let defaults = TransactionFormDefaults {
        transaction_type: TransactionType::Expense,
        amount: None,
        date: today,
        description: None,
        category_id: None,
    };
    let form = new_transaction_form(&defaults, &categories, false, "", "");

    Ok(new_transaction_view(&form).into_response())
}

/// Handle the new transaction form.
///
/// A recurring transaction is saved as one transaction per month, all or
/// nothing. Redirects to the ledger for the month of the first transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let categories = match get_categories(user_id, None, &connection) {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Failed to retrieve categories: {error}");
            return error.into_alert_response();
        }
    };

    let drafts = match form.to_drafts() {
        Ok(drafts) => drafts,
        Err(error) => {
            return new_transaction_form(
                &TransactionFormDefaults::from(&form),
                &categories,
                form.is_recurring,
                &form.recurring_months,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match create_transactions(user_id, &drafts, &connection) {
        Ok(transactions) => {
            tracing::debug!("created {} transaction(s)", transactions.len());

            (
                HxRedirect(ledger_url(form.date, None, None)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}

fn new_transaction_view(form: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let head_elements: [HeadElement; 1] = [dollar_input_styles()];

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Create Transaction" }

                (form)
            }
        }
    };

    base("Create Transaction", &head_elements, &content)
}

fn new_transaction_form(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
    is_recurring: bool,
    recurring_months: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-disabled-elt="#transaction-submit"
            hx-indicator="#indicator"
            class="w-full space-y-4"
        {
            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            (transaction_form_fields(defaults, categories))

            (recurrence_fields(is_recurring, recurring_months))

            button type="submit" id="transaction-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Transaction"
            }
        }
    }
}
