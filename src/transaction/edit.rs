//! The page and endpoint for editing a single transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    auth::UserID,
    category::{Category, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, HeadElement, base, dollar_input_styles,
        loading_spinner,
    },
    navigation::NavBar,
    transaction::{
        TransactionId,
        core::{get_transaction, update_transaction},
        create::TransactionState,
        form::{TransactionForm, TransactionFormDefaults, transaction_form_fields},
        ledger::ledger_url,
    },
};

/// Render the form for editing one of the user's transactions.
///
/// Redirects to the ledger if the transaction does not exist.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = match get_transaction(transaction_id, user_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => {
            return Ok(Redirect::to(endpoints::TRANSACTIONS_VIEW).into_response());
        }
        Err(error) => {
            tracing::error!("Could not get transaction {transaction_id}: {error}");
            return Err(error);
        }
    };

    let categories = get_categories(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let amount = transaction.amount.to_string();
    let defaults = TransactionFormDefaults {
        amount: Some(&amount),
        ..TransactionFormDefaults::from(&transaction)
    };
    let form = edit_transaction_form(transaction_id, &defaults, &categories, "");

    Ok(edit_transaction_view(&form).into_response())
}

/// Handle the edit transaction form.
///
/// Only the fields of the one transaction are changed, other months of a
/// recurring series are left alone.
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
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

    let changes = match form.to_draft() {
        Ok(changes) => changes,
        Err(error) => {
            let categories = match get_categories(user_id, None, &connection) {
                Ok(categories) => categories,
                Err(error) => {
                    tracing::error!("Failed to retrieve categories: {error}");
                    return error.into_alert_response();
                }
            };

            return edit_transaction_form(
                transaction_id,
                &TransactionFormDefaults::from(&form),
                &categories,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match update_transaction(transaction_id, user_id, &changes, &connection) {
        Ok(()) => (
            HxRedirect(ledger_url(changes.date, None, None)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_transaction_view(form: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let head_elements: [HeadElement; 1] = [dollar_input_styles()];

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit Transaction" }

                (form)
            }
        }
    };

    base("Edit Transaction", &head_elements, &content)
}

fn edit_transaction_form(
    transaction_id: TransactionId,
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
    error_message: &str,
) -> Markup {
    let update_url = format_endpoint(endpoints::TRANSACTION, transaction_id);

    html! {
        form
            hx-put=(update_url)
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

            button type="submit" id="transaction-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Update Transaction"
            }
        }
    }
}


#[cfg(test)]
mod update_transaction_endpoint_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        money::Money,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, get_test_db_with_user, must_get_form,
            parse_html_fragment,
        },
        transaction::{
            Transaction, TransactionType,
            core::{create_transactions, get_transaction},
            form::TransactionForm,
        },
    };

    use super::{TransactionState, update_transaction_endpoint};

    fn form(amount: &str) -> TransactionForm {
        TransactionForm {
            type_: TransactionType::Income,
            amount: amount.to_owned(),
            date: date!(2024 - 03 - 05),
            description: Some("Refund".to_owned()),
            category_id: None,
            is_recurring: false,
            recurring_months: String::new(),
        }
    }

    #[tokio::test]
    async fn updates_transaction() {
        let (db_connection, user) = get_test_db_with_user();
        let transaction = create_transactions(
            user.id,
            &[Transaction::build(
                TransactionType::Expense,
                Money::from_cents(1230),
                date!(2024 - 02 - 10),
            )
            .is_paid(true)],
            &db_connection.lock().unwrap(),
        )
        .unwrap()
        .remove(0);
        let state = TransactionState {
            db_connection: db_connection.clone(),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = update_transaction_endpoint(
            Path(transaction.id),
            State(state),
            Extension(user.id),
            Form(form("45.60")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/transactions?month=2024-03-05");
        let got = get_transaction(transaction.id, user.id, &db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.transaction_type, TransactionType::Income);
        assert_eq!(got.amount, Money::from_cents(4560));
        assert_eq!(got.date, date!(2024 - 03 - 05));
        assert_eq!(got.description.as_deref(), Some("Refund"));
        assert!(got.is_paid, "paid status should be kept");
    }

    #[tokio::test]
    async fn invalid_amount_shows_error() {
        let (db_connection, user) = get_test_db_with_user();
        let state = TransactionState {
            db_connection,
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response =
            update_transaction_endpoint(Path(1), State(state), Extension(user.id), Form(form("1.234")))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: \"1.234\" is not a valid amount, enter a positive number with at most two \
            decimal places",
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (db_connection, user) = get_test_db_with_user();
        let state = TransactionState {
            db_connection,
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response =
            update_transaction_endpoint(Path(42), State(state), Extension(user.id), Form(form("1")))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
