//! The monthly transaction ledger.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{CategoryId, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links, format_money,
    },
    month_window::MonthNavigation,
    navigation::NavBar,
    pagination::{PaginationConfig, create_pagination_indicators, pagination_html},
    timezone::local_today,
    transaction::{
        Transaction, TransactionType,
        core::{LedgerFilter, count_transactions, get_transactions_in_window, get_transactions_page},
        summary::{MonthlySummary, summarize_month, summary_cards},
    },
};

/// The max number of graphemes to display in the ledger rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// The state needed for the ledger.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Query parameters for the ledger.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    /// Any date in the month to display. Defaults to today.
    pub month: Option<Date>,
    /// The page of transactions to display. Starts from 1.
    pub page: Option<u64>,
    /// Only show paid (`true`) or unpaid (`false`) transactions.
    pub paid: Option<bool>,
}

/// Render one month of the user's transactions, newest first.
///
/// The totals cover the whole month regardless of the paid filter and page.
pub async fn get_ledger_page(
    State(state): State<LedgerState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<LedgerQuery>,
) -> Result<Response, Error> {
    let reference = match query.month {
        Some(month) => month,
        None => local_today(&state.local_timezone)?,
    };
    let navigation = MonthNavigation::new(reference);
    let window = navigation.window;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let month_transactions = get_transactions_in_window(user_id, &window, &connection)
        .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?;
    let summary = summarize_month(&window, &month_transactions);

    let filter = LedgerFilter {
        window: &window,
        is_paid: query.paid,
    };
    let per_page = state.pagination_config.default_page_size.max(1);
    let transaction_count = count_transactions(user_id, filter, &connection)
        .inspect_err(|error| tracing::error!("Could not count transactions: {error}"))?;
    let page_count = transaction_count.div_ceil(per_page).max(1);
    let page = query
        .page
        .unwrap_or(state.pagination_config.default_page)
        .clamp(1, page_count);

    let transactions = get_transactions_page(
        user_id,
        filter,
        per_page,
        (page - 1) * per_page,
        &connection,
    )
    .inspect_err(|error| tracing::error!("Could not get page {page} of transactions: {error}"))?;

    let category_names: HashMap<CategoryId, String> = get_categories(user_id, None, &connection)
        .inspect_err(|error| tracing::error!("Could not get categories: {error}"))?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    let indicators =
        create_pagination_indicators(page, page_count, state.pagination_config.max_pages);
    let pagination = pagination_html(&indicators, |page| {
        ledger_url(reference, Some(page), query.paid)
    });

    Ok(ledger_view(LedgerView {
        navigation,
        summary,
        transactions: &transactions,
        category_names: &category_names,
        paid_filter: query.paid,
        pagination,
    })
    .into_response())
}

/// Link to the ledger for the month containing `month`.
pub fn ledger_url(month: Date, page: Option<u64>, paid: Option<bool>) -> String {
    let mut url = format!("{}?month={month}", endpoints::TRANSACTIONS_VIEW);

    if let Some(page) = page {
        url.push_str(&format!("&page={page}"));
    }

    if let Some(paid) = paid {
        url.push_str(&format!("&paid={paid}"));
    }

    url
}

struct LedgerView<'a> {
    navigation: MonthNavigation,
    summary: MonthlySummary,
    transactions: &'a [Transaction],
    category_names: &'a HashMap<CategoryId, String>,
    paid_filter: Option<bool>,
    pagination: Markup,
}

fn ledger_view(view: LedgerView<'_>) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let reference = view.navigation.reference;
    let filters = [(None, "All"), (Some(false), "Unpaid"), (Some(true), "Paid")];

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                (view.navigation.clone().into_html(endpoints::TRANSACTIONS_VIEW))

                (summary_cards(&view.summary))

                nav class="flex gap-4" aria-label="Paid status"
                {
                    @for (filter, label) in filters {
                        @if filter == view.paid_filter {
                            span class="font-semibold" aria-current="page" { (label) }
                        } @else {
                            a href=(ledger_url(reference, None, filter)) class=(LINK_STYLE) { (label) }
                        }
                    }
                }

                div class="overflow-x-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Paid" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in view.transactions {
                                (transaction_row(
                                    transaction,
                                    transaction
                                        .category_id
                                        .and_then(|id| view.category_names.get(&id))
                                        .map(String::as_str),
                                ))
                            }

                            @if view.transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions this month."
                                    }
                                }
                            }
                        }
                    }
                }

                (view.pagination)
            }
        }
    };

    base("Transactions", &[], &content)
}

fn amount_class(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Expense => "text-red-700 dark:text-red-300",
        TransactionType::Income => "text-green-700 dark:text-green-300",
    }
}

fn truncate_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        (truncated + "...", Some(description))
    }
}

/// A ledger table row.
///
/// The paid button swaps the row for the one returned by the paid endpoint.
pub(super) fn transaction_row(transaction: &Transaction, category_name: Option<&str>) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let paid_url = format_endpoint(endpoints::TRANSACTION_PAID, transaction.id);
    let sign = match transaction.transaction_type {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };
    let (description, full_description) =
        truncate_description(transaction.description.as_deref().unwrap_or_default());
    let confirm_message = if transaction.is_recurring {
        "Are you sure you want to delete this transaction? \
        The other months of the series will be kept."
    } else {
        "Are you sure you want to delete this transaction?"
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }

            td class=(TABLE_CELL_STYLE) title=[full_description]
            {
                (description)

                @if let Some(months) = transaction.recurring_months {
                    " "
                    span class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        "(repeats for " (months) " months)"
                    }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(name) = category_name {
                    span class=(CATEGORY_BADGE_STYLE) { (name) }
                }
            }

            td class={ (TABLE_CELL_STYLE) " " (amount_class(transaction.transaction_type)) }
            {
                (sign) (format_money(transaction.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    hx-put=(paid_url)
                    hx-target="closest tr"
                    hx-target-error="#alert-container"
                    hx-swap="outerHTML"
                    hx-disabled-elt="this"
                    aria-pressed=(if transaction.is_paid { "true" } else { "false" })
                    class=(LINK_STYLE)
                {
                    @if transaction.is_paid { "Paid" } @else { "Unpaid" }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (edit_delete_action_links(
                    &edit_url,
                    &delete_url,
                    confirm_message,
                    "closest tr",
                    "delete",
                ))
            }
        }
    }
}
