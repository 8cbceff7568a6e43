//! The category manager page and the endpoint for creating categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, CategoryName, create_category, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    transaction::{TransactionType, transaction_type_radios},
};

/// The state needed for the category manager.
#[derive(Debug, Clone)]
pub struct CategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Which categories to list.
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesQuery {
    #[serde(rename = "type")]
    pub category_type: Option<TransactionType>,
}

/// Form data for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub type_: TransactionType,
}

/// Render the list of the user's categories with a form for adding one.
pub async fn get_categories_page(
    State(state): State<CategoriesState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, query.category_type, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(categories_view(&categories, query.category_type).into_response())
}

/// Handle category creation form submission.
///
/// Redirects back to the category list filtered by the new category's type.
pub async fn create_category_endpoint(
    State(state): State<CategoriesState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return category_form_view(&form.name, form.type_, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(user_id, name, form.type_, &connection) {
        Ok(category) => (
            HxRedirect(categories_url(Some(category.category_type))),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateCategoryName(_)) => {
            category_form_view(&form.name, form.type_, &format!("Error: {error}")).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn categories_url(category_type: Option<TransactionType>) -> String {
    match category_type {
        Some(category_type) => format!("{}?type={category_type}", endpoints::CATEGORIES_VIEW),
        None => endpoints::CATEGORIES_VIEW.to_owned(),
    }
}

fn filter_links(active: Option<TransactionType>) -> Markup {
    let filters = [
        (None, "All"),
        (Some(TransactionType::Income), "Income"),
        (Some(TransactionType::Expense), "Expenses"),
    ];

    html! {
        nav class="flex gap-4" aria-label="Category type"
        {
            @for (filter, label) in filters {
                @if filter == active {
                    span class="font-semibold" aria-current="page" { (label) }
                } @else {
                    a href=(categories_url(filter)) class=(LINK_STYLE) { (label) }
                }
            }
        }
    }
}

fn categories_view(categories: &[Category], active_filter: Option<TransactionType>) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let table_row = |category: &Category| {
        let delete_url = format_endpoint(endpoints::CATEGORY, category.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? Transactions in this category will be kept \
            without a category.",
            category.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (category.name) }
                }

                td class=(TABLE_CELL_STYLE) { (category.category_type.label()) }

                td class=(TABLE_CELL_STYLE)
                {
                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-3xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    (filter_links(active_filter))
                }

                div class="max-w-md"
                {
                    (category_form_view("", active_filter.unwrap_or_default(), ""))
                }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for category in categories {
                            (table_row(category))
                        }

                        @if categories.is_empty() {
                            tr
                            {
                                td
                                    colspan="3"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No categories yet."
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Categories", &[], &content)
}

fn category_form_view(name: &str, category_type: TransactionType, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-disabled-elt="#category-submit"
            hx-indicator="#indicator"
            class="w-full space-y-4"
        {
            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Category Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Groceries"
                    value=(name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (transaction_type_radios(category_type, "Category type"))

            button type="submit" id="category-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Add Category"
            }
        }
    }
}

#[cfg(test)]
mod categories_page_tests {
    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::Selector;

    use crate::{
        category::{CategoryName, create_category},
        endpoints,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_valid_html, create_test_user,
            get_test_db_with_user, must_get_form, parse_html_document,
        },
        transaction::TransactionType,
    };

    use super::{CategoriesQuery, CategoriesState, get_categories_page};

    #[tokio::test]
    async fn lists_only_own_categories_of_selected_type() {
        let (db_connection, user) = get_test_db_with_user();
        {
            let connection = db_connection.lock().unwrap();
            let other_user = create_test_user("other@example.com", &connection);
            for (user_id, name, category_type) in [
                (user.id, "Rent", TransactionType::Expense),
                (user.id, "Salary", TransactionType::Income),
                (other_user.id, "Secret", TransactionType::Expense),
            ] {
                create_category(
                    user_id,
                    CategoryName::new_unchecked(name),
                    category_type,
                    &connection,
                )
                .unwrap();
            }
        }
        let state = CategoriesState { db_connection };

        let response = get_categories_page(
            State(state),
            Extension(user.id),
            Query(CategoriesQuery {
                category_type: Some(TransactionType::Expense),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let names: Vec<String> = html
            .select(&Selector::parse("tbody tr td span").unwrap())
            .map(|span| span.text().collect())
            .collect();
        assert_eq!(names, vec!["Rent"]);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CATEGORIES_API, "hx-post");
        assert_form_input(&form, "name", "text");
    }

    #[tokio::test]
    async fn shows_empty_message_without_categories() {
        let (db_connection, user) = get_test_db_with_user();
        let state = CategoriesState { db_connection };

        let response = get_categories_page(State(state), Extension(user.id), Query(Default::default()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let text: String = html
            .select(&Selector::parse("tbody td").unwrap())
            .flat_map(|cell| cell.text())
            .collect();
        assert!(text.contains("No categories yet."));
    }
}
