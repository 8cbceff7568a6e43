//! The shopping page and the endpoints for creating and deleting lists.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles, edit_delete_action_links,
        format_money, loading_spinner,
    },
    navigation::NavBar,
    shopping::{
        core::{
            ShoppingItem, ShoppingList, ShoppingListId, create_shopping_list,
            delete_shopping_list, get_items, get_shopping_lists, parse_list_name,
        },
        item::{ItemFormAction, item_form},
        totals::{shopping_totals, totals_view},
    },
};

/// The state needed by the shopping pages and endpoints.
#[derive(Debug, Clone)]
pub struct ShoppingState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ShoppingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters for the shopping page.
#[derive(Debug, Default, Deserialize)]
pub struct ShoppingQuery {
    /// The list to display. Defaults to the user's first list.
    pub list: Option<ShoppingListId>,
}

/// Form data for creating a shopping list.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShoppingListForm {
    pub name: String,
}

/// The URL of the shopping page showing `list_id`.
pub fn shopping_list_url(list_id: ShoppingListId) -> String {
    format!("{}?list={list_id}", endpoints::SHOPPING_VIEW)
}

/// Render the user's shopping lists and the items on the selected list.
pub async fn get_shopping_page(
    State(state): State<ShoppingState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ShoppingQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let lists = get_shopping_lists(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get shopping lists: {error}"))?;

    let selected = query
        .list
        .and_then(|list_id| lists.iter().find(|list| list.id == list_id))
        .or_else(|| lists.first());

    let items = match selected {
        Some(list) => get_items(list.id, user_id, &connection)
            .inspect_err(|error| tracing::error!("Could not get items for list {}: {error}", list.id))?,
        None => Vec::new(),
    };

    Ok(shopping_view(&lists, selected, &items).into_response())
}

/// Create a shopping list and show it.
pub async fn create_shopping_list_endpoint(
    State(state): State<ShoppingState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ShoppingListForm>,
) -> Response {
    let name = match parse_list_name(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return new_list_form(&form.name, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_shopping_list(user_id, &name, &connection) {
        Ok(list) => (
            HxRedirect(shopping_list_url(list.id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not create shopping list: {error}");
            error.into_alert_response()
        }
    }
}

/// Delete a shopping list and everything on it.
pub async fn delete_shopping_list_endpoint(
    Path(list_id): Path<ShoppingListId>,
    State(state): State<ShoppingState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_shopping_list(list_id, user_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::SHOPPING_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete shopping list {list_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn new_list_form(name: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::SHOPPING_LISTS_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-disabled-elt="#list-submit"
            hx-indicator="#list-indicator"
            class="w-full space-y-4"
        {
            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            div
            {
                label for="list-name" class=(FORM_LABEL_STYLE) { "New list" }
                input
                    name="name"
                    id="list-name"
                    type="text"
                    value=(name)
                    placeholder="Groceries"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="list-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="list-indicator" { (loading_spinner()) }
                "Create List"
            }
        }
    }
}

fn item_row(item: &ShoppingItem) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_SHOPPING_ITEM_VIEW, item.id);
    let delete_url = format_endpoint(endpoints::SHOPPING_ITEM, item.id);
    let checked_url = format_endpoint(endpoints::SHOPPING_ITEM_CHECKED, item.id);
    let name_style = if item.is_checked {
        "line-through text-gray-400"
    } else {
        ""
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-item-id=(item.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    hx-put=(checked_url)
                    hx-target="#shopping-items"
                    hx-target-error="#alert-container"
                    hx-swap="outerHTML"
                    hx-disabled-elt="this"
                    aria-pressed=(if item.is_checked { "true" } else { "false" })
                    aria-label=(format!("Mark {} as bought", item.name))
                    class=(LINK_STYLE)
                {
                    @if item.is_checked { "☑" } @else { "☐" }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(name_style) { (item.name) }

                @if let Some(category) = &item.category {
                    " "
                    span class=(CATEGORY_BADGE_STYLE) { (category) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (item.quantity) }
            td class=(TABLE_CELL_STYLE)
            {
                @match item.price {
                    Some(price) => { (format_money(price)) }
                    None => { "-" }
                }
            }
            td class=(TABLE_CELL_STYLE) { (format_money(item.line_total())) }
            td class=(TABLE_CELL_STYLE)
            {
                (edit_delete_action_links(
                    &edit_url,
                    &delete_url,
                    &format!("Are you sure you want to delete '{}'?", item.name),
                    "#shopping-items",
                    "outerHTML",
                ))
            }
        }
    }
}

/// The totals and items of a list.
///
/// Toggling or deleting an item replaces this whole section so the totals
/// stay current.
pub(super) fn items_panel(items: &[ShoppingItem]) -> Markup {
    let totals = shopping_totals(items);

    html! {
        section id="shopping-items" class="space-y-4"
        {
            (totals_view(&totals))

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Bought" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Item" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Qty" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for item in items {
                        (item_row(item))
                    }

                    @if items.is_empty() {
                        tr
                        {
                            td
                                colspan="6"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "Nothing on this list yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn list_selector(lists: &[ShoppingList], selected: Option<&ShoppingList>) -> Markup {
    html! {
        nav aria-label="Shopping lists" class="flex flex-wrap gap-2" data-list-selector
        {
            @for list in lists {
                @let is_selected = selected.is_some_and(|selected| selected.id == list.id);
                @let style = if is_selected {
                    "px-3 py-1 rounded-full border bg-blue-600 text-white border-blue-600"
                } else {
                    "px-3 py-1 rounded-full border border-gray-300 dark:border-gray-600"
                };

                a
                    href=(shopping_list_url(list.id))
                    aria-current=[is_selected.then_some("page")]
                    class=(style)
                {
                    (list.name)
                }
            }
        }
    }
}

fn shopping_view(
    lists: &[ShoppingList],
    selected: Option<&ShoppingList>,
    items: &[ShoppingItem],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::SHOPPING_VIEW).into_html();
    let head_elements: [HeadElement; 1] = [dollar_input_styles()];

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-3xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Shopping" }

                @if lists.is_empty() {
                    p class="text-gray-500 dark:text-gray-400" { "No shopping lists yet." }
                } @else {
                    (list_selector(lists, selected))
                }

                @if let Some(list) = selected {
                    header class="flex justify-between flex-wrap items-end"
                    {
                        h2 class="text-lg font-semibold" { (list.name) }

                        button
                            type="button"
                            hx-delete=(format_endpoint(endpoints::SHOPPING_LIST, list.id))
                            hx-confirm=(format!(
                                "Are you sure you want to delete '{}'? Its items will be deleted too.",
                                list.name
                            ))
                            hx-target-error="#alert-container"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Delete List"
                        }
                    }

                    div class="max-w-md"
                    {
                        (item_form(ItemFormAction::Add(list.id), None, ""))
                    }

                    (items_panel(items))
                }

                div class="max-w-md"
                {
                    (new_list_form("", ""))
                }
            }
        }
    };

    base("Shopping", &head_elements, &content)
}

#[cfg(test)]
mod shopping_page_tests {
    use axum::{
        Extension,
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use scraper::{Html, Selector};

    use crate::{
        endpoints,
        shopping::core::{
            ItemDraft, add_item, create_shopping_list, get_shopping_lists, toggle_item_checked,
        },
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, create_test_user,
            get_test_db_with_user, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        ShoppingListForm, ShoppingQuery, ShoppingState, create_shopping_list_endpoint,
        delete_shopping_list_endpoint, get_shopping_page,
    };

    fn text_of(html: &Html, selector: &str) -> Vec<String> {
        html.select(&Selector::parse(selector).unwrap())
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn empty_state_offers_list_creation() {
        let (db_connection, user) = get_test_db_with_user();

        let response = get_shopping_page(
            State(ShoppingState { db_connection }),
            Extension(user.id),
            Query(ShoppingQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::SHOPPING_LISTS_API));
        assert!(text_of(&html, "main p")[0].contains("No shopping lists yet."));
    }

    #[tokio::test]
    async fn shows_selected_list_with_totals() {
        let (db_connection, user) = get_test_db_with_user();
        let second = {
            let connection = db_connection.lock().unwrap();
            let first = create_shopping_list(user.id, "Groceries", &connection).unwrap();
            let second = create_shopping_list(user.id, "Hardware", &connection).unwrap();
            add_item(
                first.id,
                user.id,
                &ItemDraft::new("Milk", Some("3"), None, None).unwrap(),
                &connection,
            )
            .unwrap();
            add_item(
                second.id,
                user.id,
                &ItemDraft::new("Screws", Some("4.50"), Some(2), Some("Fixings")).unwrap(),
                &connection,
            )
            .unwrap();
            let nails = add_item(
                second.id,
                user.id,
                &ItemDraft::new("Nails", Some("2"), None, None).unwrap(),
                &connection,
            )
            .unwrap();
            toggle_item_checked(nails.id, user.id, &connection).unwrap();
            second
        };

        let response = get_shopping_page(
            State(ShoppingState { db_connection }),
            Extension(user.id),
            Query(ShoppingQuery {
                list: Some(second.id),
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(
            text_of(&html, "[data-list-selector] a[aria-current=page]"),
            vec!["Hardware"]
        );
        assert_eq!(text_of(&html, "[data-pending]"), vec!["$9.00"]);
        assert_eq!(text_of(&html, "[data-purchased]"), vec!["$2.00"]);
        assert_eq!(html.select(&Selector::parse("tr[data-item-id]").unwrap()).count(), 2);
    }

    #[tokio::test]
    async fn unknown_list_falls_back_to_first() {
        let (db_connection, user) = get_test_db_with_user();
        {
            let connection = db_connection.lock().unwrap();
            create_shopping_list(user.id, "Groceries", &connection).unwrap();
            let intruder = create_test_user("intruder@example.com", &connection);
            create_shopping_list(intruder.id, "Secret", &connection).unwrap();
        }

        let response = get_shopping_page(
            State(ShoppingState { db_connection }),
            Extension(user.id),
            Query(ShoppingQuery { list: Some(2) }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(
            text_of(&html, "[data-list-selector] a[aria-current=page]"),
            vec!["Groceries"]
        );
        assert!(text_of(&html, "h2").iter().all(|heading| heading != "Secret"));
    }

    #[tokio::test]
    async fn creates_list() {
        let (db_connection, user) = get_test_db_with_user();

        let response = create_shopping_list_endpoint(
            State(ShoppingState {
                db_connection: db_connection.clone(),
            }),
            Extension(user.id),
            Form(ShoppingListForm {
                name: " Groceries ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let lists = get_shopping_lists(user.id, &db_connection.lock().unwrap()).unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Groceries");
        assert_hx_redirect(&response, &format!("/shopping?list={}", lists[0].id));
    }

    #[tokio::test]
    async fn blank_list_name_shows_error() {
        let (db_connection, user) = get_test_db_with_user();

        let response = create_shopping_list_endpoint(
            State(ShoppingState {
                db_connection: db_connection.clone(),
            }),
            Extension(user.id),
            Form(ShoppingListForm {
                name: "  ".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: List name cannot be empty");
        assert!(
            get_shopping_lists(user.id, &db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn deletes_list() {
        let (db_connection, user) = get_test_db_with_user();
        let list = create_shopping_list(user.id, "Groceries", &db_connection.lock().unwrap())
            .unwrap();
        let intruder = create_test_user("intruder@example.com", &db_connection.lock().unwrap());

        let intruder_response = delete_shopping_list_endpoint(
            Path(list.id),
            State(ShoppingState {
                db_connection: db_connection.clone(),
            }),
            Extension(intruder.id),
        )
        .await;
        assert_eq!(intruder_response.status(), StatusCode::NOT_FOUND);

        let response = delete_shopping_list_endpoint(
            Path(list.id),
            State(ShoppingState {
                db_connection: db_connection.clone(),
            }),
            Extension(user.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::SHOPPING_VIEW);
        assert!(
            get_shopping_lists(user.id, &db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }
}
