//! Endpoints for the items on a shopping list.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, LINK_STYLE, base, dollar_input_styles, loading_spinner, money_input,
    },
    navigation::NavBar,
    parse_whole_number,
    shopping::{
        core::{
            ItemDraft, ShoppingItem, ShoppingItemId, ShoppingListId, add_item, delete_item,
            get_item, get_items, toggle_item_checked, update_item,
        },
        page::{ShoppingState, items_panel, shopping_list_url},
    },
};

/// Form data for adding or editing an item.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ItemForm {
    pub name: String,
    /// The unit price as typed by the user, e.g. "12,30".
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl ItemForm {
    fn to_draft(&self) -> Result<ItemDraft, Error> {
        ItemDraft::new(
            &self.name,
            self.price.as_deref(),
            parse_whole_number(&self.quantity)?,
            self.category.as_deref(),
        )
    }
}

impl From<&ShoppingItem> for ItemForm {
    fn from(item: &ShoppingItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price.map(|price| price.to_string()),
            quantity: item.quantity.to_string(),
            category: item.category.clone(),
        }
    }
}

/// Add an item to a list and show the list.
pub async fn add_item_endpoint(
    Path(list_id): Path<ShoppingListId>,
    State(state): State<ShoppingState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ItemForm>,
) -> Response {
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(error) => {
            return item_form(
                ItemFormAction::Add(list_id),
                Some(&form),
                &format!("Error: {error}"),
            )
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

    match add_item(list_id, user_id, &draft, &connection) {
        Ok(_) => (HxRedirect(shopping_list_url(list_id)), StatusCode::SEE_OTHER).into_response(),
        Err(error) => {
            tracing::error!("Could not add item to shopping list {list_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Render the form for editing an item.
///
/// Redirects to the shopping page if the item does not exist.
pub async fn get_edit_item_page(
    Path(item_id): Path<ShoppingItemId>,
    State(state): State<ShoppingState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let item = match get_item(item_id, user_id, &connection) {
        Ok(item) => item,
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::SHOPPING_VIEW).into_response()),
        Err(error) => {
            tracing::error!("Could not get shopping item {item_id}: {error}");
            return Err(error);
        }
    };

    let form = item_form(
        ItemFormAction::Edit(item_id),
        Some(&ItemForm::from(&item)),
        "",
    );

    Ok(edit_item_view(&form, &shopping_list_url(item.list_id)).into_response())
}

/// Replace an item's details and go back to its list.
pub async fn update_item_endpoint(
    Path(item_id): Path<ShoppingItemId>,
    State(state): State<ShoppingState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ItemForm>,
) -> Response {
    let draft = match form.to_draft() {
        Ok(draft) => draft,
        Err(error) => {
            return item_form(
                ItemFormAction::Edit(item_id),
                Some(&form),
                &format!("Error: {error}"),
            )
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

    match update_item(item_id, user_id, &draft, &connection) {
        Ok(item) => (
            HxRedirect(shopping_list_url(item.list_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update shopping item {item_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Delete an item and return the updated items and totals of its list.
pub async fn delete_item_endpoint(
    Path(item_id): Path<ShoppingItemId>,
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

    let result = delete_item(item_id, user_id, &connection)
        .and_then(|list_id| get_items(list_id, user_id, &connection));

    match result {
        Ok(items) => items_panel(&items).into_response(),
        Err(error) => {
            tracing::error!("Could not delete shopping item {item_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Mark an item as bought or not bought and return the updated items and
/// totals of its list.
pub async fn toggle_item_checked_endpoint(
    Path(item_id): Path<ShoppingItemId>,
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

    let result = toggle_item_checked(item_id, user_id, &connection)
        .and_then(|item| get_items(item.list_id, user_id, &connection));

    match result {
        Ok(items) => items_panel(&items).into_response(),
        Err(error) => {
            tracing::error!("Could not toggle shopping item {item_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Where the item form is submitted to.
pub(super) enum ItemFormAction {
    /// Add an item to the list.
    Add(ShoppingListId),
    /// Update an existing item.
    Edit(ShoppingItemId),
}

pub(super) fn item_form(
    action: ItemFormAction,
    values: Option<&ItemForm>,
    error_message: &str,
) -> Markup {
    let (post_url, put_url, submit_text) = match action {
        ItemFormAction::Add(list_id) => (
            Some(format_endpoint(endpoints::SHOPPING_LIST_ITEMS, list_id)),
            None,
            "Add Item",
        ),
        ItemFormAction::Edit(item_id) => (
            None,
            Some(format_endpoint(endpoints::SHOPPING_ITEM, item_id)),
            "Update Item",
        ),
    };
    let name = values.map(|values| values.name.as_str());
    let price = values.and_then(|values| values.price.as_deref());
    let quantity = values
        .map(|values| values.quantity.as_str())
        .filter(|quantity| !quantity.is_empty())
        .unwrap_or("1");
    let category = values.and_then(|values| values.category.as_deref());

    html! {
        form
            hx-post=[post_url]
            hx-put=[put_url]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-disabled-elt="#item-submit"
            hx-indicator="#item-indicator"
            class="w-full space-y-4"
        {
            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Item" }
                input
                    name="name"
                    id="name"
                    type="text"
                    value=[name]
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="grid grid-cols-2 gap-4"
            {
                (money_input("price", "Unit price", price, false))

                div
                {
                    label for="quantity" class=(FORM_LABEL_STYLE) { "Quantity" }
                    input
                        name="quantity"
                        id="quantity"
                        type="number"
                        min="1"
                        step="1"
                        value=(quantity)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                input
                    name="category"
                    id="category"
                    type="text"
                    value=[category]
                    placeholder="Produce"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="item-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="item-indicator" { (loading_spinner()) }
                (submit_text)
            }
        }
    }
}

fn edit_item_view(form: &Markup, list_url: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::SHOPPING_VIEW).into_html();
    let head_elements: [HeadElement; 1] = [dollar_input_styles()];

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit Item" }

                (form)

                a href=(list_url) class=(LINK_STYLE) { "Back to list" }
            }
        }
    };

    base("Edit Item", &head_elements, &content)
}
