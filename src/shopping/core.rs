//! Shopping lists, their items and the database queries for them.
//!
//! Items are owned through their list: every item query joins to the list
//! table and filters by the acting user.

use rusqlite::{Connection, Row};

use crate::{Error, auth::UserID, database_id::DatabaseId, money::Money};

pub type ShoppingListId = DatabaseId;
pub type ShoppingItemId = DatabaseId;

/// A named list of things to buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingList {
    pub id: ShoppingListId,
    pub user_id: UserID,
    pub name: String,
}

/// Something to buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub id: ShoppingItemId,
    pub list_id: ShoppingListId,
    pub name: String,
    /// The price of one unit, if known.
    pub price: Option<Money>,
    /// How many units to buy, at least one.
    pub quantity: u32,
    /// Whether the item has been bought.
    pub is_checked: bool,
    /// A free text label such as "Produce".
    pub category: Option<String>,
}

impl ShoppingItem {
    /// The unit price times the quantity, zero when the price is unknown.
    pub fn line_total(&self) -> Money {
        let price = self.price.unwrap_or(Money::ZERO);

        price
            .checked_mul(i64::from(self.quantity))
            .unwrap_or(Money::from_cents(i64::MAX))
    }
}

/// The validated fields of a new or edited item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub price: Option<Money>,
    pub quantity: u32,
    pub category: Option<String>,
}

impl ItemDraft {
    /// Validate raw item fields.
    ///
    /// Blank prices and categories are treated as missing and a missing
    /// quantity as one.
    ///
    /// # Errors
    /// - [Error::EmptyItemName] if `name` is blank.
    /// - [Error::InvalidAmount] if `price` is not a valid amount.
    /// - [Error::InvalidQuantity] if `quantity` is zero.
    pub fn new(
        name: &str,
        price: Option<&str>,
        quantity: Option<u32>,
        category: Option<&str>,
    ) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::EmptyItemName);
        }

        let price = match price.map(str::trim).filter(|price| !price.is_empty()) {
            Some(price) => Some(Money::parse(price)?),
            None => None,
        };

        let quantity = quantity.unwrap_or(1);

        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }

        let category = category
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_owned);

        Ok(Self {
            name: name.to_owned(),
            price,
            quantity,
            category,
        })
    }
}

/// Validate a shopping list name.
///
/// # Errors
/// Returns [Error::EmptyShoppingListName] if `name` is blank.
pub fn parse_list_name(name: &str) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        Err(Error::EmptyShoppingListName)
    } else {
        Ok(name.to_owned())
    }
}

/// Create a list named `name` for the user. `name` should come from [parse_list_name].
pub fn create_shopping_list(
    user_id: UserID,
    name: &str,
    connection: &Connection,
) -> Result<ShoppingList, Error> {
    connection
        .prepare(
            "INSERT INTO shopping_list (user_id, name) VALUES (?1, ?2)
            RETURNING id, user_id, name",
        )?
        .query_row((user_id, name), map_shopping_list_row)
        .map_err(|error| error.into())
}

/// Get the user's shopping lists in the order they were created.
pub fn get_shopping_lists(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<ShoppingList>, Error> {
    connection
        .prepare("SELECT id, user_id, name FROM shopping_list WHERE user_id = ?1 ORDER BY id")?
        .query_map((user_id,), map_shopping_list_row)?
        .map(|list_result| list_result.map_err(Error::from))
        .collect()
}

/// Delete one of the user's lists and its items.
///
/// # Errors
/// Returns [Error::DeleteMissingShoppingList] if the list does not exist or
/// belongs to another user.
pub fn delete_shopping_list(
    list_id: ShoppingListId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM shopping_list WHERE id = ?1 AND user_id = ?2",
        (list_id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingShoppingList);
    }

    Ok(())
}

const ITEM_COLUMNS: &str = "shopping_item.id, shopping_item.list_id, shopping_item.name, \
    shopping_item.price, shopping_item.quantity, shopping_item.is_checked, shopping_item.category";

/// The condition restricting `shopping_item` rows to lists owned by the user in `?N`.
fn owned_item_condition(user_param: usize) -> String {
    format!("list_id IN (SELECT id FROM shopping_list WHERE user_id = ?{user_param})")
}

/// Add an item to one of the user's lists.
///
/// # Errors
/// Returns [Error::NotFound] if the list does not exist or belongs to another user.
pub fn add_item(
    list_id: ShoppingListId,
    user_id: UserID,
    draft: &ItemDraft,
    connection: &Connection,
) -> Result<ShoppingItem, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO shopping_item (list_id, name, price, quantity, is_checked, category)
            SELECT id, ?2, ?3, ?4, 0, ?5 FROM shopping_list WHERE id = ?1 AND user_id = ?6
            RETURNING {}",
            ITEM_COLUMNS.replace("shopping_item.", "")
        ))?
        .query_row(
            (
                list_id,
                &draft.name,
                draft.price,
                draft.quantity,
                draft.category.as_deref(),
                user_id,
            ),
            map_shopping_item_row,
        )
        .map_err(|error| error.into())
}

/// Get an item from one of the user's lists.
///
/// # Errors
/// Returns [Error::NotFound] if the item does not exist or its list belongs to
/// another user.
pub fn get_item(
    item_id: ShoppingItemId,
    user_id: UserID,
    connection: &Connection,
) -> Result<ShoppingItem, Error> {
    connection
        .prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM shopping_item
            INNER JOIN shopping_list ON shopping_list.id = shopping_item.list_id
            WHERE shopping_item.id = ?1 AND shopping_list.user_id = ?2"
        ))?
        .query_row((item_id, user_id), map_shopping_item_row)
        .map_err(|error| error.into())
}

/// Get the items of one of the user's lists, unpurchased first then by name.
///
/// Returns an empty list if the list belongs to another user.
pub fn get_items(
    list_id: ShoppingListId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<ShoppingItem>, Error> {
    connection
        .prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM shopping_item
            INNER JOIN shopping_list ON shopping_list.id = shopping_item.list_id
            WHERE shopping_item.list_id = ?1 AND shopping_list.user_id = ?2
            ORDER BY shopping_item.is_checked, shopping_item.name COLLATE NOCASE, shopping_item.id"
        ))?
        .query_map((list_id, user_id), map_shopping_item_row)?
        .map(|item_result| item_result.map_err(Error::from))
        .collect()
}

/// Replace the name, price, quantity and category of an item.
///
/// # Errors
/// Returns [Error::UpdateMissingShoppingItem] if the item does not exist or its
/// list belongs to another user.
pub fn update_item(
    item_id: ShoppingItemId,
    user_id: UserID,
    draft: &ItemDraft,
    connection: &Connection,
) -> Result<ShoppingItem, Error> {
    connection
        .prepare(&format!(
            "UPDATE shopping_item SET name = ?1, price = ?2, quantity = ?3, category = ?4
            WHERE id = ?5 AND {}
            RETURNING {}",
            owned_item_condition(6),
            ITEM_COLUMNS.replace("shopping_item.", "")
        ))?
        .query_row(
            (
                &draft.name,
                draft.price,
                draft.quantity,
                draft.category.as_deref(),
                item_id,
                user_id,
            ),
            map_shopping_item_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingShoppingItem,
            error => error.into(),
        })
}

/// Flip whether an item has been bought and return the updated item.
///
/// # Errors
/// Returns [Error::UpdateMissingShoppingItem] if the item does not exist or its
/// list belongs to another user.
pub fn toggle_item_checked(
    item_id: ShoppingItemId,
    user_id: UserID,
    connection: &Connection,
) -> Result<ShoppingItem, Error> {
    connection
        .prepare(&format!(
            "UPDATE shopping_item SET is_checked = NOT is_checked
            WHERE id = ?1 AND {}
            RETURNING {}",
            owned_item_condition(2),
            ITEM_COLUMNS.replace("shopping_item.", "")
        ))?
        .query_row((item_id, user_id), map_shopping_item_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingShoppingItem,
            error => error.into(),
        })
}

/// Delete an item and return the ID of the list it was on.
///
/// # Errors
/// Returns [Error::DeleteMissingShoppingItem] if the item does not exist or its
/// list belongs to another user.
pub fn delete_item(
    item_id: ShoppingItemId,
    user_id: UserID,
    connection: &Connection,
) -> Result<ShoppingListId, Error> {
    connection
        .query_row(
            &format!(
                "DELETE FROM shopping_item WHERE id = ?1 AND {} RETURNING list_id",
                owned_item_condition(2)
            ),
            (item_id, user_id),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingShoppingItem,
            error => error.into(),
        })
}

/// Create the shopping list table.
pub fn create_shopping_list_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS shopping_list (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create the shopping item table.
pub fn create_shopping_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS shopping_item (
            id INTEGER PRIMARY KEY,
            list_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            price INTEGER CHECK (price IS NULL OR price >= 0),
            quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
            is_checked INTEGER NOT NULL DEFAULT 0,
            category TEXT,
            FOREIGN KEY(list_id) REFERENCES shopping_list(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_shopping_item_list ON shopping_item(list_id)",
        (),
    )?;

    Ok(())
}

fn map_shopping_list_row(row: &Row) -> Result<ShoppingList, rusqlite::Error> {
    Ok(ShoppingList {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
    })
}

pub fn map_shopping_item_row(row: &Row) -> Result<ShoppingItem, rusqlite::Error> {
    Ok(ShoppingItem {
        id: row.get(0)?,
        list_id: row.get(1)?,
        name: row.get(2)?,
        price: row.get(3)?,
        quantity: row.get(4)?,
        is_checked: row.get(5)?,
        category: row.get(6)?,
    })
}
