//! Shopping lists with per-item prices and quantities.

mod core;
mod item;
mod page;
mod totals;

pub use core::{create_shopping_item_table, create_shopping_list_table};
pub use item::{
    add_item_endpoint, delete_item_endpoint, get_edit_item_page, toggle_item_checked_endpoint,
    update_item_endpoint,
};
pub use page::{create_shopping_list_endpoint, delete_shopping_list_endpoint, get_shopping_page};
