//! Income and expense categories for organising transactions.

mod db;
mod delete;
mod domain;
mod page;

pub use db::{create_category, create_category_table, get_categories, get_category};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryName};
pub use page::{create_category_endpoint, get_categories_page};
