//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    auth::create_user_table,
    category::create_category_table,
    goal::{create_contribution_table, create_goal_table},
    profile::create_profile_table,
    shopping::{create_shopping_item_table, create_shopping_list_table},
    transaction::create_transaction_table,
};

/// Create every table, in dependency order, inside one transaction.
///
/// Also turns on foreign key enforcement for `connection`, which SQLite
/// leaves off by default.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_profile_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_contribution_table(&transaction)?;
    create_shopping_list_table(&transaction)?;
    create_shopping_item_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
