//! Income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Expanding a recurring transaction into one transaction per month
//! - Database functions for storing, querying, and managing transactions
//! - The monthly ledger and the pages and endpoints for managing transactions

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod ledger;
mod paid;
mod recurring;
mod summary;

/// The most months a recurring transaction can be repeated for.
pub const MAX_RECURRING_MONTHS: u32 = 120;

pub use core::{
    Transaction, TransactionBuilder, TransactionId, TransactionType, create_transaction_table,
    get_transactions_in_window,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use form::transaction_type_radios;
pub use ledger::get_ledger_page;
pub use paid::toggle_paid_endpoint;
pub use summary::{summarize_month, summary_cards};

#[cfg(test)]
pub use core::create_transactions;
#[cfg(test)]
pub use ledger::{LedgerQuery, LedgerState};
