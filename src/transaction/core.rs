//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, get_category},
    database_id::DatabaseId,
    money::Money,
    month_window::{Dated, MonthWindow},
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary.
    Income,
    /// Money spent, e.g. groceries.
    #[default]
    Expense,
}

impl TransactionType {
    /// The lowercase name used in URLs, forms and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The capitalised name shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid transaction type {other:?}").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned. Never negative.
    pub amount: Money,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// Whether this is the first transaction of a recurring series.
    pub is_recurring: bool,
    /// How many months the series spans. Only set on the first transaction.
    pub recurring_months: Option<u32>,
    /// Whether the transaction has been paid.
    pub is_paid: bool,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(transaction_type: TransactionType, amount: Money, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            date,
            description: None,
            category_id: None,
            is_recurring: false,
            recurring_months: None,
            is_paid: false,
        }
    }
}

impl Dated for Transaction {
    fn date(&self) -> Date {
        self.date
    }
}

/// A transaction that has not been saved yet.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::{money::Money, transaction::{Transaction, TransactionType}};
///
/// let rent = Transaction::build(TransactionType::Expense, Money::from_cents(120_000), date!(2025 - 01 - 01))
///     .description(Some("Rent"))
///     .category_id(Some(3));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,

    /// The amount of money. The sign is given by `transaction_type`.
    pub amount: Money,

    /// The date when the transaction occurred.
    pub date: Date,

    /// An optional human-readable description of the transaction.
    pub description: Option<String>,

    /// The category of the transaction, e.g. "Groceries", "Transport", "Rent".
    ///
    /// Must be one of the owner's categories with the same type.
    pub category_id: Option<CategoryId>,

    /// See [Transaction::is_recurring].
    pub is_recurring: bool,

    /// See [Transaction::recurring_months].
    pub recurring_months: Option<u32>,

    /// Whether the transaction has already been paid.
    pub is_paid: bool,
}

impl TransactionBuilder {
    /// Set the description, treating blank text as no description.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(ToOwned::to_owned);
        self
    }

    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set whether the transaction has been paid.
    pub fn is_paid(mut self, is_paid: bool) -> Self {
        self.is_paid = is_paid;
        self
    }
}

impl Dated for TransactionBuilder {
    fn date(&self) -> Date {
        self.date
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, user_id, type, amount, category_id, date, description, \
    is_recurring, recurring_months, is_paid";

/// Save every draft in `drafts` for `user_id` in a single SQL transaction.
///
/// Either all drafts are saved or, if any of them fails, none are.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if a draft's category does not belong to the user or has a
///   different type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transactions(
    user_id: UserID,
    drafts: &[TransactionBuilder],
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let mut transactions = Vec::with_capacity(drafts.len());

    {
        let mut statement = sql_transaction.prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, type, amount, category_id, date, description, \
                is_recurring, recurring_months, is_paid)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            RETURNING {TRANSACTION_COLUMNS}"
        ))?;

        for draft in drafts {
            check_category(user_id, draft, &sql_transaction)?;

            let transaction = statement.query_row(
                (
                    user_id,
                    draft.transaction_type,
                    draft.amount,
                    draft.category_id,
                    draft.date,
                    draft.description.as_deref(),
                    draft.is_recurring,
                    draft.recurring_months,
                    draft.is_paid,
                ),
                map_transaction_row,
            )?;

            transactions.push(transaction);
        }
    }

    sql_transaction.commit()?;

    Ok(transactions)
}

/// Retrieve one of the user's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id), map_transaction_row)?;

    Ok(transaction)
}

/// Replace the type, amount, category, date and description of one of the
/// user's transactions.
///
/// The recurrence details and paid status are left as they are.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category does not belong to the user or has a
///   different type,
/// - [Error::UpdateMissingTransaction] if the transaction does not exist or belongs to
///   another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    changes: &TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    check_category(user_id, changes, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
        SET type = ?1, amount = ?2, category_id = ?3, date = ?4, description = ?5
        WHERE id = ?6 AND user_id = ?7",
        (
            changes.transaction_type,
            changes.amount,
            changes.category_id,
            changes.date,
            changes.description.as_deref(),
            id,
            user_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Flip the paid status of one of the user's transactions and return the
/// updated transaction.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if the transaction does not exist
/// or belongs to another user.
pub fn toggle_paid(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\" SET is_paid = NOT is_paid
            WHERE id = ?1 AND user_id = ?2
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row((id, user_id), map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete one of the user's transactions.
///
/// Other transactions from the same recurring series are not affected.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not exist
/// or belongs to another user.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the user's transactions dated inside `window`, newest first.
pub fn get_transactions_in_window(
    user_id: UserID,
    window: &MonthWindow,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date DESC, id DESC"
        ))?
        .query_map((user_id, window.from, window.to), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Filters for one page of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerFilter<'a> {
    pub window: &'a MonthWindow,
    /// Only paid (`Some(true)`) or unpaid (`Some(false)`) transactions.
    pub is_paid: Option<bool>,
}

/// Count the user's transactions that match `filter`.
pub fn count_transactions(
    user_id: UserID,
    filter: LedgerFilter<'_>,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\"
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 AND (?4 IS NULL OR is_paid = ?4)",
            (user_id, filter.window.from, filter.window.to, filter.is_paid),
            |row| {
                let count: i64 = row.get(0)?;
                u64::try_from(count)
                    .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, count))
            },
        )
        .map_err(Error::from)
}

/// Get at most `limit` of the user's transactions that match `filter`,
/// newest first, skipping the first `offset`.
pub fn get_transactions_page(
    user_id: UserID,
    filter: LedgerFilter<'_>,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 AND (?4 IS NULL OR is_paid = ?4)
            ORDER BY date DESC, id DESC
            LIMIT ?5 OFFSET ?6"
        ))?
        .query_map(
            (
                user_id,
                filter.window.from,
                filter.window.to,
                filter.is_paid,
                i64::try_from(limit).unwrap_or(i64::MAX),
                i64::try_from(offset).unwrap_or(i64::MAX),
            ),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Check that the draft's category, if any, is one of the user's categories
/// with the same type as the draft.
fn check_category(
    user_id: UserID,
    draft: &TransactionBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = draft.category_id else {
        return Ok(());
    };

    match get_category(category_id, user_id, connection) {
        Ok(category) if category.category_type == draft.transaction_type => Ok(()),
        Ok(_) | Err(Error::NotFound) => Err(Error::InvalidCategory(Some(category_id))),
        Err(error) => Err(error),
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            amount INTEGER NOT NULL CHECK (amount >= 0),
            category_id INTEGER,
            date TEXT NOT NULL,
            description TEXT,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            recurring_months INTEGER CHECK (recurring_months IS NULL OR recurring_months >= 1),
            is_paid INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        transaction_type: row.get(2)?,
        amount: row.get(3)?,
        category_id: row.get(4)?,
        date: row.get(5)?,
        description: row.get(6)?,
        is_recurring: row.get(7)?,
        recurring_months: row.get(8)?,
        is_paid: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
