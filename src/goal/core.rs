//! Savings goals and the database queries for them.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, database_id::DatabaseId, money::Money};

pub type GoalId = DatabaseId;

/// A validated, non-empty goal name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalName(String);

impl GoalName {
    /// Create a goal name.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyGoalName] if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyGoalName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a goal name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for GoalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for GoalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Something the user is saving towards.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserID,
    pub name: GoalName,
    /// The amount to save, always greater than zero.
    pub target_amount: Money,
    /// How many months the user wants to reach the target in.
    pub months_to_complete: u32,
    /// The sum of the goal's contributions as of the last reconciliation.
    pub current_amount: Money,
    /// The suggested monthly contribution, computed once when the goal is created.
    pub monthly_amount: Option<Money>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// The suggested monthly contribution, `target / months` rounded to the
/// nearest cent with halves rounded away from zero.
///
/// # Errors
/// - [Error::InvalidTargetAmount] if `target` is zero or negative.
/// - [Error::InvalidMonthsToComplete] if `months` is zero.
pub fn monthly_amount(target: Money, months: u32) -> Result<Money, Error> {
    if target <= Money::ZERO {
        return Err(Error::InvalidTargetAmount);
    }

    if months == 0 {
        return Err(Error::InvalidMonthsToComplete);
    }

    Money::from_decimal(target.as_decimal() / Decimal::from(months))
        .ok_or(Error::InvalidTargetAmount)
}

const GOAL_COLUMNS: &str = "id, user_id, name, target_amount, months_to_complete, \
    current_amount, monthly_amount, created_at, updated_at";

/// Create a goal for `user_id` with no contributions.
///
/// # Errors
/// - [Error::InvalidTargetAmount] or [Error::InvalidMonthsToComplete] if the
///   target or months are not positive.
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_goal(
    user_id: UserID,
    name: &GoalName,
    target_amount: Money,
    months_to_complete: u32,
    connection: &Connection,
) -> Result<Goal, Error> {
    let monthly_amount = monthly_amount(target_amount, months_to_complete)?;
    let now = OffsetDateTime::now_utc();

    let goal = connection
        .prepare(&format!(
            "INSERT INTO goal (user_id, name, target_amount, months_to_complete, current_amount, \
                monthly_amount, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?6)
            RETURNING {GOAL_COLUMNS}"
        ))?
        .query_row(
            (
                user_id,
                name.as_ref(),
                target_amount,
                months_to_complete,
                monthly_amount,
                now,
            ),
            map_goal_row,
        )?;

    Ok(goal)
}

/// Get one of the user's goals.
///
/// # Errors
/// Returns [Error::NotFound] if the goal does not exist or belongs to another user.
pub fn get_goal(goal_id: GoalId, user_id: UserID, connection: &Connection) -> Result<Goal, Error> {
    connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((goal_id, user_id), map_goal_row)
        .map_err(|error| error.into())
}

/// Get all of the user's goals, oldest first.
pub fn get_goals(user_id: UserID, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal WHERE user_id = ?1 ORDER BY created_at, id"
        ))?
        .query_map((user_id,), map_goal_row)?
        .map(|goal_result| goal_result.map_err(Error::from))
        .collect()
}

/// Delete one of the user's goals together with its contributions.
///
/// # Errors
/// Returns [Error::DeleteMissingGoal] if the goal does not exist or belongs to another user.
pub fn delete_goal(goal_id: GoalId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
        (goal_id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

/// Create the goal table.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            target_amount INTEGER NOT NULL CHECK (target_amount > 0),
            months_to_complete INTEGER NOT NULL CHECK (months_to_complete > 0),
            current_amount INTEGER NOT NULL DEFAULT 0,
            monthly_amount INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_user ON goal(user_id)",
        (),
    )?;

    Ok(())
}

pub fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    let name: String = row.get(2)?;

    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: GoalName::new_unchecked(&name),
        target_amount: row.get(3)?,
        months_to_complete: row.get(4)?,
        current_amount: row.get(5)?,
        monthly_amount: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}


#[cfg(test)]
mod monthly_amount_tests {
    use crate::{Error, money::Money};

    use super::monthly_amount;

    #[test]
    fn divides_target_by_months() {
        assert_eq!(
            monthly_amount(Money::from_cents(120_000), 12),
            Ok(Money::from_cents(10_000))
        );
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 1000.00 / 3 = 333.333...
        assert_eq!(
            monthly_amount(Money::from_cents(100_000), 3),
            Ok(Money::from_cents(33_333))
        );
        // 0.05 / 2 = 0.025
        assert_eq!(
            monthly_amount(Money::from_cents(5), 2),
            Ok(Money::from_cents(3))
        );
    }

    #[test]
    fn rejects_zero_target_and_months() {
        assert_eq!(
            monthly_amount(Money::ZERO, 12),
            Err(Error::InvalidTargetAmount)
        );
        assert_eq!(
            monthly_amount(Money::from_cents(100), 0),
            Err(Error::InvalidMonthsToComplete)
        );
    }
}
