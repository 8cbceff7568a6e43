//! Contributions towards a goal.
//!
//! Contributions are owned through their goal. Every query joins to the goal
//! table and filters by the acting user, and every change reconciles the
//! goal's saved amount before the SQL transaction is committed.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::DatabaseId,
    goal::{GoalId, core::get_goal, reconcile::reconcile_goal_balance},
    money::Money,
};

pub type ContributionId = DatabaseId;

/// An amount put towards a goal on a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub id: ContributionId,
    pub goal_id: GoalId,
    pub amount: Money,
    pub date: Date,
}

const CONTRIBUTION_COLUMNS: &str = "goal_contribution.id, goal_contribution.goal_id, \
    goal_contribution.amount, goal_contribution.date";

/// Add a contribution to one of the user's goals and update the goal's saved amount.
///
/// # Errors
/// - [Error::NotFound] if the goal does not exist or belongs to another user.
/// - [Error::SqlError] if there is some other SQL error, in which case nothing is saved.
pub fn add_contribution(
    goal_id: GoalId,
    user_id: UserID,
    amount: Money,
    date: Date,
    connection: &Connection,
) -> Result<Contribution, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    get_goal(goal_id, user_id, &sql_transaction)?;

    let contribution = sql_transaction
        .prepare(&format!(
            "INSERT INTO goal_contribution (goal_id, amount, date) VALUES (?1, ?2, ?3)
            RETURNING {CONTRIBUTION_COLUMNS}"
        ))?
        .query_row((goal_id, amount, date), map_contribution_row)?;

    reconcile_goal_balance(goal_id, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(contribution)
}

/// Get a contribution to one of the user's goals.
///
/// # Errors
/// Returns [Error::NotFound] if the contribution does not exist or its goal
/// belongs to another user.
pub fn get_contribution(
    contribution_id: ContributionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Contribution, Error> {
    connection
        .prepare(&format!(
            "SELECT {CONTRIBUTION_COLUMNS} FROM goal_contribution
            INNER JOIN goal ON goal.id = goal_contribution.goal_id
            WHERE goal_contribution.id = ?1 AND goal.user_id = ?2"
        ))?
        .query_row((contribution_id, user_id), map_contribution_row)
        .map_err(|error| error.into())
}

/// Get the contributions to one of the user's goals, newest first.
///
/// Returns an empty list if the goal belongs to another user.
pub fn get_contributions(
    goal_id: GoalId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Contribution>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CONTRIBUTION_COLUMNS} FROM goal_contribution
            INNER JOIN goal ON goal.id = goal_contribution.goal_id
            WHERE goal_contribution.goal_id = ?1 AND goal.user_id = ?2
            ORDER BY goal_contribution.date DESC, goal_contribution.id DESC"
        ))?
        .query_map((goal_id, user_id), map_contribution_row)?
        .map(|contribution_result| contribution_result.map_err(Error::from))
        .collect()
}

/// Change the amount and date of a contribution and update its goal's saved amount.
///
/// # Errors
/// - [Error::UpdateMissingContribution] if the contribution does not exist or
///   its goal belongs to another user.
/// - [Error::SqlError] if there is some other SQL error, in which case nothing is saved.
pub fn update_contribution(
    contribution_id: ContributionId,
    user_id: UserID,
    amount: Money,
    date: Date,
    connection: &Connection,
) -> Result<Contribution, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let contribution = sql_transaction
        .prepare(
            "UPDATE goal_contribution SET amount = ?1, date = ?2
            WHERE id = ?3 AND goal_id IN (SELECT id FROM goal WHERE user_id = ?4)
            RETURNING id, goal_id, amount, date",
        )?
        .query_row(
            (amount, date, contribution_id, user_id),
            map_contribution_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingContribution,
            error => error.into(),
        })?;

    reconcile_goal_balance(contribution.goal_id, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(contribution)
}

/// Delete a contribution, update its goal's saved amount and return the goal's ID.
///
/// # Errors
/// - [Error::DeleteMissingContribution] if the contribution does not exist or
///   its goal belongs to another user.
/// - [Error::SqlError] if there is some other SQL error, in which case nothing is deleted.
pub fn delete_contribution(
    contribution_id: ContributionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<GoalId, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let goal_id: GoalId = sql_transaction
        .query_row(
            "DELETE FROM goal_contribution
            WHERE id = ?1 AND goal_id IN (SELECT id FROM goal WHERE user_id = ?2)
            RETURNING goal_id",
            (contribution_id, user_id),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingContribution,
            error => error.into(),
        })?;

    reconcile_goal_balance(goal_id, &sql_transaction)?;
    sql_transaction.commit()?;

    Ok(goal_id)
}

/// Create the goal contribution table.
pub fn create_contribution_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal_contribution (
            id INTEGER PRIMARY KEY,
            goal_id INTEGER NOT NULL,
            amount INTEGER NOT NULL CHECK (amount >= 0),
            date TEXT NOT NULL,
            FOREIGN KEY(goal_id) REFERENCES goal(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_contribution_goal ON goal_contribution(goal_id)",
        (),
    )?;

    Ok(())
}

pub fn map_contribution_row(row: &Row) -> Result<Contribution, rusqlite::Error> {
    Ok(Contribution {
        id: row.get(0)?,
        goal_id: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::User,
        goal::{Goal, GoalName, GoalProgress, create_goal, get_goal},
        money::Money,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        add_contribution, delete_contribution, get_contribution, get_contributions,
        update_contribution,
    };

    fn setup() -> (Connection, User, Goal) {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let goal = create_goal(
            user.id,
            &GoalName::new_unchecked("Holiday"),
            Money::from_cents(120_000),
            12,
            &connection,
        )
        .unwrap();

        (connection, user, goal)
    }

    fn current_amount(goal: &Goal, connection: &Connection) -> Money {
        get_goal(goal.id, goal.user_id, connection)
            .unwrap()
            .current_amount
    }

    #[test]
    fn goal_lifecycle_keeps_saved_amount_in_sync() {
        let (connection, user, goal) = setup();
        assert_eq!(goal.monthly_amount, Some(Money::from_cents(10_000)));

        let fifty = add_contribution(
            goal.id,
            user.id,
            Money::from_cents(5_000),
            date!(2024 - 01 - 10),
            &connection,
        )
        .unwrap();
        add_contribution(
            goal.id,
            user.id,
            Money::from_cents(7_000),
            date!(2024 - 02 - 10),
            &connection,
        )
        .unwrap();

        let saved = current_amount(&goal, &connection);
        assert_eq!(saved, Money::from_cents(12_000));
        assert_eq!(
            GoalProgress::new(saved, goal.target_amount).display_percent(),
            10
        );

        delete_contribution(fifty.id, user.id, &connection).unwrap();

        let saved = current_amount(&goal, &connection);
        assert_eq!(saved, Money::from_cents(7_000));
        assert_eq!(
            GoalProgress::new(saved, goal.target_amount).display_percent(),
            6
        );
    }

    #[test]
    fn update_reconciles_goal() {
        let (connection, user, goal) = setup();
        let contribution = add_contribution(
            goal.id,
            user.id,
            Money::from_cents(1_010),
            date!(2024 - 01 - 10),
            &connection,
        )
        .unwrap();

        let updated = update_contribution(
            contribution.id,
            user.id,
            Money::from_cents(2_020),
            date!(2024 - 01 - 11),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.amount, Money::from_cents(2_020));
        assert_eq!(updated.date, date!(2024 - 01 - 11));
        assert_eq!(current_amount(&goal, &connection), Money::from_cents(2_020));
        assert_eq!(get_contribution(contribution.id, user.id, &connection), Ok(updated));
    }

    #[test]
    fn contributions_are_listed_newest_first() {
        let (connection, user, goal) = setup();
        for day in [date!(2024 - 01 - 10), date!(2024 - 03 - 10), date!(2024 - 02 - 10)] {
            add_contribution(goal.id, user.id, Money::from_cents(100), day, &connection).unwrap();
        }

        let dates: Vec<_> = get_contributions(goal.id, user.id, &connection)
            .unwrap()
            .into_iter()
            .map(|contribution| contribution.date)
            .collect();

        assert_eq!(
            dates,
            vec![date!(2024 - 03 - 10), date!(2024 - 02 - 10), date!(2024 - 01 - 10)]
        );
    }

    #[test]
    fn other_users_cannot_touch_contributions() {
        let (connection, user, goal) = setup();
        let intruder = create_test_user("intruder@example.com", &connection);
        let contribution = add_contribution(
            goal.id,
            user.id,
            Money::from_cents(5_000),
            date!(2024 - 01 - 10),
            &connection,
        )
        .unwrap();

        assert_eq!(
            add_contribution(
                goal.id,
                intruder.id,
                Money::from_cents(1),
                date!(2024 - 01 - 10),
                &connection
            ),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_contribution(contribution.id, intruder.id, &connection),
            Err(Error::NotFound)
        );
        assert!(get_contributions(goal.id, intruder.id, &connection).unwrap().is_empty());
        assert_eq!(
            update_contribution(
                contribution.id,
                intruder.id,
                Money::from_cents(1),
                date!(2024 - 01 - 10),
                &connection
            ),
            Err(Error::UpdateMissingContribution)
        );
        assert_eq!(
            delete_contribution(contribution.id, intruder.id, &connection),
            Err(Error::DeleteMissingContribution)
        );
        assert_eq!(current_amount(&goal, &connection), Money::from_cents(5_000));
        assert_eq!(get_contributions(goal.id, user.id, &connection).unwrap().len(), 1);
    }

    #[test]
    fn contributions_are_deleted_with_goal() {
        let (connection, user, goal) = setup();
        let contribution = add_contribution(
            goal.id,
            user.id,
            Money::from_cents(5_000),
            date!(2024 - 01 - 10),
            &connection,
        )
        .unwrap();

        crate::goal::delete_goal(goal.id, user.id, &connection).unwrap();

        assert_eq!(
            get_contribution(contribution.id, user.id, &connection),
            Err(Error::NotFound)
        );
    }
}
