//! Keeps a goal's saved amount equal to the sum of its contributions.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{Error, goal::GoalId, money::Money};

/// Recompute the saved amount of `goal_id` from its contributions, store it
/// and return it.
///
/// The sum is taken over whole cents in SQL, so it is exact. Callers that have
/// just changed a contribution must call this inside the same SQL transaction
/// as the change.
///
/// # Errors
/// - [Error::NotFound] if the goal does not exist.
/// - [Error::SqlError] if there is some other SQL error.
pub fn reconcile_goal_balance(goal_id: GoalId, connection: &Connection) -> Result<Money, Error> {
    let total: Money = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM goal_contribution WHERE goal_id = ?1",
        (goal_id,),
        |row| row.get(0),
    )?;

    let rows_affected = connection.execute(
        "UPDATE goal SET current_amount = ?1, updated_at = ?2 WHERE id = ?3",
        (total, OffsetDateTime::now_utc(), goal_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    tracing::debug!("reconciled goal {goal_id} to {total}");

    Ok(total)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        goal::{GoalName, create_goal, get_goal},
        money::Money,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::reconcile_goal_balance;

    fn insert_contribution(goal_id: i64, cents: i64, connection: &Connection) {
        connection
            .execute(
                "INSERT INTO goal_contribution (goal_id, amount, date) VALUES (?1, ?2, '2024-01-01')",
                (goal_id, cents),
            )
            .unwrap();
    }

    #[test]
    fn sums_contributions_exactly() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let goal = create_goal(
            user.id,
            &GoalName::new_unchecked("Bike"),
            Money::from_cents(100_000),
            10,
            &connection,
        )
        .unwrap();
        for cents in [1010, 2020, 570] {
            insert_contribution(goal.id, cents, &connection);
        }

        let total = reconcile_goal_balance(goal.id, &connection).unwrap();

        assert_eq!(total, Money::from_cents(3600));
        assert_eq!(
            get_goal(goal.id, user.id, &connection).unwrap().current_amount,
            Money::from_cents(3600)
        );
    }

    #[test]
    fn is_idempotent() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let goal = create_goal(
            user.id,
            &GoalName::new_unchecked("Bike"),
            Money::from_cents(100_000),
            10,
            &connection,
        )
        .unwrap();
        insert_contribution(goal.id, 4200, &connection);

        let first = reconcile_goal_balance(goal.id, &connection).unwrap();
        let second = reconcile_goal_balance(goal.id, &connection).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn no_contributions_is_zero() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let goal = create_goal(
            user.id,
            &GoalName::new_unchecked("Bike"),
            Money::from_cents(100),
            1,
            &connection,
        )
        .unwrap();
        connection
            .execute("UPDATE goal SET current_amount = 999 WHERE id = ?1", (goal.id,))
            .unwrap();

        assert_eq!(reconcile_goal_balance(goal.id, &connection), Ok(Money::ZERO));
    }

    #[test]
    fn missing_goal_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(reconcile_goal_balance(42, &connection), Err(Error::NotFound));
    }
}
