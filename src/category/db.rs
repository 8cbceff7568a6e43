//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, CategoryName},
    transaction::TransactionType,
};

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// with the same name and type, or [Error::SqlError] for other SQL errors.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    category_type: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (user_id, name, type) VALUES (?1, ?2, ?3);",
            (user_id, name.as_ref(), category_type),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name,
        category_type,
    })
}

/// Retrieve one of the user's categories by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to
/// another user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type FROM category WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            rusqlite::named_params! {":id": category_id, ":user_id": user_id},
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the user's categories ordered alphabetically by name, optionally
/// only those of `category_type`.
pub fn get_categories(
    user_id: UserID,
    category_type: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type FROM category
            WHERE user_id = :user_id AND (:type IS NULL OR type = :type)
            ORDER BY name ASC, type ASC;",
        )?
        .query_map(
            rusqlite::named_params! {":user_id": user_id, ":type": category_type},
            map_category_row,
        )?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's categories.
///
/// Transactions that used the category keep their other details and are left
/// without a category.
///
/// # Errors
/// Returns [Error::DeleteMissingCategory] if the category does not exist or
/// belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            UNIQUE(user_id, name, type),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_type ON category(user_id, type);",
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let raw_name: String = row.get(2)?;
    let category_type = row.get(3)?;

    Ok(Category {
        id,
        user_id,
        name: CategoryName::new_unchecked(&raw_name),
        category_type,
    })
}

#[cfg(test)]
mod category_query_tests {
    use crate::{
        Error,
        category::{CategoryName, create_category, get_categories, get_category},
        test_utils::{create_test_user, get_test_connection},
        transaction::TransactionType,
    };

    use super::delete_category;

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);
        let name = CategoryName::new("Groceries").unwrap();

        let category = create_category(user.id, name.clone(), TransactionType::Expense, &connection)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, name);
        assert_eq!(category.category_type, TransactionType::Expense);
        assert_eq!(get_category(category.id, user.id, &connection), Ok(category));
    }

    #[test]
    fn create_fails_on_duplicate_name_and_type() {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);
        let name = CategoryName::new_unchecked("Gifts");
        create_category(user.id, name.clone(), TransactionType::Expense, &connection).unwrap();

        let duplicate = create_category(user.id, name.clone(), TransactionType::Expense, &connection);

        assert_eq!(
            duplicate,
            Err(Error::DuplicateCategoryName("Gifts".to_owned()))
        );
    }

    #[test]
    fn same_name_allowed_for_other_type_or_user() {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);
        let other_user = create_test_user("b@example.com", &connection);
        let name = CategoryName::new_unchecked("Gifts");
        create_category(user.id, name.clone(), TransactionType::Expense, &connection).unwrap();

        assert!(create_category(user.id, name.clone(), TransactionType::Income, &connection).is_ok());
        assert!(create_category(other_user.id, name, TransactionType::Expense, &connection).is_ok());
    }

    #[test]
    fn get_category_of_other_user_returns_not_found() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        let other_user = create_test_user("b@example.com", &connection);
        let category = create_category(
            owner.id,
            CategoryName::new_unchecked("Rent"),
            TransactionType::Expense,
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_category(category.id, other_user.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_categories_filters_by_type_and_sorts_by_name() {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);
        for (name, category_type) in [
            ("Rent", TransactionType::Expense),
            ("Salary", TransactionType::Income),
            ("Food", TransactionType::Expense),
        ] {
            create_category(
                user.id,
                CategoryName::new_unchecked(name),
                category_type,
                &connection,
            )
            .unwrap();
        }

        let expenses: Vec<String> =
            get_categories(user.id, Some(TransactionType::Expense), &connection)
                .unwrap()
                .into_iter()
                .map(|category| category.name.to_string())
                .collect();
        let all = get_categories(user.id, None, &connection).unwrap();

        assert_eq!(expenses, vec!["Food", "Rent"]);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_connection();
        let user = create_test_user("a@example.com", &connection);
        let category = create_category(
            user.id,
            CategoryName::new_unchecked("Rent"),
            TransactionType::Expense,
            &connection,
        )
        .unwrap();

        assert_eq!(delete_category(category.id, user.id, &connection), Ok(()));
        assert_eq!(
            get_category(category.id, user.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_category_of_other_user_fails() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        let other_user = create_test_user("b@example.com", &connection);
        let category = create_category(
            owner.id,
            CategoryName::new_unchecked("Rent"),
            TransactionType::Expense,
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_category(category.id, other_user.id, &connection),
            Err(Error::DeleteMissingCategory)
        );
        assert!(get_category(category.id, owner.id, &connection).is_ok());
    }
}
