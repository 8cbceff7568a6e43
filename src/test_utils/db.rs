use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    auth::{Email, PasswordHash, User, create_user},
    db::initialize,
    profile::{ProfileName, create_profile},
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Register a user named "Test" with `email` and a dummy password hash.
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    let user = create_user(
        Email::new_unchecked(email),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user");
    create_profile(user.id, &ProfileName::new_unchecked("Test"), connection)
        .expect("Could not create test profile");

    user
}

/// A shared test database with one user, as stored in the app state.
pub(crate) fn get_test_db_with_user() -> (Arc<Mutex<Connection>>, User) {
    let connection = get_test_connection();
    let user = create_test_user("test@example.com", &connection);

    (Arc::new(Mutex::new(connection)), user)
}
