//! The user's display name and photo, and the database queries for them.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{Email, UserID},
};

/// A validated, non-empty display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileName(String);

impl ProfileName {
    /// Create a profile name.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyProfileName] if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyProfileName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a profile name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Parse an optional photo URL from a form field.
///
/// An empty field means no photo.
///
/// # Errors
///
/// Returns [Error::InvalidPhotoUrl] if the URL does not start with
/// `http://` or `https://`.
pub fn parse_photo_url(raw_url: Option<&str>) -> Result<Option<String>, Error> {
    let Some(url) = raw_url.map(str::trim).filter(|url| !url.is_empty()) else {
        return Ok(None);
    };

    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(Some(url.to_owned()))
    } else {
        Err(Error::InvalidPhotoUrl(url.to_owned()))
    }
}

/// A user's profile, together with the email they log in with.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserID,
    pub name: ProfileName,
    pub email: Email,
    pub photo_url: Option<String>,
    pub updated_at: OffsetDateTime,
}

/// Create the profile table.
pub fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS profile (
            user_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            photo_url TEXT,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create the profile for a newly registered user.
pub fn create_profile(
    user_id: UserID,
    name: &ProfileName,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO profile (user_id, name, photo_url, updated_at) VALUES (?1, ?2, NULL, ?3)",
        (user_id, name.as_ref(), OffsetDateTime::now_utc()),
    )?;

    Ok(())
}

/// Get the profile of `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user has no profile.
pub fn get_profile(user_id: UserID, connection: &Connection) -> Result<Profile, Error> {
    connection
        .prepare(
            "SELECT profile.user_id, profile.name, user.email, profile.photo_url, profile.updated_at
            FROM profile INNER JOIN user ON user.id = profile.user_id
            WHERE profile.user_id = :user_id",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], map_profile_row)
        .map_err(|error| error.into())
}

/// Set the name and photo of `user_id`'s profile.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user has no profile.
pub fn update_profile(
    user_id: UserID,
    name: &ProfileName,
    photo_url: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE profile SET name = ?1, photo_url = ?2, updated_at = ?3 WHERE user_id = ?4",
        (name.as_ref(), photo_url, OffsetDateTime::now_utc(), user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_profile_row(row: &Row) -> Result<Profile, rusqlite::Error> {
    let user_id = UserID::new(row.get(0)?);
    let raw_name: String = row.get(1)?;
    let raw_email: String = row.get(2)?;

    Ok(Profile {
        user_id,
        name: ProfileName::new_unchecked(&raw_name),
        email: Email::new_unchecked(&raw_email),
        photo_url: row.get(3)?,
        updated_at: row.get(4)?,
    })
}


#[cfg(test)]
mod profile_query_tests {
    use crate::{
        Error,
        auth::UserID,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{ProfileName, get_profile, update_profile};

    #[test]
    fn get_profile_includes_email() {
        let connection = get_test_connection();
        let user = create_test_user("ada@example.com", &connection);

        let profile = get_profile(user.id, &connection).unwrap();

        assert_eq!(profile.user_id, user.id);
        assert_eq!(profile.name.as_ref(), "Test");
        assert_eq!(profile.email, user.email);
        assert_eq!(profile.photo_url, None);
    }

    #[test]
    fn update_profile_changes_name_and_photo() {
        let connection = get_test_connection();
        let user = create_test_user("ada@example.com", &connection);
        let before = get_profile(user.id, &connection).unwrap();

        update_profile(
            user.id,
            &ProfileName::new_unchecked("Ada"),
            Some("https://example.com/ada.png"),
            &connection,
        )
        .unwrap();

        let after = get_profile(user.id, &connection).unwrap();
        assert_eq!(after.name.as_ref(), "Ada");
        assert_eq!(after.photo_url.as_deref(), Some("https://example.com/ada.png"));
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn missing_profile_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(
            get_profile(UserID::new(99), &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            update_profile(
                UserID::new(99),
                &ProfileName::new_unchecked("Nobody"),
                None,
                &connection
            ),
            Err(Error::NotFound)
        );
    }
}
