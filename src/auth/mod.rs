//! Users, passwords, sessions and the pages for logging in and registering.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register;
mod token;
mod user;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{get_register_page, register_user};
pub(crate) use token::Token;
pub use user::{Email, User, UserID, create_user, create_user_table};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
