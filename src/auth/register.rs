//! The registration page and the endpoint that creates a user and their profile.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        Email, PasswordHash, User, ValidatedPassword, cookie::set_auth_cookie,
        password::PASSWORD_MIN_LENGTH, user::create_user,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    profile::{ProfileName, create_profile},
    timezone::get_local_offset,
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long the session started by registering lasts.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data entered in the registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Error messages for each field of the registration form.
#[derive(Debug, Default)]
struct RegisterFormErrors {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
}

fn text_input(
    name: &str,
    label: &str,
    input_type: &str,
    value: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(input_type)
                name=(name)
                id=(name)
                value=(value)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm_password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm_password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(PASSWORD_MIN_LENGTH)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn registration_form(form: &RegisterForm, errors: &RegisterFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("name", "Name", "text", &form.name, errors.name.as_deref()))
            (text_input("email", "Email", "email", &form.email, errors.email.as_deref()))
            (password_input(&form.password, PASSWORD_MIN_LENGTH, errors.password.as_deref()))
            (confirm_password_input(errors.confirm_password.as_deref()))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form(&RegisterForm::default(), &RegisterFormErrors::default());
    let content = log_in_register("Create an account", &form);

    base("Register", &[], &content).into_response()
}

struct ValidRegistration {
    name: ProfileName,
    email: Email,
    password: ValidatedPassword,
}

fn validate_registration(form: &RegisterForm) -> Result<ValidRegistration, RegisterFormErrors> {
    let mut errors = RegisterFormErrors::default();

    let name = ProfileName::new(&form.name)
        .inspect_err(|error| errors.name = Some(error.to_string()))
        .ok();
    let email = Email::new(&form.email)
        .inspect_err(|error| errors.email = Some(error.to_string()))
        .ok();
    let user_inputs = [form.email.as_str(), form.name.as_str()];
    let password = ValidatedPassword::new(&form.password, &user_inputs)
        .inspect_err(|error| errors.password = Some(error.to_string()))
        .ok();

    if form.password != form.confirm_password {
        errors.confirm_password = Some("Passwords do not match".to_owned());
    }

    match (name, email, password, errors.confirm_password.is_none()) {
        (Some(name), Some(email), Some(password), true) => Ok(ValidRegistration {
            name,
            email,
            password,
        }),
        _ => Err(errors),
    }
}

fn create_user_with_profile(
    registration: ValidRegistration,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let transaction = connection.unchecked_transaction()?;

    let user = create_user(registration.email, password_hash, &transaction)?;
    create_profile(user.id, &registration.name, &transaction)?;

    transaction.commit()?;

    Ok(user)
}

/// Create a user and their profile, then log them in.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration = match validate_registration(&form) {
        Ok(registration) => registration,
        Err(errors) => return registration_form(&form, &errors).into_response(),
    };

    let password_hash =
        match PasswordHash::new(registration.password.clone(), PasswordHash::DEFAULT_COST) {
            Ok(hash) => hash,
            Err(error) => {
                tracing::error!("an error occurred while hashing a password: {error}");
                return get_internal_server_error_redirect();
            }
        };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => create_user_with_profile(registration, password_hash, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let user = match result {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            let errors = RegisterFormErrors {
                email: Some(Error::DuplicateEmail.to_string()),
                ..Default::default()
            };
            return registration_form(&form, &errors).into_response();
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_offset) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}
