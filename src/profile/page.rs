//! The profile page and the endpoint for saving profile changes.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
    profile::{Profile, ProfileName, get_profile, parse_photo_url, update_profile},
};

/// The state needed for the profile page and endpoint.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of the profile form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub photo_url: Option<String>,
}

/// Display the profile page.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let profile = get_profile(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get profile for {user_id}: {error}"))?;

    Ok(profile_view(&profile).into_response())
}

/// Save the name and photo URL from the profile form.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let name = ProfileName::new(&form.name);
    let photo_url = parse_photo_url(form.photo_url.as_deref());

    let (name, photo_url) = match (name, photo_url) {
        (Ok(name), Ok(photo_url)) => (name, photo_url),
        (Err(error), _) | (_, Err(error)) => {
            return profile_form(&form, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_profile(user_id, &name, photo_url.as_deref(), &connection) {
        Ok(()) => (
            HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update profile for {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn profile_view(profile: &Profile) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let form = ProfileForm {
        name: profile.name.to_string(),
        photo_url: profile.photo_url.clone(),
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full flex items-center gap-4 mb-6"
            {
                @if let Some(photo_url) = &profile.photo_url {
                    img
                        src=(photo_url)
                        alt="Profile photo"
                        class="w-16 h-16 rounded-full object-cover";
                }

                div
                {
                    h1 class="text-xl font-bold" { (profile.name) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (profile.email) }
                }
            }

            (profile_form(&form, ""))

            p class="mt-4 text-xs text-gray-500 dark:text-gray-400"
            {
                "Last updated " (profile.updated_at.date())
            }
        }
    };

    base("Profile", &[], &content)
}

fn profile_form(form: &ProfileForm, error_message: &str) -> Markup {
    html! {
        form
            hx-put=(endpoints::PROFILE_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(form.name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="photo_url" class=(FORM_LABEL_STYLE) { "Photo URL" }

                input
                    id="photo_url"
                    type="url"
                    name="photo_url"
                    placeholder="https://example.com/me.png"
                    value=[form.photo_url.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Save"
            }
        }
    }
}

#[cfg(test)]
mod profile_page_tests {
    use axum::{
        Extension, Form,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
    };
    use scraper::Selector;

    use crate::{
        endpoints,
        profile::get_profile,
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, get_test_db_with_user, must_get_form,
            parse_html_document, parse_html_fragment,
        },
    };

    use super::{ProfileForm, ProfileState, get_profile_page, update_profile_endpoint};

    #[tokio::test]
    async fn page_shows_profile_form() {
        let (db_connection, user) = get_test_db_with_user();
        let state = ProfileState { db_connection };

        let response = get_profile_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-put");
        assert_form_input_with_value(&form, "name", "text", "Test");
        let email = html
            .select(&Selector::parse("p.text-sm").unwrap())
            .next()
            .expect("email missing")
            .text()
            .collect::<String>();
        assert_eq!(email, "test@example.com");
    }

    #[tokio::test]
    async fn update_saves_profile() {
        let (db_connection, user) = get_test_db_with_user();
        let state = ProfileState {
            db_connection: db_connection.clone(),
        };
        let form = ProfileForm {
            name: "Ada".to_owned(),
            photo_url: Some("https://example.com/ada.png".to_owned()),
        };

        let response = update_profile_endpoint(State(state), Extension(user.id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::PROFILE_VIEW);
        let profile = get_profile(user.id, &db_connection.lock().unwrap()).unwrap();
        assert_eq!(profile.name.as_ref(), "Ada");
        assert_eq!(
            profile.photo_url.as_deref(),
            Some("https://example.com/ada.png")
        );
    }

    #[tokio::test]
    async fn update_with_blank_name_shows_error() {
        let (db_connection, user) = get_test_db_with_user();
        let state = ProfileState {
            db_connection: db_connection.clone(),
        };
        let form = ProfileForm {
            name: "  ".to_owned(),
            photo_url: None,
        };

        let response = update_profile_endpoint(State(state), Extension(user.id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Name cannot be empty");
        let profile = get_profile(user.id, &db_connection.lock().unwrap()).unwrap();
        assert_eq!(profile.name.as_ref(), "Test");
    }
}
