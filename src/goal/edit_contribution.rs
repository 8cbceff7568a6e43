//! The page and endpoints for editing and deleting a goal contribution.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    goal::{
        contribution::{ContributionId, delete_contribution, get_contribution, update_contribution},
        list::GoalState,
        page::{ContributionForm, ContributionFormAction, contribution_form},
    },
    html::{FORM_CONTAINER_STYLE, HeadElement, LINK_STYLE, base, dollar_input_styles},
    money::Money,
    navigation::NavBar,
};

/// Render the form for editing a contribution.
///
/// Redirects to the goals page if the contribution does not exist.
pub async fn get_edit_contribution_page(
    Path(contribution_id): Path<ContributionId>,
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let contribution = match get_contribution(contribution_id, user_id, &connection) {
        Ok(contribution) => contribution,
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::GOALS_VIEW).into_response()),
        Err(error) => {
            tracing::error!("Could not get contribution {contribution_id}: {error}");
            return Err(error);
        }
    };

    let amount = contribution.amount.to_string();
    let form = contribution_form(
        ContributionFormAction::Edit(contribution_id),
        Some(&amount),
        contribution.date,
        "",
    );
    let goal_url = format_endpoint(endpoints::GOAL_VIEW, contribution.goal_id);

    Ok(edit_contribution_view(&form, &goal_url).into_response())
}

/// Change a contribution's amount and date, redirecting to its goal's page.
pub async fn update_contribution_endpoint(
    Path(contribution_id): Path<ContributionId>,
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ContributionForm>,
) -> Response {
    let amount = match Money::parse(&form.amount) {
        Ok(amount) => amount,
        Err(error) => {
            return contribution_form(
                ContributionFormAction::Edit(contribution_id),
                Some(&form.amount),
                form.date,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_contribution(contribution_id, user_id, amount, form.date, &connection) {
        Ok(contribution) => (
            HxRedirect(format_endpoint(endpoints::GOAL_VIEW, contribution.goal_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update contribution {contribution_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Delete a contribution, redirecting to its goal's page so the new saved
/// amount is shown.
pub async fn delete_contribution_endpoint(
    Path(contribution_id): Path<ContributionId>,
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_contribution(contribution_id, user_id, &connection) {
        Ok(goal_id) => (
            HxRedirect(format_endpoint(endpoints::GOAL_VIEW, goal_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not delete contribution {contribution_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_contribution_view(form: &Markup, goal_url: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();
    let head_elements: [HeadElement; 1] = [dollar_input_styles()];

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit Contribution" }

                (form)

                a href=(goal_url) class=(LINK_STYLE) { "Back to goal" }
            }
        }
    };

    base("Edit Contribution", &head_elements, &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        goal::{
            Goal, GoalName,
            contribution::{Contribution, add_contribution},
            create_goal, get_goal,
            page::ContributionForm,
        },
        money::Money,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, create_test_user, get_header, get_test_db_with_user, must_get_form,
            parse_html_document,
        },
    };

    use super::{
        GoalState, delete_contribution_endpoint, get_edit_contribution_page,
        update_contribution_endpoint,
    };

    fn setup() -> (Arc<Mutex<Connection>>, crate::auth::User, Goal, Contribution) {
        let (db_connection, user) = get_test_db_with_user();
        let (goal, contribution) = {
            let connection = db_connection.lock().unwrap();
            let goal = create_goal(
                user.id,
                &GoalName::new_unchecked("Holiday"),
                Money::from_cents(120_000),
                12,
                &connection,
            )
            .unwrap();
            let contribution = add_contribution(
                goal.id,
                user.id,
                Money::from_cents(5_000),
                date!(2024 - 01 - 10),
                &connection,
            )
            .unwrap();
            (goal, contribution)
        };

        (db_connection, user, goal, contribution)
    }

    fn state(db_connection: &Arc<Mutex<Connection>>) -> GoalState {
        GoalState {
            db_connection: db_connection.clone(),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let (db_connection, user, _, contribution) = setup();

        let response = get_edit_contribution_page(
            Path(contribution.id),
            State(state(&db_connection)),
            Extension(user.id),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::CONTRIBUTION, contribution.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "text", "50.00");
        assert_form_input_with_value(&form, "date", "date", "2024-01-10");
    }

    #[tokio::test]
    async fn edit_page_for_other_user_redirects() {
        let (db_connection, _, _, contribution) = setup();
        let intruder = create_test_user("intruder@example.com", &db_connection.lock().unwrap());

        let response = get_edit_contribution_page(
            Path(contribution.id),
            State(state(&db_connection)),
            Extension(intruder.id),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::GOALS_VIEW);
    }

    #[tokio::test]
    async fn update_reconciles_goal() {
        let (db_connection, user, goal, contribution) = setup();

        let response = update_contribution_endpoint(
            Path(contribution.id),
            State(state(&db_connection)),
            Extension(user.id),
            Form(ContributionForm {
                amount: "70".to_owned(),
                date: date!(2024 - 02 - 10),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, &format!("/goals/{}", goal.id));
        assert_eq!(
            get_goal(goal.id, user.id, &db_connection.lock().unwrap())
                .unwrap()
                .current_amount,
            Money::from_cents(7_000)
        );
    }

    #[tokio::test]
    async fn delete_reconciles_goal() {
        let (db_connection, user, goal, contribution) = setup();

        let response = delete_contribution_endpoint(
            Path(contribution.id),
            State(state(&db_connection)),
            Extension(user.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            get_goal(goal.id, user.id, &db_connection.lock().unwrap())
                .unwrap()
                .current_amount,
            Money::ZERO
        );
    }

    #[tokio::test]
    async fn other_users_cannot_change_contribution() {
        let (db_connection, user, goal, contribution) = setup();
        let intruder = create_test_user("intruder@example.com", &db_connection.lock().unwrap());

        let update = update_contribution_endpoint(
            Path(contribution.id),
            State(state(&db_connection)),
            Extension(intruder.id),
            Form(ContributionForm {
                amount: "1".to_owned(),
                date: date!(2024 - 02 - 10),
            }),
        )
        .await;
        let delete = delete_contribution_endpoint(
            Path(contribution.id),
            State(state(&db_connection)),
            Extension(intruder.id),
        )
        .await;

        assert_eq!(update.status(), StatusCode::NOT_FOUND);
        assert_eq!(delete.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_goal(goal.id, user.id, &db_connection.lock().unwrap())
                .unwrap()
                .current_amount,
            Money::from_cents(5_000)
        );
    }
}
