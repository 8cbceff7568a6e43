//! The goals page, the new goal page and the endpoints for creating and
//! deleting goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    goal::{
        Goal, GoalId, GoalName, GoalProgress,
        core::{create_goal, delete_goal, get_goals, monthly_amount},
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles, format_money,
        loading_spinner, money_input, progress_bar,
    },
    money::Money,
    navigation::NavBar,
    parse_whole_number,
};

/// The state needed by the goal pages and endpoints.
#[derive(Debug, Clone)]
pub struct GoalState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Form data for creating a goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalForm {
    pub name: String,
    pub target_amount: String,
    #[serde(default)]
    pub months_to_complete: String,
}

struct ValidGoal {
    name: GoalName,
    target_amount: Money,
    months_to_complete: u32,
}

impl GoalForm {
    fn validate(&self) -> Result<ValidGoal, Error> {
        let name = GoalName::new(&self.name)?;
        let target_amount = Money::parse(&self.target_amount)?;
        let months_to_complete = parse_whole_number(&self.months_to_complete)?
            .ok_or(Error::InvalidMonthsToComplete)?;
        monthly_amount(target_amount, months_to_complete)?;

        Ok(ValidGoal {
            name,
            target_amount,
            months_to_complete,
        })
    }
}

/// Render the user's goals with their progress.
pub async fn get_goals_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_goals(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve goals: {error}"))?;

    Ok(goals_view(&goals).into_response())
}

/// Render the page for creating a goal.
pub async fn get_new_goal_page() -> Response {
    new_goal_view(&goal_form("", None, "", "")).into_response()
}

/// Handle the new goal form, redirecting to the new goal's page.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<GoalForm>,
) -> Response {
    let goal = match form.validate() {
        Ok(goal) => goal,
        Err(error) => {
            return goal_form(
                &form.name,
                Some(&form.target_amount),
                &form.months_to_complete,
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

    match create_goal(
        user_id,
        &goal.name,
        goal.target_amount,
        goal.months_to_complete,
        &connection,
    ) {
        Ok(goal) => (
            HxRedirect(format_endpoint(endpoints::GOAL_VIEW, goal.id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not create goal: {error}");
            error.into_alert_response()
        }
    }
}

/// Delete a goal and its contributions, redirecting to the goals page.
pub async fn delete_goal_endpoint(
    Path(goal_id): Path<GoalId>,
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

    match delete_goal(goal_id, user_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not delete goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// A card with a goal's name, saved amount and progress bar.
pub fn goal_card(goal: &Goal) -> Markup {
    let progress = GoalProgress::new(goal.current_amount, goal.target_amount);
    let percent = progress.display_percent();
    let goal_url = format_endpoint(endpoints::GOAL_VIEW, goal.id);

    html! {
        article class="p-4 space-y-2 rounded-lg bg-white shadow dark:bg-gray-800" data-goal-id=(goal.id)
        {
            div class="flex justify-between items-baseline"
            {
                a href=(goal_url) class={ "font-semibold " (LINK_STYLE) } { (goal.name) }

                span class="text-sm" data-percent { (percent) "%" }
            }

            (progress_bar(percent))

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                (format_money(goal.current_amount)) " of " (format_money(goal.target_amount))

                @if let Some(monthly) = goal.monthly_amount {
                    " · " (format_money(monthly)) " a month"
                }
            }
        }
    }
}

fn goals_view(goals: &[Goal]) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-3xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Goals" }

                    a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Create Goal" }
                }

                @for goal in goals {
                    (goal_card(goal))
                }

                @if goals.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400" { "No goals yet." }
                }
            }
        }
    };

    base("Goals", &[], &content)
}

fn new_goal_view(form: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();
    let head_elements: [HeadElement; 1] = [dollar_input_styles()];

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Create Goal" }

                (form)
            }
        }
    };

    base("Create Goal", &head_elements, &content)
}

fn goal_form(
    name: &str,
    target_amount: Option<&str>,
    months_to_complete: &str,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::GOALS_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-disabled-elt="#goal-submit"
            hx-indicator="#indicator"
            class="w-full space-y-4"
        {
            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Goal Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g. Holiday"
                    value=(name)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (money_input("target_amount", "Target Amount", target_amount, true))

            div
            {
                label for="months_to_complete" class=(FORM_LABEL_STYLE) { "Months to Complete" }

                input
                    id="months_to_complete"
                    type="number"
                    name="months_to_complete"
                    min="1"
                    step="1"
                    placeholder="12"
                    value=(months_to_complete)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "You will be asked to save the target amount divided by the number of months \
                each month."
            }

            button type="submit" id="goal-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Goal"
            }
        }
    }
}

#[cfg(test)]
mod goals_page_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        goal::{GoalName, create_goal},
        money::Money,
        test_utils::{
            assert_valid_html, create_test_user, get_test_db_with_user, parse_html_document,
        },
    };

    use super::{GoalState, get_goals_page};

    #[tokio::test]
    async fn lists_own_goals_with_progress() {
        let (db_connection, user) = get_test_db_with_user();
        {
            let connection = db_connection.lock().unwrap();
            let goal = create_goal(
                user.id,
                &GoalName::new_unchecked("Holiday"),
                Money::from_cents(120_000),
                12,
                &connection,
            )
            .unwrap();
            connection
                .execute(
                    "UPDATE goal SET current_amount = 12000 WHERE id = ?1",
                    (goal.id,),
                )
                .unwrap();
            let other_user = create_test_user("other@example.com", &connection);
            create_goal(
                other_user.id,
                &GoalName::new_unchecked("Secret"),
                Money::from_cents(100),
                1,
                &connection,
            )
            .unwrap();
        }
        let state = GoalState {
            db_connection,
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_goals_page(State(state), Extension(user.id)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let names: Vec<String> = html
            .select(&Selector::parse("article a").unwrap())
            .map(|link| link.text().collect())
            .collect();
        assert_eq!(names, vec!["Holiday"]);
        let percent: String = html
            .select(&Selector::parse("[data-percent]").unwrap())
            .flat_map(|span| span.text())
            .collect();
        assert_eq!(percent, "10%");
        let bar = html
            .select(&Selector::parse("[role=progressbar]").unwrap())
            .next()
            .expect("want a progress bar");
        assert_eq!(bar.value().attr("aria-valuenow"), Some("10"));
    }
}
