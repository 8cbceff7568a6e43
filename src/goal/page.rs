//! A single goal's page, with the endpoints for adding contributions and
//! recalculating the saved amount.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    endpoints::{self, format_endpoint},
    goal::{
        Goal, GoalId, GoalProgress,
        contribution::{Contribution, ContributionId, add_contribution, get_contributions},
        core::get_goal,
        list::GoalState,
        reconcile::reconcile_goal_balance,
    },
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles, edit_delete_action_links,
        format_money, loading_spinner, money_input, progress_bar,
    },
    money::Money,
    navigation::NavBar,
    timezone::local_today,
};

/// Form data for adding or editing a contribution.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContributionForm {
    /// The amount as typed by the user, e.g. "12,30".
    pub amount: String,
    pub date: Date,
}

/// Render a goal with its progress and contributions.
///
/// Redirects to the goals page if the goal does not exist.
pub async fn get_goal_page(
    Path(goal_id): Path<GoalId>,
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let goal = match get_goal(goal_id, user_id, &connection) {
        Ok(goal) => goal,
        Err(Error::NotFound) => return Ok(Redirect::to(endpoints::GOALS_VIEW).into_response()),
        Err(error) => {
            tracing::error!("Could not get goal {goal_id}: {error}");
            return Err(error);
        }
    };

    let contributions = get_contributions(goal_id, user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get contributions: {error}"))?;

    let form = contribution_form(ContributionFormAction::Add(goal_id), None, today, "");

    Ok(goal_view(&goal, &contributions, &form).into_response())
}

/// Add a contribution to a goal and redirect back to the goal's page.
pub async fn add_contribution_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ContributionForm>,
) -> Response {
    let amount = match Money::parse(&form.amount) {
        Ok(amount) => amount,
        Err(error) => {
            return contribution_form(
                ContributionFormAction::Add(goal_id),
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

    match add_contribution(goal_id, user_id, amount, form.date, &connection) {
        Ok(_) => (
            HxRedirect(format_endpoint(endpoints::GOAL_VIEW, goal_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not add contribution to goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Recalculate a goal's saved amount from its contributions.
pub async fn reconcile_goal_endpoint(
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

    let result = get_goal(goal_id, user_id, &connection)
        .and_then(|goal| reconcile_goal_balance(goal.id, &connection));

    match result {
        Ok(total) => {
            tracing::info!("recalculated goal {goal_id}, saved amount is now {total}");

            (
                HxRedirect(format_endpoint(endpoints::GOAL_VIEW, goal_id)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not recalculate goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Where the contribution form is submitted to.
pub(super) enum ContributionFormAction {
    /// Add a contribution to the goal.
    Add(GoalId),
    /// Update an existing contribution.
    Edit(ContributionId),
}

pub(super) fn contribution_form(
    action: ContributionFormAction,
    amount: Option<&str>,
    date: Date,
    error_message: &str,
) -> Markup {
    let (post_url, put_url, submit_text) = match action {
        ContributionFormAction::Add(goal_id) => (
            Some(format_endpoint(endpoints::GOAL_CONTRIBUTIONS, goal_id)),
            None,
            "Add Contribution",
        ),
        ContributionFormAction::Edit(contribution_id) => (
            None,
            Some(format_endpoint(endpoints::CONTRIBUTION, contribution_id)),
            "Update Contribution",
        ),
    };

    html! {
        form
            hx-post=[post_url]
            hx-put=[put_url]
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-disabled-elt="#contribution-submit"
            hx-indicator="#indicator"
            class="w-full space-y-4"
        {
            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            (money_input("amount", "Amount", amount, true))

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="date"
                    value=(date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="contribution-submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                (submit_text)
            }
        }
    }
}

/// A warning shown when the stored saved amount no longer matches the
/// contributions, with a button to recalculate it.
fn stale_balance_warning(goal_id: GoalId, stored: Money, actual: Money) -> Markup {
    html! {
        div
            role="alert"
            data-stale-balance
            class="p-4 space-y-2 rounded-lg bg-yellow-50 text-yellow-800 dark:bg-gray-800 dark:text-yellow-300"
        {
            p
            {
                "The saved amount (" (format_money(stored)) ") does not match the sum of the \
                contributions (" (format_money(actual)) ")."
            }

            button
                type="button"
                hx-post=(format_endpoint(endpoints::GOAL_RECONCILE, goal_id))
                hx-target-error="#alert-container"
                hx-disabled-elt="this"
                class=(BUTTON_SECONDARY_STYLE)
            {
                "Recalculate"
            }
        }
    }
}

fn contribution_row(contribution: &Contribution) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_CONTRIBUTION_VIEW, contribution.id);
    let delete_url = format_endpoint(endpoints::CONTRIBUTION, contribution.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (contribution.date) }
            td class=(TABLE_CELL_STYLE) { (format_money(contribution.amount)) }
            td class=(TABLE_CELL_STYLE)
            {
                (edit_delete_action_links(
                    &edit_url,
                    &delete_url,
                    "Are you sure you want to delete this contribution?",
                    "closest tr",
                    "none",
                ))
            }
        }
    }
}

fn goal_view(goal: &Goal, contributions: &[Contribution], form: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();
    let head_elements: [HeadElement; 1] = [dollar_input_styles()];
    let progress = GoalProgress::new(goal.current_amount, goal.target_amount);
    let percent = progress.display_percent();
    let contribution_total: Money = contributions
        .iter()
        .map(|contribution| contribution.amount)
        .sum();
    let delete_url = format_endpoint(endpoints::GOAL, goal.id);
    let delete_confirm = format!(
        "Are you sure you want to delete '{}'? Its contributions will be deleted too.",
        goal.name
    );

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-3xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { (goal.name) }

                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(delete_confirm)
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete Goal"
                    }
                }

                @if contribution_total != goal.current_amount {
                    (stale_balance_warning(goal.id, goal.current_amount, contribution_total))
                }

                dl class="grid grid-cols-2 sm:grid-cols-4 gap-4" data-goal-summary
                {
                    div { dt class="text-sm text-gray-500" { "Saved" } dd { (format_money(goal.current_amount)) } }
                    div { dt class="text-sm text-gray-500" { "Target" } dd { (format_money(goal.target_amount)) } }
                    div
                    {
                        dt class="text-sm text-gray-500" { "Monthly" }
                        dd
                        {
                            @match goal.monthly_amount {
                                Some(monthly) => { (format_money(monthly)) }
                                None => { "-" }
                            }
                        }
                    }
                    div { dt class="text-sm text-gray-500" { "Months" } dd { (goal.months_to_complete) } }
                }

                div class="space-y-1"
                {
                    (progress_bar(percent))
                    p class="text-sm" data-percent { (percent) "%" }
                }

                div class="max-w-md"
                {
                    h2 class="text-lg font-semibold mb-2" { "Add Contribution" }
                    (form)
                }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for contribution in contributions {
                            (contribution_row(contribution))
                        }

                        @if contributions.is_empty() {
                            tr
                            {
                                td
                                    colspan="3"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No contributions yet."
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base(goal.name.as_ref(), &head_elements, &content)
}
