//! The dashboard: a greeting, the month's totals and progress on each goal.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    goal::{Goal, get_goals, goal_card},
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    month_window::{MonthNavigation, MonthQuery},
    navigation::NavBar,
    profile::get_profile,
    timezone::local_today,
    transaction::{get_transactions_in_window, summarize_month, summary_cards},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display an overview of one month and the user's goals.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, Error> {
    let reference = match query.month {
        Some(month) => month,
        None => local_today(&state.local_timezone)?,
    };
    let navigation = MonthNavigation::new(reference);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let name = match get_profile(user_id, &connection) {
        Ok(profile) => Some(profile.name.to_string()),
        Err(Error::NotFound) => {
            tracing::warn!("user {user_id} has no profile");
            None
        }
        Err(error) => {
            tracing::error!("Could not get profile for user {user_id}: {error}");
            return Err(error);
        }
    };

    let transactions = get_transactions_in_window(user_id, &navigation.window, &connection)
        .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?;
    let summary = summarize_month(&navigation.window, &transactions);

    let goals = get_goals(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get goals: {error}"))?;

    let content = html! {
        (summary_cards(&summary))
        (goals_section(&goals))
    };

    Ok(dashboard_view(name.as_deref(), navigation, &content).into_response())
}

fn goals_section(goals: &[Goal]) -> Markup {
    html! {
        section class="space-y-4" aria-labelledby="goals-heading"
        {
            header class="flex justify-between items-end"
            {
                h2 id="goals-heading" class="text-lg font-semibold" { "Goals" }

                a href=(endpoints::GOALS_VIEW) class=(LINK_STYLE) { "All goals" }
            }

            @if goals.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No goals yet. "
                    a href=(endpoints::NEW_GOAL_VIEW) class=(LINK_STYLE) { "Create a goal" }
                    " to start tracking your savings."
                }
            } @else {
                div class="grid gap-4 sm:grid-cols-2"
                {
                    @for goal in goals {
                        (goal_card(goal))
                    }
                }
            }
        }
    }
}

fn dashboard_view(name: Option<&str>, navigation: MonthNavigation, content: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let page = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" data-greeting
                    {
                        @match name {
                            Some(name) => { "Hello, " (name) }
                            None => { "Welcome back" }
                        }
                    }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                (navigation.into_html(endpoints::DASHBOARD_VIEW))

                (content)
            }
        }
    };

    base("Dashboard", &[], &page)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Date, macros::date};

    use crate::{
        auth::UserID,
        goal::{GoalName, create_goal},
        money::Money,
        month_window::MonthQuery,
        pagination::PaginationConfig,
        test_utils::{
            assert_content_type, assert_valid_html, create_test_user, get_test_db_with_user,
            parse_html_document,
        },
        transaction::{Transaction, TransactionType, create_transactions},
    };

    use super::{DashboardState, get_dashboard_page};

    fn state(db_connection: &Arc<Mutex<Connection>>) -> DashboardState {
        DashboardState {
            db_connection: db_connection.clone(),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn add(
        user_id: UserID,
        transaction_type: TransactionType,
        cents: i64,
        date: Date,
        connection: &Connection,
    ) {
        create_transactions(
            user_id,
            &[Transaction::build(transaction_type, Money::from_cents(cents), date)],
            connection,
        )
        .expect("Could not create transaction");
    }

    fn text_of(html: &Html, selector: &str) -> Vec<String> {
        html.select(&Selector::parse(selector).unwrap())
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    async fn dashboard_for(
        db_connection: &Arc<Mutex<Connection>>,
        user_id: UserID,
        month: Option<Date>,
    ) -> Html {
        let response = get_dashboard_page(
            State(state(db_connection)),
            Extension(user_id),
            Query(MonthQuery { month }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        parse_html_document(response).await
    }

    #[tokio::test]
    async fn greets_user_with_empty_month() {
        let (db_connection, user) = get_test_db_with_user();

        let html = dashboard_for(&db_connection, user.id, Some(date!(2024 - 02 - 10))).await;

        assert_valid_html(&html);
        assert_eq!(text_of(&html, "[data-greeting]"), vec!["Hello, Test"]);
        assert_eq!(text_of(&html, "main h2").first().map(String::as_str), Some("February 2024"));
        assert_eq!(
            text_of(&html, "[data-summary] dd"),
            vec!["$0.00", "$0.00", "$0.00"]
        );
        assert!(
            text_of(&html, "section p")
                .iter()
                .any(|text| text.starts_with("No goals yet."))
        );
    }

    #[tokio::test]
    async fn shows_month_totals_and_goals() {
        let (db_connection, user) = get_test_db_with_user();
        {
            let connection = db_connection.lock().unwrap();
            add(user.id, TransactionType::Income, 50_000, date!(2024 - 02 - 01), &connection);
            add(user.id, TransactionType::Expense, 2_500, date!(2024 - 02 - 29), &connection);
            add(user.id, TransactionType::Expense, 9_999, date!(2024 - 03 - 01), &connection);
            let other_user = create_test_user("other@example.com", &connection);
            add(other_user.id, TransactionType::Income, 700, date!(2024 - 02 - 05), &connection);
            create_goal(
                user.id,
                &GoalName::new_unchecked("Holiday"),
                Money::from_cents(120_000),
                12,
                &connection,
            )
            .unwrap();
            create_goal(
                other_user.id,
                &GoalName::new_unchecked("Secret"),
                Money::from_cents(500),
                1,
                &connection,
            )
            .unwrap();
        }

        let html = dashboard_for(&db_connection, user.id, Some(date!(2024 - 02 - 15))).await;

        assert_eq!(
            text_of(&html, "[data-summary] dd"),
            vec!["$500.00", "$25.00", "$475.00"]
        );
        assert_eq!(text_of(&html, "article[data-goal-id] a"), vec!["Holiday"]);
        assert_eq!(text_of(&html, "article [data-percent]"), vec!["0%"]);
    }

    #[tokio::test]
    async fn totals_match_ledger() {
        use crate::transaction::{LedgerQuery, LedgerState, get_ledger_page};

        let (db_connection, user) = get_test_db_with_user();
        {
            let connection = db_connection.lock().unwrap();
            add(user.id, TransactionType::Income, 10_000, date!(2024 - 01 - 31), &connection);
            add(user.id, TransactionType::Expense, 12_345, date!(2024 - 01 - 01), &connection);
            add(user.id, TransactionType::Expense, 100, date!(2023 - 12 - 31), &connection);
            add(user.id, TransactionType::Income, 200, date!(2024 - 02 - 01), &connection);
        }
        let month = date!(2024 - 01 - 20);

        let dashboard = dashboard_for(&db_connection, user.id, Some(month)).await;
        let ledger_response = get_ledger_page(
            State(LedgerState {
                db_connection: db_connection.clone(),
                local_timezone: "Etc/UTC".to_owned(),
                pagination_config: PaginationConfig::default(),
            }),
            Extension(user.id),
            Query(LedgerQuery {
                month: Some(month),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        let ledger = parse_html_document(ledger_response).await;

        let dashboard_totals = text_of(&dashboard, "[data-summary] dd");
        assert_eq!(dashboard_totals, vec!["$100.00", "$123.45", "-$23.45"]);
        assert_eq!(dashboard_totals, text_of(&ledger, "[data-summary] dd"));
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let (db_connection, user) = get_test_db_with_user();

        let result = get_dashboard_page(
            State(DashboardState {
                db_connection,
                local_timezone: "Not/AZone".to_owned(),
            }),
            Extension(user.id),
            Query(MonthQuery::default()),
        )
        .await;

        assert!(result.is_err());
    }
}
