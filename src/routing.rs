//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    category::{create_category_endpoint, delete_category_endpoint, get_categories_page},
    dashboard::get_dashboard_page,
    endpoints,
    goal::{
        add_contribution_endpoint, create_goal_endpoint, delete_contribution_endpoint,
        delete_goal_endpoint, get_edit_contribution_page, get_goal_page, get_goals_page,
        get_new_goal_page, reconcile_goal_endpoint, update_contribution_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    profile::{get_profile_page, update_profile_endpoint},
    shopping::{
        add_item_endpoint, create_shopping_list_endpoint, delete_item_endpoint,
        delete_shopping_list_endpoint, get_edit_item_page, get_shopping_page,
        toggle_item_checked_endpoint, update_item_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_edit_transaction_page,
        get_ledger_page, get_new_transaction_page, toggle_paid_endpoint,
        update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_ledger_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::NEW_GOAL_VIEW, get(get_new_goal_page))
        .route(endpoints::GOAL_VIEW, get(get_goal_page))
        .route(
            endpoints::EDIT_CONTRIBUTION_VIEW,
            get(get_edit_contribution_page),
        )
        .route(endpoints::SHOPPING_VIEW, get(get_shopping_page))
        .route(endpoints::EDIT_SHOPPING_ITEM_VIEW, get(get_edit_item_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::PROFILE_API, put(update_profile_endpoint))
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::TRANSACTION,
                put(update_transaction_endpoint).delete(delete_transaction_endpoint),
            )
            .route(endpoints::TRANSACTION_PAID, put(toggle_paid_endpoint))
            .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
            .route(
                endpoints::CATEGORY,
                delete(delete_category_endpoint),
            )
            .route(endpoints::GOALS_API, post(create_goal_endpoint))
            .route(endpoints::GOAL, delete(delete_goal_endpoint))
            .route(
                endpoints::GOAL_CONTRIBUTIONS,
                post(add_contribution_endpoint),
            )
            .route(endpoints::GOAL_RECONCILE, post(reconcile_goal_endpoint))
            .route(
                endpoints::CONTRIBUTION,
                put(update_contribution_endpoint).delete(delete_contribution_endpoint),
            )
            .route(
                endpoints::SHOPPING_LISTS_API,
                post(create_shopping_list_endpoint),
            )
            .route(
                endpoints::SHOPPING_LIST,
                delete(delete_shopping_list_endpoint),
            )
            .route(endpoints::SHOPPING_LIST_ITEMS, post(add_item_endpoint))
            .route(
                endpoints::SHOPPING_ITEM,
                put(update_item_endpoint).delete(delete_item_endpoint),
            )
            .route(
                endpoints::SHOPPING_ITEM_CHECKED,
                put(toggle_item_checked_endpoint),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}

#[cfg(test)]
mod router_tests {
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        AppState, PaginationConfig,
        auth::COOKIE_TOKEN,
        endpoints::{self, format_endpoint},
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(
            connection,
            "nafstenoas",
            "Etc/UTC",
            PaginationConfig::default(),
        )
        .expect("Could not create app state");

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn register(server: &TestServer) -> Cookie<'static> {
        let response = server
            .post(endpoints::USERS)
            .form(&[
                ("name", "Test"),
                ("email", "test@example.com"),
                ("password", "roostersgocockledoodledoo"),
                ("confirm_password", "roostersgocockledoodledoo"),
            ])
            .await;

        assert_eq!(response.header("hx-redirect"), endpoints::DASHBOARD_VIEW);
        response.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_session() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::GOALS_VIEW,
            endpoints::SHOPPING_VIEW,
            endpoints::PROFILE_VIEW,
        ] {
            let response = server.get(page).await;

            response.assert_status_see_other();
            assert!(
                response
                    .header("location")
                    .to_str()
                    .unwrap()
                    .starts_with(endpoints::LOG_IN_VIEW),
                "{page} did not redirect to the log in page"
            );
        }
    }

    #[tokio::test]
    async fn api_routes_use_hx_redirect_without_session() {
        let server = get_test_server();

        let response = server
            .post(endpoints::GOALS_API)
            .add_header("HX-Request", "true")
            .form(&[("name", "Holiday"), ("target_amount", "100")])
            .await;

        assert!(
            response
                .header("hx-redirect")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn registered_user_can_use_every_section() {
        let server = get_test_server();
        let cookie = register(&server).await;

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::GOALS_VIEW,
            endpoints::NEW_GOAL_VIEW,
            endpoints::SHOPPING_VIEW,
            endpoints::PROFILE_VIEW,
        ] {
            server.get(page).add_cookie(cookie.clone()).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn goal_flow_through_router() {
        let server = get_test_server();
        let cookie = register(&server).await;

        let response = server
            .post(endpoints::GOALS_API)
            .add_cookie(cookie.clone())
            .form(&[
                ("name", "Holiday"),
                ("target_amount", "1200"),
                ("months_to_complete", "12"),
            ])
            .await;
        response.assert_status_see_other();
        let goal_url = format_endpoint(endpoints::GOAL_VIEW, 1);
        assert_eq!(response.header("hx-redirect"), goal_url.as_str());

        server
            .post(&format_endpoint(endpoints::GOAL_CONTRIBUTIONS, 1))
            .add_cookie(cookie.clone())
            .form(&[("amount", "120"), ("date", "2024-01-10")])
            .await
            .assert_status_see_other();

        let page = server.get(&goal_url).add_cookie(cookie).await;
        page.assert_status_ok();
        assert!(page.text().contains("10%"));
    }

    #[tokio::test]
    async fn non_numeric_counts_are_reported_in_the_form() {
        let server = get_test_server();
        let cookie = register(&server).await;

        let goal = server
            .post(endpoints::GOALS_API)
            .add_cookie(cookie.clone())
            .form(&[
                ("name", "Holiday"),
                ("target_amount", "1200"),
                ("months_to_complete", "twelve"),
            ])
            .await;
        goal.assert_status_ok();
        assert!(goal.text().contains("is not a whole number"));

        let transaction = server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .form(&[
                ("type_", "expense"),
                ("amount", "200"),
                ("date", "2024-01-31"),
                ("is_recurring", "true"),
                ("recurring_months", "-2"),
            ])
            .await;
        transaction.assert_status_ok();
        assert!(transaction.text().contains("is not a whole number"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server.get("/does-not-exist").await.assert_status_not_found();
    }
}
