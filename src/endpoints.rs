//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/goals/{goal_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions for a month.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing and creating categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for listing savings goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for creating a new savings goal.
pub const NEW_GOAL_VIEW: &str = "/goals/new";
/// The page for a single goal and its contributions.
pub const GOAL_VIEW: &str = "/goals/{goal_id}";
/// The page for editing a goal contribution.
pub const EDIT_CONTRIBUTION_VIEW: &str = "/contributions/{contribution_id}/edit";
/// The page for shopping lists.
pub const SHOPPING_VIEW: &str = "/shopping";
/// The page for editing a shopping list item.
pub const EDIT_SHOPPING_ITEM_VIEW: &str = "/shopping_items/{item_id}/edit";
/// The page for viewing and editing the user's profile.
pub const PROFILE_VIEW: &str = "/profile";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to update the current user's profile.
pub const PROFILE_API: &str = "/api/profile";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to toggle whether a transaction has been paid.
pub const TRANSACTION_PAID: &str = "/api/transactions/{transaction_id}/paid";
/// The route to create categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create goals.
pub const GOALS_API: &str = "/api/goals";
/// The route to delete a goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to add a contribution to a goal.
pub const GOAL_CONTRIBUTIONS: &str = "/api/goals/{goal_id}/contributions";
/// The route to recalculate a goal's current amount from its contributions.
pub const GOAL_RECONCILE: &str = "/api/goals/{goal_id}/reconcile";
/// The route to update or delete a contribution.
pub const CONTRIBUTION: &str = "/api/contributions/{contribution_id}";
/// The route to create shopping lists.
pub const SHOPPING_LISTS_API: &str = "/api/shopping_lists";
/// The route to delete a shopping list.
pub const SHOPPING_LIST: &str = "/api/shopping_lists/{list_id}";
/// The route to add an item to a shopping list.
pub const SHOPPING_LIST_ITEMS: &str = "/api/shopping_lists/{list_id}/items";
/// The route to update or delete a shopping list item.
pub const SHOPPING_ITEM: &str = "/api/shopping_items/{item_id}";
/// The route to toggle whether a shopping list item has been purchased.
pub const SHOPPING_ITEM_CHECKED: &str = "/api/shopping_items/{item_id}/checked";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/goals/{goal_id}', '{goal_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
