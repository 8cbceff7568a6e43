//! Savings goals and the contributions made towards them.
//!
//! A goal stores the sum of its contributions as its saved amount. Every
//! contribution change reconciles that amount in the same SQL transaction,
//! and the goal page offers to recalculate it if it is ever found to be stale.

mod contribution;
mod core;
mod edit_contribution;
mod list;
mod page;
mod progress;
mod reconcile;

pub use contribution::create_contribution_table;
pub use core::{
    Goal, GoalId, GoalName, create_goal, create_goal_table, delete_goal, get_goal, get_goals,
};
pub use edit_contribution::{
    delete_contribution_endpoint, get_edit_contribution_page, update_contribution_endpoint,
};
pub use list::{
    create_goal_endpoint, delete_goal_endpoint, get_goals_page, get_new_goal_page, goal_card,
};
pub use page::{add_contribution_endpoint, get_goal_page, reconcile_goal_endpoint};
pub use progress::GoalProgress;
