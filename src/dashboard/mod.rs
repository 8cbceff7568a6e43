//! Dashboard module
//!
//! Provides an overview page with the month's totals and goal progress.

mod page;

pub use page::get_dashboard_page;
