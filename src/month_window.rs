//! Calendar month windows, month arithmetic and month-by-month navigation.
//!
//! The dashboard and the transaction ledger both resolve their `month` query
//! parameter through this module so that they always agree on which records
//! belong to a month.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, Month};

use crate::html::LINK_STYLE;

/// The first and last day of a calendar month, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    /// The first day of the month.
    pub from: Date,
    /// The last day of the month.
    pub to: Date,
}

impl MonthWindow {
    /// The window of the calendar month that contains `reference`.
    pub fn containing(reference: Date) -> Self {
        let year = reference.year();
        let month = reference.month();
        let from = reference.replace_day(1).unwrap_or(reference);
        let to = reference
            .replace_day(days_in_month(year, month))
            .unwrap_or(reference);

        Self { from, to }
    }

    /// Whether `date` falls on or between the first and last day of the window.
    pub fn contains(&self, date: Date) -> bool {
        self.from <= date && date <= self.to
    }

    /// The window of the month before this one.
    pub fn previous(&self) -> Option<Self> {
        add_months(self.from, -1).map(Self::containing)
    }

    /// The window of the month after this one.
    pub fn next(&self) -> Option<Self> {
        add_months(self.from, 1).map(Self::containing)
    }

    /// A label such as "February 2024".
    pub fn label(&self) -> String {
        format!("{} {}", self.from.month(), self.from.year())
    }
}

/// A record that happened on a particular day.
pub trait Dated {
    /// The day the record happened.
    fn date(&self) -> Date;
}

impl<T: Dated> Dated for &T {
    fn date(&self) -> Date {
        (*self).date()
    }
}

/// Keep the records whose date falls inside `window`, preserving their order.
pub fn filter_by_window<T: Dated>(
    records: impl IntoIterator<Item = T>,
    window: &MonthWindow,
) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| window.contains(record.date()))
        .collect()
}

/// Move `date` by `offset` calendar months, rolling over years as needed.
///
/// The day of the month is clamped to the length of the target month, so
/// 2024-01-31 plus one month is 2024-02-29.
///
/// Returns `None` if the result is outside the range supported by [Date].
pub fn add_months(date: Date, offset: i32) -> Option<Date> {
    let month_index = i64::from(date.year()) * 12
        + i64::from(u8::from(date.month()) - 1)
        + i64::from(offset);
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(month_index.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(days_in_month(year, month));

    Date::from_calendar_date(year, month, day).ok()
}

/// The number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Query parameters for pages that show a single month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// Any date in the month to display. Defaults to today.
    pub month: Option<Date>,
}

/// The month being displayed and the reference dates of its neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthNavigation {
    /// The date the window was computed from.
    pub reference: Date,
    /// The window containing `reference`.
    pub window: MonthWindow,
    /// `reference` moved back one month.
    pub previous: Option<Date>,
    /// `reference` moved forward one month.
    pub next: Option<Date>,
}

impl MonthNavigation {
    /// Build the navigation for the month containing `reference`.
    pub fn new(reference: Date) -> Self {
        Self {
            reference,
            window: MonthWindow::containing(reference),
            previous: add_months(reference, -1),
            next: add_months(reference, 1),
        }
    }

    /// Render previous/next links around the month label.
    ///
    /// `page_url` is the page the links point to, e.g. the dashboard.
    pub fn into_html(self, page_url: &str) -> Markup {
        html! {
            div class="flex items-center justify-between w-full max-w-screen-md mb-4"
            {
                @if let Some(previous) = self.previous {
                    a href=(month_url(page_url, previous)) class=(LINK_STYLE) { "← Previous" }
                } @else {
                    span {}
                }

                h2 class="text-xl font-semibold" { (self.window.label()) }

                @if let Some(next) = self.next {
                    a href=(month_url(page_url, next)) class=(LINK_STYLE) { "Next →" }
                } @else {
                    span {}
                }
            }
        }
    }
}

/// Link to `page_url` showing the month that contains `reference`.
pub fn month_url(page_url: &str, reference: Date) -> String {
    format!("{page_url}?month={reference}")
}
