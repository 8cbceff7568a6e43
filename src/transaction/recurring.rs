//! Expands a recurring transaction into one transaction per month.

use crate::{Error, month_window::add_months, transaction::TransactionBuilder};

/// Turn `origin` into `months` drafts, one per calendar month starting at the
/// origin's date.
///
/// The first draft is the origin marked as recurring over `months` months.
/// Every later draft copies the origin apart from its date, which is moved
/// forward by its index in months, and is not marked as recurring. Dates are
/// always computed from the origin, so a series starting on the 31st returns
/// to the 31st in long months.
///
/// There is no upper limit on `months`; callers that take the count from user
/// input should bound it themselves.
///
/// # Errors
/// - [Error::InvalidRecurringMonths] if `months` is zero.
/// - [Error::DateOutOfRange] if a date would fall outside the supported calendar.
pub fn expand_recurring(
    origin: TransactionBuilder,
    months: u32,
) -> Result<Vec<TransactionBuilder>, Error> {
    if months == 0 {
        return Err(Error::InvalidRecurringMonths(months));
    }

    let mut drafts = Vec::with_capacity(months as usize);

    for offset in 0..months {
        let offset = i32::try_from(offset).map_err(|_| Error::DateOutOfRange)?;
        let date = add_months(origin.date, offset).ok_or(Error::DateOutOfRange)?;
        let is_origin = offset == 0;

        drafts.push(TransactionBuilder {
            date,
            is_recurring: is_origin,
            recurring_months: is_origin.then_some(months),
            ..origin.clone()
        });
    }

    Ok(drafts)
}
