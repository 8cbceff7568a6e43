//! Monthly income and expense totals.

use maud::{Markup, html};

use crate::{
    html::format_money,
    money::Money,
    month_window::{MonthWindow, filter_by_window},
    transaction::{Transaction, TransactionType},
};

/// Income, expenses and the difference between them for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlySummary {
    pub income: Money,
    pub expenses: Money,
    /// Income minus expenses, negative when more was spent than earned.
    pub balance: Money,
}

/// Total the transactions that fall inside `window`.
///
/// Transactions outside the window are ignored, so the same list can be
/// passed in regardless of how it was fetched.
pub fn summarize_month(window: &MonthWindow, transactions: &[Transaction]) -> MonthlySummary {
    let in_window = filter_by_window(transactions, window);

    let total_of = |transaction_type: TransactionType| -> Money {
        in_window
            .iter()
            .filter(|transaction| transaction.transaction_type == transaction_type)
            .map(|transaction| transaction.amount)
            .sum()
    };

    let income = total_of(TransactionType::Income);
    let expenses = total_of(TransactionType::Expense);

    MonthlySummary {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// Income, expense and balance cards for a month.
pub fn summary_cards(summary: &MonthlySummary) -> Markup {
    let balance_class = if summary.balance < Money::ZERO {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    };
    let cards = [
        ("Income", summary.income, "text-green-700 dark:text-green-300"),
        ("Expenses", summary.expenses, "text-red-700 dark:text-red-300"),
        ("Balance", summary.balance, balance_class),
    ];

    html! {
        dl class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full" data-summary
        {
            @for (label, amount, amount_class) in cards {
                div class="p-4 rounded-lg bg-white shadow dark:bg-gray-800"
                {
                    dt class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                    dd class={ "text-2xl font-semibold " (amount_class) } { (format_money(amount)) }
                }
            }
        }
    }
}
