use maud::{Markup, html};

use crate::{html::format_money, money::Money, shopping::core::ShoppingItem};

/// What is left to spend on a list and what has already been spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShoppingTotals {
    /// The cost of the unchecked items.
    pub pending: Money,
    /// The cost of the checked items.
    pub purchased: Money,
}

/// Sum price times quantity over the items, split by whether they have been
/// bought. Items without a price count as zero.
pub fn shopping_totals(items: &[ShoppingItem]) -> ShoppingTotals {
    items
        .iter()
        .fold(ShoppingTotals::default(), |mut totals, item| {
            if item.is_checked {
                totals.purchased = totals.purchased + item.line_total();
            } else {
                totals.pending = totals.pending + item.line_total();
            }

            totals
        })
}

pub(super) fn totals_view(totals: &ShoppingTotals) -> Markup {
    html! {
        dl class="grid grid-cols-2 gap-4" data-shopping-totals
        {
            div
            {
                dt class="text-sm text-gray-500" { "Still to buy" }
                dd class="text-lg font-semibold" data-pending { (format_money(totals.pending)) }
            }
            div
            {
                dt class="text-sm text-gray-500" { "Purchased" }
                dd class="text-lg font-semibold" data-purchased { (format_money(totals.purchased)) }
            }
        }
    }
}
