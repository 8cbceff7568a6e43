use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::{Category, CategoryId},
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, money_input,
    },
    money::Money,
    parse_whole_number,
    transaction::{
        MAX_RECURRING_MONTHS, Transaction, TransactionBuilder, TransactionType,
        recurring::expand_recurring,
    },
};

/// The smallest series the recurrence input offers.
const FORM_MIN_RECURRING_MONTHS: u32 = 2;
/// The largest series the recurrence input offers.
const FORM_MAX_RECURRING_MONTHS: u32 = 12;

/// The form data for creating or editing a transaction.
///
/// Must be extracted with `axum_extra`'s `Form`, which reads empty fields as `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Whether the money was earned or spent.
    pub type_: TransactionType,
    /// The amount as typed by the user, e.g. "12,30".
    pub amount: String,
    /// The date when the transaction occurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// The category to file the transaction under.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Whether to repeat the transaction every month.
    #[serde(default)]
    pub is_recurring: bool,
    /// How many months to repeat the transaction for, including the first.
    #[serde(default)]
    pub recurring_months: String,
}

impl TransactionForm {
    /// Validate the fields that describe a single transaction.
    ///
    /// The recurrence fields are ignored.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount cannot be parsed.
    pub fn to_draft(&self) -> Result<TransactionBuilder, Error> {
        let amount = Money::parse(&self.amount)?;

        Ok(Transaction::build(self.type_, amount, self.date)
            .description(self.description.as_deref())
            .category_id(self.category_id))
    }

    /// Validate the form and expand it into the transactions to create.
    ///
    /// # Errors
    /// - [Error::InvalidAmount] if the amount cannot be parsed.
    /// - [Error::InvalidNumber] if the number of months is not a whole number.
    /// - [Error::InvalidRecurringMonths] if a recurring transaction repeats for
    ///   zero months or more than [MAX_RECURRING_MONTHS] months.
    /// - [Error::DateOutOfRange] if a repeated date is outside the supported range.
    pub fn to_drafts(&self) -> Result<Vec<TransactionBuilder>, Error> {
        let draft = self.to_draft()?;

        if !self.is_recurring {
            return Ok(vec![draft]);
        }

        let months = parse_whole_number(&self.recurring_months)?.unwrap_or(0);

        if months > MAX_RECURRING_MONTHS {
            return Err(Error::InvalidRecurringMonths(months));
        }

        expand_recurring(draft, months)
    }
}

/// The values to pre-fill a transaction form with.
pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<&'a str>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub category_id: Option<CategoryId>,
}

impl<'a> From<&'a TransactionForm> for TransactionFormDefaults<'a> {
    fn from(form: &'a TransactionForm) -> Self {
        Self {
            transaction_type: form.type_,
            amount: Some(&form.amount),
            date: form.date,
            description: form.description.as_deref(),
            category_id: form.category_id,
        }
    }
}

impl<'a> From<&'a Transaction> for TransactionFormDefaults<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        Self {
            transaction_type: transaction.transaction_type,
            amount: None,
            date: transaction.date,
            description: transaction.description.as_deref(),
            category_id: transaction.category_id,
        }
    }
}

/// Radio buttons for choosing between income and expense, submitted as `type_`.
pub fn transaction_type_radios(selected: TransactionType, legend: &str) -> Markup {
    let options = [TransactionType::Expense, TransactionType::Income];

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { (legend) }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for option in options {
                    @let id = format!("transaction-type-{option}");

                    div class="flex items-center gap-3"
                    {
                        input
                            name="type_"
                            id=(id)
                            type="radio"
                            value=(option)
                            checked[option == selected]
                            required
                            tabindex="0"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (option.label()) }
                    }
                }
            }
        }
    }
}

/// The inputs shared by the create and edit transaction forms.
pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[Category],
) -> Markup {
    let category_group = |category_type: TransactionType| {
        html! {
            optgroup label=(category_type.label())
            {
                @for category in categories.iter().filter(|category| category.category_type == category_type) {
                    option
                        value=(category.id)
                        selected[Some(category.id) == defaults.category_id]
                    {
                        (category.name)
                    }
                }
            }
        }
    };

    html! {
        (transaction_type_radios(defaults.transaction_type, "Transaction type"))

        (money_input("amount", "Amount", defaults.amount, true))

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category_id" id="category_id" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "No category" }

                (category_group(TransactionType::Expense))
                (category_group(TransactionType::Income))
            }
        }
    }
}

/// A checkbox to repeat the transaction monthly and the number of months.
pub fn recurrence_fields(is_recurring: bool, months: &str) -> Markup {
    html! {
        div class="flex items-center gap-3"
        {
            input
                name="is_recurring"
                id="is_recurring"
                type="checkbox"
                value="true"
                checked[is_recurring]
                class=(FORM_RADIO_INPUT_STYLE);

            label for="is_recurring" class=(FORM_LABEL_STYLE) { "Repeat every month" }
        }

        div
        {
            label for="recurring_months" class=(FORM_LABEL_STYLE) { "Number of months" }

            input
                name="recurring_months"
                id="recurring_months"
                type="number"
                min=(FORM_MIN_RECURRING_MONTHS)
                max=(FORM_MAX_RECURRING_MONTHS)
                step="1"
                placeholder=(FORM_MIN_RECURRING_MONTHS)
                value=(months)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}
