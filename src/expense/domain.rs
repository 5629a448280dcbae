//! Core expense domain types.

use std::{fmt::Display, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};
use time::Date;

use crate::{
    Error,
    category::Category,
    database_id::{CategoryId, ExpenseId},
};

/// The number of digits stored after the decimal point.
const AMOUNT_SCALE: u32 = 2;

/// The earliest year an expense may be dated.
///
/// Dates are stored as `YYYY-MM-DD` text and compared as text, which only
/// orders correctly for years without a sign.
pub const MIN_YEAR: i32 = 1;

/// Check that `date` can be stored and compared in the database.
///
/// # Errors
/// Returns [Error::DateOutOfRange] if `date` is before [MIN_YEAR].
pub fn check_date(date: Date) -> Result<Date, Error> {
    if date.year() < MIN_YEAR {
        Err(Error::DateOutOfRange(date))
    } else {
        Ok(date)
    }
}

/// The largest amount that fits in ten significant digits with two decimal places.
fn max_amount() -> Decimal {
    Decimal::new(99_999_999_99, AMOUNT_SCALE)
}

/// A strictly positive amount of money with exactly two decimal places.
///
/// The direction of the money (in or out) is carried by [ExpenseType], never
/// by the sign of the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount, rounding `value` to two decimal places (half away from zero).
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::NonPositiveAmount] if the rounded value is zero or negative,
    /// - or [Error::AmountOutOfRange] if the rounded value is larger than 99999999.99.
    pub fn new(value: Decimal) -> Result<Self, Error> {
        let mut rounded =
            value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);

        if rounded <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount(value));
        }

        if rounded > max_amount() {
            return Err(Error::AmountOutOfRange(value));
        }

        rounded.rescale(AMOUNT_SCALE);

        Ok(Self(rounded))
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that the value is positive and has two decimal
    /// places, e.g. when the amount was read back from the database.
    pub fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// The amount as a decimal number.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a record is money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpenseType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. rent or groceries.
    Expense,
}

impl ExpenseType {
    /// The name used for this type in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Income => "INCOME",
            ExpenseType::Expense => "EXPENSE",
        }
    }
}

impl FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(ExpenseType::Income),
            "EXPENSE" => Ok(ExpenseType::Expense),
            other => Err(format!("unknown expense type \"{other}\"")),
        }
    }
}

impl Display for ExpenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single dated record of money spent or earned.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// How much money was spent or earned.
    pub amount: Amount,
    /// A free text description of what the money was for.
    pub description: Option<String>,
    /// When the money was spent or earned.
    pub date: Date,
    /// The category of the expense, or `None` if it has no category or its
    /// category was deleted.
    pub category: Option<Category>,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(amount: Amount, date: Date, expense_type: ExpenseType) -> ExpenseBuilder {
        ExpenseBuilder {
            amount,
            date,
            expense_type,
            description: None,
            category_id: None,
        }
    }
}

/// A builder for the fields of an expense that are written to the database.
///
/// The same builder is used to create an expense and to replace all the
/// fields of an existing one.
///
/// # Examples
///
/// ```ignore
/// use rust_decimal_macros::dec;
/// use time::macros::date;
///
/// let rent = Expense::build(Amount::new(dec!(85000))?, date!(2025 - 01 - 01), ExpenseType::Expense)
///     .description(Some("Rent".to_owned()))
///     .category_id(Some(rent_category.id));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct ExpenseBuilder {
    /// The validated, positive amount.
    pub amount: Amount,
    /// The date the money was spent or earned.
    pub date: Date,
    /// Whether this is income or an expense.
    pub expense_type: ExpenseType,
    /// Optional free text description.
    pub description: Option<String>,
    /// The category the expense belongs to, if any.
    pub category_id: Option<CategoryId>,
}

impl ExpenseBuilder {
    /// Set the description for the expense.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the category id for the expense.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

/// A reference to a category by ID in a request body.
///
/// Other category fields sent by clients, e.g. `name`, are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// The ID of an existing category.
    pub id: CategoryId,
}

/// Request body for creating and updating an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFormData {
    /// The unvalidated amount, checked by [Amount::new].
    ///
    /// Only JSON numbers are accepted, strings such as `"5"` are rejected.
    #[serde(deserialize_with = "deserialize_json_number")]
    pub amount: Decimal,
    /// Optional free text description, `null` or omitted for none.
    pub description: Option<String>,
    /// The date as `YYYY-MM-DD`, checked by [check_date].
    pub date: Date,
    /// The category to file the expense under, `null` or omitted for none.
    pub category: Option<CategoryRef>,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
}

impl TryFrom<ExpenseFormData> for ExpenseBuilder {
    type Error = Error;

    fn try_from(form: ExpenseFormData) -> Result<Self, Self::Error> {
        let amount = Amount::new(form.amount)?;
        let date = check_date(form.date)?;

        Ok(Expense::build(amount, date, form.expense_type)
            .description(form.description)
            .category_id(form.category.map(|category| category.id)))
    }
}

fn deserialize_json_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    struct JsonNumberVisitor;

    impl Visitor<'_> for JsonNumberVisitor {
        type Value = Decimal;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(value))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Decimal, E> {
            Decimal::from_str(&value.to_string())
                .map_err(|_| E::invalid_value(de::Unexpected::Float(value), &self))
        }
    }

    deserializer.deserialize_any(JsonNumberVisitor)
}
