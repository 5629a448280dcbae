//! Queries for filtering expenses by calendar month or date range.

use rusqlite::Connection;
use time::{Date, Month, macros::format_description};

use crate::{
    Error,
    expense::{
        Expense, MIN_YEAR, check_date,
        db::{SELECT_EXPENSE, map_expense_row},
    },
};

/// Parse a calendar date in the format `YYYY-MM-DD`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidDate] if `text` is not a valid calendar date,
/// - or [Error::DateOutOfRange] if the date is before year 1.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let date = Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))?;

    check_date(date)
}

/// Get the expenses dated within the calendar month `month` (1-12) of `year`.
///
/// Months or years that do not exist on the calendar match nothing, so an
/// empty list is returned instead of an error.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_expenses_by_month(
    year: i32,
    month: i32,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let Some((start, end)) = month_bounds(year, month) else {
        return Ok(Vec::new());
    };

    get_expenses_in_range(start, end, connection)
}

/// Get the expenses dated between `start` and `end`, inclusive, sorted by
/// date and then ID.
///
/// If `start` is after `end`, the result is empty.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_expenses_in_range(
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_EXPENSE} WHERE expense.date BETWEEN ?1 AND ?2 \
            ORDER BY expense.date ASC, expense.id ASC"
        ))?
        .query_map([start, end], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// The first and last day of a calendar month, or `None` if there is no such month.
fn month_bounds(year: i32, month: i32) -> Option<(Date, Date)> {
    if year < MIN_YEAR {
        return None;
    }

    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
    let start = Date::from_calendar_date(year, month, 1).ok()?;
    let end = Date::from_calendar_date(year, month, month.length(year)).ok()?;

    Some((start, end))
}
