//! Default categories and sample records loaded into a new database.
//!
//! A fixture set is applied at most once. Applying it is recorded in the
//! `fixture` table in the same SQL transaction as the inserted rows, so a
//! restart never inserts a second copy, even if the user has since deleted
//! everything.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use rust_decimal::Decimal;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::{
    Error,
    category::{CategoryName, count_categories, create_category, find_category_by_name},
    expense::{Amount, Expense, ExpenseType, count_expenses, create_expense},
};

use ExpenseType::{Expense as Out, Income as In};
use SampleDate::DaysAgo;

/// The name recorded in the `fixture` table for the default data set.
pub const DEFAULT_FIXTURE: &str = "default-v1";

/// Category name and display colour.
const DEFAULT_CATEGORIES: [(&str, &str); 10] = [
    ("Food", "#FF6B6B"),
    ("Transport", "#4ECDC4"),
    ("Entertainment", "#45B7D1"),
    ("Groceries", "#96CEB4"),
    ("Medical", "#FFEAA7"),
    ("Salary", "#74B9FF"),
    ("Utilities", "#FD79A8"),
    ("Rent", "#6C5CE7"),
    ("Communication", "#A29BFE"),
    ("Education", "#00B894"),
];

/// When a sample record happened, relative to the day the fixtures are applied.
#[derive(Debug, Clone, Copy)]
enum SampleDate {
    /// A fixed day of the current month (`months_ago == 0`) or an earlier month.
    DayOfMonth { months_ago: u8, day: u8 },
    /// A number of days before today.
    DaysAgo(i64),
}

struct SampleExpense {
    amount: i64,
    description: &'static str,
    date: SampleDate,
    category: &'static str,
    expense_type: ExpenseType,
}

const fn sample(
    amount: i64,
    description: &'static str,
    date: SampleDate,
    category: &'static str,
    expense_type: ExpenseType,
) -> SampleExpense {
    SampleExpense {
        amount,
        description,
        date,
        category,
        expense_type,
    }
}

const fn day_of_month(months_ago: u8, day: u8) -> SampleDate {
    SampleDate::DayOfMonth { months_ago, day }
}

const SAMPLE_EXPENSES: [SampleExpense; 21] = [
    // This month
    sample(350000, "Monthly salary", day_of_month(0, 25), "Salary", In),
    sample(85000, "Rent", day_of_month(0, 1), "Rent", Out),
    sample(12000, "Electricity bill", day_of_month(0, 15), "Utilities", Out),
    sample(3500, "Supermarket shopping", DaysAgo(1), "Food", Out),
    sample(1200, "Convenience store lunch", DaysAgo(2), "Food", Out),
    sample(800, "Train fare", DaysAgo(3), "Transport", Out),
    sample(2800, "Cinema", DaysAgo(7), "Entertainment", Out),
    sample(4500, "Books", DaysAgo(10), "Entertainment", Out),
    sample(2100, "Detergent and shampoo", DaysAgo(5), "Groceries", Out),
    // Last month
    sample(350000, "Monthly salary", day_of_month(1, 25), "Salary", In),
    sample(85000, "Rent", day_of_month(1, 1), "Rent", Out),
    sample(11500, "Electricity bill", day_of_month(1, 15), "Utilities", Out),
    sample(25000, "Food (monthly)", day_of_month(1, 20), "Food", Out),
    sample(8000, "Transport (monthly)", day_of_month(1, 20), "Transport", Out),
    sample(15000, "Entertainment", day_of_month(1, 18), "Entertainment", Out),
    // Two months ago
    sample(350000, "Monthly salary", day_of_month(2, 25), "Salary", In),
    sample(85000, "Rent", day_of_month(2, 1), "Rent", Out),
    sample(13200, "Electricity bill", day_of_month(2, 15), "Utilities", Out),
    sample(28000, "Food (monthly)", day_of_month(2, 20), "Food", Out),
    sample(7500, "Transport (monthly)", day_of_month(2, 20), "Transport", Out),
    sample(12000, "Entertainment", day_of_month(2, 18), "Entertainment", Out),
];

/// What [seed_default_fixtures] inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    /// The number of categories inserted.
    pub categories: usize,
    /// The number of sample expense and income records inserted.
    pub expenses: usize,
}

/// Load the default categories and sample records, unless already applied.
///
/// Categories are only inserted into an empty category table, and sample
/// records only into an empty expense table. Sample records are linked to
/// categories by name; a name with no match leaves the record without a
/// category. Sample dates are relative to `today`.
///
/// Returns `None` if the fixture set had already been applied.
///
/// # Errors
/// Returns [Error::SqlError] if any insert fails, in which case nothing is
/// inserted and the fixture set is not recorded.
pub fn seed_default_fixtures(
    connection: &Connection,
    today: Date,
) -> Result<Option<SeedSummary>, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    if is_fixture_applied(DEFAULT_FIXTURE, &transaction)? {
        tracing::debug!("fixture set {DEFAULT_FIXTURE} already applied, skipping");
        return Ok(None);
    }

    let mut summary = SeedSummary::default();

    if count_categories(&transaction)? == 0 {
        for (name, color) in DEFAULT_CATEGORIES {
            create_category(CategoryName::new_unchecked(name), color, &transaction)?;
            summary.categories += 1;
        }
    }

    if count_expenses(&transaction)? == 0 {
        for sample in &SAMPLE_EXPENSES {
            let category_id =
                find_category_by_name(sample.category, &transaction)?.map(|category| category.id);
            let amount = Amount::new(Decimal::from(sample.amount))?;
            let date = resolve_sample_date(sample.date, today)?;

            create_expense(
                Expense::build(amount, date, sample.expense_type)
                    .description(Some(sample.description.to_owned()))
                    .category_id(category_id),
                &transaction,
            )?;
            summary.expenses += 1;
        }
    }

    record_fixture(DEFAULT_FIXTURE, &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "applied fixture set {DEFAULT_FIXTURE}: {} categories, {} sample records",
        summary.categories,
        summary.expenses
    );

    Ok(Some(summary))
}

/// Create the table that records which fixture sets have been applied.
pub fn create_fixture_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS fixture (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn is_fixture_applied(name: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM fixture WHERE name = ?1)",
            [name],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn record_fixture(name: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO fixture (name, applied_at) VALUES (?1, ?2)",
        (name, OffsetDateTime::now_utc()),
    )?;

    Ok(())
}

fn resolve_sample_date(sample_date: SampleDate, today: Date) -> Result<Date, Error> {
    match sample_date {
        SampleDate::DaysAgo(days) => Ok(today - Duration::days(days)),
        SampleDate::DayOfMonth { months_ago, day } => {
            let mut year = today.year();
            let mut month = today.month();

            for _ in 0..months_ago {
                month = month.previous();
                if month == Month::December {
                    year -= 1;
                }
            }

            Date::from_calendar_date(year, month, day)
                .map_err(|error| Error::InvalidDate(format!("{year}-{month}-{day}: {error}")))
        }
    }
}

#[cfg(test)]
mod seed_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{
            CategoryName, create_category, delete_category, find_category_by_name,
            get_all_categories,
        },
        db::initialize,
        expense::{
            Amount, Expense, ExpenseType, count_expenses, create_expense, delete_expense,
            get_all_expenses, get_expenses_by_month,
        },
    };

    use super::{SampleDate, SeedSummary, resolve_sample_date, seed_default_fixtures};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn seeds_empty_database() {
        let conn = get_test_connection();

        let summary = seed_default_fixtures(&conn, date!(2025 - 03 - 12));

        assert_eq!(
            summary,
            Ok(Some(SeedSummary {
                categories: 10,
                expenses: 21
            }))
        );
        let categories = get_all_categories(&conn).unwrap();
        assert_eq!(categories.len(), 10);
        assert_eq!(categories[0].name, CategoryName::new_unchecked("Food"));
        assert_eq!(categories[0].color, "#FF6B6B");
    }

    #[test]
    fn sample_records_span_three_months() {
        let conn = get_test_connection();

        seed_default_fixtures(&conn, date!(2025 - 03 - 12)).unwrap();

        let count = |year, month| get_expenses_by_month(year, month, &conn).unwrap().len();
        assert_eq!(count(2025, 3), 9);
        assert_eq!(count(2025, 2), 6);
        assert_eq!(count(2025, 1), 6);
    }

    #[test]
    fn sample_records_are_linked_to_categories() {
        let conn = get_test_connection();

        seed_default_fixtures(&conn, date!(2025 - 03 - 12)).unwrap();

        let expenses = get_all_expenses(&conn).unwrap();
        assert!(expenses.iter().all(|expense| expense.category.is_some()));
        let salary = &expenses[0];
        assert_eq!(salary.expense_type, ExpenseType::Income);
        assert_eq!(salary.date, date!(2025 - 03 - 25));
        assert_eq!(
            salary.category.as_ref().map(|category| category.name.as_ref()),
            Some("Salary")
        );
    }

    #[test]
    fn second_run_does_nothing() {
        let conn = get_test_connection();
        seed_default_fixtures(&conn, date!(2025 - 03 - 12)).unwrap();

        let summary = seed_default_fixtures(&conn, date!(2025 - 03 - 13));

        assert_eq!(summary, Ok(None));
        assert_eq!(count_expenses(&conn), Ok(21));
    }

    #[test]
    fn does_not_reseed_after_records_are_deleted() {
        let conn = get_test_connection();
        seed_default_fixtures(&conn, date!(2025 - 03 - 12)).unwrap();
        for expense in get_all_expenses(&conn).unwrap() {
            delete_expense(expense.id, &conn).unwrap();
        }
        for category in get_all_categories(&conn).unwrap() {
            delete_category(category.id, &conn).unwrap();
        }

        let summary = seed_default_fixtures(&conn, date!(2025 - 03 - 12));

        assert_eq!(summary, Ok(None));
        assert_eq!(count_expenses(&conn), Ok(0));
    }

    #[test]
    fn skips_categories_when_some_exist() {
        let conn = get_test_connection();
        let food = create_category(CategoryName::new_unchecked("Food"), "#000000", &conn).unwrap();

        let summary = seed_default_fixtures(&conn, date!(2025 - 03 - 12));

        assert_eq!(
            summary,
            Ok(Some(SeedSummary {
                categories: 0,
                expenses: 21
            }))
        );
        assert_eq!(find_category_by_name("Food", &conn), Ok(Some(food.clone())));
        let expenses = get_all_expenses(&conn).unwrap();
        let linked = expenses
            .iter()
            .filter(|expense| expense.category.as_ref() == Some(&food))
            .count();
        let unlinked = expenses
            .iter()
            .filter(|expense| expense.category.is_none())
            .count();
        assert_eq!(linked, 4);
        assert_eq!(unlinked, 17);
    }

    #[test]
    fn skips_expenses_when_some_exist() {
        let conn = get_test_connection();
        create_expense(
            Expense::build(
                Amount::new_unchecked(1.into()),
                date!(2025 - 01 - 01),
                ExpenseType::Expense,
            ),
            &conn,
        )
        .unwrap();

        let summary = seed_default_fixtures(&conn, date!(2025 - 03 - 12));

        assert_eq!(
            summary,
            Ok(Some(SeedSummary {
                categories: 10,
                expenses: 0
            }))
        );
        assert_eq!(count_expenses(&conn), Ok(1));
    }

    #[test]
    fn day_of_month_wraps_to_previous_year() {
        let got = resolve_sample_date(
            SampleDate::DayOfMonth {
                months_ago: 2,
                day: 25,
            },
            date!(2025 - 01 - 31),
        );

        assert_eq!(got, Ok(date!(2024 - 11 - 25)));
    }

    #[test]
    fn days_ago_counts_back_from_today() {
        let got = resolve_sample_date(SampleDate::DaysAgo(10), date!(2025 - 03 - 05));

        assert_eq!(got, Ok(date!(2025 - 02 - 23)));
    }
}
