//! Database operations for expenses.

use std::str::FromStr;

use rusqlite::{Connection, Row, params, types::Type};
use rust_decimal::Decimal;

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::ExpenseId,
    expense::{Amount, Expense, ExpenseBuilder, ExpenseType},
};

/// Selects the expense columns with the category resolved in a single join.
///
/// The column order must match [map_expense_row].
pub(crate) const SELECT_EXPENSE: &str = "SELECT expense.id, expense.amount, expense.description, \
    expense.date, expense.\"type\", category.id, category.name, category.color \
    FROM expense \
    LEFT JOIN category ON expense.category_id = category.id";

/// Create a new expense in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(builder: ExpenseBuilder, connection: &Connection) -> Result<Expense, Error> {
    connection
        .execute(
            "INSERT INTO expense (amount, description, date, category_id, \"type\")
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                builder.amount.to_string(),
                builder.description,
                builder.date,
                builder.category_id,
                builder.expense_type.as_str(),
            ],
        )
        .map_err(|error| map_write_error(error, &builder))?;

    get_expense(connection.last_insert_rowid(), connection)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(&format!("{SELECT_EXPENSE} WHERE expense.id = :id"))?
        .query_row(&[(":id", &id)], map_expense_row)
        .map_err(|error| error.into())
}

/// Retrieve every expense in the order they were created.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!("{SELECT_EXPENSE} ORDER BY expense.id ASC"))?
        .query_map([], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Replace every field of the expense `id` with the values in `builder`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - [Error::InvalidCategory] if the category ID does not refer to a category,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    builder: ExpenseBuilder,
    connection: &Connection,
) -> Result<Expense, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE expense
            SET \
                amount = ?1, \
                description = ?2, \
                date = ?3, \
                category_id = ?4, \
                \"type\" = ?5 \
            WHERE id = ?6",
            params![
                builder.amount.to_string(),
                builder.description,
                builder.date,
                builder.category_id,
                builder.expense_type.as_str(),
                id,
            ],
        )
        .map_err(|error| map_write_error(error, &builder))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_expense(id, connection)
}

/// Delete an expense by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the expense doesn't exist.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the total number of expenses in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_expenses(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM expense;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the expense table in the database.
///
/// Deleting a category keeps its expenses and clears their category.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL,
            category_id INTEGER,
            \"type\" TEXT NOT NULL CHECK (\"type\" IN ('INCOME', 'EXPENSE')),
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
    )?;

    Ok(())
}

fn map_write_error(error: rusqlite::Error, builder: &ExpenseBuilder) -> Error {
    match (error, builder.category_id) {
        (
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ),
            Some(category_id),
        ) => Error::InvalidCategory(category_id),
        (error, _) => error.into(),
    }
}

/// Map a row selected with [SELECT_EXPENSE] to an expense.
pub(crate) fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_amount: String = row.get(1)?;
    let amount = Decimal::from_str(&raw_amount)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(error)))?;
    let description = row.get(2)?;
    let date = row.get(3)?;
    let raw_type: String = row.get(4)?;
    let expense_type = ExpenseType::from_str(&raw_type).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, error.into())
    })?;

    let category = match row.get::<usize, Option<i64>>(5)? {
        Some(category_id) => {
            let raw_name: String = row.get(6)?;

            Some(Category {
                id: category_id,
                name: CategoryName::new_unchecked(&raw_name),
                color: row.get(7)?,
            })
        }
        None => None,
    };

    Ok(Expense {
        id,
        amount: Amount::new_unchecked(amount),
        description,
        date,
        category,
        expense_type,
    })
}
