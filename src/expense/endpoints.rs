//! HTTP handlers for the expense API.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::ExpenseId,
    db::lock_connection,
    expense::{
        Expense, ExpenseBuilder, ExpenseFormData, create_expense, delete_expense,
        get_all_expenses, get_expense, get_expenses_by_month, get_expenses_in_range, parse_date,
        update_expense,
    },
    json::JsonBody,
};

/// The state needed for the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query string for [get_expenses_in_range_endpoint].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    /// The first date to include, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last date to include, `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

/// List every expense with its category.
pub async fn get_expenses_endpoint(
    State(state): State<ExpenseState>,
) -> Result<Json<Vec<Expense>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_expenses(&connection).map(Json)
}

/// Get a single expense, or 404 if it does not exist.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_expense(expense_id, &connection).map(Json)
}

/// List the expenses in a calendar month.
pub async fn get_expenses_by_month_endpoint(
    State(state): State<ExpenseState>,
    Path((year, month)): Path<(i32, i32)>,
) -> Result<Json<Vec<Expense>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_expenses_by_month(year, month, &connection).map(Json)
}

/// List the expenses between the `startDate` and `endDate` query parameters, inclusive.
pub async fn get_expenses_in_range_endpoint(
    State(state): State<ExpenseState>,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<Vec<Expense>>, Error> {
    let start = params
        .start_date
        .ok_or(Error::MissingQueryParameter("startDate"))
        .and_then(|text| parse_date(&text))?;
    let end = params
        .end_date
        .ok_or(Error::MissingQueryParameter("endDate"))
        .and_then(|text| parse_date(&text))?;

    let connection = lock_connection(&state.db_connection)?;

    get_expenses_in_range(start, end, &connection).map(Json)
}

/// Create an expense from a JSON body and return it with its new ID.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    JsonBody(form): JsonBody<ExpenseFormData>,
) -> Result<Json<Expense>, Error> {
    let builder = ExpenseBuilder::try_from(form)?;
    let connection = lock_connection(&state.db_connection)?;

    let expense = create_expense(builder, &connection)?;
    tracing::debug!("created expense {}", expense.id);

    Ok(Json(expense))
}

/// Replace every field of an expense.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<ExpenseId>,
    JsonBody(form): JsonBody<ExpenseFormData>,
) -> Result<Json<Expense>, Error> {
    let builder = ExpenseBuilder::try_from(form)?;
    let connection = lock_connection(&state.db_connection)?;

    update_expense(expense_id, builder, &connection).map(Json)
}

/// Delete an expense.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<(), Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_expense(expense_id, &connection)?;
    tracing::debug!("deleted expense {expense_id}");

    Ok(())
}
