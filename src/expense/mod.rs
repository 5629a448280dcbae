//! Expense and income records.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model, its validated `Amount`, and `ExpenseBuilder` for creating expenses
//! - Database functions for storing and managing expenses
//! - Queries for filtering expenses by month or date range
//! - HTTP handlers for the expense API

mod db;
mod domain;
mod endpoints;
mod query;

pub use db::{
    count_expenses, create_expense, create_expense_table, delete_expense, get_all_expenses,
    get_expense, update_expense,
};
pub use domain::{
    Amount, Expense, ExpenseBuilder, ExpenseFormData, ExpenseType, MIN_YEAR, check_date,
};
pub use endpoints::{
    create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
    get_expenses_by_month_endpoint, get_expenses_endpoint, get_expenses_in_range_endpoint,
    update_expense_endpoint,
};
pub use query::{get_expenses_by_month, get_expenses_in_range, parse_date};
