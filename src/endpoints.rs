//! The API endpoints URIs.
//!
//! Paths with a parameter use the axum `{param}` syntax.

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to get, update and delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to get, update and delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to list the expenses in a calendar month.
pub const EXPENSES_BY_MONTH: &str = "/api/expenses/month/{year}/{month}";
/// The route to list the expenses between the `startDate` and `endDate` query parameters.
pub const EXPENSES_IN_RANGE: &str = "/api/expenses/range";
