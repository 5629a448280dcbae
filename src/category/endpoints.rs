//! HTTP handlers for the category API.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        Category, CategoryFormData, CategoryName, create_category, delete_category,
        get_all_categories, get_category, update_category,
    },
    database_id::CategoryId,
    db::lock_connection,
    json::JsonBody,
};

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List every category.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_categories(&connection).map(Json)
}

/// Get a single category, or 404 if it does not exist.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category(category_id, &connection).map(Json)
}

/// Create a category from a JSON body and return it with its new ID.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    JsonBody(form): JsonBody<CategoryFormData>,
) -> Result<Json<Category>, Error> {
    let name = CategoryName::new(&form.name)?;
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(name, &form.color, &connection)?;
    tracing::debug!("created category {}", category.id);

    Ok(Json(category))
}

/// Replace the name and colour of a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
    JsonBody(form): JsonBody<CategoryFormData>,
) -> Result<Json<Category>, Error> {
    let name = CategoryName::new(&form.name)?;
    let connection = lock_connection(&state.db_connection)?;

    update_category(category_id, name, &form.color, &connection).map(Json)
}

/// Delete a category. Expenses in the category are kept without a category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<(), Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_category(category_id, &connection)?;
    tracing::debug!("deleted category {category_id}");

    Ok(())
}
