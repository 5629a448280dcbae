//! Categories for grouping expenses and income, e.g. 'Food' or 'Salary'.

mod db;
mod domain;
mod endpoints;

pub use db::{
    count_categories, create_category, create_category_table, delete_category,
    find_category_by_name, get_all_categories, get_category, update_category,
};
pub use domain::{Category, CategoryFormData, CategoryName};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    get_category_endpoint, update_category_endpoint,
};
