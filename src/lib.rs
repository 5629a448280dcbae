//! Expense Tracker is a personal income and expense tracking service.
//!
//! This library provides a JSON REST API for managing categories and the
//! dated income/expense records tagged with them, backed by SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;
use tokio::signal;

mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod json;
mod logging;
mod routing;
mod seed;
mod timezone;

pub use app_state::AppState;
pub use category::{Category, CategoryName};
pub use database_id::{CategoryId, DatabaseId, ExpenseId};
pub use db::initialize as initialize_db;
pub use expense::{Amount, Expense, ExpenseType};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use seed::{DEFAULT_FIXTURE, SeedSummary, seed_default_fixtures};
pub use timezone::local_today;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the ID is
    /// correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An empty string was used as a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// An amount of zero or less was given for an expense or income.
    ///
    /// Whether money came in or went out is recorded by the type, so amounts
    /// are always strictly positive.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// An amount too large to be stored with two decimal places and ten
    /// significant digits.
    #[error("amount {0} is larger than the maximum of 99999999.99")]
    AmountOutOfRange(Decimal),

    /// The category ID used to create or update an expense does not refer to
    /// an existing category.
    #[error("no category with the ID {0}")]
    InvalidCategory(CategoryId),

    /// The request body was missing, not JSON, or did not have the expected shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// A query string value could not be parsed as a calendar date.
    #[error("could not parse \"{0}\" as a date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A date before year 1, which cannot be stored or queried.
    #[error("date {0} is before year 1")]
    DateOutOfRange(Date),

    /// A required query string parameter was not given.
    #[error("missing query parameter \"{0}\"")]
    MissingQueryParameter(&'static str),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent alongside error status codes.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound => return StatusCode::NOT_FOUND.into_response(),
            Error::EmptyCategoryName
            | Error::NonPositiveAmount(_)
            | Error::AmountOutOfRange(_)
            | Error::InvalidCategory(_)
            | Error::InvalidBody(_)
            | Error::InvalidDate(_)
            | Error::DateOutOfRange(_)
            | Error::MissingQueryParameter(_) => StatusCode::BAD_REQUEST,
            Error::InvalidTimezone(_) | Error::SqlError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Any errors that are not handled above are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}
