//! Expense Tracker is a web app for recording personal expenses.
//!
//! Users register and log in, record expenses and download a PDF report of
//! them. Administrators can see every user's expenses, view summary charts
//! and delete users.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod admin;
mod alert;
mod app_state;
mod auth;
mod db;
mod endpoints;
mod expense;
mod forbidden;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod report;
mod routing;
mod summary;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use admin::{AuditRecord, get_user_audit_log};
pub use app_state::AppState;
pub use auth::{
    PasswordHash, Role, Session, User, UserID, authenticate, create_user, delete_user,
    get_user_by_username, register, set_user_role,
};
pub use db::initialize as initialize_db;
pub use expense::{Category, Expense, ExpenseScope, NewExpense, add_expense, list_expenses};
pub use logging::logging_middleware;
pub use report::{ReportLayout, layout_report, render_pdf};
pub use routing::build_router;
pub use summary::{ExpenseSummary, SpenderTotal, summarize};
pub use timezone::get_local_offset;

use crate::{
    alert::Alert, forbidden::get_403_forbidden_response,
    internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The username is already taken by another user.
    #[error("the username already exists in the database")]
    DuplicateUsername,

    /// An expense was submitted without a description.
    #[error("expense description cannot be empty")]
    EmptyDescription,

    /// An expense was submitted with a description longer than the given number of characters.
    #[error("expense description cannot be longer than {0} characters")]
    DescriptionTooLong(usize),

    /// An expense was submitted with an amount that is zero, negative or not a number.
    #[error("{0} is not a valid expense amount")]
    InvalidAmount(f64),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The logged in user is not allowed to access the resource.
    #[error("the user does not have permission to access this resource")]
    Forbidden,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// A redirect query string could not be URL encoded.
    #[error("could not encode query string: {0}")]
    QueryEncodingError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a user that does not exist
    #[error("tried to delete a user that is not in the database")]
    DeleteMissingUser,

    /// An administrator tried to delete their own account.
    #[error("administrators cannot delete their own account")]
    DeleteOwnAccount,

    /// An administrator tried to delete another administrator's account.
    #[error("administrator accounts cannot be deleted")]
    DeleteAdministrator,

    /// The user deletion request did not include the confirmation flag.
    #[error("user deletion was not confirmed")]
    DeletionNotConfirmed,

    /// The PDF report could not be rendered.
    #[error("could not render the PDF report: {0}")]
    ReportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Forbidden => get_403_forbidden_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert for HTMX requests.
    ///
    /// Forms target the alert container on error responses, so the status
    /// code must be 4xx or 5xx for the alert to be shown.
    fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::EmptyDescription => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid expense".to_owned(),
                    details: "Enter a description for the expense.".to_owned(),
                },
            ),
            Error::DescriptionTooLong(max_length) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid expense".to_owned(),
                    details: format!(
                        "Descriptions can be at most {max_length} characters long."
                    ),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid expense".to_owned(),
                    details: format!("{amount} is not a valid amount. Enter an amount above zero."),
                },
            ),
            Error::DeletionNotConfirmed => (
                StatusCode::BAD_REQUEST,
                Alert::Warning {
                    message: "Deletion not confirmed".to_owned(),
                    details: "Please check the confirmation box to proceed.".to_owned(),
                },
            ),
            Error::DeleteOwnAccount => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not delete user".to_owned(),
                    details: "You cannot delete your own account.".to_owned(),
                },
            ),
            Error::DeleteAdministrator => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not delete user".to_owned(),
                    details: "Administrator accounts cannot be deleted.".to_owned(),
                },
            ),
            Error::DeleteMissingUser => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete user".to_owned(),
                    details: "The user could not be found. \
                        Try refreshing the page to see if the user has already been deleted."
                        .to_owned(),
                },
            ),
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Access denied".to_owned(),
                    details: "Only administrators can do that.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details: "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                    },
                )
            }
        };

        (status_code, alert).into_response()
    }
}

#[cfg(test)]
mod alert_response_tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::{
        Error,
        test_utils::{assert_alert_message, parse_html_fragment},
    };

    #[tokio::test]
    async fn overlong_description_is_a_bad_request() {
        let response = Error::DescriptionTooLong(255).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_alert_message(&html, "Invalid expense");
        let details: String = html
            .select(&Selector::parse("div[role=alert] p:nth-of-type(2)").unwrap())
            .flat_map(|p| p.text())
            .collect();
        assert_eq!(
            details.trim(),
            "Descriptions can be at most 255 characters long."
        );
    }

    #[tokio::test]
    async fn query_encoding_error_is_an_internal_error() {
        let error = Error::QueryEncodingError("unsupported value".to_owned());

        assert_eq!(
            error.to_string(),
            "could not encode query string: unsupported value"
        );

        let response = error.into_alert_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_alert_message(&parse_html_fragment(response).await, "Something went wrong");
    }
}
