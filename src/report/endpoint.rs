//! Defines the endpoint for downloading the PDF expense report.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::Session,
    expense::{ExpenseScope, list_expenses},
    report::{
        layout::{ReportLayout, layout_report},
        pdf::render_pdf,
    },
    timezone::local_now,
};

/// The state needed to generate a report.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Generate the expense report of the logged in user and send it as a file download.
///
/// Administrators get every user's expenses. The report only ever exists in memory.
pub async fn get_report(
    State(state): State<ReportState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let generated_on = local_now(&state.local_timezone)?;

    let layout = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        session_report_layout(&session, &connection, generated_on)?
    };

    let pdf = render_pdf(&layout)?;

    tracing::debug!(
        "generated {} page report for {}",
        layout.pages.len(),
        session.username
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    report_file_name(&session.username)
                ),
            ),
        ],
        pdf,
    )
        .into_response())
}

/// Lay out the report of the expenses `session` may see: every expense for
/// administrators, otherwise only the user's own.
fn session_report_layout(
    session: &Session,
    connection: &Connection,
    generated_on: OffsetDateTime,
) -> Result<ReportLayout, Error> {
    let expenses = list_expenses(&ExpenseScope::for_session(session), connection)?;

    Ok(layout_report(&session.username, &expenses, generated_on))
}

/// The download name of a user's report, e.g. "alice_expense_report.pdf".
///
/// Characters that are not safe in a quoted header value or a file name are replaced with '_'.
pub fn report_file_name(username: &str) -> String {
    let safe_username: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{safe_username}_expense_report.pdf")
}
