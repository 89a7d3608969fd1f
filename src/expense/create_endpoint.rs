//! Defines the endpoint for creating a new expense.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Session,
    endpoints,
    expense::{Category, NewExpense, add_expense},
    timezone::local_today,
};

/// The most characters an expense description may have.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// The state needed to create an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating an expense.
#[derive(Debug, Deserialize)]
pub struct ExpenseForm {
    /// Text detailing the expense.
    pub description: String,
    pub category: Category,
    /// The amount spent in dollars.
    pub amount: f64,
}

/// A route handler for creating a new expense dated today for the logged in user.
///
/// Redirects to the expenses view on success, otherwise responds with an alert.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let description = form.description.trim();

    if description.is_empty() {
        return Error::EmptyDescription.into_alert_response();
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Error::DescriptionTooLong(MAX_DESCRIPTION_LENGTH).into_alert_response();
    }

    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Error::InvalidAmount(form.amount).into_alert_response();
    }

    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_expense = NewExpense {
        date: today,
        description: description.to_owned(),
        category: form.category,
        amount: form.amount,
        owner: session.username,
    };

    if let Err(error) = add_expense(new_expense, &connection) {
        tracing::error!("could not create expense: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(format!("{}?added=true", endpoints::EXPENSES_VIEW)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::OffsetDateTime;

    use crate::{
        auth::{Role, Session, UserID},
        expense::{Category, ExpenseScope, list_expenses},
        test_utils::{
            assert_alert_message, assert_hx_redirect, get_test_connection, parse_html_fragment,
        },
    };

    use super::{
        CreateExpenseState, ExpenseForm, MAX_DESCRIPTION_LENGTH, create_expense_endpoint,
    };

    fn get_state() -> CreateExpenseState {
        CreateExpenseState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn session() -> Extension<Session> {
        Extension(Session {
            user_id: UserID::new(1),
            username: "alice".to_owned(),
            role: Role::User,
        })
    }

    fn form(description: &str, amount: f64) -> Form<ExpenseForm> {
        Form(ExpenseForm {
            description: description.to_owned(),
            category: Category::Food,
            amount,
        })
    }

    fn stored_expense_count(state: &CreateExpenseState) -> usize {
        list_expenses(&ExpenseScope::All, &state.db_connection.lock().unwrap())
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn can_create_expense() {
        let state = get_state();

        let response =
            create_expense_endpoint(State(state.clone()), session(), form("  Coffee ", 4.5)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/expenses?added=true");

        let expenses = list_expenses(
            &ExpenseScope::Owner("alice".to_owned()),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "Coffee");
        assert_eq!(expenses[0].category, Category::Food);
        assert_eq!(expenses[0].amount, 4.5);
        assert_eq!(expenses[0].date, OffsetDateTime::now_utc().date());
    }

    #[tokio::test]
    async fn blank_description_is_rejected() {
        let state = get_state();

        let response =
            create_expense_endpoint(State(state.clone()), session(), form("   ", 4.5)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_alert_message(&parse_html_fragment(response).await, "Invalid expense");
        assert_eq!(stored_expense_count(&state), 0);
    }

    #[tokio::test]
    async fn overlong_description_is_rejected() {
        let state = get_state();
        let description = "a".repeat(MAX_DESCRIPTION_LENGTH + 1);

        let response =
            create_expense_endpoint(State(state.clone()), session(), form(&description, 4.5))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_alert_message(&parse_html_fragment(response).await, "Invalid expense");
        assert_eq!(stored_expense_count(&state), 0);
    }

    #[tokio::test]
    async fn description_at_length_limit_is_accepted() {
        let state = get_state();
        let description = "é".repeat(MAX_DESCRIPTION_LENGTH);

        let response =
            create_expense_endpoint(State(state.clone()), session(), form(&description, 4.5))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(stored_expense_count(&state), 1);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let state = get_state();

        let response =
            create_expense_endpoint(State(state.clone()), session(), form("Coffee", 0.0)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stored_expense_count(&state), 0);
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let state = get_state();

        let response =
            create_expense_endpoint(State(state.clone()), session(), form("Coffee", -3.0)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stored_expense_count(&state), 0);
    }

    #[test]
    fn parses_form_body() {
        let form: ExpenseForm =
            serde_html_form::from_str("description=Bus+fare&category=Transport&amount=2.5")
                .unwrap();

        assert_eq!(form.description, "Bus fare");
        assert_eq!(form.category, Category::Transport);
        assert_eq!(form.amount, 2.5);
    }

    #[test]
    fn rejects_unknown_category() {
        let form = serde_html_form::from_str::<ExpenseForm>(
            "description=Rent&category=Housing&amount=100",
        );

        assert!(form.is_err());
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_internal_error() {
        let mut state = get_state();
        state.local_timezone = "Not/AZone".to_owned();

        let response =
            create_expense_endpoint(State(state.clone()), session(), form("Coffee", 1.0)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stored_expense_count(&state), 0);
    }
}
