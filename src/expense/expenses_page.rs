//! Defines the route handler for the landing page: the expense form and the table of expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::Session,
    endpoints,
    expense::{
        Category, Expense, ExpenseScope, create_endpoint::MAX_DESCRIPTION_LENGTH, list_expenses,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        dollar_input_styles, format_currency, loading_spinner,
    },
    navigation::NavBar,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesViewState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    /// Set after the expense form redirects back to this page.
    pub added: Option<bool>,
}

fn expense_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::EXPENSES_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4"
        {
            h2 class="text-xl font-bold" { "Add New Expense" }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    maxlength=(MAX_DESCRIPTION_LENGTH)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category" id="category" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in Category::ALL {
                        option value=(category) { (category) }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                // w-full needed to ensure input takes the full width when prefilled with a value
                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        min="0"
                        step="0.01"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                " Add Expense"
            }
        }
    }
}

fn expense_table(expenses: &[Expense], show_owner: bool) -> Markup {
    html! {
        @if expenses.is_empty() {
            p class="text-gray-500 dark:text-gray-400" { "No expenses recorded yet." }
        } @else {
            div class="w-full overflow-x-auto rounded-lg shadow"
            {
                table id="expenses" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                            @if show_owner {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Owner" }
                            }
                        }
                    }

                    tbody
                    {
                        @for expense in expenses {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { time datetime=(expense.date) { (expense.date) } }
                                td class=(TABLE_CELL_STYLE) { (expense.description) }
                                td class=(TABLE_CELL_STYLE) { (expense.category) }
                                td class={(TABLE_CELL_STYLE) " text-right"} { (format_currency(expense.amount)) }
                                @if show_owner {
                                    td class=(TABLE_CELL_STYLE) { (expense.owner) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn expenses_view(session: &Session, expenses: &[Expense], show_added_alert: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW, session.is_admin()).into_html();
    let table_title = if session.is_admin() {
        "All Expenses"
    } else {
        "Your Expenses"
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl space-y-8 pb-24 lg:pb-0"
            {
                h1 class="text-2xl font-bold" { "Welcome, " (session.username) "!" }

                @if show_added_alert {
                    (Alert::Success {
                        message: "Expense added successfully!".to_owned(),
                        details: String::new(),
                    }.into_html())
                }

                div class="max-w-md" { (expense_form()) }

                section class="space-y-4"
                {
                    h2 class="text-xl font-bold" { (table_title) }
                    (expense_table(expenses, session.is_admin()))
                }

                section class="space-y-2"
                {
                    h2 class="text-xl font-bold" { "Generate PDF Report" }
                    p
                    {
                        a href=(endpoints::REPORT) id="report-link" class=(LINK_STYLE) download
                        {
                            "Download PDF Report"
                        }
                    }
                }
            }
        }
    };

    base("Expenses", &[dollar_input_styles()], &content)
}

/// Display the expense form and the expenses visible to the logged in user.
pub async fn get_expenses_page(
    State(state): State<ExpensesViewState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        list_expenses(&ExpenseScope::for_session(&session), &connection)?
    };

    Ok(expenses_view(&session, &expenses, query.added.unwrap_or(false)).into_response())
}
