//! Defines the route handler for the administrator's page.

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
    auth::{Role, Session, User, list_users},
    endpoints,
    expense::{ExpenseScope, list_expenses},
    html::{
        BUTTON_DANGER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    summary::{
        ECHARTS_SCRIPT_URL, ExpenseSummary, category_breakdown_table, charts_script, charts_view,
        summarize, summary_charts, summary_statistics_view, top_spenders_table,
    },
};

/// The state needed for the admin page.
#[derive(Debug, Clone)]
pub struct AdminPageState {
    /// The database connection for reading users and expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AdminPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    /// The username of the user deleted by the previous request.
    pub deleted: Option<String>,
}

/// Display the summary of every user's expenses and the user deletion form.
pub async fn get_admin_page(
    State(state): State<AdminPageState>,
    Extension(session): Extension<Session>,
    Query(query): Query<AdminQuery>,
) -> Result<Response, Error> {
    let (expenses, users) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            list_expenses(&ExpenseScope::All, &connection)?,
            list_users(&connection)?,
        )
    };

    let summary = summarize(&expenses);
    let deletable_users: Vec<User> = users
        .into_iter()
        .filter(|user| user.role != Role::Admin && user.username != session.username)
        .collect();

    Ok(admin_view(&summary, &deletable_users, query.deleted.as_deref()).into_response())
}

fn admin_view(summary: &ExpenseSummary, deletable_users: &[User], deleted: Option<&str>) -> Markup {
    let nav_bar = NavBar::new(endpoints::ADMIN_VIEW, true).into_html();
    let charts = summary_charts(summary);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-8 pb-24 lg:pb-0"
            {
                h1 class="text-2xl font-bold" { "Admin Dashboard" }

                @if let Some(username) = deleted {
                    (Alert::Success {
                        message: format!("User '{username}' and their expenses have been deleted."),
                        details: String::new(),
                    }.into_html())
                }

                (summary_statistics_view(summary))

                @if summary.is_empty() {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "Charts will show up here once users record some expenses."
                    }
                } @else {
                    (charts_view(&charts))

                    div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                    {
                        (top_spenders_table(summary))
                        (category_breakdown_table(summary))
                    }
                }

                (delete_user_form(deletable_users))
            }
        }
    };

    let head_elements = if summary.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
            charts_script(&charts),
        ]
    };

    base("Admin", &head_elements, &content)
}

fn delete_user_form(deletable_users: &[User]) -> Markup {
    html! {
        section class="max-w-md space-y-4"
        {
            h2 class="text-xl font-bold" { "Delete User" }

            @if deletable_users.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "There are no users to delete." }
            } @else {
                form
                    hx-post=(endpoints::DELETE_USER)
                    hx-target-error="#alert-container"
                    hx-indicator="#indicator"
                    hx-disabled-elt="#delete-button"
                    class="space-y-4"
                {
                    div
                    {
                        label for="username" class=(FORM_LABEL_STYLE) { "Select user to delete" }

                        select name="username" id="username" required class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for user in deletable_users {
                                option value=(user.username) { (user.username) }
                            }
                        }
                    }

                    label class="flex items-center space-x-2 text-sm"
                    {
                        input
                            type="checkbox"
                            name="confirm"
                            id="confirm"
                            value="true"
                            class="rounded-sm border-gray-300 text-red-600 shadow-xs";

                        span { "Yes, I want to delete this user and their expenses." }
                    }

                    button type="submit" id="delete-button" class=(BUTTON_DANGER_STYLE)
                    {
                        span id="indicator" class="inline htmx-indicator" { (loading_spinner()) }
                        " Delete User"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
    };
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        auth::{Role, Session},
        endpoints,
        expense::{Category, add_expense},
        test_utils::{
            assert_alert_message, assert_hx_endpoint, assert_status_ok, assert_valid_html,
            expense_on, get_test_connection, insert_user, must_get_form, parse_html_document,
            table_rows,
        },
    };

    use super::{AdminPageState, AdminQuery, get_admin_page};

    fn get_state_and_admin(with_expenses: bool) -> (AdminPageState, Session) {
        let connection = get_test_connection();
        let admin = insert_user(&connection, "root", Role::Admin);
        insert_user(&connection, "other_admin", Role::Admin);
        insert_user(&connection, "bob", Role::User);
        insert_user(&connection, "alice", Role::User);

        if with_expenses {
            for (date, category, amount, owner) in [
                (date!(2024 - 01 - 05), Category::Food, 4.5, "alice"),
                (date!(2024 - 01 - 10), Category::Transport, 2.0, "alice"),
                (date!(2024 - 02 - 01), Category::Bills, 100.0, "bob"),
            ] {
                add_expense(
                    expense_on(date, "Thing", category, amount, owner),
                    &connection,
                )
                .unwrap();
            }
        }

        (
            AdminPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            admin.into(),
        )
    }

    async fn render(with_expenses: bool, query: AdminQuery) -> Html {
        let (state, admin) = get_state_and_admin(with_expenses);

        let response = get_admin_page(State(state), Extension(admin), Query(query))
            .await
            .unwrap();

        assert_status_ok(&response);
        parse_html_document(response).await
    }

    fn text_of(html: &Html, selector: &str) -> String {
        html.select(&Selector::parse(selector).unwrap())
            .next()
            .unwrap_or_else(|| panic!("no element matches {selector}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn shows_summary_of_all_expenses() {
        let html = render(true, AdminQuery::default()).await;
        assert_valid_html(&html);

        assert_eq!(text_of(&html, "#total-expenses"), "$106.50");
        assert_eq!(text_of(&html, "#user-count"), "2");
        assert_eq!(
            table_rows(&html, "#top-spenders"),
            vec![vec!["1", "bob", "$100.00"], vec!["2", "alice", "$6.50"]]
        );
        assert!(
            html.select(&Selector::parse("#category-chart").unwrap())
                .next()
                .is_some()
        );
        assert!(
            html.select(&Selector::parse("#monthly-chart").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn delete_form_lists_only_ordinary_users() {
        let html = render(true, AdminQuery::default()).await;

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::DELETE_USER, "hx-post");

        let options: Vec<_> = form
            .select(&Selector::parse("select[name=username] option").unwrap())
            .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
            .collect();
        assert_eq!(options, vec!["alice", "bob"]);

        let checkbox = form
            .select(&Selector::parse("input[name=confirm]").unwrap())
            .next()
            .expect("no confirmation checkbox");
        assert_eq!(checkbox.value().attr("type"), Some("checkbox"));
        assert_eq!(checkbox.value().attr("checked"), None);
    }

    #[tokio::test]
    async fn shows_prompt_without_expenses() {
        let html = render(false, AdminQuery::default()).await;

        assert_eq!(text_of(&html, "#total-expenses"), "$0.00");
        assert!(
            html.select(&Selector::parse("#category-chart").unwrap())
                .next()
                .is_none()
        );
    }

    #[tokio::test]
    async fn shows_alert_after_deleting_user() {
        let html = render(
            true,
            AdminQuery {
                deleted: Some("carol".to_owned()),
            },
        )
        .await;

        assert_alert_message(&html, "User 'carol' and their expenses have been deleted.");
    }
}
