//! The registration page for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    auth::{PasswordHash, register_with_cost},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, loading_spinner, log_in_register, password_input,
        username_input,
    },
};

/// The longest username that can be registered.
pub const MAX_USERNAME_LENGTH: usize = 50;

const DUPLICATE_USERNAME_MSG: &str = "Username already exists. Try another.";

#[derive(Default)]
struct FormErrors<'a> {
    username: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(username: &str, errors: FormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (username_input(username, errors.username))
            (password_input("password", "password", "Password", errors.password))
            (password_input(
                "confirm-password",
                "confirm_password",
                "Confirm Password",
                errors.confirm_password
            ))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", FormErrors::default());
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a new user and send the client to the log-in page.
///
/// New users always get the ordinary user role. Invalid input and taken
/// usernames return the form with an error message.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let username = user_data.username.trim();

    if username.is_empty() {
        return registration_form(
            username,
            FormErrors {
                username: Some("Enter a username."),
                ..Default::default()
            },
        )
        .into_response();
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        let message = format!("Usernames can be at most {MAX_USERNAME_LENGTH} characters long.");
        return registration_form(
            username,
            FormErrors {
                username: Some(&message),
                ..Default::default()
            },
        )
        .into_response();
    }

    if user_data.password.is_empty() {
        return registration_form(
            username,
            FormErrors {
                password: Some("Enter a password."),
                ..Default::default()
            },
        )
        .into_response();
    }

    if user_data.password != user_data.confirm_password {
        return registration_form(
            username,
            FormErrors {
                confirm_password: Some("Passwords do not match."),
                ..Default::default()
            },
        )
        .into_response();
    }

    let is_registered = match state.db_connection.lock() {
        Ok(connection) => register_with_cost(
            username,
            &user_data.password,
            state.password_cost,
            &connection,
        ),
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            false
        }
    };

    if !is_registered {
        return registration_form(
            username,
            FormErrors {
                username: Some(DUPLICATE_USERNAME_MSG),
                ..Default::default()
            },
        )
        .into_response();
    }

    tracing::info!("Registered new user {username}");

    (
        HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod get_register_page_tests {
    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_status_ok, assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::get_register_page;

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let title = document
            .select(&scraper::Selector::parse("h1").unwrap())
            .next()
            .expect("no h1")
            .text()
            .collect::<String>();
        assert_eq!(title.trim(), "Create an account");

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");
        assert_form_submit_button_with_text(&form, "Register");
    }
}
