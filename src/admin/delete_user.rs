//! Defines the endpoint for deleting a user and, through the delete trigger, their expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{Role, Session, delete_user, get_user_by_username},
    endpoints,
};

/// The state needed to delete a user.
#[derive(Debug, Clone)]
pub struct DeleteUserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for deleting a user.
#[derive(Debug, Deserialize)]
pub struct DeleteUserForm {
    /// The username of the user to delete.
    pub username: String,
    /// Set by the confirmation checkbox, missing when it is unchecked.
    #[serde(default)]
    pub confirm: bool,
}

/// A route handler for deleting a user.
///
/// Nothing is deleted unless the confirmation checkbox was ticked. On success
/// the client is redirected to the admin page which shows which user was deleted.
pub async fn delete_user_endpoint(
    State(state): State<DeleteUserState>,
    Extension(session): Extension<Session>,
    Form(form): Form<DeleteUserForm>,
) -> Response {
    if !form.confirm {
        return Error::DeletionNotConfirmed.into_alert_response();
    }

    if form.username == session.username {
        return Error::DeleteOwnAccount.into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match get_user_by_username(&form.username, &connection) {
        Ok(user) if user.role == Role::Admin => {
            return Error::DeleteAdministrator.into_alert_response();
        }
        Ok(_) => {}
        Err(Error::NotFound) => return Error::DeleteMissingUser.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    }

    match delete_user(&form.username, &connection) {
        Ok(0) => Error::DeleteMissingUser.into_alert_response(),
        Ok(_) => {
            tracing::info!(
                "user {} deleted by administrator {}",
                form.username,
                session.username
            );

            match deleted_user_redirect_url(&form.username) {
                Ok(url) => (HxRedirect(url), StatusCode::SEE_OTHER).into_response(),
                Err(error) => {
                    tracing::error!("could not build redirect URL: {error}");
                    error.into_alert_response()
                }
            }
        }
        Err(error) => {
            tracing::error!("could not delete user {}: {error}", form.username);
            error.into_alert_response()
        }
    }
}

/// The admin page URL that announces `username` was deleted, e.g. "/admin?deleted=alice".
fn deleted_user_redirect_url(username: &str) -> Result<String, Error> {
    let query = serde_urlencoded::to_string([("deleted", username)])
        .map_err(|error| Error::QueryEncodingError(error.to_string()))?;

    Ok(format!("{}?{query}", endpoints::ADMIN_VIEW))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        admin::get_user_audit_log,
        auth::{Role, Session, get_user_by_username},
        expense::{Category, ExpenseScope, add_expense, list_expenses},
        test_utils::{
            assert_alert_message, assert_hx_redirect, expense_on, get_test_connection,
            insert_user, parse_html_fragment,
        },
    };

    use super::{
        DeleteUserForm, DeleteUserState, delete_user_endpoint, deleted_user_redirect_url,
    };

    struct Fixture {
        state: DeleteUserState,
        admin: Session,
    }

    fn fixture() -> Fixture {
        let connection = get_test_connection();
        let admin = insert_user(&connection, "root", Role::Admin);
        insert_user(&connection, "alice", Role::User);
        insert_user(&connection, "bob", Role::User);
        insert_user(&connection, "other_admin", Role::Admin);

        for (owner, amount) in [("alice", 4.5), ("alice", 2.0), ("bob", 30.0)] {
            add_expense(
                expense_on(date!(2024 - 01 - 05), "Thing", Category::Other, amount, owner),
                &connection,
            )
            .unwrap();
        }

        Fixture {
            state: DeleteUserState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            admin: admin.into(),
        }
    }

    fn form(username: &str, confirm: bool) -> Form<DeleteUserForm> {
        Form(DeleteUserForm {
            username: username.to_owned(),
            confirm,
        })
    }

    #[tokio::test]
    async fn deletes_user_and_their_expenses() {
        let Fixture { state, admin } = fixture();

        let response =
            delete_user_endpoint(State(state.clone()), Extension(admin), form("alice", true))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/admin?deleted=alice");

        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_username("alice", &connection).is_err());

        let remaining = list_expenses(&ExpenseScope::All, &connection).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].owner, "bob");

        let audit_log = get_user_audit_log(&connection).unwrap();
        assert_eq!(audit_log.len(), 1);
        assert_eq!(audit_log[0].username, "alice");
    }

    #[tokio::test]
    async fn unconfirmed_deletion_does_nothing() {
        let Fixture { state, admin } = fixture();

        let response =
            delete_user_endpoint(State(state.clone()), Extension(admin), form("alice", false))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_alert_message(
            &parse_html_fragment(response).await,
            "Deletion not confirmed",
        );

        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_username("alice", &connection).is_ok());
        assert_eq!(list_expenses(&ExpenseScope::All, &connection).unwrap().len(), 3);
        assert!(get_user_audit_log(&connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn cannot_delete_own_account() {
        let Fixture { state, admin } = fixture();

        let response =
            delete_user_endpoint(State(state.clone()), Extension(admin), form("root", true)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(get_user_by_username("root", &state.db_connection.lock().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn cannot_delete_other_administrators() {
        let Fixture { state, admin } = fixture();

        let response = delete_user_endpoint(
            State(state.clone()),
            Extension(admin),
            form("other_admin", true),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            get_user_by_username("other_admin", &state.db_connection.lock().unwrap()).is_ok()
        );
    }

    #[tokio::test]
    async fn deleting_missing_user_is_not_found() {
        let Fixture { state, admin } = fixture();

        let response =
            delete_user_endpoint(State(state.clone()), Extension(admin), form("nobody", true))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_alert_message(
            &parse_html_fragment(response).await,
            "Could not delete user",
        );
        assert!(
            get_user_audit_log(&state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn redirect_encodes_username() {
        let Fixture { state, admin } = fixture();
        insert_user(&state.db_connection.lock().unwrap(), "a b&c", Role::User);

        let response =
            delete_user_endpoint(State(state.clone()), Extension(admin), form("a b&c", true))
                .await;

        assert_hx_redirect(&response, "/admin?deleted=a+b%26c");
    }

    #[test]
    fn redirect_url_points_at_admin_page() {
        assert_eq!(
            deleted_user_redirect_url("bob"),
            Ok("/admin?deleted=bob".to_owned())
        );
    }
}
