//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    admin::{delete_user_endpoint, get_admin_page},
    auth::{
        admin_guard, auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page,
        post_log_in, register_user,
    },
    endpoints,
    expense::{create_expense_endpoint, get_expenses_page},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    report::get_report,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    // The report is downloaded with a plain link, so it redirects like a page.
    let protected_pages = Router::new()
        .route(endpoints::ADMIN_VIEW, get(get_admin_page))
        .route_layer(middleware::from_fn(admin_guard))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::REPORT, get(get_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_api = Router::new()
        .route(endpoints::DELETE_USER, post(delete_user_endpoint))
        .route_layer(middleware::from_fn(admin_guard))
        .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    protected_pages
        .merge(protected_api)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the expenses page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::EXPENSES_VIEW)
}
