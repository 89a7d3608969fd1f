//! The page to display when a user tries to open a page reserved for administrators.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub fn get_403_forbidden_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        Html(
            error_view(
                "Forbidden",
                "403",
                "Access denied.",
                "Only administrators can view this page.",
            )
            .into_string(),
        ),
    )
        .into_response()
}
