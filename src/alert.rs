//! Alert messages that are swapped into the page's alert container.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A dismissable message shown to the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action completed.
    Success { message: String, details: String },
    /// The action was not performed, but nothing went wrong.
    Warning { message: String, details: String },
    /// The action failed.
    Error { message: String, details: String },
}

impl Alert {
    fn style(&self) -> &'static str {
        match self {
            Alert::Success { .. } => {
                "text-green-800 bg-green-50 border-green-300 \
                dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
            }
            Alert::Warning { .. } => {
                "text-yellow-800 bg-yellow-50 border-yellow-300 \
                dark:bg-gray-800 dark:text-yellow-300 dark:border-yellow-800"
            }
            Alert::Error { .. } => {
                "text-red-800 bg-red-50 border-red-300 \
                dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
            }
        }
    }

    pub fn into_html(self) -> Markup {
        let style = self.style();
        let (message, details) = match self {
            Alert::Success { message, details }
            | Alert::Warning { message, details }
            | Alert::Error { message, details } => (message, details),
        };

        html! {
            div
                role="alert"
                class={"flex items-start p-4 mb-4 text-sm border rounded-lg " (style)}
                onclick="this.remove()"
            {
                div
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p { (details) }
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}
