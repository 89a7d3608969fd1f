//! User accounts, password hashing, sessions and the log-in, registration and log-out pages.

mod cookie;
mod credentials;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register_user;
mod session;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use credentials::{authenticate, register, register_with_cost, verify_credentials};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{admin_guard, auth_guard, auth_guard_hx};
pub use password::PasswordHash;
pub use register_user::{get_register_page, register_user};
pub use session::Session;
pub(super) use token::Token;
pub use user::{
    Role, User, UserID, create_user, create_user_table, delete_user, get_user_by_id,
    get_user_by_username, list_users, set_user_role,
};

pub(crate) use redirect::{build_log_in_redirect_url, normalize_redirect_url};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub use middleware::AuthState;
