//! Administrator features: the summary page, user deletion and the deletion audit log.

mod audit;
mod delete_user;
mod page;

pub use audit::{AuditRecord, get_user_audit_log};
pub use delete_user::delete_user_endpoint;
pub use page::get_admin_page;
