use crate::auth::{Role, User, UserID};

/// The logged in user, inserted into each authenticated request by the auth middleware.
///
/// Handlers receive it with `Extension(session): Extension<Session>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The ID of the logged in user.
    pub user_id: UserID,
    /// The username of the logged in user.
    pub username: String,
    /// The role of the logged in user.
    pub role: Role,
}

impl Session {
    /// Whether the logged in user may see every user's data.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for Session {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}
