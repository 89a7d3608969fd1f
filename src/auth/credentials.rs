//! Registering and authenticating users by username and password.

use rusqlite::Connection;

use crate::{
    Error,
    auth::{PasswordHash, Role, User, create_user, get_user_by_username},
};

/// Register a new user with the role [Role::User].
///
/// Returns `false` if the username is taken or the user could not be stored.
pub fn register(username: &str, password: &str, connection: &Connection) -> bool {
    register_with_cost(username, password, PasswordHash::DEFAULT_COST, connection)
}

/// Register a new user, hashing the password with `cost` rounds.
///
/// See [register].
pub fn register_with_cost(
    username: &str,
    password: &str,
    cost: u32,
    connection: &Connection,
) -> bool {
    let password_hash = match PasswordHash::new(password, cost) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("Could not hash password for new user: {error}");
            return false;
        }
    };

    match create_user(username, password_hash, Role::User, connection) {
        Ok(_) => true,
        Err(Error::DuplicateUsername) => {
            tracing::debug!("Tried to register duplicate username {username}");
            false
        }
        Err(error) => {
            tracing::error!("Could not create user {username}: {error}");
            false
        }
    }
}

/// Get the user named `username` if `password` matches their stored password.
///
/// Unknown usernames and wrong passwords both give `None`.
pub fn verify_credentials(username: &str, password: &str, connection: &Connection) -> Option<User> {
    let user = match get_user_by_username(username, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return None,
        Err(error) => {
            tracing::error!("Could not look up user {username}: {error}");
            return None;
        }
    };

    match user.password_hash.verify(password) {
        Ok(true) => Some(user),
        Ok(false) => None,
        Err(error) => {
            tracing::error!("Could not verify password for {username}: {error}");
            None
        }
    }
}

/// Check whether `password` is the password registered for `username`.
pub fn authenticate(username: &str, password: &str, connection: &Connection) -> bool {
    verify_credentials(username, password, connection).is_some()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        auth::{Role, delete_user, get_user_by_username, list_users},
        db::initialize,
    };

    use super::{authenticate, register_with_cost, verify_credentials};

    fn get_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn register_then_authenticate() {
        let connection = get_db_connection();

        assert!(register_with_cost("alice", "hunter2", 4, &connection));
        assert!(authenticate("alice", "hunter2", &connection));
    }

    #[test]
    fn wrong_password_fails() {
        let connection = get_db_connection();
        register_with_cost("alice", "hunter2", 4, &connection);

        assert!(!authenticate("alice", "hunter3", &connection));
    }

    #[test]
    fn unknown_username_fails() {
        let connection = get_db_connection();

        assert!(!authenticate("nobody", "hunter2", &connection));
    }

    #[test]
    fn duplicate_registration_fails_and_keeps_one_user() {
        let connection = get_db_connection();

        assert!(register_with_cost("alice", "first", 4, &connection));
        assert!(!register_with_cost("alice", "second", 4, &connection));

        assert_eq!(list_users(&connection).unwrap().len(), 1);
        assert!(authenticate("alice", "first", &connection));
        assert!(!authenticate("alice", "second", &connection));
    }

    #[test]
    fn registering_admin_name_creates_ordinary_user() {
        let connection = get_db_connection();

        register_with_cost("admin", "hunter2", 4, &connection);

        let user = get_user_by_username("admin", &connection).unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn re_registering_after_deletion_uses_new_password() {
        let connection = get_db_connection();
        register_with_cost("alice", "old", 4, &connection);
        delete_user("alice", &connection).unwrap();

        assert!(register_with_cost("alice", "new", 4, &connection));

        assert!(authenticate("alice", "new", &connection));
        assert!(!authenticate("alice", "old", &connection));
    }

    #[test]
    fn verify_credentials_returns_user() {
        let connection = get_db_connection();
        register_with_cost("alice", "hunter2", 4, &connection);

        let user = verify_credentials("alice", "hunter2", &connection).unwrap();

        assert_eq!(user.username, "alice");
    }
}
