use rusqlite::Connection;
use time::Date;

use crate::{
    auth::{PasswordHash, Role, User, create_user},
    db::initialize,
    expense::{Category, NewExpense},
};

/// An in-memory database with every table and trigger created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Insert a user whose password is "password", hashed with a low cost.
#[track_caller]
pub(crate) fn insert_user(connection: &Connection, username: &str, role: Role) -> User {
    let password_hash = PasswordHash::new("password", 4).expect("Could not hash password");

    create_user(username, password_hash, role, connection).expect("Could not create user")
}

pub(crate) fn expense_on(
    date: Date,
    description: &str,
    category: Category,
    amount: f64,
    owner: &str,
) -> NewExpense {
    NewExpense {
        date,
        description: description.to_owned(),
        category,
        amount,
        owner: owner.to_owned(),
    }
}
