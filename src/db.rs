//! Creates the application's tables and triggers.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, expense::create_expense_table};

/// Create the audit table and the trigger that records and cleans up after user deletions.
///
/// The trigger runs inside the statement that deletes the user, so the
/// audit row, the user row and the user's expenses are removed or written
/// together or not at all.
fn create_user_audit(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user_audit (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL,
            deleted_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TRIGGER IF NOT EXISTS user_delete_audit
        AFTER DELETE ON user
        BEGIN
            INSERT INTO user_audit (username, deleted_at)
            VALUES (OLD.username, CURRENT_TIMESTAMP);

            DELETE FROM expense WHERE owner = OLD.username;
        END;",
    )
}

/// Create all of the tables and triggers used by the application.
///
/// Running this more than once on the same database is a no-op.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the statements fail, in which case
/// none of the changes are applied.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_user_audit(&transaction)?;

    transaction.commit()?;

    Ok(())
}
