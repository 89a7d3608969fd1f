//! Read access to the user deletion audit log.

use rusqlite::{Connection, Row};
use time::{PrimitiveDateTime, macros::format_description};

use crate::Error;

/// A record of a deleted user, written by the user delete trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    /// The ID of the audit record.
    pub id: i64,
    /// The username of the deleted user.
    pub username: String,
    /// When the user was deleted, in UTC.
    pub deleted_at: PrimitiveDateTime,
}

/// Get every audit record, oldest first.
pub fn get_user_audit_log(connection: &Connection) -> Result<Vec<AuditRecord>, Error> {
    connection
        .prepare("SELECT id, username, deleted_at FROM user_audit ORDER BY id ASC")?
        .query_map([], map_audit_row)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

fn map_audit_row(row: &Row) -> Result<AuditRecord, rusqlite::Error> {
    let raw_deleted_at: String = row.get(2)?;
    let deleted_at = PrimitiveDateTime::parse(
        &raw_deleted_at,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(AuditRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        deleted_at,
    })
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::{
        auth::{Role, delete_user},
        test_utils::{get_test_connection, insert_user},
    };

    use super::get_user_audit_log;

    #[test]
    fn audit_log_starts_empty() {
        let connection = get_test_connection();

        assert_eq!(get_user_audit_log(&connection).unwrap(), vec![]);
    }

    #[test]
    fn each_deletion_appends_one_record() {
        let connection = get_test_connection();
        insert_user(&connection, "alice", Role::User);
        insert_user(&connection, "bob", Role::User);

        delete_user("bob", &connection).unwrap();
        delete_user("alice", &connection).unwrap();
        delete_user("alice", &connection).unwrap();

        let log = get_user_audit_log(&connection).unwrap();
        let usernames: Vec<_> = log.iter().map(|record| record.username.as_str()).collect();

        assert_eq!(usernames, vec!["bob", "alice"]);
        assert_eq!(
            log[0].deleted_at.date(),
            OffsetDateTime::now_utc().date(),
            "deletion should be timestamped today in UTC"
        );
    }
}
