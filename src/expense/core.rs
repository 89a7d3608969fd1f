//! Defines the core data models and database queries for expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::Session};

// ============================================================================
// MODELS
// ============================================================================

/// The fixed set of categories an expense can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Other,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Bills,
        Category::Other,
    ];

    /// The name shown to users and stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown category \"{s}\""))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// Money spent by a user on one thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: i64,
    /// The day the expense was recorded.
    pub date: Date,
    /// What the money was spent on.
    pub description: String,
    pub category: Category,
    /// The amount spent in dollars, never negative.
    pub amount: f64,
    /// The username of the user who recorded the expense.
    pub owner: String,
}

/// The data for an expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub date: Date,
    pub description: String,
    pub category: Category,
    pub amount: f64,
    pub owner: String,
}

/// Which expenses a query should return.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseScope {
    /// Only the expenses recorded by the user with this username.
    Owner(String),
    /// Every user's expenses.
    All,
}

impl ExpenseScope {
    /// Administrators see every expense, everyone else sees their own.
    pub fn for_session(session: &Session) -> Self {
        if session.is_admin() {
            ExpenseScope::All
        } else {
            ExpenseScope::Owner(session.username.clone())
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table and the index used to look up expenses by owner.
///
/// `owner` is a plain copy of the username rather than a foreign key, the
/// user delete trigger removes a user's expenses.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            owner TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_owner ON expense(owner);",
    )
}

/// Insert a new expense and return the stored row.
///
/// The caller is responsible for validating the description and amount.
///
/// # Errors
/// Returns an [Error::SqlError] if the insert fails, e.g. for a negative amount.
pub fn add_expense(expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(
            "INSERT INTO expense (date, description, category, amount, owner)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, date, description, category, amount, owner",
        )?
        .query_row(
            (
                expense.date,
                expense.description,
                expense.category,
                expense.amount,
                expense.owner,
            ),
            map_expense_row,
        )
        .map_err(Error::from)
}

/// Get the expenses in `scope`, oldest first with ties in the order they were added.
pub fn list_expenses(scope: &ExpenseScope, connection: &Connection) -> Result<Vec<Expense>, Error> {
    let mut statement = match scope {
        ExpenseScope::Owner(_) => connection.prepare(
            "SELECT id, date, description, category, amount, owner FROM expense
             WHERE owner = ?1 ORDER BY date ASC, id ASC",
        )?,
        ExpenseScope::All => connection.prepare(
            "SELECT id, date, description, category, amount, owner FROM expense
             ORDER BY date ASC, id ASC",
        )?,
    };

    let rows = match scope {
        ExpenseScope::Owner(owner) => statement.query_map((owner,), map_expense_row)?,
        ExpenseScope::All => statement.query_map([], map_expense_row)?,
    };

    let expenses = rows
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(expenses)
}

/// Map a database row to an [Expense].
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        date: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        amount: row.get(4)?,
        owner: row.get(5)?,
    })
}
