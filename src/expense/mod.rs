//! Expense management.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the fixed `Category` set
//! - Database functions for adding and listing expenses
//! - The expenses page and the endpoint for adding an expense

mod core;
mod create_endpoint;
mod expenses_page;

pub use core::{
    Category, Expense, ExpenseScope, NewExpense, add_expense, create_expense_table,
    list_expenses,
};
pub use create_endpoint::create_expense_endpoint;
pub use expenses_page::get_expenses_page;
