//! Expense aggregation for the administrator's summary.
//!
//! Everything here is a pure function of the expenses passed in and is
//! recomputed on every request.

use std::collections::{BTreeMap, HashMap, HashSet};

use time::{Date, Duration, Month};

use crate::expense::{Category, Expense};

/// The number of users listed as top spenders.
pub const TOP_SPENDER_COUNT: usize = 3;

/// The summed expenses of one user.
#[derive(Debug, Clone, PartialEq)]
pub struct SpenderTotal {
    /// The owner of the expenses.
    pub username: String,
    /// The sum of the owner's expense amounts.
    pub total: f64,
}

/// Summary statistics over a set of expenses.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseSummary {
    /// The sum of every expense amount.
    pub total: f64,
    /// The number of distinct owners.
    pub user_count: usize,
    /// The biggest spenders, largest total first, ties broken by username.
    pub top_spenders: Vec<SpenderTotal>,
    /// The summed amount of each category that has at least one expense, in category order.
    pub category_totals: Vec<(Category, f64)>,
    /// The summed amount of each calendar month, oldest first.
    ///
    /// Months are represented by their first day.
    pub monthly_totals: Vec<(Date, f64)>,
}

impl ExpenseSummary {
    /// Whether the summary was computed from an empty set of expenses.
    pub fn is_empty(&self) -> bool {
        self.user_count == 0
    }
}

/// Compute the summary statistics of `expenses`.
pub fn summarize(expenses: &[Expense]) -> ExpenseSummary {
    let mut total = 0.0;
    let mut owners = HashSet::new();
    let mut spender_totals: HashMap<&str, f64> = HashMap::new();
    let mut category_totals: BTreeMap<Category, f64> = BTreeMap::new();
    let mut monthly_totals: BTreeMap<Date, f64> = BTreeMap::new();

    for expense in expenses {
        total += expense.amount;
        owners.insert(expense.owner.as_str());
        *spender_totals.entry(&expense.owner).or_insert(0.0) += expense.amount;
        *category_totals.entry(expense.category).or_insert(0.0) += expense.amount;
        *monthly_totals
            .entry(first_of_month(expense.date))
            .or_insert(0.0) += expense.amount;
    }

    ExpenseSummary {
        total,
        user_count: owners.len(),
        top_spenders: top_spenders(spender_totals, TOP_SPENDER_COUNT),
        category_totals: category_totals.into_iter().collect(),
        monthly_totals: monthly_totals.into_iter().collect(),
    }
}

fn top_spenders(spender_totals: HashMap<&str, f64>, count: usize) -> Vec<SpenderTotal> {
    let mut spenders: Vec<SpenderTotal> = spender_totals
        .into_iter()
        .map(|(username, total)| SpenderTotal {
            username: username.to_owned(),
            total,
        })
        .collect();

    spenders.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.username.cmp(&b.username))
    });
    spenders.truncate(count);
    spenders
}

fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// Formats a month as a three-letter abbreviation followed by the year, e.g. "Jan 2024".
pub fn format_month_label(month: Date) -> String {
    let name = match month.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{name} {}", month.year())
}
