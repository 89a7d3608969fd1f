//! Table views of an [ExpenseSummary].

use maud::{Markup, html};

use crate::{
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    summary::aggregation::ExpenseSummary,
};

const STAT_CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";

/// Renders the total spent and the number of users with expenses side by side.
pub fn summary_statistics_view(summary: &ExpenseSummary) -> Markup {
    html! {
        section id="summary-statistics" class="grid grid-cols-1 sm:grid-cols-2 gap-4 w-full"
        {
            div class=(STAT_CARD_STYLE)
            {
                h3 class="text-sm text-gray-600 dark:text-gray-400" { "Total Expenses" }
                p id="total-expenses" class="text-3xl font-bold" { (format_currency(summary.total)) }
            }

            div class=(STAT_CARD_STYLE)
            {
                h3 class="text-sm text-gray-600 dark:text-gray-400" { "Users" }
                p id="user-count" class="text-3xl font-bold" { (summary.user_count) }
            }
        }
    }
}

/// Renders the ranked table of the users who spent the most.
pub fn top_spenders_table(summary: &ExpenseSummary) -> Markup {
    html! {
        div
        {
            h3 class="text-xl font-semibold mb-4" { "Top Spenders" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table id="top-spenders" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Rank" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "User" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Total" }
                        }
                    }
                    tbody
                    {
                        @for (rank, spender) in summary.top_spenders.iter().enumerate() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (rank + 1) }
                                td class=(TABLE_CELL_STYLE) { (spender.username) }
                                td class={(TABLE_CELL_STYLE) " text-right"} { (format_currency(spender.total)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the summed amount and share of the total for each category.
pub fn category_breakdown_table(summary: &ExpenseSummary) -> Markup {
    html! {
        div
        {
            h3 class="text-xl font-semibold mb-4" { "Category Breakdown" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table id="category-breakdown" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Total" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Share" }
                        }
                    }
                    tbody
                    {
                        @for (category, total) in &summary.category_totals {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (category) }
                                td class={(TABLE_CELL_STYLE) " text-right"} { (format_currency(*total)) }
                                td class={(TABLE_CELL_STYLE) " text-right"} { (format_share(*total, summary.total)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Formats `part` as a whole-number percentage of `whole`, e.g. "69%".
fn format_share(part: f64, whole: f64) -> String {
    if whole <= 0.0 {
        return "0%".to_owned();
    }

    format!("{:.0}%", part / whole * 100.0)
}
