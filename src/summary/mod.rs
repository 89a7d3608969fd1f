//! Summary statistics, charts and tables for the administrator view.

mod aggregation;
mod charts;
mod tables;

pub use aggregation::{ExpenseSummary, SpenderTotal, summarize};
pub(crate) use charts::{ECHARTS_SCRIPT_URL, charts_script, charts_view, summary_charts};
pub(crate) use tables::{category_breakdown_table, summary_statistics_view, top_spenders_table};
