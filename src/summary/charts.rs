//! ECharts visualisations of an [ExpenseSummary].
//!
//! - **Category chart**: bar chart of the summed amount per category
//! - **Monthly chart**: line chart of the summed amount per calendar month
//!
//! Each chart is serialised to its JSON options and initialised on page load.

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Line, bar::Bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    html::HeadElement,
    summary::aggregation::{ExpenseSummary, format_month_label},
};

/// The ECharts build loaded by pages that show charts.
pub const ECHARTS_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// A chart with its HTML container ID and ECharts configuration.
pub struct SummaryChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Build the category breakdown and monthly trend charts for `summary`.
pub fn summary_charts(summary: &ExpenseSummary) -> [SummaryChart; 2] {
    [
        SummaryChart {
            id: "category-chart",
            options: category_chart(summary).to_string(),
        },
        SummaryChart {
            id: "monthly-chart",
            options: monthly_chart(summary).to_string(),
        },
    ]
}

/// Renders the HTML containers for `charts`.
pub fn charts_view(charts: &[SummaryChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates the script that initialises each chart once the page has loaded.
///
/// Charts follow the browser's colour scheme and resize with the window.
pub fn charts_script(charts: &[SummaryChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chart = echarts.init(document.getElementById("{}"));
                    chart.setOption({});

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    HeadElement::ScriptSource(PreEscaped(format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    )))
}

fn category_chart(summary: &ExpenseSummary) -> Chart {
    let (labels, values): (Vec<String>, Vec<f64>) = summary
        .category_totals
        .iter()
        .map(|(category, total)| (category.to_string(), *total))
        .unzip();

    Chart::new()
        .title(Title::new().text("Expenses by Category"))
        .tooltip(currency_tooltip())
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Total").data(values))
}

fn monthly_chart(summary: &ExpenseSummary) -> Chart {
    let (labels, values): (Vec<String>, Vec<f64>) = summary
        .monthly_totals
        .iter()
        .map(|(month, total)| (format_month_label(*month), *total))
        .unzip();

    Chart::new()
        .title(Title::new().text("Monthly Expenses"))
        .tooltip(currency_tooltip())
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Total").data(values))
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{expense::Category, html::HeadElement, summary::aggregation::ExpenseSummary};

    use super::{charts_script, summary_charts};

    fn summary() -> ExpenseSummary {
        ExpenseSummary {
            total: 6.5,
            user_count: 1,
            top_spenders: Vec::new(),
            category_totals: vec![(Category::Food, 4.5), (Category::Transport, 2.0)],
            monthly_totals: vec![(date!(2024 - 01 - 01), 6.5)],
        }
    }

    #[test]
    fn charts_contain_labels_and_values() {
        let [category, monthly] = summary_charts(&summary());

        assert_eq!(category.id, "category-chart");
        assert!(category.options.contains("\"Food\""));
        assert!(category.options.contains("\"Transport\""));
        assert!(category.options.contains("4.5"));

        assert_eq!(monthly.id, "monthly-chart");
        assert!(monthly.options.contains("\"Jan 2024\""));
        assert!(monthly.options.contains("6.5"));
    }

    #[test]
    fn script_initialises_every_chart() {
        let charts = summary_charts(&summary());

        let HeadElement::ScriptSource(script) = charts_script(&charts) else {
            panic!("expected an inline script");
        };

        assert!(script.0.contains("document.getElementById(\"category-chart\")"));
        assert!(script.0.contains("document.getElementById(\"monthly-chart\")"));
    }
}
