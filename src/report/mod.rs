//! The downloadable PDF expense report.
//!
//! Reports are built in two steps: [layout_report] positions every piece of
//! text on A4 pages, then [render_pdf] draws the layout with printpdf.

mod endpoint;
mod layout;
mod pdf;

pub use endpoint::get_report;
pub use layout::{ReportLayout, layout_report};
pub use pdf::render_pdf;
