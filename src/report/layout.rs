//! Page layout for the PDF expense report.
//!
//! The layout is computed up front as positioned text and cell borders so the
//! pagination rules can be tested without parsing PDF output. Distances are in
//! millimetres measured from the top left corner of an A4 portrait page.

use time::OffsetDateTime;
use unicode_segmentation::UnicodeSegmentation;

use crate::expense::Expense;

pub(super) const PAGE_WIDTH: f32 = 210.0;
pub(super) const PAGE_HEIGHT: f32 = 297.0;

const MARGIN: f32 = 10.0;
/// Rows may not extend past this distance from the top of the page.
const PAGE_BREAK_Y: f32 = PAGE_HEIGHT - 20.0;
const FOOTER_Y: f32 = PAGE_HEIGHT - 15.0;
/// Horizontal padding between a cell border and its text.
const CELL_PADDING: f32 = 1.0;

const LINE_HEIGHT: f32 = 10.0;
const HEADER_ROW_HEIGHT: f32 = 10.0;
const WRAPPED_LINE_HEIGHT: f32 = 8.0;
/// Where the first row of the table starts on every page after the first.
const CONTINUED_TABLE_TOP: f32 = MARGIN + 2.0 * LINE_HEIGHT + HEADER_ROW_HEIGHT;

const TITLE_FONT_SIZE: f32 = 14.0;
const BODY_FONT_SIZE: f32 = 12.0;
const ROW_FONT_SIZE: f32 = 11.0;
const FOOTER_FONT_SIZE: f32 = 9.0;

const DATE_WIDTH: f32 = 30.0;
const DESCRIPTION_WIDTH: f32 = 50.0;
const CATEGORY_WIDTH: f32 = 40.0;
const AMOUNT_WIDTH: f32 = 30.0;

const COLUMNS: [(&str, f32); 4] = [
    ("Date", DATE_WIDTH),
    ("Description", DESCRIPTION_WIDTH),
    ("Category", CATEGORY_WIDTH),
    ("Amount", AMOUNT_WIDTH),
];

/// The typeface variants used in the report, all Helvetica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// A line of text drawn at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub font: FontStyle,
    /// The font size in points.
    pub size: f32,
    /// Distance from the left edge of the page to the start of the text.
    pub x: f32,
    /// Distance from the top of the page to the text baseline.
    pub baseline: f32,
}

/// The border of a table cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBorder {
    pub x: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Everything drawn on one page of the report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportPage {
    pub texts: Vec<TextItem>,
    pub borders: Vec<CellBorder>,
}

/// The fully positioned content of a report, one entry per page.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub pages: Vec<ReportPage>,
}

/// Lay out the expense report for `username` listing `expenses` in the order given.
///
/// Every page starts with the report title and `generated_on` timestamp and
/// ends with its page number. The first page also shows the username and the
/// total of every expense. Rows that do not fit above the bottom margin start
/// a new page, which repeats the column headings. A row too tall for any page
/// is split across pages, with the date, category and amount on its first part.
pub fn layout_report(
    username: &str,
    expenses: &[Expense],
    generated_on: OffsetDateTime,
) -> ReportLayout {
    let generated_on = format!(
        "Generated on: {} {:02}:{:02}:{:02}",
        generated_on.date(),
        generated_on.hour(),
        generated_on.minute(),
        generated_on.second()
    );
    let total = expenses
        .iter()
        .fold(0.0, |total, expense| total + expense.amount);

    let mut builder = LayoutBuilder::new(generated_on);

    builder.line(&format!("User: {username}"), FontStyle::Regular, BODY_FONT_SIZE);
    builder.line(
        &format!("Total Expenses: {}", format_amount(total)),
        FontStyle::Regular,
        BODY_FONT_SIZE,
    );
    builder.y += 5.0;
    builder.column_headings();

    for expense in expenses {
        builder.expense_row(expense);
    }

    builder.finish()
}

/// Formats a dollar amount with two decimal places and no thousands separators, e.g. "$1234.50".
pub fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}

struct LayoutBuilder {
    generated_on: String,
    pages: Vec<ReportPage>,
    current: ReportPage,
    y: f32,
}

impl LayoutBuilder {
    fn new(generated_on: String) -> Self {
        let mut builder = Self {
            generated_on,
            pages: Vec::new(),
            current: ReportPage::default(),
            y: MARGIN,
        };
        builder.page_header();
        builder
    }

    fn page_header(&mut self) {
        self.centered(
            "Expense Report",
            FontStyle::Bold,
            TITLE_FONT_SIZE,
            LINE_HEIGHT,
        );
        let generated_on = self.generated_on.clone();
        self.centered(&generated_on, FontStyle::Regular, BODY_FONT_SIZE, LINE_HEIGHT);
    }

    fn page_footer(&mut self) {
        let page_number = format!("Page {}", self.pages.len() + 1);
        let width = text_width(&page_number, FOOTER_FONT_SIZE);

        self.current.texts.push(TextItem {
            text: page_number,
            font: FontStyle::Italic,
            size: FOOTER_FONT_SIZE,
            x: (PAGE_WIDTH - width) / 2.0,
            baseline: baseline(FOOTER_Y, LINE_HEIGHT, FOOTER_FONT_SIZE),
        });
    }

    fn new_page(&mut self) {
        self.page_footer();
        self.pages.push(std::mem::take(&mut self.current));
        self.y = MARGIN;
        self.page_header();
    }

    fn finish(mut self) -> ReportLayout {
        self.page_footer();
        self.pages.push(self.current);

        ReportLayout { pages: self.pages }
    }

    fn centered(&mut self, text: &str, font: FontStyle, size: f32, height: f32) {
        let content_width = PAGE_WIDTH - 2.0 * MARGIN;
        let x = MARGIN + (content_width - text_width(text, size)) / 2.0;

        self.current.texts.push(TextItem {
            text: text.to_owned(),
            font,
            size,
            x,
            baseline: baseline(self.y, height, size),
        });
        self.y += height;
    }

    fn line(&mut self, text: &str, font: FontStyle, size: f32) {
        self.current.texts.push(TextItem {
            text: text.to_owned(),
            font,
            size,
            x: MARGIN + CELL_PADDING,
            baseline: baseline(self.y, LINE_HEIGHT, size),
        });
        self.y += LINE_HEIGHT;
    }

    fn column_headings(&mut self) {
        let mut x = MARGIN;

        for (heading, width) in COLUMNS {
            self.cell(heading, FontStyle::Bold, BODY_FONT_SIZE, x, width, HEADER_ROW_HEIGHT);
            x += width;
        }

        self.y += HEADER_ROW_HEIGHT;
    }

    fn table_page(&mut self) {
        self.new_page();
        self.column_headings();
    }

    /// How many wrapped description lines still fit above the bottom margin.
    fn lines_left(&self) -> usize {
        ((PAGE_BREAK_Y - self.y) / WRAPPED_LINE_HEIGHT).floor().max(0.0) as usize
    }

    fn expense_row(&mut self, expense: &Expense) {
        let description_lines = wrap_text(
            &expense.description,
            DESCRIPTION_WIDTH - 2.0 * CELL_PADDING,
            ROW_FONT_SIZE,
        );
        let lines_per_page = max_lines_per_page();

        let fits_here = description_lines.len() <= self.lines_left();
        let fits_next_page = description_lines.len() <= lines_per_page;
        if !fits_here && (fits_next_page || self.lines_left() == 0) {
            self.table_page();
        }

        let mut remaining = description_lines.as_slice();
        let mut is_first_part = true;

        loop {
            let (part, rest) = remaining.split_at(remaining.len().min(self.lines_left()));
            self.row_part(expense, part, is_first_part);
            is_first_part = false;
            remaining = rest;

            if remaining.is_empty() {
                break;
            }

            self.table_page();
        }
    }

    /// Draw `description_lines` as one row, or as the continuation of a split row.
    fn row_part(&mut self, expense: &Expense, description_lines: &[String], is_first_part: bool) {
        let height = WRAPPED_LINE_HEIGHT * description_lines.len() as f32;

        let mut x = MARGIN;
        if is_first_part {
            self.cell(
                &expense.date.to_string(),
                FontStyle::Regular,
                ROW_FONT_SIZE,
                x,
                DATE_WIDTH,
                height,
            );
        } else {
            self.border(x, DATE_WIDTH, height);
        }
        x += DATE_WIDTH;

        self.border(x, DESCRIPTION_WIDTH, height);
        for (index, line) in description_lines.iter().enumerate() {
            let line_top = self.y + WRAPPED_LINE_HEIGHT * index as f32;

            self.current.texts.push(TextItem {
                text: line.clone(),
                font: FontStyle::Regular,
                size: ROW_FONT_SIZE,
                x: x + CELL_PADDING,
                baseline: baseline(line_top, WRAPPED_LINE_HEIGHT, ROW_FONT_SIZE),
            });
        }
        x += DESCRIPTION_WIDTH;

        if is_first_part {
            self.cell(
                expense.category.as_str(),
                FontStyle::Regular,
                ROW_FONT_SIZE,
                x,
                CATEGORY_WIDTH,
                height,
            );
            x += CATEGORY_WIDTH;

            self.cell(
                &format_amount(expense.amount),
                FontStyle::Regular,
                ROW_FONT_SIZE,
                x,
                AMOUNT_WIDTH,
                height,
            );
        } else {
            self.border(x, CATEGORY_WIDTH, height);
            x += CATEGORY_WIDTH;
            self.border(x, AMOUNT_WIDTH, height);
        }

        self.y += height;
    }

    fn border(&mut self, x: f32, width: f32, height: f32) {
        self.current.borders.push(CellBorder {
            x,
            top: self.y,
            width,
            height,
        });
    }

    /// A bordered cell with a single line of vertically centred text.
    fn cell(&mut self, text: &str, font: FontStyle, size: f32, x: f32, width: f32, height: f32) {
        self.border(x, width, height);
        self.current.texts.push(TextItem {
            text: text.to_owned(),
            font,
            size,
            x: x + CELL_PADDING,
            baseline: baseline(self.y, height, size),
        });
    }
}

/// The number of wrapped description lines that fit in the table of a continued page.
fn max_lines_per_page() -> usize {
    ((PAGE_BREAK_Y - CONTINUED_TABLE_TOP) / WRAPPED_LINE_HEIGHT).floor() as usize
}

/// The baseline that vertically centres text of `size` points in a box starting at `top`.
fn baseline(top: f32, height: f32, size: f32) -> f32 {
    top + height / 2.0 + 0.3 * points_to_mm(size)
}

fn points_to_mm(points: f32) -> f32 {
    points * 25.4 / 72.0
}

/// Split `text` into lines no wider than `max_width` millimetres at `size` points.
///
/// Lines break between words. A word too wide for a line by itself is broken
/// between grapheme clusters. Always returns at least one line.
pub fn wrap_text(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_owned()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, size) <= max_width {
            current = word.to_owned();
            continue;
        }

        for grapheme in word.graphemes(true) {
            if !current.is_empty() && text_width(&current, size) + text_width(grapheme, size) > max_width
            {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(grapheme);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

/// The width of `text` in millimetres when set in Helvetica at `size` points.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(helvetica_width).sum();

    units as f32 / 1000.0 * points_to_mm(size)
}

/// Advance widths of the standard Helvetica glyphs in thousandths of an em.
fn helvetica_width(c: char) -> u32 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '[' | '\\' | ']' | 'f' | 't' => 278,
        '"' => 355,
        '#' | '$' | '0'..='9' | '?' | '_' | 'L' => 556,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 556,
        '%' => 889,
        '&' | 'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        '\'' => 191,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '+' | '<' | '=' | '>' | '~' => 584,
        '@' => 1015,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'F' | 'T' | 'Z' => 611,
        'G' | 'O' | 'Q' => 778,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'M' | 'm' => 833,
        'W' => 944,
        '^' => 469,
        'i' | 'j' | 'l' => 222,
        '{' | '}' => 334,
        '|' => 260,
        _ => 556,
    }
}
