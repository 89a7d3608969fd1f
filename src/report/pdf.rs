//! Renders a [ReportLayout] to PDF bytes.

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use crate::{
    Error,
    report::layout::{CellBorder, FontStyle, PAGE_HEIGHT, PAGE_WIDTH, ReportLayout},
};

const BORDER_THICKNESS: f32 = 0.2;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(document: &PdfDocumentReference) -> Result<Self, Error> {
        let load_font = |font| document.add_builtin_font(font).map_err(report_error);

        Ok(Self {
            regular: load_font(BuiltinFont::Helvetica)?,
            bold: load_font(BuiltinFont::HelveticaBold)?,
            italic: load_font(BuiltinFont::HelveticaOblique)?,
        })
    }

    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

fn report_error(error: printpdf::Error) -> Error {
    tracing::error!("could not render PDF report: {error:?}");
    Error::ReportError(format!("{error:?}"))
}

/// Render `layout` as an A4 PDF document held in memory.
///
/// # Errors
/// Returns [Error::ReportError] if the fonts cannot be loaded or the document cannot be serialised.
pub fn render_pdf(layout: &ReportLayout) -> Result<Vec<u8>, Error> {
    let (document, first_page, first_layer) = PdfDocument::new(
        "Expense Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts::load(&document)?;

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            document.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                document.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            document.get_page(page_index).get_layer(layer_index)
        };

        layer.set_outline_thickness(BORDER_THICKNESS);
        for border in &page.borders {
            draw_border(&layer, border);
        }

        for item in &page.texts {
            layer.use_text(
                item.text.clone(),
                item.size,
                Mm(item.x),
                Mm(PAGE_HEIGHT - item.baseline),
                fonts.get(item.font),
            );
        }
    }

    document.save_to_bytes().map_err(report_error)
}

/// PDF coordinates start at the bottom left, layout coordinates at the top left.
fn draw_border(layer: &PdfLayerReference, border: &CellBorder) {
    let left = Mm(border.x);
    let right = Mm(border.x + border.width);
    let top = Mm(PAGE_HEIGHT - border.top);
    let bottom = Mm(PAGE_HEIGHT - border.top - border.height);

    layer.add_line(Line {
        points: vec![
            (Point::new(left, top), false),
            (Point::new(right, top), false),
            (Point::new(right, bottom), false),
            (Point::new(left, bottom), false),
        ],
        is_closed: true,
    });
}
