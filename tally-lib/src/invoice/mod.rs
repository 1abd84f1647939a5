//! Monthly invoice export.
//!
//! The page is laid out as plain data by [`InvoiceLayout`] and then drawn onto a single US
//! Letter page with `printpdf`. The caller picks which jobs go on the invoice; the renderer
//! keeps their order.

use std::{fs, io::Cursor};

use heck::ToSnakeCase;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt,
    image_crate::codecs::png::PngDecoder,
};
use tracing::{debug, warn};

use crate::{Result, job::JobRecord, ledger::YearMonth, repository::config::CoreConfig};

mod layout;
mod metrics;

pub use layout::{
    COLUMNS, InvoiceLayout, LINE_HEIGHT, LOGO, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, Rect, TextRun,
    Weight, format_invoice_date,
};

/// Everything about an invoice that doesn't come from the jobs themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceOptions {
    pub currency_symbol: String,
    pub author: String,
    pub creator: String,
    /// PNG image for the logo slot
    pub logo: Option<Vec<u8>>,
}

impl Default for InvoiceOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "$".into(),
            author: String::new(),
            creator: "Tally".into(),
            logo: None,
        }
    }
}

impl InvoiceOptions {
    /// Build options from the configuration. A logo that can't be read is left out.
    pub fn from_config(cfg: &CoreConfig) -> Self {
        let logo = cfg
            .invoice
            .logo
            .as_ref()
            .and_then(|path| match fs::read(path) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!("Leaving out logo {}: {e}", path.display());
                    None
                }
            });

        Self {
            currency_symbol: cfg.currency_symbol.clone(),
            author: cfg.invoice.author.clone(),
            creator: cfg.invoice.creator.clone(),
            logo,
        }
    }
}

/// Render the invoice for `month` listing `jobs`, returning the PDF file contents.
pub fn render_monthly_invoice(
    month: &str,
    jobs: &[JobRecord],
    options: &InvoiceOptions,
) -> Result<Vec<u8>> {
    let layout = InvoiceLayout::new(month, jobs, &options.currency_symbol);

    let (doc, page, layer) = PdfDocument::new(
        layout.title.text.as_str(),
        Mm::from(Pt(PAGE_WIDTH)),
        Mm::from(Pt(PAGE_HEIGHT)),
        "Invoice",
    );
    let doc = doc
        .with_author(options.author.as_str())
        .with_creator(options.creator.as_str());
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    if let Some(logo) = &options.logo {
        draw_logo(&layer, logo);
    }

    for run in layout.runs() {
        let font = match run.weight {
            Weight::Regular => &regular,
            Weight::Bold => &bold,
        };
        draw_text(&layer, font, run);
    }

    let bytes = doc.save_to_bytes()?;

    debug!(
        "Rendered invoice for {month} with {} job(s), {} bytes",
        jobs.len(),
        bytes.len()
    );

    Ok(bytes)
}

/// File name an exported invoice gets unless the user picks one, e.g. `invoice_mar_2025.pdf`.
pub fn default_file_name(month: YearMonth) -> String {
    format!("invoice_{}.pdf", month.label().to_snake_case())
}

fn draw_text(layer: &PdfLayerReference, font: &IndirectFontRef, run: &TextRun) {
    layer.use_text(
        run.text.as_str(),
        run.size,
        Mm::from(Pt(run.x)),
        Mm::from(Pt(run.baseline())),
        font,
    );
}

/// Scale the logo into the [`LOGO`] slot. A logo that isn't a readable PNG is skipped.
fn draw_logo(layer: &PdfLayerReference, png: &[u8]) {
    let image = match PngDecoder::new(Cursor::new(png)).and_then(Image::try_from) {
        Ok(image) => image,
        Err(e) => {
            warn!("Leaving out logo: {e}");
            return;
        }
    };

    let width = pixels(image.image.width.0);
    let height = pixels(image.image.height.0);
    if width <= 0.0 || height <= 0.0 {
        warn!("Leaving out empty logo");
        return;
    }

    // At 72 dpi one pixel is one point
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm::from(Pt(LOGO.x))),
            translate_y: Some(Mm::from(Pt(PAGE_HEIGHT - LOGO.y - LOGO.height))),
            scale_x: Some(LOGO.width / width),
            scale_y: Some(LOGO.height / height),
            dpi: Some(72.0),
            ..Default::default()
        },
    );
}

fn pixels(px: usize) -> f32 {
    f32::from(u16::try_from(px).unwrap_or(u16::MAX))
}
