//! PDF and PNG export.
//!
//! Pages are rasterized with the same renderer as the on-screen cache and
//! embedded as images, one output page per document page, sized in points
//! at 72 units per inch.

use std::fs;
use std::path::Path;

use image::ImageEncoder;
use log::info;
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::document::Document;
use crate::page::Page;
use crate::renderer;

/// Raster scale used for PDF pages: 2.0 gives 144 dpi images.
pub const PDF_RASTER_ZOOM: f32 = 2.0;

const MM_PER_POINT: f32 = 25.4 / 72.0;

/// Errors that can occur during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Page {0} could not be rasterized")]
    EmptyPage(usize),
}

fn rasterize(page: &Page, index: usize, zoom: f32) -> Result<Pixmap, ExportError> {
    renderer::render_page(page, zoom).ok_or(ExportError::EmptyPage(index))
}

/// Straight-alpha RGBA bytes of a pixmap.
fn rgba_bytes(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

fn rgb_bytes(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue()]
        })
        .collect()
}

/// Encodes one page as PNG at `zoom`.
pub fn page_to_png(page: &Page, zoom: f32) -> Result<Vec<u8>, ExportError> {
    let pixmap = rasterize(page, 0, zoom)?;
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf).write_image(
        &rgba_bytes(&pixmap),
        pixmap.width(),
        pixmap.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

pub fn export_png(page: &Page, zoom: f32, path: &Path) -> Result<(), ExportError> {
    fs::write(path, page_to_png(page, zoom)?)?;
    info!("Exported PNG {}", path.display());
    Ok(())
}

fn page_image(page: &Page, index: usize, zoom: f32) -> Result<printpdf::Image, ExportError> {
    let pixmap = rasterize(page, index, zoom)?;
    let rgb = printpdf::image_crate::RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb_bytes(&pixmap))
        .ok_or_else(|| ExportError::Pdf(format!("page {index} has an inconsistent raster size")))?;
    let dynamic = printpdf::image_crate::DynamicImage::ImageRgb8(rgb);
    Ok(printpdf::Image::from_dynamic_image(&dynamic))
}

/// Renders every page into a PDF, in document order.
pub fn document_to_pdf(document: &Document, title: &str, zoom: f32) -> Result<Vec<u8>, ExportError> {
    let Some(first) = document.pages.first() else {
        return Err(ExportError::EmptyPage(0));
    };
    let (doc, first_page, first_layer) = printpdf::PdfDocument::new(
        title,
        printpdf::Mm(first.width() * MM_PER_POINT),
        printpdf::Mm(first.height() * MM_PER_POINT),
        "Page 1",
    );

    for (index, page) in document.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(
                printpdf::Mm(page.width() * MM_PER_POINT),
                printpdf::Mm(page.height() * MM_PER_POINT),
                format!("Page {}", index + 1),
            )
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        let transform = printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            dpi: Some(72.0 * zoom),
            ..Default::default()
        };
        page_image(page, index, zoom)?.add_to_layer(layer, transform);
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(format!("PDF save failed: {e}")))
}

pub fn export_pdf(document: &Document, path: &Path) -> Result<(), ExportError> {
    let title = document.name().unwrap_or_else(|| "Untitled".to_string());
    fs::write(path, document_to_pdf(document, &title, PDF_RASTER_ZOOM)?)?;
    info!("Exported {} pages to {}", document.page_count(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;
    use egui::{Color32, pos2};

    #[test]
    fn pdf_has_header() {
        let mut doc = Document::with_page(Page::new(100.0, 100.0, Color32::WHITE));
        doc.pages.push(Page::new(50.0, 80.0, Color32::WHITE));
        let pdf = document_to_pdf(&doc, "test", 1.0).expect("pdf export");
        assert_eq!(&pdf[0..5], b"%PDF-");
    }

    #[test]
    fn png_has_signature() {
        let mut page = Page::new(40.0, 30.0, Color32::WHITE);
        page.strokes.push(Stroke::new(
            Color32::BLACK,
            2.0,
            vec![pos2(5.0, 5.0), pos2(35.0, 25.0)],
            vec![1.0, 1.0],
        ));
        let png = page_to_png(&page, 1.0).expect("png export");
        assert_eq!(&png[1..4], b"PNG");
    }
}
