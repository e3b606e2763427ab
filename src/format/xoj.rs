use std::fmt::Write as _;

use egui::{Color32, Pos2, pos2};
use roxmltree::Node;

use super::DocumentError;
use super::color::{format_color, parse_color};
use crate::document::Document;
use crate::page::Page;
use crate::stroke::Stroke;

const XOURNAL_VERSION: &str = "0.4.8";
const TITLE: &str = "Xournal document - see http://math.mit.edu/~auroux/software/xournal/";

fn required<'a>(node: Node<'a, '_>, element: &'static str, attribute: &'static str) -> Result<&'a str, DocumentError> {
    node.attribute(attribute)
        .ok_or(DocumentError::MissingAttribute { element, attribute })
}

fn number(attribute: &str, value: &str) -> Result<f32, DocumentError> {
    value.trim().parse().map_err(|_| DocumentError::InvalidNumber {
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}

fn numbers(attribute: &str, value: &str) -> Result<Vec<f32>, DocumentError> {
    value.split_whitespace().map(|v| number(attribute, v)).collect()
}

/// Rebuilds per-point pressures from a width list whose first entry is the
/// base width and whose later entries are per-segment widths.
pub(crate) fn pressures_from_widths(widths: &[f32]) -> Vec<f32> {
    let Some((&base, segments)) = widths.split_first() else {
        return Vec::new();
    };
    if base == 0.0 {
        return vec![1.0; widths.len()];
    }
    let mut pressures = Vec::with_capacity(widths.len());
    pressures.push(1.0);
    for width in segments {
        let previous = pressures.last().copied().unwrap_or(1.0);
        pressures.push(2.0 * width / base - previous);
    }
    pressures
}

/// Width list for a stroke: base width followed by one width per segment.
pub(crate) fn widths_for(stroke: &Stroke) -> Vec<f32> {
    std::iter::once(stroke.pen_width())
        .chain(stroke.segment_widths())
        .collect()
}

fn parse_stroke(node: Node<'_, '_>) -> Result<Option<Stroke>, DocumentError> {
    if node.attribute("tool") != Some("pen") {
        return Ok(None);
    }
    let color = node.attribute("color").map_or(Color32::TRANSPARENT, parse_color);
    let widths = numbers("width", required(node, "stroke", "width")?)?;
    let Some(&pen_width) = widths.first() else {
        return Err(DocumentError::MissingAttribute {
            element: "stroke",
            attribute: "width",
        });
    };

    let coordinates = numbers("points", node.text().unwrap_or(""))?;
    let points: Vec<Pos2> = coordinates
        .chunks_exact(2)
        .map(|xy| pos2(xy[0], xy[1]))
        .collect();
    if points.is_empty() {
        return Ok(None);
    }

    Ok(Some(Stroke::new(color, pen_width, points, pressures_from_widths(&widths))))
}

fn parse_page(node: Node<'_, '_>) -> Result<Page, DocumentError> {
    let width = number("width", required(node, "page", "width")?)?;
    let height = number("height", required(node, "page", "height")?)?;
    let background = node
        .children()
        .find(|n| n.has_tag_name("background"))
        .and_then(|n| n.attribute("color"))
        .map_or(Color32::WHITE, parse_color);

    let mut page = Page::new(width, height, background);
    for stroke in node.descendants().filter(|n| n.has_tag_name("stroke")) {
        if let Some(stroke) = parse_stroke(stroke)? {
            page.strokes.push(stroke);
        }
    }
    Ok(page)
}

/// Parses XOJ markup. Strokes drawn with tools other than the pen are skipped.
pub fn parse(xml: &str) -> Result<Document, DocumentError> {
    let tree = roxmltree::Document::parse(xml)?;
    let pages = tree
        .descendants()
        .filter(|n| n.has_tag_name("page"))
        .map(parse_page)
        .collect::<Result<Vec<_>, _>>()?;
    if pages.is_empty() {
        return Err(DocumentError::NoPages);
    }
    Ok(Document::from_pages(pages))
}

/// Serializes a document as uncompressed XOJ markup.
pub fn write(document: &Document) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_into(&mut out, document);
    out
}

fn write_into(out: &mut String, document: &Document) -> std::fmt::Result {
    writeln!(out, r#"<?xml version="1.0" standalone="no"?>"#)?;
    writeln!(out, r#"<xournal version="{XOURNAL_VERSION}">"#)?;
    writeln!(out, "<title>{TITLE}</title>")?;
    for page in &document.pages {
        writeln!(out, r#"<page width="{}" height="{}">"#, page.width(), page.height())?;
        writeln!(
            out,
            r#"<background type="solid" color="{}" style="plain"/>"#,
            format_color(page.background)
        )?;
        writeln!(out, "<layer>")?;
        for stroke in &page.strokes {
            let widths: Vec<String> = widths_for(stroke).iter().map(f32::to_string).collect();
            write!(
                out,
                r#"<stroke tool="pen" color="{}" width="{}">"#,
                format_color(stroke.color()),
                widths.join(" ")
            )?;
            for point in stroke.points() {
                write!(out, "{} {} ", point.x, point.y)?;
            }
            writeln!(out, "</stroke>")?;
        }
        writeln!(out, "</layer>")?;
        writeln!(out, "</page>")?;
    }
    writeln!(out, "</xournal>")
}
