//! PDF implementation of the `DocumentRenderer` port.
//!
//! Builds a single-page A4 document from the confirmation HTML: tags are
//! stripped, text lines are laid out top-down in Helvetica. The keepsake is
//! text-only; embedded media stay behind their locators.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::ports::{DocumentRenderer, RenderError};

/// A4 page size in PDF points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;

const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 12;
const LINE_HEIGHT: i64 = 16;

pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let lines = text_lines(html);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
        ];
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-LINE_HEIGHT).into()]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(latin1_bytes(line), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Failed(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::Failed(e.to_string()))?;

        Ok(buffer)
    }
}

/// Strip tags and entities, keeping non-empty text lines in order.
fn text_lines(html: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut in_tag = false;
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                // Block-ish closers become line breaks.
                let rest: String = chars.clone().take(8).collect();
                let lower = rest.to_ascii_lowercase();
                if lower.starts_with("/p")
                    || lower.starts_with("/h")
                    || lower.starts_with("br")
                    || lower.starts_with("/div")
                    || lower.starts_with("/li")
                {
                    push_line(&mut lines, &mut current);
                }
                in_tag = true;
            }
            '>' => in_tag = false,
            '&' => {
                if !in_tag {
                    current.push(consume_entity(&mut chars));
                }
            }
            c if !in_tag => current.push(c),
            _ => {}
        }
    }
    push_line(&mut lines, &mut current);
    lines
}

fn push_line(lines: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
    current.clear();
}

/// Decode the handful of entities the composer emits; unknown entities are
/// passed through as '&' plus their raw text.
fn consume_entity(chars: &mut std::iter::Peekable<std::str::Chars>) -> char {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == ';' {
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '#' || name.len() > 6 {
            return '&';
        }
        name.push(c);
        chars.next();
    }
    match name.as_str() {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "nbsp" => ' ',
        _ => '&',
    }
}

/// Helvetica carries Latin-1; anything outside is substituted.
fn latin1_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}
