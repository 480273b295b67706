//! Render adapter: PDF generation via lopdf.

mod pdf;

pub use pdf::PdfRenderer;
