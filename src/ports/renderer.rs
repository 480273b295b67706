//! DocumentRenderer port - HTML to PDF conversion.

use thiserror::Error;

/// Errors producing a PDF document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document could not be rendered: {0}")]
    Failed(String),
}

/// Port for turning rendered HTML into a PDF document.
///
/// Rendering is pure CPU work on in-memory data, so the trait is sync;
/// callers on the async path should treat it as cheap.
pub trait DocumentRenderer: Send + Sync {
    fn render_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError>;
}
