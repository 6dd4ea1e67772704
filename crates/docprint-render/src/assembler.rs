//! Request-to-document assembly.

use std::sync::Arc;

use docprint_core::{Artifact, TransactionRequest};

use crate::error::{RenderError, Result};
use crate::layout::{self, Arrangement, BASELINE_OFFSET, CELL_PADDING, FONT_SIZE, LEADING};
use crate::metrics;
use crate::pdf::{self, PageCanvas, PageSetup};

/// Width of the cell borders, in points.
const RULE_WIDTH: f64 = 0.5;

/// Turns a transaction request into a rendered document.
///
/// Implementations must be deterministic: the same request always yields the
/// same bytes. The generation cache relies on this only for efficiency, never
/// for correctness.
pub trait Assembler: Send + Sync {
    fn render(&self, request: &TransactionRequest) -> Result<Artifact>;
}

impl<A: Assembler + ?Sized> Assembler for Arc<A> {
    fn render(&self, request: &TransactionRequest) -> Result<Artifact> {
        (**self).render(request)
    }
}

/// Renders the invoice table as a PDF, flowing long tables onto further pages.
#[derive(Debug, Clone, Default)]
pub struct PdfAssembler {
    page: PageSetup,
}

impl PdfAssembler {
    /// An assembler for A4 pages.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(page: PageSetup) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &PageSetup {
        &self.page
    }

    /// Draw one page worth of rows from the top margin down.
    fn draw(&self, page: &Arrangement) -> Result<Vec<u8>> {
        let mut canvas = PageCanvas::new(RULE_WIDTH);

        let left = self.page.margin;
        let mut top = self.page.height - self.page.margin;

        for row in &page.rows {
            for cell in &row.cells {
                canvas.stroke_rect(left + cell.x, top - row.height, cell.width, row.height);

                let x = left + cell.x + CELL_PADDING;
                let mut baseline = top - CELL_PADDING - BASELINE_OFFSET;
                for line in &cell.lines {
                    if !line.text.is_empty() {
                        let encoded = metrics::encode_winansi(&line.text).map_err(|ch| {
                            RenderError::InvalidLayout(format!(
                                "layout text contains unencodable character {:?}",
                                ch
                            ))
                        })?;
                        canvas.show_text(line.style, FONT_SIZE, x, baseline, &encoded);
                    }
                    baseline -= LEADING;
                }
            }
            top -= row.height;
        }

        Ok(canvas.finish())
    }
}

impl Assembler for PdfAssembler {
    fn render(&self, request: &TransactionRequest) -> Result<Artifact> {
        check_repertoire(request)?;

        let table = layout::invoice_table(request);
        let arrangement = table.arrange(self.page.content_width())?;

        let contents = arrangement
            .paginate(self.page.content_height())?
            .iter()
            .map(|page| self.draw(page))
            .collect::<Result<Vec<_>>>()?;
        let bytes = pdf::write_document(&self.page, &contents);

        tracing::debug!(
            items = request.items.len(),
            pages = contents.len(),
            bytes = bytes.len(),
            "rendered invoice"
        );
        Ok(Artifact::from(bytes))
    }
}

/// Reject text the standard fonts cannot draw, naming the field.
fn check_repertoire(request: &TransactionRequest) -> Result<()> {
    for (field, text) in request.text_fields() {
        if let Some(ch) = text.chars().find(|ch| !metrics::is_renderable(*ch)) {
            return Err(RenderError::UnsupportedCharacter { field, ch });
        }
    }
    Ok(())
}
