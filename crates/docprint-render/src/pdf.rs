//! Document output through `pdf-writer`.
//!
//! The writer emits objects in a fixed order with fixed ids and never sets a
//! creation date or file identifier, so identical page content yields
//! identical bytes.
//!
//! Object layout:
//!
//! | #        | Object                                  |
//! |----------|-----------------------------------------|
//! | 1        | Catalog                                 |
//! | 2        | Pages                                   |
//! | 3        | Font `F1` (Helvetica, WinAnsi)          |
//! | 4        | Font `F2` (Helvetica-Bold, WinAnsi)     |
//! | 5        | Info (producer only)                    |
//! | 6 + 2n   | Page `n`                                |
//! | 7 + 2n   | Content stream of page `n`              |

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::metrics::FontStyle;

const PRODUCER: &str = "docprint";

const CATALOG_ID: Ref = Ref::new(1);
const PAGE_TREE_ID: Ref = Ref::new(2);
const REGULAR_FONT_ID: Ref = Ref::new(3);
const BOLD_FONT_ID: Ref = Ref::new(4);
const INFO_ID: Ref = Ref::new(5);
const FIRST_PAGE_ID: i32 = 6;

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageSetup {
    /// ISO A4 with 36pt margins.
    pub const A4: PageSetup = PageSetup {
        width: 595.0,
        height: 842.0,
        margin: 36.0,
    };

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::A4
    }
}

/// Drawing operations for one page, in PDF user space (origin bottom-left).
pub struct PageCanvas {
    content: Content,
}

impl PageCanvas {
    pub fn new(rule_width: f64) -> Self {
        let mut content = Content::new();
        content.set_line_width(rule_width as f32);
        Self { content }
    }

    /// Stroke a rectangle whose lower-left corner is at (`x`, `y`).
    pub fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.content
            .rect(x as f32, y as f32, width as f32, height as f32)
            .stroke();
    }

    /// Show WinAnsi-encoded text with its baseline starting at (`x`, `y`).
    pub fn show_text(&mut self, style: FontStyle, size: f64, x: f64, y: f64, text: &[u8]) {
        self.content
            .begin_text()
            .set_font(Name(style.resource_name().as_bytes()), size as f32)
            .next_line(x as f32, y as f32)
            .show(Str(text))
            .end_text();
    }

    pub fn finish(self) -> Vec<u8> {
        self.content.finish()
    }
}

fn page_ids(index: usize) -> (Ref, Ref) {
    let page = FIRST_PAGE_ID + 2 * index as i32;
    (Ref::new(page), Ref::new(page + 1))
}

/// Write a complete document with one page per content stream.
pub fn write_document(page: &PageSetup, contents: &[Vec<u8>]) -> Vec<u8> {
    let mut pdf = Pdf::new();
    pdf.set_version(1, 4);

    pdf.catalog(CATALOG_ID).pages(PAGE_TREE_ID);
    pdf.pages(PAGE_TREE_ID)
        .kids((0..contents.len()).map(|index| page_ids(index).0))
        .count(contents.len() as i32);

    for (style, id) in [
        (FontStyle::Regular, REGULAR_FONT_ID),
        (FontStyle::Bold, BOLD_FONT_ID),
    ] {
        pdf.type1_font(id)
            .base_font(Name(style.base_font().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    pdf.document_info(INFO_ID).producer(TextStr(PRODUCER));

    let media_box = Rect::new(0.0, 0.0, page.width as f32, page.height as f32);
    for (index, content) in contents.iter().enumerate() {
        let (page_id, content_id) = page_ids(index);
        {
            let mut writer = pdf.page(page_id);
            writer
                .media_box(media_box)
                .parent(PAGE_TREE_ID)
                .contents(content_id);
            writer
                .resources()
                .fonts()
                .pair(Name(FontStyle::Regular.resource_name().as_bytes()), REGULAR_FONT_ID)
                .pair(Name(FontStyle::Bold.resource_name().as_bytes()), BOLD_FONT_ID);
        }
        pdf.stream(content_id, content);
    }

    pdf.finish()
}
