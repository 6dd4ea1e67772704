//! Declarative table layout.
//!
//! A [`Table`] is an ordered list of rows, each an ordered list of cells that
//! span one or more columns. Columns are sized by integer ratios over the
//! available width. [`Table::arrange`] resolves the description into absolute
//! geometry: cell offsets and widths, wrapped lines, and row heights.
//! [`Arrangement::paginate`] then flows the rows onto pages, and the
//! assembler draws one page arrangement at a time.

use docprint_core::TransactionRequest;

use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;

use crate::error::{RenderError, Result};
use crate::metrics::{text_width, FontStyle};

/// Font size for all text, in points.
pub const FONT_SIZE: f64 = 12.0;

/// Distance between consecutive baselines.
pub const LEADING: f64 = 14.0;

/// Inner padding on every side of a cell.
pub const CELL_PADDING: f64 = 3.0;

/// Distance from the top of a line box down to its baseline.
pub const BASELINE_OFFSET: f64 = 10.5;

/// Height of a row whose tallest cell holds one line of text.
pub const SINGLE_LINE_ROW_HEIGHT: f64 = LEADING + 2.0 * CELL_PADDING;

/// Column ratios of the invoice table: item, quantity, rate, amount.
pub const INVOICE_COLUMNS: [u32; 4] = [4, 4, 2, 2];

/// One line of text inside a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub style: FontStyle,
}

impl Line {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: FontStyle::Regular,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: FontStyle::Bold,
        }
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Number of columns covered.
    pub span: usize,
    /// Lines in top-to-bottom order. Each may wrap into several.
    pub lines: Vec<Line>,
    /// Minimum height of the row containing this cell.
    pub min_height: f64,
}

impl Cell {
    /// A cell with the given lines.
    pub fn new(span: usize, lines: Vec<Line>) -> Self {
        Self {
            span,
            lines,
            min_height: 0.0,
        }
    }

    /// A single-column cell holding one line.
    pub fn single(line: Line) -> Self {
        Self::new(1, vec![line])
    }

    /// An empty cell with a fixed minimum height.
    pub fn spacer(span: usize, height: f64) -> Self {
        Self {
            span,
            lines: Vec::new(),
            min_height: height,
        }
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

/// A table: column ratios plus rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub column_ratios: Vec<u32>,
    pub rows: Vec<Row>,
}

/// A cell with resolved geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    /// Offset from the table's left edge.
    pub x: f64,
    pub width: f64,
    /// Lines after wrapping.
    pub lines: Vec<Line>,
}

/// A row with resolved geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    pub height: f64,
    pub cells: Vec<PlacedCell>,
}

/// A table resolved against a width.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    pub width: f64,
    pub rows: Vec<PlacedRow>,
}

impl Arrangement {
    /// Total height of all rows.
    pub fn height(&self) -> f64 {
        self.rows.iter().map(|row| row.height).sum()
    }

    /// Flow the rows onto pages `page_height` points tall.
    ///
    /// Rows keep their order. A row that does not fit in the space left on a
    /// page starts the next one, and a row taller than a whole page is split
    /// between its lines. Always yields at least one page.
    pub fn paginate(&self, page_height: f64) -> Result<Vec<Arrangement>> {
        let lines_per_page = ((page_height - 2.0 * CELL_PADDING) / LEADING).floor();
        if lines_per_page < 1.0 {
            return Err(RenderError::InvalidLayout(format!(
                "page content height {:.2}pt cannot hold a line of text",
                page_height
            )));
        }
        let lines_per_page = lines_per_page as usize;

        let mut pages = Vec::new();
        let mut current: Vec<PlacedRow> = Vec::new();
        let mut used = 0.0;

        for row in self
            .rows
            .iter()
            .flat_map(|row| split_row(row, page_height, lines_per_page))
        {
            if !current.is_empty() && used + row.height > page_height + HEIGHT_TOLERANCE {
                pages.push(Arrangement {
                    width: self.width,
                    rows: std::mem::take(&mut current),
                });
                used = 0.0;
            }
            used += row.height;
            current.push(row);
        }

        if !current.is_empty() || pages.is_empty() {
            pages.push(Arrangement {
                width: self.width,
                rows: current,
            });
        }
        Ok(pages)
    }
}

/// Slack allowed when comparing summed row heights against a page.
const HEIGHT_TOLERANCE: f64 = 1e-6;

/// Cut a row taller than a page into pieces of at most `lines_per_page` lines.
fn split_row(row: &PlacedRow, page_height: f64, lines_per_page: usize) -> Vec<PlacedRow> {
    if row.height <= page_height + HEIGHT_TOLERANCE {
        return vec![row.clone()];
    }

    let tallest = row.cells.iter().map(|cell| cell.lines.len()).max().unwrap_or(0);
    if tallest == 0 {
        // Only a minimum height makes it tall; clamp it to the page.
        return vec![PlacedRow {
            height: page_height,
            cells: row.cells.clone(),
        }];
    }

    (0..tallest)
        .step_by(lines_per_page)
        .map(|first| {
            let cells: Vec<PlacedCell> = row
                .cells
                .iter()
                .map(|cell| PlacedCell {
                    x: cell.x,
                    width: cell.width,
                    lines: cell
                        .lines
                        .iter()
                        .skip(first)
                        .take(lines_per_page)
                        .cloned()
                        .collect(),
                })
                .collect();
            let lines = cells.iter().map(|cell| cell.lines.len()).max().unwrap_or(0);
            PlacedRow {
                height: lines as f64 * LEADING + 2.0 * CELL_PADDING,
                cells,
            }
        })
        .collect()
}

impl Table {
    pub fn new(column_ratios: Vec<u32>) -> Self {
        Self {
            column_ratios,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn column_count(&self) -> usize {
        self.column_ratios.len()
    }

    /// Widths of each column when the table is `width` points wide.
    pub fn column_widths(&self, width: f64) -> Vec<f64> {
        let total: u32 = self.column_ratios.iter().sum();
        self.column_ratios
            .iter()
            .map(|ratio| width * f64::from(*ratio) / f64::from(total))
            .collect()
    }

    /// Check that ratios are positive and every row covers all columns.
    pub fn check(&self) -> Result<()> {
        if self.column_ratios.is_empty() || self.column_ratios.contains(&0) {
            return Err(RenderError::InvalidLayout(
                "column ratios must be non-empty and positive".into(),
            ));
        }

        for (index, row) in self.rows.iter().enumerate() {
            if row.cells.iter().any(|cell| cell.span == 0) {
                return Err(RenderError::InvalidLayout(format!(
                    "row {} has a cell spanning no columns",
                    index
                )));
            }
            let covered: usize = row.cells.iter().map(|cell| cell.span).sum();
            if covered != self.column_count() {
                return Err(RenderError::InvalidLayout(format!(
                    "row {} covers {} of {} columns",
                    index,
                    covered,
                    self.column_count()
                )));
            }
        }

        Ok(())
    }

    /// Resolve the table into absolute geometry at the given width.
    pub fn arrange(&self, width: f64) -> Result<Arrangement> {
        self.check()?;
        let columns = self.column_widths(width);

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut column = 0;
                let mut height: f64 = 0.0;
                let mut cells = Vec::with_capacity(row.cells.len());

                for cell in &row.cells {
                    let x: f64 = columns[..column].iter().sum();
                    let cell_width: f64 = columns[column..column + cell.span].iter().sum();
                    let inner = cell_width - 2.0 * CELL_PADDING;

                    let lines: Vec<Line> = cell
                        .lines
                        .iter()
                        .flat_map(|line| {
                            wrap(&line.text, line.style, FONT_SIZE, inner)
                                .into_iter()
                                .map(move |text| Line {
                                    text,
                                    style: line.style,
                                })
                        })
                        .collect();

                    let content = lines.len() as f64 * LEADING + 2.0 * CELL_PADDING;
                    height = height.max(content).max(cell.min_height);

                    cells.push(PlacedCell {
                        x,
                        width: cell_width,
                        lines,
                    });
                    column += cell.span;
                }

                PlacedRow { height, cells }
            })
            .collect();

        Ok(Arrangement { width, rows })
    }
}

/// A word or word fragment with its measured width.
#[derive(Debug)]
struct Piece<'a> {
    text: &'a str,
    width: f64,
    space: f64,
}

impl Fragment for Piece<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.space
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Split a word into runs no wider than `max_width`, keeping at least one
/// character per run.
fn split_word(word: &str, style: FontStyle, size: f64, max_width: f64) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;

    for (index, ch) in word.char_indices() {
        let end = index + ch.len_utf8();
        if index > start && text_width(style, &word[start..end], size) > max_width {
            runs.push(&word[start..index]);
            start = index;
        }
    }
    runs.push(&word[start..]);
    runs
}

/// Break `text` into lines no wider than `max_width`.
///
/// Breaks at spaces; a word wider than a whole line is broken between
/// characters. Runs of spaces collapse. Always yields at least one line.
pub fn wrap(text: &str, style: FontStyle, size: f64, max_width: f64) -> Vec<String> {
    let space = text_width(style, " ", size);
    let pieces: Vec<Piece<'_>> = text
        .split(' ')
        .filter(|word| !word.is_empty())
        .flat_map(|word| split_word(word, style, size, max_width))
        .map(|run| Piece {
            text: run,
            width: text_width(style, run, size),
            space,
        })
        .collect();

    if pieces.is_empty() {
        return vec![String::new()];
    }

    wrap_first_fit(&pieces, &[max_width])
        .into_iter()
        .map(|line| {
            line.iter()
                .map(|piece| piece.text)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Build the invoice table for a request.
///
/// Party blocks side by side, a bold header row, one row per line item in
/// request order, and a blank closing row twice the height of a one-line row.
pub fn invoice_table(request: &TransactionRequest) -> Table {
    let mut table = Table::new(INVOICE_COLUMNS.to_vec());

    let party_cell = |label: &str, party: &docprint_core::Party| {
        Cell::new(
            2,
            vec![
                Line::bold(label),
                Line::regular(party.name.as_str()),
                Line::regular(party.address.as_str()),
                Line::regular(format!("GSTIN: {}", party.tax_id)),
            ],
        )
    };
    table.push_row(Row::new(vec![
        party_cell("Seller:", &request.seller),
        party_cell("Buyer:", &request.buyer),
    ]));

    table.push_row(Row::new(
        ["Item", "Quantity", "Rate", "Amount"]
            .into_iter()
            .map(|header| Cell::single(Line::bold(header)))
            .collect(),
    ));

    for item in &request.items {
        table.push_row(Row::new(vec![
            Cell::single(Line::regular(item.name.as_str())),
            Cell::single(Line::regular(item.quantity.as_str())),
            Cell::single(Line::regular(item.rate.to_string())),
            Cell::single(Line::regular(item.amount.to_string())),
        ]));
    }

    table.push_row(Row::new(vec![Cell::spacer(
        INVOICE_COLUMNS.len(),
        2.0 * SINGLE_LINE_ROW_HEIGHT,
    )]));

    table
}
