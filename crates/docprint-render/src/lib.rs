//! # docprint render
//!
//! Turns transaction requests into PDF invoices. Long tables flow onto as
//! many A4 pages as they need.
//!
//! ## Key Types
//!
//! - [`Assembler`] - The rendering seam used by the generation cache
//! - [`PdfAssembler`] - The invoice renderer
//! - [`Table`] - Declarative table layout consumed by the writer
//! - [`RenderError`] - Unsupported text and layout failures
//!
//! ## Determinism
//!
//! Rendering the same request twice produces the same bytes. The document is
//! written with `pdf-writer` using fixed object ids, and no timestamps or
//! document IDs are set. See the [`pdf`] module.

pub mod assembler;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod pdf;

pub use assembler::{Assembler, PdfAssembler};
pub use error::{RenderError, Result};
pub use layout::{Cell, Line, Row, Table};
pub use metrics::FontStyle;
pub use pdf::{PageCanvas, PageSetup};
