//! # edgequake-slides2a4
//!
//! Lay out PDF slide decks onto gridded A4 handout pages for note taking.
//!
//! Every slide is rasterised to grayscale, then the slides are stacked
//! top-to-bottom, right-aligned, a fixed number per A4 page, over a faint
//! 5 mm grid that leaves room for handwritten notes. Each input deck
//! `<stem>.pdf` becomes `<stem>_merged.pdf`, and a batch of decks is packed
//! into one zip archive.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF deck(s)
//!  │
//!  ├─ 1. Input      resolve local file or download from URL
//!  ├─ 2. Rasterize  render pages to grayscale via pdfium
//!  ├─ 3. Compose    stack slides onto gridded A4 pages (lopdf)
//!  └─ 4. Archive    `<stem>_merged.pdf` entries in one zip
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_slides2a4::{merge_batch, MergeConfig, NamedInput};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MergeConfig::builder().slides_per_page(3).build()?;
//!     let deck = NamedInput::new("lecture-01.pdf", std::fs::read("lecture-01.pdf")?);
//!     let output = merge_batch(&[deck], &config)?;
//!     std::fs::write("merged_pdfs.zip", &output.archive)?;
//!     eprintln!("{} A4 pages", output.stats.total_output_pages);
//!     Ok(())
//! }
//! ```
//!
//! The layout primitives are usable on their own:
//!
//! ```rust,no_run
//! use edgequake_slides2a4::{compose, rasterize_default};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pages = rasterize_default(&std::fs::read("deck.pdf")?)?;
//! let handout: Vec<u8> = compose(&pages, 2)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `slides2a4` binary (clap + anyhow + tracing-subscriber) |
//!
//! Rasterisation needs a pdfium shared library at runtime; see
//! [`pipeline::rasterize::bind_pdfium`] for the lookup order.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FailurePolicy, MergeConfig, MergeConfigBuilder};
pub use convert::{
    inspect, inspect_with_config, merge_batch, merge_document, merge_inputs, merge_slides,
    merge_to_file,
};
pub use error::Slides2A4Error;
pub use layout::LayoutSlot;
pub use output::{BatchOutput, BatchStats, DocumentMetadata, FileFailure, MergedDocument};
pub use page::PageImage;
pub use pipeline::archive::{build_archive, output_name};
pub use pipeline::compose::compose;
pub use pipeline::input::NamedInput;
pub use pipeline::rasterize::{rasterize, rasterize_default, PdfiumRasterizer, Rasterizer};
pub use progress::{MergeProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{merge_stream, merge_stream_from_bytes, DocumentStream};
