//! Pipeline stages for slide-deck merging.
//!
//! Each submodule implements exactly one transformation step, so each can
//! be tested on its own and the rasteriser can be swapped without touching
//! the composer.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterize ──▶ compose ──▶ archive
//! (path/URL)  (pdfium)     (lopdf)     (zip)
//! ```
//!
//! 1. [`input`]     - read a local path or download a URL into a named buffer
//! 2. [`rasterize`] - render every page to a grayscale bitmap
//! 3. [`compose`]   - stack the bitmaps onto gridded A4 pages, serialize PDF
//! 4. [`archive`]   - name each output and pack them into one zip

pub mod archive;
pub mod compose;
pub mod input;
pub mod rasterize;
