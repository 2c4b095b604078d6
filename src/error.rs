//! Error types for the edgequake-slides2a4 library.
//!
//! Every failure is fatal for the document it happened in: a deck that
//! cannot be decoded, a slide image that cannot be drawn, or a bad
//! slides-per-page value aborts that one conversion and propagates to the
//! caller unchanged. There is no per-page partial output.
//!
//! Whether one failing deck aborts a whole batch is decided one level up by
//! [`crate::config::FailurePolicy`]. In the batch layer a per-file error is
//! wrapped in [`Slides2A4Error::FileFailed`] so the caller knows which input
//! broke.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-slides2a4 library.
#[derive(Debug, Error)]
pub enum Slides2A4Error {
    // ── Decode errors ─────────────────────────────────────────────────────
    /// The byte content is not a parseable PDF (corrupt header, bad xref,
    /// unsupported encoding).
    #[error("Cannot decode PDF: {detail}")]
    Decode { detail: String },

    /// The input was read but does not start with the `%PDF` magic bytes.
    #[error("'{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    // ── Argument errors ───────────────────────────────────────────────────
    /// A caller-supplied argument is out of its domain (e.g. slides per page ≤ 0).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Render errors ─────────────────────────────────────────────────────
    /// A page could not be rasterised, or a slide image could not be drawn
    /// onto the A4 canvas. `page` is 1-indexed.
    #[error("Rendering failed for page {page}: {detail}")]
    Render { page: usize, detail: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Batch errors ──────────────────────────────────────────────────────
    /// One input of a batch failed; `source` is the underlying error.
    #[error("'{name}' failed: {source}")]
    FileFailed {
        name: String,
        #[source]
        source: Box<Slides2A4Error>,
    },

    /// Every input of a batch failed while failures were being skipped.
    #[error("All {total} files failed.\nFirst error: {first_error}")]
    AllFilesFailed { total: usize, first_error: String },

    /// The zip archive could not be assembled.
    #[error("Failed to build archive: {0}")]
    ArchiveFailed(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Slides2A4Error {
    /// Wrap a per-file error with the name of the input it came from.
    pub fn for_file(name: impl Into<String>, source: Slides2A4Error) -> Self {
        Slides2A4Error::FileFailed {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through [`Slides2A4Error::FileFailed`].
    pub fn root(&self) -> &Slides2A4Error {
        match self {
            Slides2A4Error::FileFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// `true` when the input bytes could not be decoded as a PDF.
    pub fn is_decode(&self) -> bool {
        matches!(
            self.root(),
            Slides2A4Error::Decode { .. }
                | Slides2A4Error::NotAPdf { .. }
                | Slides2A4Error::PasswordRequired
                | Slides2A4Error::WrongPassword
        )
    }

    /// `true` for drawing or rasterisation failures.
    pub fn is_render(&self) -> bool {
        matches!(self.root(), Slides2A4Error::Render { .. })
    }

    /// `true` for rejected caller arguments.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.root(), Slides2A4Error::InvalidArgument(_))
    }
}
