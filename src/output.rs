//! Result types returned by the merge entry points.

use serde::{Deserialize, Serialize};

/// One merged handout: the `<stem>_merged.pdf` produced for one input deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    /// Output file name, e.g. `lecture-01_merged.pdf`.
    pub name: String,
    /// Serialized A4 PDF.
    pub pdf: Vec<u8>,
    /// Slides (source pages) placed into the handout.
    pub slide_count: usize,
    /// A4 pages in the handout.
    pub page_count: usize,
}

/// An input that was skipped under [`crate::config::FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Original input name.
    pub name: String,
    /// Human-readable error.
    pub error: String,
}

/// Aggregate numbers for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub merged_files: usize,
    pub failed_files: usize,
    pub total_slides: usize,
    pub total_output_pages: usize,
    pub archive_bytes: usize,
    pub rasterize_duration_ms: u64,
    pub compose_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a batch run produced.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Zip archive holding every merged PDF, in input order.
    pub archive: Vec<u8>,
    /// The merged PDFs themselves, same order as in the archive.
    pub documents: Vec<MergedDocument>,
    /// Inputs left out of the archive (only with `FailurePolicy::Skip`).
    pub failures: Vec<FileFailure>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// `true` when every input made it into the archive.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Document-level metadata of an input deck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
