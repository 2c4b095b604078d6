//! Progress-callback trait for per-file merge events.
//!
//! Inject an [`Arc<dyn MergeProgressCallback>`] via
//! [`crate::config::MergeConfigBuilder::progress_callback`] to receive events
//! as the batch walks through its inputs. Files are processed one after the
//! other, so events for a batch always arrive in input order.
//!
//! # Example
//!
//! ```rust
//! use edgequake_slides2a4::{MergeConfig, MergeProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl MergeProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, _file_num: usize, _total: usize, name: &str, pages: usize) {
//!         self.pages.fetch_add(pages, Ordering::SeqCst);
//!         eprintln!("{name}: {pages} A4 pages");
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = MergeConfig::builder()
//!     .progress_callback(cb as Arc<dyn MergeProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch orchestration as it processes each input file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `Send + Sync` because the work runs on tokio's
/// blocking pool when driven through the async API.
pub trait MergeProgressCallback: Send + Sync {
    /// Called once before the first file is processed.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is rasterised.
    ///
    /// # Arguments
    /// * `file_num`    - 1-indexed position of the file in the batch
    /// * `total_files` - number of files in the batch
    /// * `name`        - original file name
    fn on_file_start(&self, file_num: usize, total_files: usize, name: &str) {
        let _ = (file_num, total_files, name);
    }

    /// Called when a file has been merged.
    ///
    /// `output_pages` is the number of A4 pages produced.
    fn on_file_complete(&self, file_num: usize, total_files: usize, name: &str, output_pages: usize) {
        let _ = (file_num, total_files, name, output_pages);
    }

    /// Called when a file fails.
    fn on_file_error(&self, file_num: usize, total_files: usize, name: &str, error: &str) {
        let _ = (file_num, total_files, name, error);
    }

    /// Called once after all files have been attempted and archived.
    ///
    /// Not called when the batch aborts on the first failure.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl MergeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::MergeConfig`].
pub type ProgressCallback = Arc<dyn MergeProgressCallback>;
