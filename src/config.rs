//! Configuration types for slide-deck merging.
//!
//! All merge behaviour is controlled through [`MergeConfig`], built via its
//! [`MergeConfigBuilder`]. The A4 page box and the 5 mm grid are fixed (see
//! [`crate::layout`]); the config only carries what legitimately varies
//! between runs.

use crate::error::Slides2A4Error;
use crate::pipeline::rasterize::Rasterizer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default rasterisation resolution in DPI.
pub const DEFAULT_DPI: u32 = 200;

/// Default number of slides stacked on one A4 page.
pub const DEFAULT_SLIDES_PER_PAGE: usize = 3;

/// Configuration for a merge run.
///
/// Built via [`MergeConfig::builder()`] or using [`MergeConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_slides2a4::{FailurePolicy, MergeConfig};
///
/// let config = MergeConfig::builder()
///     .slides_per_page(4)
///     .dpi(150)
///     .failure_policy(FailurePolicy::Skip)
///     .build()
///     .unwrap();
/// assert_eq!(config.slides_per_page, 4);
/// ```
#[derive(Clone)]
pub struct MergeConfig {
    /// Slides stacked top-to-bottom on each A4 page. Default: 3.
    ///
    /// Any positive value is accepted; the CLI restricts it to 1–6.
    pub slides_per_page: usize,

    /// Rasterisation DPI. Range: 72–400. Default: 200.
    ///
    /// A 4:3 slide at 200 DPI is roughly 2000 × 1500 px, comfortably sharp
    /// for a third of an A4 page. Lower it for very long decks where output
    /// size matters.
    pub dpi: u32,

    /// PDF user password for encrypted decks. Applied to every input.
    pub password: Option<String>,

    /// What to do when one input of a batch fails. Default: abort.
    pub failure_policy: FailurePolicy,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Pre-constructed rasteriser. If `None`, pdfium is used at [`Self::dpi`].
    pub rasterizer: Option<Arc<dyn Rasterizer>>,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            slides_per_page: DEFAULT_SLIDES_PER_PAGE,
            dpi: DEFAULT_DPI,
            password: None,
            failure_policy: FailurePolicy::default(),
            download_timeout_secs: 120,
            rasterizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for MergeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeConfig")
            .field("slides_per_page", &self.slides_per_page)
            .field("dpi", &self.dpi)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("failure_policy", &self.failure_policy)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "rasterizer",
                &self.rasterizer.as_ref().map(|_| "<dyn Rasterizer>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn MergeProgressCallback>"),
            )
            .finish()
    }
}

impl MergeConfig {
    /// Create a new builder for `MergeConfig`.
    pub fn builder() -> MergeConfigBuilder {
        MergeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`MergeConfig`].
#[derive(Debug)]
pub struct MergeConfigBuilder {
    config: MergeConfig,
}

impl MergeConfigBuilder {
    pub fn slides_per_page(mut self, n: usize) -> Self {
        self.config.slides_per_page = n;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<MergeConfig, Slides2A4Error> {
        let c = &self.config;
        if c.slides_per_page == 0 {
            return Err(Slides2A4Error::InvalidConfig(
                "Slides per page must be ≥ 1".into(),
            ));
        }
        if c.dpi < 72 || c.dpi > 400 {
            return Err(Slides2A4Error::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How a batch reacts when one input fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop at the first failing input and return its error. (default)
    #[default]
    Abort,
    /// Record the failure, leave that file out of the archive, keep going.
    Skip,
}
