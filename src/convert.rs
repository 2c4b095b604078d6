//! Merge entry points: one deck, a batch of decks, or a batch written to disk.
//!
//! The synchronous functions ([`merge_slides`], [`merge_document`],
//! [`merge_batch`]) are the core: one input runs to completion before the
//! next starts. The async functions resolve paths and URLs, then hand the
//! whole synchronous batch to `tokio::task::spawn_blocking`, because
//! rasterisation and composition are CPU-bound.

use crate::config::{FailurePolicy, MergeConfig};
use crate::error::Slides2A4Error;
use crate::layout;
use crate::output::{BatchOutput, BatchStats, DocumentMetadata, FileFailure, MergedDocument};
use crate::pipeline::input::{self, NamedInput};
use crate::pipeline::rasterize::{self, resolve_rasterizer, Rasterizer};
use crate::pipeline::{archive, compose};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Rasterise `pdf_bytes` and compose the slides onto gridded A4 pages.
///
/// Returns the serialized handout PDF.
pub fn merge_slides(pdf_bytes: &[u8], config: &MergeConfig) -> Result<Vec<u8>, Slides2A4Error> {
    let per_page = slides_per_page_arg(config)?;
    let rasterizer = resolve_rasterizer(config);
    let images = rasterizer.rasterize(pdf_bytes)?;
    compose::compose(&images, per_page)
}

/// Merge one named input into a [`MergedDocument`] called `<stem>_merged.pdf`.
pub fn merge_document(
    input: &NamedInput,
    config: &MergeConfig,
) -> Result<MergedDocument, Slides2A4Error> {
    let rasterizer = resolve_rasterizer(config);
    let mut timings = StageTimings::default();
    merge_one(rasterizer.as_ref(), input, config, &mut timings)
}

/// Merge every input and pack the results into one zip archive.
///
/// Inputs are processed in order. With [`FailurePolicy::Abort`] the first
/// failure is returned as [`Slides2A4Error::FileFailed`]; with
/// [`FailurePolicy::Skip`] failing inputs are listed in
/// [`BatchOutput::failures`] and left out of the archive.
///
/// # Errors
/// - [`Slides2A4Error::InvalidArgument`] for an empty batch
/// - [`Slides2A4Error::AllFilesFailed`] when skipping and nothing succeeded
pub fn merge_batch(
    inputs: &[NamedInput],
    config: &MergeConfig,
) -> Result<BatchOutput, Slides2A4Error> {
    let total_start = Instant::now();
    if inputs.is_empty() {
        return Err(Slides2A4Error::InvalidArgument(
            "no input files to merge".into(),
        ));
    }
    slides_per_page_arg(config)?;

    let total = inputs.len();
    info!(
        "Merging {} file(s), {} slides per page",
        total, config.slides_per_page
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let rasterizer = resolve_rasterizer(config);
    let mut timings = StageTimings::default();
    let mut taken = HashSet::new();
    let mut documents = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (idx, input) in inputs.iter().enumerate() {
        let file_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(file_num, total, &input.name);
        }

        match merge_one(rasterizer.as_ref(), input, config, &mut timings) {
            Ok(mut doc) => {
                doc.name = archive::disambiguate(doc.name, &mut taken);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(file_num, total, &input.name, doc.page_count);
                }
                documents.push(doc);
            }
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(file_num, total, &input.name, &e.to_string());
                }
                match config.failure_policy {
                    FailurePolicy::Abort => return Err(Slides2A4Error::for_file(&input.name, e)),
                    FailurePolicy::Skip => {
                        warn!("Skipping '{}': {}", input.name, e);
                        failures.push(FileFailure {
                            name: input.name.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    if documents.is_empty() {
        let first_error = failures
            .first()
            .map(|f| format!("{}: {}", f.name, f.error))
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(Slides2A4Error::AllFilesFailed { total, first_error });
    }

    let archive_bytes = archive::build_archive(&documents)?;

    let stats = BatchStats {
        total_files: total,
        merged_files: documents.len(),
        failed_files: failures.len(),
        total_slides: documents.iter().map(|d| d.slide_count).sum(),
        total_output_pages: documents.iter().map(|d| d.page_count).sum(),
        archive_bytes: archive_bytes.len(),
        rasterize_duration_ms: timings.rasterize_ms,
        compose_duration_ms: timings.compose_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} files, {} A4 pages, {}ms total",
        stats.merged_files, total, stats.total_output_pages, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, documents.len());
    }

    Ok(BatchOutput {
        archive: archive_bytes,
        documents,
        failures,
        stats,
    })
}

/// Resolve every path or URL in `inputs`, then run [`merge_batch`] on the
/// blocking pool.
///
/// Resolution is fail-fast under [`FailurePolicy::Abort`]; under
/// [`FailurePolicy::Skip`] unreadable inputs are reported in
/// [`BatchOutput::failures`] like any other failing file.
pub async fn merge_inputs(
    inputs: &[String],
    config: &MergeConfig,
) -> Result<BatchOutput, Slides2A4Error> {
    if inputs.is_empty() {
        return Err(Slides2A4Error::InvalidArgument(
            "no input files to merge".into(),
        ));
    }

    let mut resolved = Vec::with_capacity(inputs.len());
    let mut unresolved = Vec::new();
    for raw in inputs {
        match input::resolve_input(raw, config.download_timeout_secs).await {
            Ok(named) => resolved.push(named),
            Err(e) if config.failure_policy == FailurePolicy::Skip => {
                warn!("Skipping '{}': {}", raw, e);
                unresolved.push(FileFailure {
                    name: raw.clone(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(Slides2A4Error::for_file(raw.as_str(), e)),
        }
    }

    if resolved.is_empty() {
        let first_error = unresolved
            .first()
            .map(|f| format!("{}: {}", f.name, f.error))
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(Slides2A4Error::AllFilesFailed {
            total: inputs.len(),
            first_error,
        });
    }

    let cfg = config.clone();
    let mut output = tokio::task::spawn_blocking(move || merge_batch(&resolved, &cfg))
        .await
        .map_err(|e| Slides2A4Error::Internal(format!("Merge task panicked: {}", e)))??;

    if !unresolved.is_empty() {
        output.stats.total_files += unresolved.len();
        output.stats.failed_files += unresolved.len();
        unresolved.append(&mut output.failures);
        output.failures = unresolved;
    }
    Ok(output)
}

/// Merge `inputs` and write the zip archive to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn merge_to_file(
    inputs: &[String],
    output_path: impl AsRef<Path>,
    config: &MergeConfig,
) -> Result<BatchStats, Slides2A4Error> {
    let output = merge_inputs(inputs, config).await?;
    write_atomic(output_path.as_ref(), &output.archive).await?;
    Ok(output.stats)
}

/// Write `bytes` to `path` atomically: temp file in the same directory, then
/// rename over the destination.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Slides2A4Error> {
    let path = path.to_path_buf();
    let bytes = bytes.to_vec();

    tokio::task::spawn_blocking(move || {
        let write_err = |source: std::io::Error| Slides2A4Error::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
        tmp.write_all(&bytes).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| Slides2A4Error::Internal(format!("Write task panicked: {}", e)))?
}

/// Extract deck metadata (title, page count, …) without rasterising.
///
/// Uses the default download timeout and no password; see
/// [`inspect_with_config`] for encrypted decks.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentMetadata, Slides2A4Error> {
    inspect_with_config(input_str, &MergeConfig::default()).await
}

/// Like [`inspect`], honouring `config.password` and
/// `config.download_timeout_secs`.
pub async fn inspect_with_config(
    input_str: impl AsRef<str>,
    config: &MergeConfig,
) -> Result<DocumentMetadata, Slides2A4Error> {
    let named = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let password = config.password.clone();
    tokio::task::spawn_blocking(move || {
        rasterize::extract_metadata(&named.bytes, password.as_deref())
    })
    .await
    .map_err(|e| Slides2A4Error::Internal(format!("Metadata task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct StageTimings {
    rasterize_ms: u64,
    compose_ms: u64,
}

fn merge_one(
    rasterizer: &dyn Rasterizer,
    input: &NamedInput,
    config: &MergeConfig,
    timings: &mut StageTimings,
) -> Result<MergedDocument, Slides2A4Error> {
    let per_page = slides_per_page_arg(config)?;

    let start = Instant::now();
    let images = rasterizer.rasterize(&input.bytes)?;
    timings.rasterize_ms += start.elapsed().as_millis() as u64;

    let start = Instant::now();
    let pdf = compose::compose(&images, per_page)?;
    timings.compose_ms += start.elapsed().as_millis() as u64;

    let doc = MergedDocument {
        name: archive::output_name(&input.name),
        pdf,
        slide_count: images.len(),
        page_count: layout::page_count(images.len(), config.slides_per_page),
    };
    info!(
        "{} → {} ({} slides, {} pages)",
        input.name, doc.name, doc.slide_count, doc.page_count
    );
    Ok(doc)
}

/// `slides_per_page` as the signed value [`compose::compose`] expects.
///
/// `MergeConfig` can be built by hand, bypassing the builder, so zero is
/// rejected here as well.
fn slides_per_page_arg(config: &MergeConfig) -> Result<i64, Slides2A4Error> {
    i64::try_from(config.slides_per_page)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| {
            Slides2A4Error::InvalidArgument(format!(
                "slides per page must be a positive integer, got {}",
                config.slides_per_page
            ))
        })
}
