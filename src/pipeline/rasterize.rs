//! PDF rasterisation: render every page to a grayscale bitmap via pdfium.
//!
//! The rest of the pipeline only sees [`PageImage`]s, so rasterisation sits
//! behind the [`Rasterizer`] trait. [`PdfiumRasterizer`] is the production
//! implementation; tests and embedders can inject their own through
//! [`crate::config::MergeConfigBuilder::rasterizer`].
//!
//! Rendering is synchronous and CPU-bound. The async entry points in
//! [`crate::convert`] move it onto tokio's blocking pool.

use crate::config::{MergeConfig, DEFAULT_DPI};
use crate::error::Slides2A4Error;
use crate::output::DocumentMetadata;
use crate::page::PageImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns PDF bytes into one grayscale image per page, in page order.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, Slides2A4Error>;
}

/// pdfium-backed rasteriser.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    dpi: u32,
    password: Option<String>,
}

impl PdfiumRasterizer {
    pub fn new(dpi: u32, password: Option<String>) -> Self {
        Self { dpi, password }
    }

    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(config.dpi, config.password.clone())
    }
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_DPI, None)
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, Slides2A4Error> {
        rasterize(pdf_bytes, self.dpi, self.password.as_deref())
    }
}

/// The rasteriser a merge run should use: the injected one, else pdfium.
pub fn resolve_rasterizer(config: &MergeConfig) -> Arc<dyn Rasterizer> {
    match config.rasterizer {
        Some(ref r) => Arc::clone(r),
        None => Arc::new(PdfiumRasterizer::from_config(config)),
    }
}

/// Rasterise every page of `pdf_bytes` at the default resolution.
pub fn rasterize_default(pdf_bytes: &[u8]) -> Result<Vec<PageImage>, Slides2A4Error> {
    rasterize(pdf_bytes, DEFAULT_DPI, None)
}

/// Rasterise every page of `pdf_bytes` to grayscale at `dpi`.
///
/// Bytes that do not start with `%PDF` are rejected before pdfium is loaded.
pub fn rasterize(
    pdf_bytes: &[u8],
    dpi: u32,
    password: Option<&str>,
) -> Result<Vec<PageImage>, Slides2A4Error> {
    check_pdf_header(pdf_bytes)?;

    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, password)
        .map_err(|e| classify_load_error(e, password.is_some()))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / 72.0)
        .use_grayscale_rendering(true);

    let mut images = Vec::with_capacity(total_pages);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| Slides2A4Error::Render {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let image = PageImage::from_luma(bitmap.as_image().to_luma8());
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}

/// Extract document metadata without rendering pages.
pub fn extract_metadata(
    pdf_bytes: &[u8],
    password: Option<&str>,
) -> Result<DocumentMetadata, Slides2A4Error> {
    check_pdf_header(pdf_bytes)?;

    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, password)
        .map_err(|e| classify_load_error(e, password.is_some()))?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

/// Bind to a pdfium shared library.
///
/// Lookup order: `PDFIUM_LIB_PATH` (a library file or the directory holding
/// it), then the current directory, then the system loader path.
pub fn bind_pdfium() -> Result<Pdfium, Slides2A4Error> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => {
            let path = PathBuf::from(path);
            let lib = if path.is_dir() {
                PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(&path))
            } else {
                path
            };
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Slides2A4Error::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Bytes searched for the `%PDF` header; pdfium tolerates leading junk
/// (a BOM, blank lines) up to this offset.
pub const HEADER_SEARCH_WINDOW: usize = 1024;

/// Offset of the `%PDF` header within the first [`HEADER_SEARCH_WINDOW`]
/// bytes, if any.
pub fn find_pdf_header(pdf_bytes: &[u8]) -> Option<usize> {
    let window = &pdf_bytes[..pdf_bytes.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(4).position(|w| w == b"%PDF")
}

/// Reject input that cannot be a PDF before handing it to pdfium.
pub fn check_pdf_header(pdf_bytes: &[u8]) -> Result<(), Slides2A4Error> {
    if pdf_bytes.len() < 4 {
        return Err(Slides2A4Error::Decode {
            detail: format!("input is only {} bytes long", pdf_bytes.len()),
        });
    }
    if find_pdf_header(pdf_bytes).is_none() {
        return Err(Slides2A4Error::Decode {
            detail: format!(
                "no %PDF header in the first {} bytes, first bytes {:?}",
                HEADER_SEARCH_WINDOW,
                &pdf_bytes[..4]
            ),
        });
    }
    Ok(())
}

fn classify_load_error(e: PdfiumError, password_given: bool) -> Slides2A4Error {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password_given {
            Slides2A4Error::WrongPassword
        } else {
            Slides2A4Error::PasswordRequired
        }
    } else {
        Slides2A4Error::Decode { detail: err_str }
    }
}
