//! Input resolution: turn a user-supplied path or URL into a named buffer.
//!
//! The core never looks at the file system: it works on [`NamedInput`]s,
//! which pair the raw PDF bytes with the original file name used to name the
//! merged output. Local files are read fully into memory; URLs are
//! downloaded. Both paths validate the `%PDF` magic so the caller gets a
//! meaningful error instead of a pdfium failure.

use crate::error::Slides2A4Error;
use crate::pipeline::rasterize::find_pdf_header;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw PDF bytes plus the file name they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedInput {
    /// Original file name (no directory), e.g. `lecture-01.pdf`.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedInput {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a named in-memory PDF.
///
/// URLs are downloaded with `timeout_secs`; anything else is read as a
/// local file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<NamedInput, Slides2A4Error> {
    if input.trim().is_empty() {
        return Err(Slides2A4Error::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(Path::new(input)).await
    }
}

/// Read a local file, validating existence, permissions and PDF magic bytes.
async fn resolve_local(path: &Path) -> Result<NamedInput, Slides2A4Error> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Slides2A4Error::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Slides2A4Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let name = file_name(path);
    check_magic(&name, &bytes)?;

    debug!("Resolved local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(NamedInput { name, bytes })
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<NamedInput, Slides2A4Error> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Slides2A4Error::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Slides2A4Error::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Slides2A4Error::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Slides2A4Error::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Slides2A4Error::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let name = extract_filename(url);
    check_magic(&name, &bytes)?;

    info!("Downloaded {} ({} bytes)", name, bytes.len());
    Ok(NamedInput {
        name,
        bytes: bytes.to_vec(),
    })
}

/// Extract a reasonable filename from the URL path.
pub fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| PathBuf::from(path).display().to_string())
}

fn check_magic(name: &str, bytes: &[u8]) -> Result<(), Slides2A4Error> {
    if bytes.len() >= 4 && find_pdf_header(bytes).is_none() {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(Slides2A4Error::NotAPdf {
            name: name.to_string(),
            magic,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/deck.pdf"));
        assert!(is_url("http://example.com/deck.pdf"));
        assert!(!is_url("/tmp/deck.pdf"));
        assert!(!is_url("deck.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_from_url() {
        assert_eq!(
            extract_filename("https://example.com/courses/week-3.pdf"),
            "week-3.pdf"
        );
        assert_eq!(extract_filename("https://example.com/"), "downloaded.pdf");
        assert_eq!(extract_filename("not a url"), "downloaded.pdf");
    }

    #[tokio::test]
    async fn local_file_keeps_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.5\n%%EOF\n")
            .unwrap();

        let input = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(input.name, "lecture.pdf");
        assert!(input.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = resolve_input("/definitely/not/here.pdf", 5).await.unwrap_err();
        assert!(matches!(err, Slides2A4Error::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn non_pdf_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"plain text, not a deck").unwrap();

        let err = resolve_input(path.to_str().unwrap(), 5).await.unwrap_err();
        match err {
            Slides2A4Error::NotAPdf { name, magic } => {
                assert_eq!(name, "notes.pdf");
                assert_eq!(&magic, b"plai");
            }
            other => panic!("expected NotAPdf, got {other}"),
        }
    }

    #[tokio::test]
    async fn bom_before_header_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.pdf");
        std::fs::write(&path, b"\xEF\xBB\xBF%PDF-1.5\n%%EOF\n").unwrap();

        let input = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(input.name, "bom.pdf");
    }

    #[tokio::test]
    async fn blank_input_is_invalid() {
        let err = resolve_input("  ", 5).await.unwrap_err();
        assert!(matches!(err, Slides2A4Error::InvalidInput { .. }));
    }
}
