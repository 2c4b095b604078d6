//! Output naming and zip packing.
//!
//! Every input deck `<stem>.pdf` yields `<stem>_merged.pdf`; all merged PDFs
//! of a batch go into one Deflate-compressed zip in input order. Entry
//! timestamps are left at the zip epoch so the archive is reproducible.

use crate::error::Slides2A4Error;
use crate::output::MergedDocument;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default file name of the batch archive.
pub const ARCHIVE_NAME: &str = "merged_pdfs.zip";

const MERGED_SUFFIX: &str = "_merged";

/// Name of the merged output for an input called `filename`.
///
/// Directory components are dropped and a trailing `.pdf` (any case) is
/// replaced by `_merged.pdf`.
///
/// ```rust
/// use edgequake_slides2a4::output_name;
///
/// assert_eq!(output_name("lecture-01.pdf"), "lecture-01_merged.pdf");
/// assert_eq!(output_name("decks/Intro.PDF"), "Intro_merged.pdf");
/// ```
pub fn output_name(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let stem = match base.len().checked_sub(4) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".pdf") => {
            &base[..cut]
        }
        _ => base,
    };
    format!("{stem}{MERGED_SUFFIX}.pdf")
}

/// Make `name` unique against `taken` by appending `_2`, `_3`, … before
/// the `.pdf` extension. The returned name is inserted into `taken`.
pub fn disambiguate(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let stem = name.strip_suffix(".pdf").unwrap_or(&name).to_string();
    let mut n = 2;
    loop {
        let candidate = format!("{stem}_{n}.pdf");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Pack `documents` into a zip archive, one entry per document, in order.
pub fn build_archive(documents: &[MergedDocument]) -> Result<Vec<u8>, Slides2A4Error> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for doc in documents {
            zip.start_file(doc.name.as_str(), options)
                .map_err(|e| Slides2A4Error::ArchiveFailed(format!("{}: {}", doc.name, e)))?;
            zip.write_all(&doc.pdf)
                .map_err(|e| Slides2A4Error::ArchiveFailed(format!("{}: {}", doc.name, e)))?;
            debug!("Archived {} ({} bytes)", doc.name, doc.pdf.len());
        }

        zip.finish()
            .map_err(|e| Slides2A4Error::ArchiveFailed(e.to_string()))?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn doc(name: &str, pdf: &[u8]) -> MergedDocument {
        MergedDocument {
            name: name.to_string(),
            pdf: pdf.to_vec(),
            slide_count: 1,
            page_count: 1,
        }
    }

    #[test]
    fn output_name_strips_pdf_extension() {
        assert_eq!(output_name("deck.pdf"), "deck_merged.pdf");
        assert_eq!(output_name("Deck.Pdf"), "Deck_merged.pdf");
        assert_eq!(output_name("my.slides.pdf"), "my.slides_merged.pdf");
        assert_eq!(output_name("/tmp/in/deck.pdf"), "deck_merged.pdf");
        assert_eq!(output_name(r"C:\decks\deck.pdf"), "deck_merged.pdf");
    }

    #[test]
    fn output_name_without_extension_keeps_full_name() {
        assert_eq!(output_name("slides"), "slides_merged.pdf");
        assert_eq!(output_name("pdf"), "pdf_merged.pdf");
    }

    #[test]
    fn duplicate_names_get_suffixes() {
        let mut taken = HashSet::new();
        assert_eq!(disambiguate("a_merged.pdf".into(), &mut taken), "a_merged.pdf");
        assert_eq!(disambiguate("a_merged.pdf".into(), &mut taken), "a_merged_2.pdf");
        assert_eq!(disambiguate("a_merged.pdf".into(), &mut taken), "a_merged_3.pdf");
    }

    #[test]
    fn archive_entries_in_order() {
        let bytes = build_archive(&[doc("b_merged.pdf", b"%PDF-b"), doc("a_merged.pdf", b"%PDF-a")])
            .unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "b_merged.pdf");
        let mut content = Vec::new();
        first.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"%PDF-b");
        drop(first);

        assert_eq!(archive.by_index(1).unwrap().name(), "a_merged.pdf");
    }

    #[test]
    fn empty_archive_is_valid_zip() {
        let bytes = build_archive(&[]).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn archive_is_reproducible() {
        let docs = [doc("x_merged.pdf", b"%PDF-x")];
        assert_eq!(build_archive(&docs).unwrap(), build_archive(&docs).unwrap());
    }
}
