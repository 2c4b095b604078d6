//! A4 composition: stack slide bitmaps onto gridded A4 pages.
//!
//! Each batch of `slides_per_page` images becomes one page. The page content
//! stream first strokes the full-page 5 mm grid, then paints every slide as a
//! DeviceGray image XObject placed by [`LayoutSlot::for_image`].
//!
//! Pixel buffers are deflated straight into the XObject stream; nothing
//! touches the file system. The writer emits no timestamps or document IDs,
//! so identical input yields byte-identical output.

use crate::error::Slides2A4Error;
use crate::layout::{self, LayoutSlot, A4_HEIGHT_PT, A4_WIDTH_PT};
use crate::page::PageImage;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use tracing::{debug, info};

/// Compose `images` onto A4 pages, `slides_per_page` per page, and return
/// the serialized PDF.
///
/// # Errors
/// - [`Slides2A4Error::InvalidArgument`] if `slides_per_page <= 0`
/// - [`Slides2A4Error::Render`] if any image is degenerate; no output is
///   produced in that case
pub fn compose(images: &[PageImage], slides_per_page: i64) -> Result<Vec<u8>, Slides2A4Error> {
    let per_page = usize::try_from(slides_per_page)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| {
            Slides2A4Error::InvalidArgument(format!(
                "slides per page must be a positive integer, got {}",
                slides_per_page
            ))
        })?;

    for (idx, image) in images.iter().enumerate() {
        validate_image(idx + 1, image)?;
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(layout::page_count(images.len(), per_page));
    for (batch_idx, batch) in images.chunks(per_page).enumerate() {
        let first_slide = batch_idx * per_page + 1;
        let page_id = compose_page(&mut doc, pages_id, batch, per_page, first_slide)?;
        kids.push(page_id.into());
    }
    let page_count = kids.len();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Slides2A4Error::Internal(format!("Failed to serialize PDF: {}", e)))?;

    info!(
        "Composed {} slides onto {} A4 pages ({} per page, {} bytes)",
        images.len(),
        page_count,
        per_page,
        buffer.len()
    );
    Ok(buffer)
}

/// Write one A4 page for `batch` and return its object id.
///
/// `first_slide` is the 1-indexed slide number of `batch[0]`, used in errors.
fn compose_page(
    doc: &mut Document,
    pages_id: ObjectId,
    batch: &[PageImage],
    slides_per_page: usize,
    first_slide: usize,
) -> Result<ObjectId, Slides2A4Error> {
    let mut operations = grid_operations();
    let mut xobjects = Dictionary::new();

    for (position, image) in batch.iter().enumerate() {
        let slide = first_slide + position;
        let slot = LayoutSlot::for_image(position, slides_per_page, image.width(), image.height());
        let name = format!("Im{}", position);

        let xobject_id = doc.add_object(image_xobject(slide, image)?);
        xobjects.set(name.as_bytes().to_vec(), xobject_id);
        operations.extend(draw_image_operations(&name, &slot));

        debug!(
            "Slide {} → slot {} at ({:.2}, {:.2}) {:.2}x{:.2} pt",
            slide, position, slot.x, slot.y, slot.width, slot.height
        );
    }

    let content = Content { operations }
        .encode()
        .map_err(|e| Slides2A4Error::Render {
            page: first_slide,
            detail: format!("content stream encoding failed: {}", e),
        })?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            real(A4_WIDTH_PT),
            real(A4_HEIGHT_PT),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => xobjects,
        },
    });

    Ok(page_id)
}

/// Stroke operations for the full-page background grid.
fn grid_operations() -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("w", vec![real(layout::GRID_LINE_WIDTH_PT)]),
        Operation::new("G", vec![real(layout::GRID_GRAY)]),
    ];
    for x in layout::vertical_grid_lines() {
        ops.push(Operation::new("m", vec![real(x), 0.into()]));
        ops.push(Operation::new("l", vec![real(x), real(A4_HEIGHT_PT)]));
    }
    for y in layout::horizontal_grid_lines() {
        ops.push(Operation::new("m", vec![0.into(), real(y)]));
        ops.push(Operation::new("l", vec![real(A4_WIDTH_PT), real(y)]));
    }
    ops.push(Operation::new("S", vec![]));
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// `q w 0 0 h x y cm /Name Do Q`
fn draw_image_operations(name: &str, slot: &LayoutSlot) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(slot.width),
                0.into(),
                0.into(),
                real(slot.height),
                real(slot.x),
                real(slot.y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

/// Build a Flate-compressed DeviceGray image XObject from `image`.
fn image_xobject(slide: usize, image: &PageImage) -> Result<Stream, Slides2A4Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(image.pixels())
        .map_err(|e| Slides2A4Error::Render {
            page: slide,
            detail: format!("image compression failed: {}", e),
        })?;
    let data = encoder.finish().map_err(|e| Slides2A4Error::Render {
        page: slide,
        detail: format!("image compression failed: {}", e),
    })?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width() as i64,
        "Height" => image.height() as i64,
        "ColorSpace" => "DeviceGray",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    Ok(Stream::new(dict, data).with_compression(false))
}

fn validate_image(slide: usize, image: &PageImage) -> Result<(), Slides2A4Error> {
    if image.aspect_ratio().is_none() {
        return Err(Slides2A4Error::Render {
            page: slide,
            detail: format!(
                "image has degenerate size {}x{} px",
                image.width(),
                image.height()
            ),
        });
    }
    Ok(())
}

fn real(value: f64) -> Object {
    Object::from(value as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn slide(w: u32, h: u32) -> PageImage {
        PageImage::from_luma(GrayImage::from_pixel(w, h, Luma([128])))
    }

    #[test]
    fn grid_is_drawn_before_and_outside_slides() {
        let ops = grid_operations();
        assert_eq!(ops.first().unwrap().operator, "q");
        assert_eq!(ops.last().unwrap().operator, "Q");
        let moves = ops.iter().filter(|op| op.operator == "m").count();
        assert_eq!(moves, 42 + 60);
    }

    #[test]
    fn non_positive_slides_per_page_rejected() {
        let images = vec![slide(4, 3)];
        for bad in [0, -1, -6] {
            let err = compose(&images, bad).unwrap_err();
            assert!(err.is_invalid_argument(), "{bad}: {err}");
        }
    }

    #[test]
    fn degenerate_image_fails_whole_composition() {
        let images = vec![
            slide(4, 3),
            PageImage::from_raw(5, 0, Vec::new()).unwrap(),
        ];
        let err = compose(&images, 2).unwrap_err();
        match err {
            Slides2A4Error::Render { page, .. } => assert_eq!(page, 2),
            other => panic!("expected Render, got {other}"),
        }
    }

    #[test]
    fn xobject_declares_gray_flate_image() {
        let stream = image_xobject(1, &slide(8, 6)).unwrap();
        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 8);
        assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 6);
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceGray"
        );
        assert_eq!(stream.decompressed_content().unwrap().len(), 48);
    }
}
