//! Integration tests for A4 composition.
//!
//! Composed PDFs are parsed back with lopdf and checked for page count,
//! image placement and the background grid. No pdfium needed.

use edgequake_slides2a4::layout::{A4_HEIGHT_PT, A4_WIDTH_PT, RIGHT_MARGIN_PT};
use edgequake_slides2a4::{compose, PageImage, Slides2A4Error};
use image::{GrayImage, Luma};
use lopdf::content::Content;
use lopdf::{Document, Object};

const EPS: f64 = 0.01;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn slide(w: u32, h: u32, shade: u8) -> PageImage {
    PageImage::from_luma(GrayImage::from_pixel(w, h, Luma([shade])))
}

fn slides(n: usize) -> Vec<PageImage> {
    (0..n).map(|i| slide(160, 90, (i * 20) as u8)).collect()
}

fn num(obj: &Object) -> f64 {
    match obj {
        Object::Integer(i) => *i as f64,
        other => other.as_float().expect("numeric operand") as f64,
    }
}

/// `(width, height, x, y)` of every image placement on `page`, in paint order.
fn placements(doc: &Document, page: lopdf::ObjectId) -> Vec<(f64, f64, f64, f64)> {
    let bytes = doc.get_page_content(page).expect("page content");
    let content = Content::decode(&bytes).expect("decodable content");
    content
        .operations
        .iter()
        .filter(|op| op.operator == "cm")
        .map(|op| {
            let o = &op.operands;
            (num(&o[0]), num(&o[3]), num(&o[4]), num(&o[5]))
        })
        .collect()
}

/// Pixel width of every image painted on `page`, in paint order.
fn painted_widths(doc: &Document, page: lopdf::ObjectId) -> Vec<i64> {
    let xobjects = doc
        .get_dictionary(page)
        .unwrap()
        .get(b"Resources")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"XObject")
        .unwrap()
        .as_dict()
        .unwrap();
    let content = Content::decode(&doc.get_page_content(page).unwrap()).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Do")
        .map(|op| {
            let name = op.operands[0].as_name().unwrap();
            let id = xobjects.get(name).unwrap().as_reference().unwrap();
            let stream = doc.get_object(id).unwrap().as_stream().unwrap();
            stream.dict.get(b"Width").unwrap().as_i64().unwrap()
        })
        .collect()
}

fn load(pdf: &[u8]) -> Document {
    Document::load_mem(pdf).expect("composed output should parse")
}

// ── Page count ───────────────────────────────────────────────────────────────

#[test]
fn seven_slides_three_per_page_fill_three_pages() {
    let doc = load(&compose(&slides(7), 3).unwrap());
    let pages: Vec<_> = doc.get_pages().into_values().collect();
    assert_eq!(pages.len(), 3);

    let per_page: Vec<usize> = pages.iter().map(|&p| placements(&doc, p).len()).collect();
    assert_eq!(per_page, vec![3, 3, 1]);
}

#[test]
fn page_count_is_ceiling_of_slides_over_per_page() {
    for (n, per_page, expected) in [(1, 1, 1), (4, 2, 2), (5, 2, 3), (6, 6, 1), (13, 4, 4)] {
        let doc = load(&compose(&slides(n), per_page).unwrap());
        assert_eq!(doc.get_pages().len(), expected, "{n} slides / {per_page}");
    }
}

#[test]
fn no_slides_gives_document_without_pages() {
    let pdf = compose(&[], 3).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(load(&pdf).get_pages().len(), 0);
}

#[test]
fn fewer_slides_than_slots_leaves_lower_bands_empty() {
    let doc = load(&compose(&slides(2), 5).unwrap());
    let pages: Vec<_> = doc.get_pages().into_values().collect();
    assert_eq!(pages.len(), 1);

    let placed = placements(&doc, pages[0]);
    assert_eq!(placed.len(), 2);
    let slot_h = A4_HEIGHT_PT / 5.0;
    for (j, &(_, _, _, y)) in placed.iter().enumerate() {
        let band_bottom = A4_HEIGHT_PT - (j as f64 + 1.0) * slot_h;
        assert!((y - band_bottom).abs() < EPS, "slot {j} y {y} vs {band_bottom}");
    }
    // Bands 2..5 lie below the lowest placed slide.
    assert!(placed.iter().all(|&(_, _, _, y)| y >= A4_HEIGHT_PT - 2.0 * slot_h - EPS));
}

// ── Geometry ─────────────────────────────────────────────────────────────────

#[test]
fn every_page_is_a4() {
    let doc = load(&compose(&slides(4), 2).unwrap());
    for (_, page) in doc.get_pages() {
        let dict = doc.get_dictionary(page).unwrap();
        let media_box = dict.get(b"MediaBox").unwrap().as_array().unwrap();
        let vals: Vec<f64> = media_box.iter().map(num).collect();
        assert!((vals[2] - A4_WIDTH_PT).abs() < EPS);
        assert!((vals[3] - A4_HEIGHT_PT).abs() < EPS);
    }
}

#[test]
fn slides_stack_top_down_right_aligned() {
    let doc = load(&compose(&slides(3), 3).unwrap());
    let page = *doc.get_pages().values().next().unwrap();
    let slot_h = A4_HEIGHT_PT / 3.0;

    for (j, (w, h, x, y)) in placements(&doc, page).into_iter().enumerate() {
        assert!((h - slot_h).abs() < EPS, "slot {j} height {h}");
        assert!((w / h - 160.0 / 90.0).abs() < 1e-3, "slot {j} aspect");
        assert!(
            (A4_WIDTH_PT - (x + w) - RIGHT_MARGIN_PT).abs() < EPS,
            "slot {j} right margin"
        );
        let expected_y = A4_HEIGHT_PT - (j as f64 + 1.0) * slot_h;
        assert!((y - expected_y).abs() < EPS, "slot {j} y {y} vs {expected_y}");
    }
}

#[test]
fn slides_keep_input_order_across_and_within_pages() {
    let images: Vec<PageImage> = (3..=9).map(|w| slide(w, 2, 0)).collect();
    let doc = load(&compose(&images, 3).unwrap());

    let mut widths = Vec::new();
    for (_, page) in doc.get_pages() {
        let ys: Vec<f64> = placements(&doc, page).iter().map(|p| p.3).collect();
        assert!(ys.windows(2).all(|w| w[0] > w[1]), "not top-down: {ys:?}");
        widths.extend(painted_widths(&doc, page));
    }
    assert_eq!(widths, vec![3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn portrait_slide_keeps_its_aspect_ratio() {
    let doc = load(&compose(&[slide(90, 160, 0)], 1).unwrap());
    let page = *doc.get_pages().values().next().unwrap();
    let (w, h, _, _) = placements(&doc, page)[0];
    assert!((h - A4_HEIGHT_PT).abs() < EPS);
    assert!((w / h - 90.0 / 160.0).abs() < 1e-3);
}

#[test]
fn grid_is_painted_before_slides() {
    let doc = load(&compose(&slides(1), 1).unwrap());
    let page = *doc.get_pages().values().next().unwrap();
    let content = Content::decode(&doc.get_page_content(page).unwrap()).unwrap();
    let ops: Vec<&str> = content.operations.iter().map(|o| o.operator.as_str()).collect();

    let stroke = ops.iter().position(|&o| o == "S").expect("grid stroke");
    let paint = ops.iter().position(|&o| o == "Do").expect("image paint");
    assert!(stroke < paint);
    assert_eq!(ops.iter().filter(|&&o| o == "l").count(), 42 + 60);
}

#[test]
fn each_page_references_its_own_images() {
    let doc = load(&compose(&slides(5), 2).unwrap());
    for (_, page) in doc.get_pages() {
        let xobjects = doc
            .get_dictionary(page)
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"XObject")
            .unwrap()
            .as_dict()
            .unwrap();
        assert_eq!(xobjects.len(), placements(&doc, page).len());
    }
}

// ── Determinism & errors ─────────────────────────────────────────────────────

#[test]
fn identical_input_gives_identical_bytes() {
    let images = slides(4);
    assert_eq!(compose(&images, 3).unwrap(), compose(&images, 3).unwrap());
}

#[test]
fn non_positive_slides_per_page_is_invalid_argument() {
    for bad in [0, -3] {
        let err = compose(&slides(2), bad).unwrap_err();
        assert!(
            matches!(err, Slides2A4Error::InvalidArgument(_)),
            "{bad}: {err}"
        );
    }
}
