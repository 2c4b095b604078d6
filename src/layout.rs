//! A4 page geometry: slot bands, image placement and grid lines.
//!
//! All coordinates are PDF points with the origin at the bottom-left corner
//! of the page. The page box, grid spacing and right margin are fixed; the
//! only runtime parameter is the number of slides stacked on one page.
//!
//! ```text
//!  ┌──────────────────────────────┐  ← pageHeight
//!  │ grid          ┌────────────┐ │
//!  │               │  slide 0   │ │  slot 0
//!  │               └────────────┘ │
//!  │               ┌────────────┐ │
//!  │               │  slide 1   │ │  slot 1
//!  │               └────────────┘ │
//!  │                           10pt│
//!  └──────────────────────────────┘  ← 0
//! ```

/// Points per millimetre (1 in = 72 pt = 25.4 mm).
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// A4 width in millimetres.
pub const A4_WIDTH_MM: u32 = 210;

/// A4 height in millimetres.
pub const A4_HEIGHT_MM: u32 = 297;

/// A4 width in points (≈ 595.27).
pub const A4_WIDTH_PT: f64 = A4_WIDTH_MM as f64 * PT_PER_MM;

/// A4 height in points (≈ 841.89).
pub const A4_HEIGHT_PT: f64 = A4_HEIGHT_MM as f64 * PT_PER_MM;

/// Distance between neighbouring grid lines, in millimetres.
pub const GRID_SPACING_MM: u32 = 5;

/// Grid stroke width in points.
pub const GRID_LINE_WIDTH_PT: f64 = 0.25;

/// Grid stroke gray level (0 = black, 1 = white); the usual "light grey".
pub const GRID_GRAY: f64 = 0.827;

/// Gap between every slide's right edge and the page's right edge.
pub const RIGHT_MARGIN_PT: f64 = 10.0;

/// Where one slide image lands on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSlot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutSlot {
    /// Place an image of `pixel_width × pixel_height` at batch position
    /// `position` (0-based, top first) on a page holding `slides_per_page`.
    ///
    /// The height always fills the slot band and the width follows from the
    /// pixel aspect ratio; the image is right-aligned and sits on the bottom
    /// of its band. `pixel_height` must be non-zero.
    pub fn for_image(
        position: usize,
        slides_per_page: usize,
        pixel_width: u32,
        pixel_height: u32,
    ) -> Self {
        let height = slot_height(slides_per_page);
        let width = height * (pixel_width as f64 / pixel_height as f64);
        let (bottom, _) = slot_band(position, slides_per_page);
        Self {
            x: A4_WIDTH_PT - width - RIGHT_MARGIN_PT,
            y: bottom,
            width,
            height,
        }
    }

    pub fn right_edge(&self) -> f64 {
        self.x + self.width
    }

    pub fn top_edge(&self) -> f64 {
        self.y + self.height
    }
}

/// Height of every slot band when `slides_per_page` slides share a page.
pub fn slot_height(slides_per_page: usize) -> f64 {
    A4_HEIGHT_PT / slides_per_page as f64
}

/// Vertical band `(bottom, top)` occupied by slot `position`.
pub fn slot_band(position: usize, slides_per_page: usize) -> (f64, f64) {
    let h = slot_height(slides_per_page);
    (
        A4_HEIGHT_PT - (position + 1) as f64 * h,
        A4_HEIGHT_PT - position as f64 * h,
    )
}

/// Number of A4 pages needed for `slides` slides.
pub fn page_count(slides: usize, slides_per_page: usize) -> usize {
    slides.div_ceil(slides_per_page)
}

/// x positions of the vertical grid lines, left to right.
pub fn vertical_grid_lines() -> impl Iterator<Item = f64> {
    grid_positions(A4_WIDTH_MM)
}

/// y positions of the horizontal grid lines, bottom to top.
pub fn horizontal_grid_lines() -> impl Iterator<Item = f64> {
    grid_positions(A4_HEIGHT_MM)
}

// Stepping in whole millimetres keeps the line count exact; accumulating
// float points would drift by an ulp at the far edge.
fn grid_positions(extent_mm: u32) -> impl Iterator<Item = f64> {
    (0..extent_mm)
        .step_by(GRID_SPACING_MM as usize)
        .map(|mm| mm as f64 * PT_PER_MM)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn a4_matches_standard_points() {
        assert!((A4_WIDTH_PT - 595.2756).abs() < 1e-3);
        assert!((A4_HEIGHT_PT - 841.8898).abs() < 1e-3);
    }

    #[test]
    fn slot_bands_tile_the_page() {
        for s in 1..=6 {
            let (bottom, _) = slot_band(s - 1, s);
            assert!(bottom.abs() < EPS, "last band must reach the bottom (s={s})");
            let (_, top) = slot_band(0, s);
            assert!((top - A4_HEIGHT_PT).abs() < EPS);
            for j in 1..s {
                let (_, upper_top) = slot_band(j, s);
                let (prev_bottom, _) = slot_band(j - 1, s);
                assert!((upper_top - prev_bottom).abs() < EPS);
            }
        }
    }

    #[test]
    fn landscape_slide_keeps_aspect_and_right_margin() {
        let slot = LayoutSlot::for_image(1, 3, 1600, 900);
        assert!((slot.height - A4_HEIGHT_PT / 3.0).abs() < EPS);
        assert!((slot.width / slot.height - 1600.0 / 900.0).abs() < EPS);
        assert!((A4_WIDTH_PT - slot.right_edge() - RIGHT_MARGIN_PT).abs() < EPS);
        assert!((slot.y - (A4_HEIGHT_PT - 2.0 * slot.height)).abs() < EPS);
    }

    #[test]
    fn wide_image_on_single_slot_page_overflows_left() {
        // Width is never clamped to the page; a very wide slide simply
        // extends past the left edge.
        let slot = LayoutSlot::for_image(0, 1, 4000, 1000);
        assert!(slot.x < 0.0);
        assert!((slot.top_edge() - A4_HEIGHT_PT).abs() < EPS);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 3), 0);
        assert_eq!(page_count(7, 3), 3);
        assert_eq!(page_count(6, 3), 2);
        assert_eq!(page_count(2, 6), 1);
    }

    #[test]
    fn grid_lines_every_five_millimetres() {
        let xs: Vec<f64> = vertical_grid_lines().collect();
        let ys: Vec<f64> = horizontal_grid_lines().collect();
        assert_eq!(xs.len(), 42);
        assert_eq!(ys.len(), 60);
        assert_eq!(xs[0], 0.0);
        for pair in xs.windows(2) {
            assert!((pair[1] - pair[0] - 5.0 * PT_PER_MM).abs() < 1e-9);
        }
        assert!(*xs.last().unwrap() < A4_WIDTH_PT);
        assert!(*ys.last().unwrap() < A4_HEIGHT_PT);
    }
}
