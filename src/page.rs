//! Rasterised slide pages.

use image::GrayImage;

/// One rasterised PDF page: 8-bit grayscale pixels, row-major.
///
/// Immutable once built. The pixel buffer always holds
/// `width * height` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PageImage {
    /// Wrap an already-decoded grayscale image.
    pub fn from_luma(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    /// Build from a raw row-major buffer.
    ///
    /// Returns `None` if `pixels` is not exactly `width * height` bytes.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?;
        if pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel width over pixel height, `None` for a degenerate image.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

impl From<GrayImage> for PageImage {
    fn from(image: GrayImage) -> Self {
        Self::from_luma(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn from_luma_keeps_dimensions() {
        let img = PageImage::from_luma(GrayImage::from_pixel(16, 9, Luma([200])));
        assert_eq!((img.width(), img.height()), (16, 9));
        assert_eq!(img.pixels().len(), 144);
        assert!((img.aspect_ratio().unwrap() - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn from_raw_rejects_short_buffer() {
        assert!(PageImage::from_raw(4, 4, vec![0; 15]).is_none());
        assert!(PageImage::from_raw(4, 4, vec![0; 16]).is_some());
    }

    #[test]
    fn zero_sized_image_has_no_aspect() {
        let img = PageImage::from_raw(0, 10, Vec::new()).unwrap();
        assert!(img.aspect_ratio().is_none());
    }
}
