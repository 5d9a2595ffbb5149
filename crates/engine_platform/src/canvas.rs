//! Fixed-resolution software render target.
//!
//! Pixels are packed `0xAARRGGBB` values stored row-major. Coordinates are
//! signed so callers can draw partially off-screen; everything is clipped to
//! the canvas bounds.

use crate::error::PlatformError;

/// Fully transparent black.
pub const TRANSPARENT: u32 = 0x0000_0000;

/// Anything that can be copied onto a [`Canvas`].
pub trait Blittable {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Pixel at `(x, y)`; callers stay within `width × height`.
    fn pixel_at(&self, x: u32, y: u32) -> u32;
}

/// Returns the alpha channel of a packed ARGB pixel.
#[must_use]
pub const fn alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

/// The surface handed to `draw` every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    /// Creates a transparent canvas.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::ZeroSize`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, PlatformError> {
        if width == 0 || height == 0 {
            return Err(PlatformError::ZeroSize { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![TRANSPARENT; width as usize * height as usize],
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel buffer.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Fills the whole canvas with `color`.
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Sets one pixel; out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Fills a `width × height` rectangle whose top-left corner is `(x, y)`.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: u32) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        let stride = self.width as usize;
        for row in y0..y1 {
            let start = row * stride;
            self.pixels[start + x0..start + x1].fill(color);
        }
    }

    /// Copies `source` with its top-left corner at `(x, y)`. Source pixels
    /// with zero alpha are skipped.
    pub fn blit<B: Blittable + ?Sized>(&mut self, source: &B, x: i32, y: i32) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, source.width(), source.height()) else {
            return;
        };
        let stride = self.width as usize;
        for row in y0..y1 {
            let sy = (row as i64 - i64::from(y)) as u32;
            for col in x0..x1 {
                let sx = (col as i64 - i64::from(x)) as u32;
                let color = source.pixel_at(sx, sy);
                if alpha(color) != 0 {
                    self.pixels[row * stride + col] = color;
                }
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Intersects a rectangle with the canvas; returns half-open bounds.
    fn clip(&self, x: i32, y: i32, width: u32, height: u32) -> Option<(usize, usize, usize, usize)> {
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(width)).min(i64::from(self.width));
        let y1 = (i64::from(y) + i64::from(height)).min(i64::from(self.height));
        (x0 < x1 && y0 < y1).then(|| (x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }
}

impl Blittable for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel_at(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// An immutable image that can be blitted onto a [`Canvas`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Sprite {
    /// Wraps already-decoded ARGB pixels.
    ///
    /// # Errors
    ///
    /// [`PlatformError::ZeroSize`] for an empty sprite,
    /// [`PlatformError::PixelCount`] if `pixels` does not hold exactly
    /// `width × height` values.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, PlatformError> {
        if width == 0 || height == 0 {
            return Err(PlatformError::ZeroSize { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(PlatformError::PixelCount {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A sprite of one solid color.
    ///
    /// # Errors
    ///
    /// [`PlatformError::ZeroSize`] for an empty sprite.
    pub fn solid(width: u32, height: u32, color: u32) -> Result<Self, PlatformError> {
        Self::from_pixels(width, height, vec![color; width as usize * height as usize])
    }
}

impl Blittable for Sprite {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel_at(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: u32 = 0xFFFF_0000;
    const BLUE: u32 = 0xFF00_00FF;

    #[test]
    fn test_zero_sized_canvas_is_rejected() {
        assert_eq!(
            Canvas::new(0, 4),
            Err(PlatformError::ZeroSize {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = Canvas::new(4, 3).unwrap();
        assert_eq!(canvas.pixels().len(), 12);
        assert!(canvas.pixels().iter().all(|&p| p == TRANSPARENT));
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_ignored() {
        let mut canvas = Canvas::new(2, 2).unwrap();
        canvas.set_pixel(-1, 0, RED);
        canvas.set_pixel(2, 0, RED);
        canvas.set_pixel(1, 1, RED);
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(2, 1), None);
        assert_eq!(canvas.pixels().iter().filter(|&&p| p == RED).count(), 1);
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.fill_rect(-2, 2, 4, 10, RED);
        let filled: Vec<_> = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Some(RED))
            .collect();
        assert_eq!(filled, vec![(0, 2), (1, 2), (0, 3), (1, 3)]);
    }

    #[test]
    fn test_fill_rect_fully_outside_is_noop() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.fill_rect(10, 10, 3, 3, RED);
        canvas.fill_rect(-5, 0, 5, 4, RED);
        assert!(canvas.pixels().iter().all(|&p| p == TRANSPARENT));
    }

    #[test]
    fn test_blit_skips_transparent_pixels() {
        let mut canvas = Canvas::new(3, 3).unwrap();
        canvas.clear(BLUE);
        let sprite = Sprite::from_pixels(2, 1, vec![RED, TRANSPARENT]).unwrap();
        canvas.blit(&sprite, 1, 1);
        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(2, 1), Some(BLUE));
    }

    #[test]
    fn test_blit_partially_offscreen() {
        let mut canvas = Canvas::new(3, 3).unwrap();
        let sprite = Sprite::from_pixels(2, 2, vec![RED, BLUE, BLUE, RED]).unwrap();
        canvas.blit(&sprite, -1, -1);
        // Only the sprite's bottom-right pixel lands on the canvas.
        assert_eq!(canvas.pixel(0, 0), Some(RED));
        assert_eq!(canvas.pixel(1, 0), Some(TRANSPARENT));
    }

    #[test]
    fn test_canvas_is_blittable() {
        let mut src = Canvas::new(1, 1).unwrap();
        src.clear(RED);
        let mut dst = Canvas::new(2, 2).unwrap();
        dst.blit(&src, 1, 0);
        assert_eq!(dst.pixel(1, 0), Some(RED));
    }

    #[test]
    fn test_sprite_pixel_count_mismatch() {
        assert_eq!(
            Sprite::from_pixels(2, 2, vec![RED; 3]),
            Err(PlatformError::PixelCount {
                expected: 4,
                actual: 3
            })
        );
        assert!(Sprite::solid(2, 2, RED).is_ok());
    }
}
