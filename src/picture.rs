//! Pixel-addressable RGB picture buffer.
//!
//! Pixels are stored row-major as interleaved `[R, G, B]` bytes, the same
//! layout `image::RgbImage` uses, so loading and saving never reshuffle data.

use std::path::Path;

use crate::error::{BlurError, Result};

/// Largest value a single channel can hold.
pub const MAX_PIXEL_INTENSITY: u8 = u8::MAX;

const CHANNELS: usize = 3;

/// One RGB pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Pixel {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Pixel with all three channels set to `value`.
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }
}

/// A `width` x `height` grid of RGB pixels.
///
/// `Clone` produces an independent snapshot; dropping the value releases the
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl Picture {
    /// Blank (black) picture of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Pixel::default())
    }

    /// Picture with every pixel set to `pixel`.
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self::from_fn(width, height, |_, _| pixel)
    }

    /// Builds a picture by evaluating `f(x, y)` in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        let mut pixels = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                let p = f(x, y);
                pixels.extend_from_slice(&[p.red, p.green, p.blue]);
            }
        }
        Self { pixels, width, height }
    }

    /// Wraps an interleaved RGB buffer.
    pub fn from_raw(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let expected = width * height * CHANNELS;
        if pixels.len() != expected {
            return Err(BlurError::BufferSizeMismatch {
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self { pixels, width, height })
    }

    /// Decodes any format the `image` crate understands and converts it to RGB8.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Self {
            pixels: rgb.into_raw(),
            width: width as usize,
            height: height as usize,
        })
    }

    /// Encodes the picture; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let too_large = || BlurError::TooLarge {
            width: self.width,
            height: self.height,
        };
        let width = u32::try_from(self.width).map_err(|_| too_large())?;
        let height = u32::try_from(self.height).map_err(|_| too_large())?;
        image::save_buffer(path, &self.pixels, width, height, image::ColorType::Rgb8)?;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Reads the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the picture.
    pub fn get_pixel(&self, x: usize, y: usize) -> Pixel {
        let i = self.offset(x, y);
        Pixel::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    /// Overwrites the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the picture.
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: Pixel) {
        let i = self.offset(x, y);
        self.pixels[i..i + CHANNELS].copy_from_slice(&[pixel.red, pixel.green, pixel.blue]);
    }

    /// True for pixels on the outermost row or column.
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} picture",
            self.width,
            self.height
        );
        (y * self.width + x) * CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black() {
        let pic = Picture::new(4, 3);
        assert_eq!(pic.dimensions(), (4, 3));
        assert_eq!(pic.as_raw().len(), 36);
        assert!(pic.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_get_set_roundtrip() {
        let mut pic = Picture::new(3, 3);
        pic.set_pixel(2, 1, Pixel::new(10, 20, 30));

        assert_eq!(pic.get_pixel(2, 1), Pixel::new(10, 20, 30));
        assert_eq!(pic.get_pixel(1, 2), Pixel::default());
        // (2, 1) is byte offset (1 * 3 + 2) * 3
        assert_eq!(&pic.as_raw()[15..18], &[10, 20, 30]);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let pic = Picture::from_fn(2, 2, |x, y| Pixel::gray((y * 2 + x) as u8));
        assert_eq!(pic.as_raw(), &[0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_save_rejects_dimensions_beyond_u32() {
        // zero rows, so nothing is allocated
        let pic = Picture::new(u32::MAX as usize + 1, 0);
        let dir = tempfile::tempdir().unwrap();

        let err = pic.save(dir.path().join("wide.png")).unwrap_err();
        assert!(matches!(err, BlurError::TooLarge { height: 0, .. }), "{err}");
        assert!(!dir.path().join("wide.png").exists());
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = Picture::from_raw(2, 2, vec![0; 11]).unwrap_err();
        assert!(matches!(
            err,
            BlurError::BufferSizeMismatch { expected: 12, got: 11 }
        ));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Picture::filled(3, 3, Pixel::gray(7));
        let mut copy = original.clone();
        copy.set_pixel(1, 1, Pixel::gray(99));

        assert_eq!(original.get_pixel(1, 1), Pixel::gray(7));
        assert_eq!(copy.get_pixel(1, 1), Pixel::gray(99));
    }

    #[test]
    fn test_is_border() {
        let pic = Picture::new(4, 3);
        assert!(pic.is_border(0, 1));
        assert!(pic.is_border(3, 1));
        assert!(pic.is_border(2, 0));
        assert!(pic.is_border(2, 2));
        assert!(!pic.is_border(1, 1));
        assert!(!pic.is_border(2, 1));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_bounds_panics() {
        Picture::new(2, 2).get_pixel(2, 0);
    }

    #[test]
    fn test_save_and_open_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        let pic = Picture::from_fn(5, 4, |x, y| Pixel::new(x as u8 * 40, y as u8 * 60, 200));

        pic.save(&path).unwrap();
        let loaded = Picture::open(&path).unwrap();

        assert_eq!(loaded, pic);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Picture::open(dir.path().join("nope.png"));
        assert!(result.is_err());
    }
}
