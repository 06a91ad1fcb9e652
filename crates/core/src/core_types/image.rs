//! Packed RGB images handed to display code

use crate::core_types::color::Rgb8;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Row-major RGB raster, 3 bytes per pixel, row 0 at the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImage {
    /// Create an image filled with `fill`
    pub fn new(width: usize, height: usize, fill: Rgb8) -> Self {
        let data = std::iter::repeat([fill.r, fill.g, fill.b])
            .take(width * height)
            .flatten()
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Packed pixel bytes (`width * height * 3`)
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to packed rows, each `width * 3` bytes long
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, u8> {
        // a zero-width image has no data, so the clamp never yields a row
        self.data.chunks_exact_mut(self.width.max(1) * 3)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb8 {
        let i = (y * self.width + x) * 3;
        Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb8) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
    }

    /// Write as binary PPM (P6)
    ///
    /// # Errors
    /// Returns error if the file cannot be created or written
    pub fn write_ppm<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        out.write_all(&self.data)?;
        out.flush()
    }
}

/// Write `color` into a packed row at pixel `x`
pub(crate) fn put_pixel(row: &mut [u8], x: usize, color: Rgb8) {
    row[x * 3..x * 3 + 3].copy_from_slice(&[color.r, color.g, color.b]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_and_set() {
        let mut img = RgbImage::new(4, 3, Rgb8::new(1, 2, 3));
        assert_eq!(img.as_bytes().len(), 36);
        assert_eq!(img.pixel(3, 2), Rgb8::new(1, 2, 3));

        img.set_pixel(1, 2, Rgb8::WHITE);
        assert_eq!(img.pixel(1, 2), Rgb8::WHITE);
        assert_eq!(img.pixel(0, 2), Rgb8::new(1, 2, 3));
    }

    #[test]
    fn test_rows_are_packed() {
        let mut img = RgbImage::new(2, 2, Rgb8::BLACK);
        for (y, row) in img.rows_mut().enumerate() {
            put_pixel(row, 1, Rgb8::new(y as u8, 0, 0));
        }
        assert_eq!(img.pixel(1, 0), Rgb8::new(0, 0, 0));
        assert_eq!(img.pixel(1, 1), Rgb8::new(1, 0, 0));
    }

    #[test]
    fn test_write_ppm_header() {
        let img = RgbImage::new(3, 2, Rgb8::RED);
        let path = std::env::temp_dir().join("flowviz_image_header_test.ppm");
        img.write_ppm(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n3 2\n255\n"));
        assert_eq!(bytes.len(), "P6\n3 2\n255\n".len() + 18);

        let _ = std::fs::remove_file(path);
    }
}
