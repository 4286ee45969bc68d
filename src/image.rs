#![forbid(unsafe_code)]

//! Provides the heap-allocated decoded image type.

use alloc::vec::Vec;

use crate::pixel_formats::{RGB8, Y8};

/// Converts an `(x,y)` position within a given `width` 2D space into a linear
/// index.
#[inline]
#[must_use]
pub const fn xy_width_to_index(x: u32, y: u32, width: u32) -> usize {
  (y as usize) * (width as usize) + (x as usize)
}

/// The pixel data of a decoded image, in the simplest format that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pixels {
  /// One byte per pixel, written out as a PGM.
  Gray(Vec<Y8>),
  /// Three bytes per pixel, written out as a PPM.
  Rgb(Vec<RGB8>),
}
impl Pixels {
  /// Views all the pixel data as raw bytes, row-major.
  #[inline]
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Self::Gray(v) => bytemuck::cast_slice(v),
      Self::Rgb(v) => bytemuck::cast_slice(v),
    }
  }
}

/// A decoded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct Image {
  pub width: u32,
  pub height: u32,
  pub pixels: Pixels,
}
impl Image {
  /// If the image holds only gray pixels.
  #[inline]
  #[must_use]
  pub const fn is_gray(&self) -> bool {
    matches!(self.pixels, Pixels::Gray(_))
  }

  /// Gets the pixel at the position as RGB, or `None` if the position is out
  /// of bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, x: u32, y: u32) -> Option<RGB8> {
    if x < self.width && y < self.height {
      let i = xy_width_to_index(x, y, self.width);
      match &self.pixels {
        Pixels::Gray(v) => v.get(i).copied().map(RGB8::from),
        Pixels::Rgb(v) => v.get(i).copied(),
      }
    } else {
      None
    }
  }
}

#[test]
fn test_image_get() {
  use alloc::vec;
  let image = Image {
    width: 2,
    height: 2,
    pixels: Pixels::Gray(vec![Y8 { y: 10 }, Y8 { y: 20 }, Y8 { y: 30 }, Y8 { y: 40 }]),
  };
  assert_eq!(image.get(1, 1), Some(RGB8 { r: 40, g: 40, b: 40 }));
  assert_eq!(image.get(2, 0), None);
  assert_eq!(image.pixels.as_bytes(), &[10, 20, 30, 40]);
  assert!(image.is_gray());
}
