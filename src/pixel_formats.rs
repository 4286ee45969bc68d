//! Module for pixel formats.
//!
//! Only 8-bit channels are handled, so every format here is a plain bundle of
//! bytes with alignment 1. That lets `bytemuck` view a `&[u8]` as a slice of
//! pixels (and back) without any copying, which is how palettes are read out
//! of PNG data and how RGB pixels are written into PPM data.
//!
//! ## Between Gray and RGB
//! When going from grayscale to RGB one just simply copies the gray value to
//! each of the RGB channels. The reverse is only lossless when all three
//! channels already hold the same value, see [`RGB8::to_gray`].

use bytemuck::{Pod, Zeroable};

/// An 8-bit greyscale pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Y8 {
  pub y: u8,
}

/// An RGB value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}
impl RGB8 {
  /// If all three channels are equal, that's the gray value.
  #[inline]
  #[must_use]
  pub const fn to_gray(self) -> Option<Y8> {
    if self.r == self.g && self.g == self.b {
      Some(Y8 { y: self.r })
    } else {
      None
    }
  }
}
impl From<Y8> for RGB8 {
  #[inline]
  fn from(Y8 { y }: Y8) -> Self {
    Self { r: y, g: y, b: y }
  }
}
impl From<[u8; 3]> for RGB8 {
  #[inline]
  fn from([r, g, b]: [u8; 3]) -> Self {
    Self { r, g, b }
  }
}

#[test]
fn test_rgb8_to_gray() {
  assert_eq!(RGB8 { r: 5, g: 5, b: 5 }.to_gray(), Some(Y8 { y: 5 }));
  assert_eq!(RGB8 { r: 5, g: 5, b: 6 }.to_gray(), None);
  assert_eq!(RGB8 { r: 4, g: 5, b: 5 }.to_gray(), None);
  assert_eq!(RGB8::from(Y8 { y: 9 }), RGB8 { r: 9, g: 9, b: 9 });
  let bytes: &[u8] = &[1, 2, 3, 4, 5, 6];
  let pixels: &[RGB8] = bytemuck::cast_slice(bytes);
  assert_eq!(pixels, &[RGB8::from([1, 2, 3]), RGB8::from([4, 5, 6])]);
}
