#![forbid(unsafe_code)]

//! This module gives support for the binary greyscale and binary color
//! [Netpbm](https://en.wikipedia.org/wiki/Netpbm) formats.
//!
//! * `P5` is a PGM: one byte per pixel.
//! * `P6` is a PPM: three bytes per pixel, R then G then B.
//!
//! Both have the same layout: an ASCII header giving the magic tag, the
//! width, the height, and the maximum sample value, then a single whitespace
//! byte, then the raw pixel bytes. This crate always writes a max value of
//! 255.
//!
//! Use [`netpbm_encode`] to write an [`Image`]. To look at a file that's
//! already been written, [`netpbm_pull_header`] gives you the header and the
//! pixel bytes, or [`netpbm_try_image`] reads the whole thing.
//!
//! No colorspace is recorded anywhere in a Netpbm file, the samples are
//! written exactly as the PNG held them.

use alloc::vec::Vec;
use core::str::from_utf8;

use crate::{
  image::{Image, Pixels},
  pixel_formats::{RGB8, Y8},
  ErrorKind,
};

/// An error from writing or parsing Netpbm data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum NetpbmError {
  #[error("malformed netpbm header")]
  ParseError,
  /// The tag value given wasn't `5` or `6`.
  #[error("only the binary P5 and P6 formats are handled")]
  TagError,
  /// Max values above 255 would need two bytes per sample.
  #[error("max value {0} isn't in 1..=255")]
  MaxValueError(u32),
  #[error("expected {expected} bytes of pixel data, found {actual}")]
  MissingPixelData { expected: usize, actual: usize },
  #[error("allocation failed")]
  Alloc,
}
impl NetpbmError {
  #[inline]
  #[must_use]
  pub const fn kind(self) -> ErrorKind {
    match self {
      Self::TagError | Self::MaxValueError(_) => ErrorKind::Unsupported,
      Self::Alloc => ErrorKind::OutOfMemory,
      Self::ParseError | Self::MissingPixelData { .. } => ErrorKind::DataInvalid,
    }
  }
}
impl From<alloc::collections::TryReserveError> for NetpbmError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    NetpbmError::Alloc
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetpbmHeader {
  /// `5` for a PGM, `6` for a PPM.
  pub tag: u8,
  pub width: u32,
  pub height: u32,
  /// The largest sample value. Always 255 in files this crate writes.
  pub max: u32,
}
impl NetpbmHeader {
  /// Bytes per pixel for this header's tag.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    if self.tag == 6 {
      3
    } else {
      1
    }
  }

  /// The number of pixel bytes that must follow the header.
  #[inline]
  pub fn pixel_data_len(&self) -> Result<usize, NetpbmError> {
    (self.width as usize)
      .checked_mul(self.height as usize)
      .and_then(|px| px.checked_mul(self.bytes_per_pixel()))
      .ok_or(NetpbmError::ParseError)
  }
}

/// Skips whitespace and `#` comments.
///
/// A comment runs to the end of its line.
#[inline]
pub fn netpbm_trim(mut bytes: &[u8]) -> &[u8] {
  loop {
    bytes = bytes.trim_ascii_start();
    match bytes.strip_prefix(b"#") {
      Some(comment) => {
        let line_len = comment.iter().position(|&u| u == b'\n').unwrap_or(comment.len());
        bytes = &comment[line_len..];
      }
      None => return bytes,
    }
  }
}

#[inline]
pub fn netpbm_pull_tag(bytes: &[u8]) -> Result<(u8, &[u8]), NetpbmError> {
  match bytes {
    [b'P', tag, rest @ ..] => Ok((tag.wrapping_sub(b'0'), netpbm_trim(rest))),
    _ => Err(NetpbmError::ParseError),
  }
}

/// Reads a run of ASCII digits.
///
/// The bytes after the digits are returned untrimmed, because after the max
/// value only a single whitespace byte separates the header from the pixels.
#[inline]
pub fn netpbm_pull_ascii_u32(bytes: &[u8]) -> Result<(u32, &[u8]), NetpbmError> {
  let digit_count = bytes.iter().take_while(|u| u.is_ascii_digit()).count();
  let (digits, rest) = bytes.split_at(digit_count);
  if digits.is_empty() {
    return Err(NetpbmError::ParseError);
  }
  let number = from_utf8(digits)
    .ok()
    .and_then(|digits| digits.parse::<u32>().ok())
    .ok_or(NetpbmError::ParseError)?;
  Ok((number, rest))
}

/// Parses a `P5` or `P6` header.
///
/// On success you get the header and the bytes after it, which should be the
/// pixel data (and possibly more).
#[inline]
pub fn netpbm_pull_header(bytes: &[u8]) -> Result<(NetpbmHeader, &[u8]), NetpbmError> {
  let (tag, rest) = netpbm_pull_tag(bytes)?;
  if !(5..=6).contains(&tag) {
    return Err(NetpbmError::TagError);
  }
  let (width, rest) = netpbm_pull_ascii_u32(rest)?;
  let (height, rest) = netpbm_pull_ascii_u32(netpbm_trim(rest))?;
  let (max, rest) = netpbm_pull_ascii_u32(netpbm_trim(rest))?;
  if !(1..=255).contains(&max) {
    return Err(NetpbmError::MaxValueError(max));
  }
  match rest {
    [w, pixels @ ..] if w.is_ascii_whitespace() => {
      Ok((NetpbmHeader { tag, width, height, max }, pixels))
    }
    _ => Err(NetpbmError::ParseError),
  }
}

/// Writes the image as a `P5` (if gray) or `P6` (if RGB).
///
/// The output is the header `P5\n<width> <height>\n255\n` (or with `P6`)
/// followed by the pixel bytes exactly as held in the image.
pub fn netpbm_encode(image: &Image) -> Result<Vec<u8>, NetpbmError> {
  let tag = if image.is_gray() { 5 } else { 6 };
  let header = alloc::format!("P{tag}\n{} {}\n255\n", image.width, image.height);
  let pixel_bytes = image.pixels.as_bytes();
  let mut out: Vec<u8> = Vec::new();
  out.try_reserve_exact(header.len().saturating_add(pixel_bytes.len()))?;
  out.extend_from_slice(header.as_bytes());
  out.extend_from_slice(pixel_bytes);
  log::debug!("wrote P{tag} {}x{}, {} bytes", image.width, image.height, out.len());
  Ok(out)
}

/// Reads a whole `P5` or `P6` file back into an [`Image`].
///
/// Only a max value of 255 maps directly onto the image's pixels, other max
/// values are rejected. Bytes past the end of the pixel data are ignored.
pub fn netpbm_try_image(bytes: &[u8]) -> Result<Image, NetpbmError> {
  let (header, rest) = netpbm_pull_header(bytes)?;
  if header.max != 255 {
    return Err(NetpbmError::MaxValueError(header.max));
  }
  let expected = header.pixel_data_len()?;
  let pixel_bytes = rest
    .get(..expected)
    .ok_or(NetpbmError::MissingPixelData { expected, actual: rest.len() })?;
  let pixels = if header.tag == 5 {
    let mut v: Vec<Y8> = Vec::new();
    v.try_reserve_exact(pixel_bytes.len())?;
    v.extend_from_slice(bytemuck::cast_slice(pixel_bytes));
    Pixels::Gray(v)
  } else {
    let mut v: Vec<RGB8> = Vec::new();
    v.try_reserve_exact(pixel_bytes.len() / 3)?;
    v.extend_from_slice(bytemuck::cast_slice(pixel_bytes));
    Pixels::Rgb(v)
  };
  Ok(Image { width: header.width, height: header.height, pixels })
}
