use crate::u32_be_at;

use super::{PngChunkType, PngError};

/// The types of color that this decoder supports.
///
/// PNG also has greyscale + alpha (4) and RGBA (6), but neither of those can
/// go into a PGM or PPM file, so they're rejected as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Greyscale
  Y = 0,
  /// Red, Green, Blue
  RGB = 2,
  /// Index into a palette.
  ///
  /// The palette will have `RGB8` data.
  Index = 3,
}
impl PngColorType {
  /// The number of bytes per pixel in the decompressed data (at 8 bits per
  /// channel).
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(self) -> usize {
    match self {
      Self::Y | Self::Index => 1,
      Self::RGB => 3,
    }
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => PngColorType::Y,
      2 => PngColorType::RGB,
      3 => PngColorType::Index,
      other => return Err(PngError::UnsupportedColorType(other)),
    })
  }
}

/// Image Header
///
/// Once parsed this never changes: it's the description that every later
/// decoding stage works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// pixel color type
  pub color_type: PngColorType,
}
impl IHDR {
  /// The IHDR payload is always exactly this long.
  pub const DATA_LEN: usize = 13;

  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(&self) -> usize {
    self.color_type.bytes_per_pixel()
  }

  /// Bytes of pixel data in one row, not counting the filter byte.
  #[inline]
  pub fn bytes_per_scanline(&self) -> Result<usize, PngError> {
    (self.width as usize).checked_mul(self.bytes_per_pixel()).ok_or(self.too_large())
  }

  /// Bytes in one row of the decompressed data: the filter byte plus the
  /// pixel data.
  #[inline]
  pub fn bytes_per_filterline(&self) -> Result<usize, PngError> {
    self.bytes_per_scanline()?.checked_add(1).ok_or(self.too_large())
  }

  /// Gets the exact number of bytes that Zlib decompression must produce.
  ///
  /// This is `width * bpp * height + height`, one filter byte per row.
  #[inline]
  pub fn get_zlib_decompression_requirement(&self) -> Result<usize, PngError> {
    self.bytes_per_filterline()?.checked_mul(self.height as usize).ok_or(self.too_large())
  }

  /// Gets the number of bytes of pixel data once the filter bytes are gone.
  #[inline]
  pub fn get_unfiltered_len(&self) -> Result<usize, PngError> {
    self.bytes_per_scanline()?.checked_mul(self.height as usize).ok_or(self.too_large())
  }

  #[inline]
  const fn too_large(&self) -> PngError {
    PngError::ImageTooLarge { width: self.width, height: self.height }
  }
}
impl TryFrom<&[u8]> for IHDR {
  type Error = PngError;
  /// Parses the 13 byte IHDR payload.
  ///
  /// The checks go in field order, so the first bad field is the one that's
  /// reported.
  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    match *value {
      [_, _, _, _, _, _, _, _, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        if bit_depth != 8 {
          return Err(PngError::UnsupportedBitDepth(bit_depth));
        }
        if compression_method != 0 {
          return Err(PngError::UnknownCompressionMethod(compression_method));
        }
        if filter_method != 0 {
          return Err(PngError::UnknownFilterMethod(filter_method));
        }
        if interlace_method != 0 {
          return Err(PngError::InterlaceNotSupported);
        }
        let color_type = PngColorType::try_from(color_type)?;
        let width = u32_be_at(value, 0).ok_or(PngError::FirstChunkNotIHDR(PngChunkType::IHDR))?;
        let height = u32_be_at(value, 4).ok_or(PngError::FirstChunkNotIHDR(PngChunkType::IHDR))?;
        if width == 0 || height == 0 {
          return Err(PngError::WidthOrHeightZero);
        }
        Ok(Self { width, height, color_type })
      }
      _ => Err(PngError::FirstChunkNotIHDR(PngChunkType::IHDR)),
    }
  }
}
