use core::fmt::{Debug, Write};

use crate::{try_split_off, try_split_off_byte_array, u32_be, ErrorKind};

use super::png_crc;

/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// An error from decoding PNG data.
///
/// Decoding always stops at the first problem found, there's no partial
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PngError {
  #[error("the PNG signature is incorrect")]
  BadSignature,

  #[error("the first chunk must be a 13 byte IHDR, found {0:?}")]
  FirstChunkNotIHDR(PngChunkType),

  #[error("the image width and height must be non-zero")]
  WidthOrHeightZero,

  #[error("only 8 bits per channel is supported, found {0}")]
  UnsupportedBitDepth(u8),

  #[error("only color types 0, 2, and 3 are supported, found {0}")]
  UnsupportedColorType(u8),

  #[error("only compression method 0 exists, found {0}")]
  UnknownCompressionMethod(u8),

  #[error("only filter method 0 exists, found {0}")]
  UnknownFilterMethod(u8),

  #[error("interlaced images are not supported")]
  InterlaceNotSupported,

  #[error("unexpected end of input while reading the {0}")]
  UnexpectedEndOfInput(&'static str),

  #[error("chunk {0:?} has zero length, only IEND may be empty")]
  UnexpectedEmptyChunk(PngChunkType),

  #[error("the IEND chunk must be empty")]
  NonEmptyIEND,

  #[error("chunk {chunk_ty:?} declares CRC {declared:#010X} but has {actual:#010X}")]
  CrcMismatch { chunk_ty: PngChunkType, declared: u32, actual: u32 },

  #[error("IDAT chunks must be consecutive")]
  IdatNotConsecutive,

  #[error("a PLTE chunk is not allowed in a greyscale image")]
  PaletteInGreyscale,

  #[error("the PLTE chunk must appear once, before any IDAT")]
  PaletteMisplaced,

  #[error("the PLTE chunk length must be a multiple of 3, up to 768, found {0}")]
  BadPaletteLength(usize),

  #[error("no image data")]
  NoImageData,

  #[error("the compressed image data is corrupt")]
  Decompression,

  #[error("expected {expected} bytes of decompressed image data, got {actual}")]
  DecompressedSizeMismatch { expected: usize, actual: usize },

  #[error("the compressed image data holds more than {expected} bytes")]
  TooMuchImageData { expected: usize },

  #[error("scanline {row} uses unknown filter type {filter}")]
  UnsupportedFilterType { row: u32, filter: u8 },

  #[error("palette index {index} is out of range for a palette of {palette_len}")]
  PaletteIndexOutOfRange { index: u8, palette_len: usize },

  #[error("image dimensions {width}x{height} exceed the configured limit")]
  DimensionsTooLarge { width: u32, height: u32 },

  #[error("image dimensions {width}x{height} overflow the address space")]
  ImageTooLarge { width: u32, height: u32 },

  #[error("the allocator couldn't give us enough space")]
  Alloc,
}
impl PngError {
  /// The category this error falls into.
  #[must_use]
  pub const fn kind(&self) -> ErrorKind {
    match self {
      Self::UnsupportedBitDepth(_)
      | Self::UnsupportedColorType(_)
      | Self::InterlaceNotSupported
      | Self::UnsupportedFilterType { .. } => ErrorKind::Unsupported,
      Self::DimensionsTooLarge { .. } | Self::ImageTooLarge { .. } | Self::Alloc => {
        ErrorKind::OutOfMemory
      }
      _ => ErrorKind::DataInvalid,
    }
  }
}
impl From<alloc::collections::TryReserveError> for PngError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}

/// The four ASCII letters naming a chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PngChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl PngChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");

  /// Critical chunks have an uppercase first letter.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    self.0[0].is_ascii_uppercase()
  }
}
impl Debug for PngChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    for &b in self.0.iter() {
      if b.is_ascii_graphic() {
        f.write_char(b as char)?;
      } else {
        write!(f, "\\x{b:02X}")?;
      }
    }
    Ok(())
  }
}

/// An unparsed chunk from a PNG.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawPngChunk<'b> {
  pub chunk_ty: PngChunkType,
  pub data: &'b [u8],
  pub declared_crc: u32,
}
impl Debug for RawPngChunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawPngChunk")
      .field("chunk_ty", &self.chunk_ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .finish()
  }
}
impl RawPngChunk<'_> {
  /// The CRC that the chunk's type and data actually produce.
  #[inline]
  #[must_use]
  pub fn actual_crc(&self) -> u32 {
    png_crc(self.chunk_ty, self.data)
  }
}

/// Reads chunks one after the other out of PNG bytes.
///
/// Every length is checked before use, and a short read is an error.
#[derive(Debug, Clone)]
pub struct PngChunkReader<'b> {
  spare: &'b [u8],
  verify_crc: bool,
}
impl<'b> PngChunkReader<'b> {
  /// Checks the PNG signature and makes a reader positioned at the first
  /// chunk.
  #[inline]
  pub fn new(png: &'b [u8]) -> Result<Self, PngError> {
    match try_split_off_byte_array::<8>(png) {
      Some((PNG_SIGNATURE, spare)) => Ok(Self { spare, verify_crc: false }),
      _ => Err(PngError::BadSignature),
    }
  }

  /// Sets if each chunk's declared CRC should be checked.
  #[inline]
  #[must_use]
  pub const fn with_crc_check(self, verify_crc: bool) -> Self {
    Self { spare: self.spare, verify_crc }
  }

  /// The bytes not yet read.
  #[inline]
  #[must_use]
  pub const fn spare(&self) -> &'b [u8] {
    self.spare
  }

  /// Reads the next chunk: length, type, payload, then the CRC trailer.
  pub fn next_chunk(&mut self) -> Result<RawPngChunk<'b>, PngError> {
    let (header, rest) =
      try_split_off_byte_array::<8>(self.spare).ok_or(PngError::UnexpectedEndOfInput("chunk header"))?;
    let len = u32_be(&header).ok_or(PngError::UnexpectedEndOfInput("chunk header"))? as usize;
    let chunk_ty = PngChunkType([header[4], header[5], header[6], header[7]]);
    let (data, rest) = try_split_off(rest, len).ok_or(PngError::UnexpectedEndOfInput("chunk data"))?;
    let (crc_bytes, rest) =
      try_split_off_byte_array::<4>(rest).ok_or(PngError::UnexpectedEndOfInput("chunk CRC"))?;
    let chunk = RawPngChunk { chunk_ty, data, declared_crc: u32::from_be_bytes(crc_bytes) };
    if self.verify_crc {
      let actual = chunk.actual_crc();
      if actual != chunk.declared_crc {
        return Err(PngError::CrcMismatch { chunk_ty, declared: chunk.declared_crc, actual });
      }
    }
    self.spare = rest;
    Ok(chunk)
  }
}
impl<'b> Iterator for PngChunkReader<'b> {
  type Item = Result<RawPngChunk<'b>, PngError>;
  /// Gives chunks until the input runs out. After any error the reader is
  /// emptied, so the error is the last item.
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.spare.is_empty() {
      return None;
    }
    let out = self.next_chunk();
    if out.is_err() {
      self.spare = &[];
    }
    Some(out)
  }
}
