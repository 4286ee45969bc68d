//! Zlib decompression of the `IDAT` stream.
//!
//! The rest of the decoder only ever talks to the [`Inflate`] trait, so any
//! zlib/DEFLATE library can be plugged in. The `miniz_oxide` feature provides
//! [`MinizInflate`], which is what [`decode_png`](super::decode_png) uses.

use alloc::vec::Vec;

use super::PngError;

/// Something that can decompress a PNG's image data.
pub trait Inflate {
  /// Decompresses the zlib stream `zlib_data`, which must produce exactly
  /// `expected_len` bytes.
  ///
  /// ## Failure
  /// * [`PngError::Alloc`] if the output buffer can't be allocated.
  /// * [`PngError::Decompression`] if the stream is corrupt or truncated.
  /// * [`PngError::DecompressedSizeMismatch`] or
  ///   [`PngError::TooMuchImageData`] if the stream is fine but holds a
  ///   different amount of data.
  fn inflate(&self, zlib_data: &[u8], expected_len: usize) -> Result<Vec<u8>, PngError>;
}
impl<I: Inflate + ?Sized> Inflate for &I {
  #[inline]
  fn inflate(&self, zlib_data: &[u8], expected_len: usize) -> Result<Vec<u8>, PngError> {
    I::inflate(*self, zlib_data, expected_len)
  }
}

/// Splits the 2 byte zlib header and 4 byte Adler-32 trailer off of a zlib
/// stream, leaving the raw DEFLATE data in between.
///
/// Backends that only understand raw DEFLATE need this. Only the header's
/// compression method is checked, the trailer is not.
pub fn strip_zlib_wrapper(zlib_data: &[u8]) -> Result<&[u8], PngError> {
  match zlib_data {
    [cmf, flg, deflate @ .., _, _, _, _]
      if (cmf & 0x0F) == 8 && (u16::from_be_bytes([*cmf, *flg]) % 31) == 0 =>
    {
      Ok(deflate)
    }
    _ => Err(PngError::Decompression),
  }
}

/// Decompression with [`miniz_oxide`].
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinizInflate {
  /// Check the Adler-32 at the end of the stream.
  pub verify_adler32: bool,
}
#[cfg(feature = "miniz_oxide")]
impl Default for MinizInflate {
  #[inline]
  fn default() -> Self {
    Self { verify_adler32: true }
  }
}
#[cfg(feature = "miniz_oxide")]
impl Inflate for MinizInflate {
  fn inflate(&self, zlib_data: &[u8], expected_len: usize) -> Result<Vec<u8>, PngError> {
    use miniz_oxide::inflate::core::inflate_flags::*;
    let mut flags = TINFL_FLAG_PARSE_ZLIB_HEADER;
    if !self.verify_adler32 {
      flags |= TINFL_FLAG_IGNORE_ADLER32;
    }
    miniz_inflate_capped(zlib_data, expected_len, flags)
  }
}

/// Decompression with [`miniz_oxide`] in raw DEFLATE mode.
///
/// The zlib wrapper is stripped by [`strip_zlib_wrapper`] first, so the
/// Adler-32 is never checked. This is how backends that don't speak zlib
/// are hooked up.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MinizRawInflate;
#[cfg(feature = "miniz_oxide")]
impl Inflate for MinizRawInflate {
  fn inflate(&self, zlib_data: &[u8], expected_len: usize) -> Result<Vec<u8>, PngError> {
    let deflate = strip_zlib_wrapper(zlib_data)?;
    miniz_inflate_capped(deflate, expected_len, 0)
  }
}

/// The output buffer starts this big (or at `expected_len`, if that's
/// smaller) and doubles as needed.
#[cfg(feature = "miniz_oxide")]
const FIRST_OUTPUT_LEN: usize = 32 * 1024;

/// Runs the decompressor, growing the output only as data is produced.
///
/// The header's declared size is never allocated up front: a tiny stream
/// only ever costs a tiny buffer, no matter what `expected_len` is. Output
/// is capped at `expected_len`, going past that is
/// [`PngError::TooMuchImageData`].
#[cfg(feature = "miniz_oxide")]
fn miniz_inflate_capped(
  mut input: &[u8], expected_len: usize, flags: u32,
) -> Result<Vec<u8>, PngError> {
  use miniz_oxide::inflate::{
    core::{decompress, inflate_flags::TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF, DecompressorOxide},
    TINFLStatus,
  };
  let flags = flags | TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF;
  let mut decompressor = alloc::boxed::Box::<DecompressorOxide>::default();
  let mut out: Vec<u8> = Vec::new();
  grow_output(&mut out, FIRST_OUTPUT_LEN.min(expected_len))?;
  let mut out_pos = 0;
  loop {
    let (status, in_consumed, out_written) =
      decompress(&mut decompressor, input, &mut out, out_pos, flags);
    out_pos += out_written;
    match status {
      TINFLStatus::Done => break,
      TINFLStatus::HasMoreOutput => {
        if out.len() >= expected_len {
          return Err(PngError::TooMuchImageData { expected: expected_len });
        }
        input = input.get(in_consumed..).ok_or(PngError::Decompression)?;
        let new_len = out.len().saturating_mul(2).min(expected_len);
        grow_output(&mut out, new_len)?;
      }
      status => {
        log::debug!("inflate failed: {status:?}");
        return Err(PngError::Decompression);
      }
    }
  }
  if out_pos != expected_len {
    return Err(PngError::DecompressedSizeMismatch { expected: expected_len, actual: out_pos });
  }
  out.truncate(out_pos);
  Ok(out)
}

/// Zero-extends `out` to `new_len`, or reports allocation failure.
#[cfg(feature = "miniz_oxide")]
fn grow_output(out: &mut Vec<u8>, new_len: usize) -> Result<(), PngError> {
  out.try_reserve_exact(new_len.saturating_sub(out.len()))?;
  out.resize(new_len, 0);
  Ok(())
}
