#![forbid(unsafe_code)]

//! Holds all the tools for decoding PNG data.
//!
//! ## Automated PNG Decoding
//! If you just want the pixels, call [`decode_png`]. It takes the PNG data
//! stream and gives back an [`Image`] of either greyscale or RGB pixels.
//!
//! ```no_run
//! let png: &[u8] = unimplemented!("data from somewhere");
//! let image = png2pnm::png::decode_png(png).unwrap();
//! println!("{}x{}, gray: {}", image.width, image.height, image.is_gray());
//! ```
//!
//! If you want to pick the zlib library, or change the [`DecodeOptions`], use
//! [`decode_png_with`] instead.
//!
//! ## Decoding a PNG Yourself
//! Each stage of decoding is also public, in case you want to drive it
//! yourself.
//!
//! The general format of a PNG is that the information is stored in "chunks".
//! [`PngChunkReader`] walks the chunks one at a time. There's four "critical"
//! chunk types that matter here:
//! * **Header** - This has the image's dimensions and pixel format. Using this
//!   information you'll know how big the decompressed data must be, and how
//!   much final space is required after unfiltering.
//! * **Palette** - If an image uses indexed color it will have a palette of
//!   what index values map to what `RGB8` values.
//! * **Image Data** - One or more chunks of compressed data. All of the
//!   compressed data forms a single zlib data stream. All of the image data
//!   chunks have to appear one after the other.
//! * **End** - The last chunk, lets you know you had the full PNG and your data
//!   wasn't truncated accidentally.
//!
//! [`png_parse_stream`] runs the chunk reader over the whole stream and
//! collects these. After that:
//!
//! 1. The image data is decompressed with some [`Inflate`] implementation. It
//!    must produce exactly
//!    [`get_zlib_decompression_requirement`](IHDR::get_zlib_decompression_requirement)
//!    bytes.
//! 2. [`unfilter_scanlines`] reverses the per-line filtering and drops the
//!    filter bytes.
//! 3. [`materialize`] resolves palette indexes and picks between greyscale
//!    and RGB output.

use alloc::vec::Vec;

use crate::{image::Image, DecodeOptions};

mod chunk;
pub use chunk::*;

mod crc32;
pub use crc32::*;

mod ihdr;
pub use ihdr::*;

mod stream;
pub use stream::*;

mod inflate;
pub use inflate::*;

mod unfilter;
pub use unfilter::*;

mod materialize;
pub use materialize::*;

/// Decodes PNG bytes into an [`Image`], using the given decompressor and
/// options.
///
/// Bytes after the `IEND` chunk are ignored.
pub fn decode_png_with<I: Inflate + ?Sized>(
  bytes: &[u8], inflater: &I, options: &DecodeOptions,
) -> Result<Image, PngError> {
  let PngStream { ihdr, idat, palette } = png_parse_stream(bytes, options)?;
  let expected = ihdr.get_zlib_decompression_requirement()?;
  log::debug!("inflating {} bytes of IDAT into {expected} bytes", idat.len());
  let decompressed: Vec<u8> = inflater.inflate(&idat, expected)?;
  drop(idat);
  let unfiltered = unfilter_scanlines(&ihdr, &decompressed)?;
  drop(decompressed);
  let pixels =
    materialize(&ihdr, unfiltered, palette.as_deref(), options.downgrade_true_color)?;
  Ok(Image { width: ihdr.width, height: ihdr.height, pixels })
}

/// Decodes PNG bytes into an [`Image`] with the default options, using
/// `miniz_oxide` for decompression.
#[cfg(feature = "miniz_oxide")]
#[cfg_attr(docs_rs, doc(cfg(feature = "miniz_oxide")))]
#[inline]
pub fn decode_png(bytes: &[u8]) -> Result<Image, PngError> {
  let options = DecodeOptions::default();
  decode_png_with(bytes, &MinizInflate { verify_adler32: options.verify_adler32 }, &options)
}
