use alloc::vec::Vec;

use super::{PngError, IHDR};

/// The per-scanline filter that the encoder applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  None = 0,
  Sub = 1,
  Up = 2,
  Average = 3,
  Paeth = 4,
}
impl TryFrom<u8> for FilterType {
  type Error = u8;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      other => return Err(other),
    })
  }
}

/// Picks whichever of `a` (left), `b` (up), `c` (upper left) is closest to
/// `a + b - c`.
#[inline]
#[must_use]
pub const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // ties go to a, then b: the order of these tests is part of the format
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Unfilters a single line of pixel data.
///
/// * `filtered` is the line as decompressed, without its filter byte.
/// * `prev` is the previous line, already unfiltered. Pass `None` for the
///   first line of the image, which acts as if it had a line of zeroes above
///   it.
/// * `out` gets the unfiltered line. It must be the same length as
///   `filtered`.
///
/// Any byte less than `bpp` bytes from the start of the line has an implied
/// zero to its left.
pub fn unfilter_line(
  filter: FilterType, bpp: usize, filtered: &[u8], prev: Option<&[u8]>, out: &mut [u8],
) {
  debug_assert_eq!(filtered.len(), out.len());
  debug_assert!(prev.map_or(true, |p| p.len() == out.len()));
  let up = |c: usize| -> u8 { prev.map_or(0, |p| p[c]) };
  let up_left = |c: usize| -> u8 {
    match prev {
      Some(p) if c >= bpp => p[c - bpp],
      _ => 0,
    }
  };
  match filter {
    FilterType::None => out.copy_from_slice(filtered),
    FilterType::Sub => {
      for c in 0..out.len() {
        let left = if c >= bpp { out[c - bpp] } else { 0 };
        out[c] = filtered[c].wrapping_add(left);
      }
    }
    FilterType::Up => {
      for c in 0..out.len() {
        out[c] = filtered[c].wrapping_add(up(c));
      }
    }
    FilterType::Average => {
      for c in 0..out.len() {
        let left = if c >= bpp { out[c - bpp] } else { 0 };
        let avg = ((u32::from(left) + u32::from(up(c))) / 2) as u8;
        out[c] = filtered[c].wrapping_add(avg);
      }
    }
    FilterType::Paeth => {
      for c in 0..out.len() {
        let left = if c >= bpp { out[c - bpp] } else { 0 };
        out[c] = filtered[c].wrapping_add(paeth_predict(left, up(c), up_left(c)));
      }
    }
  }
}

/// Unfilters all of the decompressed data into a new buffer of just pixel
/// bytes.
///
/// The `decompressed` data must be exactly
/// [`get_zlib_decompression_requirement`](IHDR::get_zlib_decompression_requirement)
/// bytes: `height` lines, each a filter byte followed by `width * bpp` bytes.
/// The output is `width * bpp * height` bytes, with no filter bytes.
///
/// Lines are processed strictly top to bottom, and each one only looks at
/// itself and the line just above it.
pub fn unfilter_scanlines(ihdr: &IHDR, decompressed: &[u8]) -> Result<Vec<u8>, PngError> {
  let bpp = ihdr.bytes_per_pixel();
  let bytes_per_scanline = ihdr.bytes_per_scanline()?;
  let bytes_per_filterline = ihdr.bytes_per_filterline()?;
  let expected = ihdr.get_zlib_decompression_requirement()?;
  if decompressed.len() != expected {
    return Err(PngError::DecompressedSizeMismatch { expected, actual: decompressed.len() });
  }

  let mut out: Vec<u8> = Vec::new();
  out.try_reserve_exact(ihdr.get_unfiltered_len()?)?;
  out.resize(ihdr.get_unfiltered_len()?, 0);

  for (y, filterline) in decompressed.chunks_exact(bytes_per_filterline).enumerate() {
    let (&f, filtered) = filterline.split_first().ok_or(PngError::NoImageData)?;
    let filter = FilterType::try_from(f)
      .map_err(|filter| PngError::UnsupportedFilterType { row: y as u32, filter })?;
    log::trace!("line {y}: {filter:?}");
    let start = y * bytes_per_scanline;
    let (done, rest) = out.split_at_mut(start);
    let prev = if y == 0 { None } else { Some(&done[start - bytes_per_scanline..]) };
    unfilter_line(filter, bpp, filtered, prev, &mut rest[..bytes_per_scanline]);
  }

  Ok(out)
}
