use alloc::vec::Vec;

use crate::{
  image::Pixels,
  pixel_formats::{RGB8, Y8},
};

use super::{PngColorType, PngError, IHDR};

/// Turns unfiltered pixel bytes into final pixels.
///
/// * Greyscale stays greyscale.
/// * RGB stays RGB, unless `downgrade_true_color` is set and every pixel has
///   `r == g == b`.
/// * Indexed pixels are looked up in the palette. If every palette entry that
///   actually gets *used* is gray then the output is greyscale, otherwise
///   it's RGB. Unused entries don't count.
///
/// ## Failure
/// * An index that's not less than the palette length is an error. An indexed
///   image with no palette fails on its first pixel.
pub fn materialize(
  ihdr: &IHDR, unfiltered: Vec<u8>, palette: Option<&[RGB8]>, downgrade_true_color: bool,
) -> Result<Pixels, PngError> {
  debug_assert_eq!(Ok(unfiltered.len()), ihdr.get_unfiltered_len());
  match ihdr.color_type {
    PngColorType::Y => Ok(Pixels::Gray(reuse_as_pixels(unfiltered)?)),
    PngColorType::RGB => {
      let rgb: &[RGB8] = bytemuck::cast_slice(&unfiltered);
      if downgrade_true_color && rgb.iter().all(|p| p.to_gray().is_some()) {
        log::debug!("every pixel is gray, writing greyscale");
        let mut v: Vec<Y8> = Vec::new();
        v.try_reserve_exact(rgb.len())?;
        v.extend(rgb.iter().map(|p| Y8 { y: p.r }));
        Ok(Pixels::Gray(v))
      } else {
        Ok(Pixels::Rgb(reuse_as_pixels(unfiltered)?))
      }
    }
    PngColorType::Index => {
      let palette = palette.unwrap_or(&[]);
      // first pass: every index must be in range, and see if it's all gray
      let mut all_gray = true;
      for &index in unfiltered.iter() {
        match palette.get(usize::from(index)) {
          Some(entry) => all_gray &= entry.to_gray().is_some(),
          None => {
            return Err(PngError::PaletteIndexOutOfRange { index, palette_len: palette.len() })
          }
        }
      }
      // second pass: write out the pixels, all indexes are now known good
      let lookup = |index: u8| palette.get(usize::from(index)).copied().unwrap_or_default();
      if all_gray {
        let mut v: Vec<Y8> = Vec::new();
        v.try_reserve_exact(unfiltered.len())?;
        v.extend(unfiltered.iter().map(|&i| Y8 { y: lookup(i).r }));
        Ok(Pixels::Gray(v))
      } else {
        let mut v: Vec<RGB8> = Vec::new();
        v.try_reserve_exact(unfiltered.len())?;
        v.extend(unfiltered.iter().map(|&i| lookup(i)));
        Ok(Pixels::Rgb(v))
      }
    }
  }
}

/// Reinterprets the byte buffer as pixels without copying.
///
/// That only works when the buffer's capacity is a whole number of pixels,
/// otherwise the bytes get copied into a new buffer.
fn reuse_as_pixels<P: bytemuck::Pod>(bytes: Vec<u8>) -> Result<Vec<P>, PngError> {
  match bytemuck::allocation::try_cast_vec(bytes) {
    Ok(pixels) => Ok(pixels),
    Err((_, bytes)) => {
      let mut v: Vec<P> = Vec::new();
      v.try_reserve_exact(bytes.len() / core::mem::size_of::<P>())?;
      v.extend_from_slice(bytemuck::cast_slice(&bytes));
      Ok(v)
    }
  }
}
