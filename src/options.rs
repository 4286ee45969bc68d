//! Knobs that change how strict (or how clever) decoding is.

/// Options for [`decode_png_with`](crate::png::decode_png_with).
///
/// The [`Default`] matches the behavior of the plain
/// [`decode_png`](crate::png::decode_png) function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeOptions {
  /// Check each chunk's CRC-32 against its type and payload.
  ///
  /// Off by default: the CRC is read and skipped.
  pub verify_crc: bool,

  /// Check the Adler-32 checksum at the end of the zlib stream.
  pub verify_adler32: bool,

  /// Allow an RGB image where every pixel has `r == g == b` to come out as
  /// greyscale.
  ///
  /// Off by default: RGB images always come out as RGB. Indexed images are
  /// always checked, regardless of this setting.
  pub downgrade_true_color: bool,

  /// Images wider than this are rejected before anything is allocated.
  pub max_width: Option<u32>,

  /// Images taller than this are rejected before anything is allocated.
  pub max_height: Option<u32>,
}
impl Default for DecodeOptions {
  #[inline]
  fn default() -> Self {
    Self {
      verify_crc: false,
      verify_adler32: true,
      downgrade_true_color: false,
      max_width: None,
      max_height: None,
    }
  }
}
impl DecodeOptions {
  /// Checks the dimensions against `max_width` and `max_height`.
  #[inline]
  #[must_use]
  pub const fn allows_dimensions(&self, width: u32, height: u32) -> bool {
    let w_ok = match self.max_width {
      Some(max) => width <= max,
      None => true,
    };
    let h_ok = match self.max_height {
      Some(max) => height <= max,
      None => true,
    };
    w_ok && h_ok
  }
}

#[test]
fn test_allows_dimensions() {
  let opts = DecodeOptions::default();
  assert!(opts.allows_dimensions(u32::MAX, u32::MAX));
  let opts = DecodeOptions { max_width: Some(17_000), max_height: Some(100), ..opts };
  assert!(opts.allows_dimensions(17_000, 100));
  assert!(!opts.allows_dimensions(17_001, 1));
  assert!(!opts.allows_dimensions(1, 101));
}
