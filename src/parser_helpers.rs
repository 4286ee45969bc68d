#![forbid(unsafe_code)]

//! Just has shorthands for the byte splitting that the parsers do.
//!
//! Everything here hands back `None` rather than reading past the end of the
//! slice, so callers can turn a short read into their own error.

/// Reads a big-endian `u32` from the start of `bytes`.
#[inline]
#[must_use]
pub fn u32_be(bytes: &[u8]) -> Option<u32> {
  let (a, _) = try_split_off_byte_array::<4>(bytes)?;
  Some(u32::from_be_bytes(a))
}

/// Reads a big-endian `u32` starting at `offset` within `bytes`.
#[inline]
#[must_use]
pub fn u32_be_at(bytes: &[u8], offset: usize) -> Option<u32> {
  u32_be(bytes.get(offset..)?)
}

/// Splits an `N` byte array off the front of the slice.
#[inline]
pub fn try_split_off_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    let a: [u8; N] = head.try_into().ok()?;
    Some((a, tail))
  } else {
    None
  }
}

/// Splits `len` bytes off the front of the slice.
#[inline]
pub fn try_split_off(bytes: &[u8], len: usize) -> Option<(&[u8], &[u8])> {
  if bytes.len() >= len {
    Some(bytes.split_at(len))
  } else {
    None
  }
}

#[test]
fn test_u32_be() {
  assert_eq!(u32_be(&[0, 0, 0, 13]), Some(13));
  assert_eq!(u32_be(&[0x12, 0x34, 0x56, 0x78, 0xFF]), Some(0x1234_5678));
  assert_eq!(u32_be(&[1, 2, 3]), None);
  assert_eq!(u32_be_at(&[9, 0, 0, 1, 0], 1), Some(256));
  assert_eq!(u32_be_at(&[9, 0, 0, 1, 0], 2), None);
  assert_eq!(u32_be_at(&[9], 5), None);
}

#[test]
fn test_try_split_off() {
  assert_eq!(try_split_off(&[1, 2, 3], 2), Some((&[1_u8, 2][..], &[3_u8][..])));
  assert_eq!(try_split_off(&[1, 2, 3], 4), None);
  assert_eq!(try_split_off_byte_array::<3>(&[1, 2, 3]), Some(([1, 2, 3], &[][..])));
}
