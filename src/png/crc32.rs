use super::PngChunkType;

const CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
  let mut out = [0; 256];
  let mut n = 0;
  while n < 256 {
    let mut c = n as u32;
    let mut k = 0;
    while k < 8 {
      if (c & 1) != 0 {
        c = 0xEDB8_8320_u32 ^ (c >> 1);
      } else {
        c >>= 1;
      }
      k += 1;
    }
    out[n] = c;
    n += 1;
  }
  out
}

fn update_crc(mut crc: u32, bytes: &[u8]) -> u32 {
  for &byte in bytes {
    let i = (crc ^ u32::from(byte)) as u8 as usize;
    crc = CRC_TABLE[i] ^ (crc >> 8);
  }
  crc
}

/// The CRC-32 that a chunk's trailer should hold.
///
/// It covers the chunk type and the chunk data, but not the length.
#[inline]
#[must_use]
pub fn png_crc(chunk_ty: PngChunkType, data: &[u8]) -> u32 {
  update_crc(update_crc(u32::MAX, &chunk_ty.0), data) ^ u32::MAX
}

#[test]
fn test_png_crc() {
  // every PNG ends with exactly these bytes
  assert_eq!(png_crc(PngChunkType::IEND, &[]), 0xAE42_6082);
  // the 1x1 greyscale IHDR written by most encoders
  let ihdr = [0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0];
  assert_eq!(png_crc(PngChunkType::IHDR, &ihdr), 0x3A7E_9B55);
}
