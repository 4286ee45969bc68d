use std::{cell::Cell, path::Path};

use miniz_oxide::deflate::compress_to_vec_zlib;
use png2pnm::{
  netpbm::netpbm_encode,
  png::{
    decode_png, decode_png_with, png_crc, Inflate, MinizInflate, MinizRawInflate, PngChunkReader,
    PngChunkType, PngError, PNG_SIGNATURE,
  },
  DecodeOptions, ErrorKind, Pixels, Y8, RGB8,
};
use walkdir::WalkDir;

fn chunk(ty: &[u8; 4], data: &[u8]) -> Vec<u8> {
  let mut out = Vec::new();
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(ty);
  out.extend_from_slice(data);
  out.extend_from_slice(&png_crc(PngChunkType(*ty), data).to_be_bytes());
  out
}

fn ihdr(width: u32, height: u32, color_type: u8) -> Vec<u8> {
  let mut data = Vec::new();
  data.extend_from_slice(&width.to_be_bytes());
  data.extend_from_slice(&height.to_be_bytes());
  data.extend_from_slice(&[8, color_type, 0, 0, 0]);
  chunk(b"IHDR", &data)
}

/// `filtered` is the full decompressed stream, filter bytes included.
fn idat(filtered: &[u8]) -> Vec<u8> {
  chunk(b"IDAT", &compress_to_vec_zlib(filtered, 6))
}

fn iend() -> Vec<u8> {
  chunk(b"IEND", &[])
}

fn png_file(chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  for c in chunks {
    out.extend_from_slice(c);
  }
  out
}

fn to_pnm(png: &[u8]) -> Result<Vec<u8>, PngError> {
  let image = decode_png(png)?;
  Ok(netpbm_encode(&image).unwrap())
}

#[test]
fn test_decode_png_no_panics() {
  // every file in the test folder, even non-png files, shouldn't panic.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(_) => continue,
    };
    let _ = decode_png(&v);
    for _ in PngChunkReader::new(&v).into_iter().flatten() {
      //
    }
  }
  // even totally random data should never panic the decoder!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    let _ = decode_png(&v);
  }
  // random data after a real header gets further along
  for _ in 0..10 {
    let mut v = png_file(&[ihdr(4, 4, 2)]);
    v.extend(super::rand_bytes(512));
    let _ = decode_png(&v);
    let options = DecodeOptions { verify_crc: true, ..DecodeOptions::default() };
    let _ = decode_png_with(&v, &MinizRawInflate, &options);
  }
  // random image data inside a well formed file
  for color_type in [0, 2, 3] {
    for _ in 0..10 {
      let v = png_file(&[
        ihdr(3, 3, color_type),
        chunk(b"PLTE", &super::rand_bytes(3 * 7)),
        idat(&super::rand_bytes(30)),
        iend(),
      ]);
      let _ = decode_png(&v);
    }
  }
}

#[test]
fn test_fixtures_match_expected_output() {
  let mut checked = 0;
  for entry in WalkDir::new("tests/png/fixtures/").into_iter().filter_map(|e| e.ok()) {
    let path = entry.path();
    if path.extension().map_or(true, |ext| ext != "png") {
      continue;
    }
    let expected_path = path.with_extension("pnm");
    if !expected_path.exists() {
      continue;
    }
    let png = std::fs::read(path).unwrap();
    let expected = std::fs::read(&expected_path).unwrap();
    assert_eq!(to_pnm(&png), Ok(expected), "{}", path.display());
    checked += 1;
  }
  assert!(checked >= 8, "only found {checked} fixtures");
}

#[test]
fn test_unsupported_fixtures() {
  let read = |name: &str| std::fs::read(Path::new("tests/png/fixtures/").join(name)).unwrap();
  let err = decode_png(&read("bad_interlaced.png")).unwrap_err();
  assert_eq!(err, PngError::InterlaceNotSupported);
  assert_eq!(err.kind(), ErrorKind::Unsupported);
  let err = decode_png(&read("bad_16bit.png")).unwrap_err();
  assert_eq!(err, PngError::UnsupportedBitDepth(16));
  assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_gray_2x2_to_pgm() {
  let png = png_file(&[ihdr(2, 2, 0), idat(&[0, 10, 20, 0, 30, 40]), iend()]);
  assert_eq!(to_pnm(&png).unwrap(), b"P5\n2 2\n255\n\x0A\x14\x1E\x28");
}

#[test]
fn test_gray_palette_to_pgm() {
  let png = png_file(&[ihdr(1, 1, 3), chunk(b"PLTE", &[5, 5, 5]), idat(&[0, 0]), iend()]);
  let image = decode_png(&png).unwrap();
  assert_eq!(image.pixels, Pixels::Gray(vec![Y8 { y: 5 }]));
  assert_eq!(netpbm_encode(&image).unwrap(), b"P5\n1 1\n255\n\x05");
}

#[test]
fn test_true_color_to_ppm() {
  let png = png_file(&[ihdr(1, 2, 2), idat(&[0, 1, 1, 1, 0, 2, 3, 4]), iend()]);
  let image = decode_png(&png).unwrap();
  assert_eq!(image.pixels, Pixels::Rgb(vec![RGB8::from([1, 1, 1]), RGB8::from([2, 3, 4])]));
  assert_eq!(netpbm_encode(&image).unwrap(), b"P6\n1 2\n255\n\x01\x01\x01\x02\x03\x04");
}

#[test]
fn test_true_color_gray_downgrade_is_opt_in() {
  let png = png_file(&[ihdr(2, 1, 2), idat(&[0, 9, 9, 9, 200, 200, 200]), iend()]);
  assert!(!decode_png(&png).unwrap().is_gray());
  let options = DecodeOptions { downgrade_true_color: true, ..DecodeOptions::default() };
  let image = decode_png_with(&png, &MinizInflate::default(), &options).unwrap();
  assert_eq!(image.pixels, Pixels::Gray(vec![Y8 { y: 9 }, Y8 { y: 200 }]));
}

#[test]
fn test_decoding_is_idempotent() {
  let png = std::fs::read("tests/png/fixtures/gray_paeth_17x9.png").unwrap();
  let a = to_pnm(&png).unwrap();
  let b = to_pnm(&png).unwrap();
  assert_eq!(a, b);
}

#[test]
fn test_both_backends_agree() {
  let png = std::fs::read("tests/png/fixtures/rgb_filters_5x5.png").unwrap();
  let options = DecodeOptions::default();
  assert_eq!(
    decode_png_with(&png, &MinizInflate::default(), &options),
    decode_png_with(&png, &MinizRawInflate, &options)
  );
}

#[test]
fn test_custom_inflate_backend() {
  /// Stores the decompressed data uncompressed, and remembers the size it
  /// was asked for.
  struct Stored {
    asked_for: Cell<usize>,
  }
  impl Inflate for Stored {
    fn inflate(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>, PngError> {
      self.asked_for.set(expected_len);
      if data.len() == expected_len {
        Ok(data.to_vec())
      } else {
        Err(PngError::DecompressedSizeMismatch { expected: expected_len, actual: data.len() })
      }
    }
  }
  let stored = Stored { asked_for: Cell::new(0) };
  // 3x2 RGB: 3 * 3 * 2 + 2 = 20
  let mut raw = vec![0; 20];
  raw[10] = 2;
  raw[11] = 7;
  let png = png_file(&[ihdr(3, 2, 2), chunk(b"IDAT", &raw), iend()]);
  let image = decode_png_with(&png, &stored, &DecodeOptions::default()).unwrap();
  assert_eq!(stored.asked_for.get(), 20);
  // up filter on row 1 copies row 0, plus 7 in the first byte
  assert_eq!(image.get(0, 1), Some(RGB8::from([7, 0, 0])));
}

#[test]
fn test_idat_must_be_consecutive() {
  let z = compress_to_vec_zlib(&[0, 1, 0, 2], 6);
  let (a, b) = z.split_at(z.len() / 2);
  let png = png_file(&[
    ihdr(1, 2, 0),
    chunk(b"IDAT", a),
    chunk(b"tEXt", b"k\0v"),
    chunk(b"IDAT", b),
    iend(),
  ]);
  let err = decode_png(&png).unwrap_err();
  assert_eq!(err, PngError::IdatNotConsecutive);
  assert_eq!(err.kind(), ErrorKind::DataInvalid);
  assert_eq!(err.to_string(), "IDAT chunks must be consecutive");

  // the same split with nothing in between is fine, as is an empty IDAT
  let png =
    png_file(&[ihdr(1, 2, 0), chunk(b"IDAT", a), chunk(b"IDAT", &[]), chunk(b"IDAT", b), iend()]);
  assert_eq!(to_pnm(&png).unwrap(), b"P5\n1 2\n255\n\x01\x02");
}

#[test]
fn test_no_image_data() {
  let png = png_file(&[ihdr(1, 1, 0), iend()]);
  let err = decode_png(&png).unwrap_err();
  assert_eq!(err, PngError::NoImageData);
  assert_eq!(err.kind(), ErrorKind::DataInvalid);
  assert_eq!(err.to_string(), "no image data");
}

#[test]
fn test_palette_index_one_past_the_end() {
  let png = png_file(&[ihdr(1, 1, 3), chunk(b"PLTE", &[5, 5, 5]), idat(&[0, 1]), iend()]);
  let err = decode_png(&png).unwrap_err();
  assert_eq!(err, PngError::PaletteIndexOutOfRange { index: 1, palette_len: 1 });
  assert_eq!(err.kind(), ErrorKind::DataInvalid);
  // no palette at all
  let png = png_file(&[ihdr(1, 1, 3), idat(&[0, 0]), iend()]);
  assert_eq!(
    decode_png(&png),
    Err(PngError::PaletteIndexOutOfRange { index: 0, palette_len: 0 })
  );
}

#[test]
fn test_palette_misuse() {
  let plte = chunk(b"PLTE", &[1, 2, 3]);
  let data = idat(&[0, 0]);
  let check = |chunks: &[Vec<u8>], expected: PngError| {
    let err = decode_png(&png_file(chunks)).unwrap_err();
    assert_eq!(err, expected);
    assert_eq!(err.kind(), ErrorKind::DataInvalid);
  };
  check(&[ihdr(1, 1, 0), plte.clone(), data.clone(), iend()], PngError::PaletteInGreyscale);
  check(&[ihdr(1, 1, 3), data.clone(), plte.clone(), iend()], PngError::PaletteMisplaced);
  check(&[ihdr(1, 1, 3), plte.clone(), plte.clone(), data.clone(), iend()], PngError::PaletteMisplaced);
  check(&[ihdr(1, 1, 3), chunk(b"PLTE", &[1, 2, 3, 4]), data.clone(), iend()], PngError::BadPaletteLength(4));
  check(&[ihdr(1, 1, 3), chunk(b"PLTE", &[7; 3 * 257]), data.clone(), iend()], PngError::BadPaletteLength(771));
  // a suggested palette in an RGB image is allowed, and not used
  let png = png_file(&[ihdr(1, 1, 2), plte, idat(&[0, 4, 5, 6]), iend()]);
  assert_eq!(decode_png(&png).unwrap().pixels, Pixels::Rgb(vec![RGB8::from([4, 5, 6])]));
}

#[test]
fn test_chunk_structure_errors() {
  let good = png_file(&[ihdr(1, 1, 0), idat(&[0, 77]), iend()]);
  assert_eq!(to_pnm(&good).unwrap(), b"P5\n1 1\n255\nM");

  let mut bad_sig = good.clone();
  bad_sig[1] = b'Q';
  assert_eq!(decode_png(&bad_sig), Err(PngError::BadSignature));
  assert_eq!(decode_png(&good[..7]), Err(PngError::BadSignature));

  // every possible truncation fails, and never panics
  for end in 8..good.len() {
    let err = decode_png(&good[..end]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataInvalid, "cut at {end}: {err:?}");
  }
  assert!(matches!(
    decode_png(&good[..good.len() - 2]),
    Err(PngError::UnexpectedEndOfInput("chunk CRC"))
  ));

  // anything after IEND is ignored
  let mut trailing = good.clone();
  trailing.extend_from_slice(b"garbage");
  assert_eq!(to_pnm(&trailing).unwrap(), b"P5\n1 1\n255\nM");

  let check = |chunks: &[Vec<u8>], expected: PngError| {
    assert_eq!(decode_png(&png_file(chunks)), Err(expected));
  };
  check(&[idat(&[0, 77]), iend()], PngError::FirstChunkNotIHDR(PngChunkType::IDAT));
  check(&[chunk(b"IHDR", &[0; 12]), idat(&[0, 77]), iend()], PngError::FirstChunkNotIHDR(PngChunkType::IHDR));
  check(&[ihdr(0, 1, 0), idat(&[0]), iend()], PngError::WidthOrHeightZero);
  check(&[ihdr(1, 1, 6), idat(&[0, 0, 0, 0, 0]), iend()], PngError::UnsupportedColorType(6));
  check(&[ihdr(1, 1, 0), idat(&[0, 77]), chunk(b"IEND", &[1])], PngError::NonEmptyIEND);
  check(
    &[ihdr(1, 1, 0), chunk(b"tEXt", &[]), idat(&[0, 77]), iend()],
    PngError::UnexpectedEmptyChunk(PngChunkType(*b"tEXt")),
  );
}

#[test]
fn test_unknown_chunks_are_skipped() {
  let png = png_file(&[
    ihdr(1, 1, 0),
    chunk(b"gAMA", &45455_u32.to_be_bytes()),
    chunk(b"ZZZZ", b"critical but unknown"),
    idat(&[0, 77]),
    chunk(b"tIME", &[7, 230, 10, 16, 12, 0, 0]),
    iend(),
  ]);
  assert_eq!(to_pnm(&png).unwrap(), b"P5\n1 1\n255\nM");
}

#[test]
fn test_crc_verification_is_opt_in() {
  let mut text = chunk(b"tEXt", b"Comment\0hello");
  let last = text.len() - 1;
  text[last] ^= 0xFF;
  let png = png_file(&[ihdr(1, 1, 0), text, idat(&[0, 77]), iend()]);
  assert!(decode_png(&png).is_ok());

  let options = DecodeOptions { verify_crc: true, ..DecodeOptions::default() };
  let err = decode_png_with(&png, &MinizInflate::default(), &options).unwrap_err();
  assert!(
    matches!(err, PngError::CrcMismatch { chunk_ty, declared, actual }
      if chunk_ty == PngChunkType(*b"tEXt") && declared != actual),
    "{err:?}"
  );
  assert_eq!(err.kind(), ErrorKind::DataInvalid);

  // a good file passes the check
  let png = std::fs::read("tests/png/fixtures/gray_paeth_17x9.png").unwrap();
  assert!(decode_png_with(&png, &MinizInflate::default(), &options).is_ok());
}

#[test]
fn test_filter_type_above_four() {
  let png = png_file(&[ihdr(1, 2, 0), idat(&[0, 1, 5, 2]), iend()]);
  let err = decode_png(&png).unwrap_err();
  assert_eq!(err, PngError::UnsupportedFilterType { row: 1, filter: 5 });
  assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_decompressed_size_must_match() {
  let short = png_file(&[ihdr(2, 2, 0), idat(&[0, 1, 2, 0, 3]), iend()]);
  let err = decode_png(&short).unwrap_err();
  assert_eq!(err, PngError::DecompressedSizeMismatch { expected: 6, actual: 5 });
  assert_eq!(err.kind(), ErrorKind::DataInvalid);

  let long = png_file(&[ihdr(2, 2, 0), idat(&[0, 1, 2, 0, 3, 4, 0]), iend()]);
  assert_eq!(decode_png(&long), Err(PngError::TooMuchImageData { expected: 6 }));

  let corrupt = png_file(&[ihdr(2, 2, 0), chunk(b"IDAT", &[0x78, 0x9C, 0xFF, 0xFF]), iend()]);
  assert_eq!(decode_png(&corrupt), Err(PngError::Decompression));
}

#[test]
fn test_dimension_limits() {
  let png = png_file(&[ihdr(3, 1, 0), idat(&[0, 1, 2, 3]), iend()]);
  let options = DecodeOptions { max_width: Some(2), ..DecodeOptions::default() };
  let err = decode_png_with(&png, &MinizInflate::default(), &options).unwrap_err();
  assert_eq!(err, PngError::DimensionsTooLarge { width: 3, height: 1 });
  assert_eq!(err.kind(), ErrorKind::OutOfMemory);
  let options = DecodeOptions { max_width: Some(3), max_height: Some(1), ..options };
  assert!(decode_png_with(&png, &MinizInflate::default(), &options).is_ok());
}

#[test]
fn test_huge_header_with_tiny_idat() {
  // the declared size is about 900 MB, the stream holds 2 bytes
  let png = png_file(&[ihdr(30000, 30000, 0), idat(&[0, 1]), iend()]);
  let err = decode_png(&png).unwrap_err();
  assert_eq!(err, PngError::DecompressedSizeMismatch { expected: 900_030_000, actual: 2 });
  assert_eq!(err.kind(), ErrorKind::DataInvalid);
}
