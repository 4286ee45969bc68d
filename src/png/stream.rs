use alloc::vec::Vec;

use crate::{pixel_formats::RGB8, DecodeOptions};

use super::{PngChunkReader, PngChunkType, PngColorType, PngError, IHDR};

/// Everything the rest of decoding needs out of the chunk stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngStream {
  pub ihdr: IHDR,
  /// Every `IDAT` payload, concatenated in file order. This is one zlib
  /// stream.
  pub idat: Vec<u8>,
  /// The `PLTE` entries, if there was a `PLTE`.
  pub palette: Option<Vec<RGB8>>,
}

/// Where we are relative to the run of `IDAT` chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdatRun {
  NotStarted,
  Running,
  Finished,
}

/// Parses the whole PNG container, from the signature through `IEND`.
///
/// Chunk ordering is enforced:
/// * `IHDR` must be first, and exactly 13 bytes.
/// * `PLTE` may appear at most once, before any `IDAT`, and never in a
///   greyscale image.
/// * All `IDAT` chunks must form one unbroken run.
/// * Only `IEND` may be empty, and it ends the stream. Anything after the
///   `IEND` is ignored.
///
/// All other chunks are skipped. Their CRC is only checked if
/// [`verify_crc`](DecodeOptions::verify_crc) is set.
pub fn png_parse_stream(bytes: &[u8], options: &DecodeOptions) -> Result<PngStream, PngError> {
  let mut reader = PngChunkReader::new(bytes)?.with_crc_check(options.verify_crc);

  let first = reader.next_chunk()?;
  if first.chunk_ty != PngChunkType::IHDR || first.data.len() != IHDR::DATA_LEN {
    return Err(PngError::FirstChunkNotIHDR(first.chunk_ty));
  }
  let ihdr = IHDR::try_from(first.data)?;
  log::debug!("{ihdr:?}");
  if !options.allows_dimensions(ihdr.width, ihdr.height) {
    return Err(PngError::DimensionsTooLarge { width: ihdr.width, height: ihdr.height });
  }

  let mut idat: Vec<u8> = Vec::new();
  let mut idat_run = IdatRun::NotStarted;
  let mut palette: Option<Vec<RGB8>> = None;

  loop {
    let chunk = reader.next_chunk()?;
    log::debug!("{chunk:?}");
    if chunk.chunk_ty != PngChunkType::IDAT && idat_run == IdatRun::Running {
      idat_run = IdatRun::Finished;
    }
    match chunk.chunk_ty {
      PngChunkType::IDAT => {
        if idat_run == IdatRun::Finished {
          return Err(PngError::IdatNotConsecutive);
        }
        idat_run = IdatRun::Running;
        idat.try_reserve(chunk.data.len())?;
        idat.extend_from_slice(chunk.data);
      }
      PngChunkType::IEND => {
        if !chunk.data.is_empty() {
          return Err(PngError::NonEmptyIEND);
        }
        break;
      }
      PngChunkType::PLTE => {
        if ihdr.color_type == PngColorType::Y {
          return Err(PngError::PaletteInGreyscale);
        }
        if palette.is_some() || idat_run != IdatRun::NotStarted {
          return Err(PngError::PaletteMisplaced);
        }
        let entries: &[[u8; 3]] = match bytemuck::try_cast_slice(chunk.data) {
          Ok(entries) if entries.len() <= 256 => entries,
          _ => return Err(PngError::BadPaletteLength(chunk.data.len())),
        };
        let mut v: Vec<RGB8> = Vec::new();
        v.try_reserve_exact(entries.len())?;
        v.extend(entries.iter().copied().map(RGB8::from));
        if ihdr.color_type == PngColorType::RGB {
          log::warn!("ignoring the suggested palette of an RGB image");
        }
        palette = Some(v);
      }
      other if chunk.data.is_empty() => return Err(PngError::UnexpectedEmptyChunk(other)),
      other if other.is_critical() => {
        log::warn!("skipping unknown critical chunk {other:?} ({} bytes)", chunk.data.len());
      }
      other => {
        log::debug!("skipping {other:?} chunk ({} bytes)", chunk.data.len());
      }
    }
  }

  if idat.is_empty() {
    return Err(PngError::NoImageData);
  }
  if ihdr.color_type == PngColorType::Index && palette.is_none() {
    log::warn!("indexed image has no PLTE chunk");
  }
  Ok(PngStream { ihdr, idat, palette })
}
