//! `png2pnm <input.png> <output.pnm>`
//!
//! Writes a PGM if the image is all gray, otherwise a PPM.
//!
//! Environment variables:
//! * `PNG2PNM_VERIFY_CRC=1` checks every chunk CRC.
//! * `PNG2PNM_GRAY_RGB=1` writes RGB images with only gray pixels as PGM.
//! * `PNG2PNM_LOG` sets the log level (`off`, `error`, `warn`, `info`,
//!   `debug`, `trace`). The default is `warn`.

use png2pnm::{
  netpbm::{netpbm_encode, NetpbmError},
  png::{decode_png_with, MinizInflate, PngError},
  DecodeOptions, ErrorKind,
};

use std::{
  io::Write,
  path::{Path, PathBuf},
  str::FromStr,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
  #[error("usage: png2pnm <input.png> <output.pnm>")]
  Usage,
  #[error("couldn't read {}: {source}", path.display())]
  OpenInput { path: PathBuf, source: std::io::Error },
  #[error("couldn't write {}: {source}", path.display())]
  WriteOutput { path: PathBuf, source: std::io::Error },
  #[error("{}: {source}", path.display())]
  Decode { path: PathBuf, source: PngError },
  #[error(transparent)]
  Encode(#[from] NetpbmError),
}
impl CliError {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Usage => ErrorKind::ParameterInvalid,
      Self::OpenInput { .. } | Self::WriteOutput { .. } => ErrorKind::CannotOpenFile,
      Self::Decode { source, .. } => source.kind(),
      Self::Encode(e) => e.kind(),
    }
  }
}

struct StderrLogger;
impl log::Log for StderrLogger {
  fn enabled(&self, metadata: &log::Metadata) -> bool {
    metadata.level() <= log::max_level()
  }
  fn log(&self, record: &log::Record) {
    if self.enabled(record.metadata()) {
      let _ = writeln!(
        std::io::stderr().lock(),
        "[{}] {}: {}",
        record.level(),
        record.target(),
        record.args()
      );
    }
  }
  fn flush(&self) {
    let _ = std::io::stderr().flush();
  }
}
static LOGGER: StderrLogger = StderrLogger;

fn env_flag(name: &str) -> bool {
  std::env::var_os(name).map_or(false, |v| v == "1")
}

fn init_logging() {
  let level = std::env::var("PNG2PNM_LOG")
    .ok()
    .and_then(|s| log::LevelFilter::from_str(s.trim()).ok())
    .unwrap_or(log::LevelFilter::Warn);
  if log::set_logger(&LOGGER).is_ok() {
    log::set_max_level(level);
  }
}

fn options_from_env() -> DecodeOptions {
  DecodeOptions {
    verify_crc: env_flag("PNG2PNM_VERIFY_CRC"),
    downgrade_true_color: env_flag("PNG2PNM_GRAY_RGB"),
    ..DecodeOptions::default()
  }
}

fn convert(input: &Path, output: &Path, options: &DecodeOptions) -> Result<(), CliError> {
  let bytes = std::fs::read(input)
    .map_err(|source| CliError::OpenInput { path: input.to_path_buf(), source })?;
  log::info!("read {} bytes from {}", bytes.len(), input.display());
  let inflater = MinizInflate { verify_adler32: options.verify_adler32 };
  let image = decode_png_with(&bytes, &inflater, options)
    .map_err(|source| CliError::Decode { path: input.to_path_buf(), source })?;
  drop(bytes);
  let pnm = netpbm_encode(&image)?;
  std::fs::write(output, &pnm)
    .map_err(|source| CliError::WriteOutput { path: output.to_path_buf(), source })?;
  log::info!("wrote {}", output.display());
  Ok(())
}

fn run() -> Result<(), CliError> {
  let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
  let [input, output] = args.as_slice() else {
    return Err(CliError::Usage);
  };
  convert(input, output, &options_from_env())
}

fn main() {
  init_logging();
  if let Err(e) = run() {
    eprintln!("png2pnm: {e}");
    std::process::exit(e.kind().exit_code());
  }
}
