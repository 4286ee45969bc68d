/// The broad category of a failure.
///
/// Every error this crate (and its binary) can produce falls into exactly
/// one of these, and each category has a fixed process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
  /// The program was invoked with the wrong arguments.
  ParameterInvalid,
  /// An input or output path couldn't be opened or written.
  CannotOpenFile,
  /// The input bytes are malformed.
  DataInvalid,
  /// The input is well formed but uses a feature we don't handle.
  Unsupported,
  /// The allocator couldn't give us enough space.
  OutOfMemory,
}
impl ErrorKind {
  /// The process exit code for this kind of failure. Success is always 0.
  #[inline]
  #[must_use]
  pub const fn exit_code(self) -> i32 {
    match self {
      Self::CannotOpenFile => 1,
      Self::OutOfMemory => 2,
      Self::DataInvalid => 3,
      Self::ParameterInvalid => 4,
      Self::Unsupported => 20,
    }
  }
}

#[test]
fn test_exit_codes_are_distinct() {
  let kinds = [
    ErrorKind::ParameterInvalid,
    ErrorKind::CannotOpenFile,
    ErrorKind::DataInvalid,
    ErrorKind::Unsupported,
    ErrorKind::OutOfMemory,
  ];
  for (i, a) in kinds.iter().enumerate() {
    assert_ne!(a.exit_code(), 0);
    for b in &kinds[i + 1..] {
      assert_ne!(a.exit_code(), b.exit_code(), "{a:?} vs {b:?}");
    }
  }
}
