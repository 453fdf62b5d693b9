use core::fmt;

/// The high-level class of an error.
///
/// The format distinguishes:
/// - **Decode** errors: a buffer could not be read (truncation, reserved head bytes, wrong type).
/// - **Validate** errors: a full-document check rejected the buffer (limits, inconsistent lengths).
/// - **Encode** errors: the builder was driven incorrectly or could not grow its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Decode/framing failure.
    Decode,
    /// Full-document validation failure.
    Validate,
    /// Builder/encoding failure.
    Encode,
}

/// A structured error code identifying why an operation was rejected.
///
/// This enum is string-free to support `no_std` and stay cheap on hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The head byte is reserved or unused by the format.
    MalformedHeader,
    /// The value has a different type than the operation requires.
    TypeMismatch,
    /// An index or position lies outside the value.
    IndexOutOfBounds,
    /// A number cannot be represented losslessly in the requested type.
    NumericOverflow,
    /// The builder was used out of order (unbalanced close, missing key, second root value, ...).
    BuilderMisuse,
    /// A read or append went past the known end of the buffer.
    BufferExhausted,

    /// Arithmetic overflow while computing a length/offset.
    LengthOverflow,
    /// Memory allocation failed while growing a buffer.
    AllocationFailed,
    /// A container's declared length disagrees with its members or index table.
    InconsistentLength,
    /// Input contains bytes after the single top-level value.
    TrailingBytes,
    /// Nesting depth limit exceeded.
    DepthLimitExceeded,
    /// Input, container or string exceeds the configured limits.
    InputTooLarge,
    /// A string is not valid UTF-8.
    Utf8Invalid,
    /// An object contains the same attribute name twice.
    DuplicateAttribute,
    /// A serde conversion failed.
    SerdeError,
}

impl ErrorCode {
    /// Returns the error class this code belongs to.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self {
            Self::BuilderMisuse | Self::AllocationFailed | Self::SerdeError => ErrorKind::Encode,
            Self::InconsistentLength
            | Self::TrailingBytes
            | Self::DepthLimitExceeded
            | Self::InputTooLarge
            | Self::DuplicateAttribute => ErrorKind::Validate,
            _ => ErrorKind::Decode,
        }
    }
}

/// An error with a stable code and the byte offset where it was detected.
///
/// For decode and validation errors `offset` points into the input buffer. For builder
/// errors it is the builder's buffer length at the time of the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VPackError {
    /// The error code.
    pub code: ErrorCode,
    /// Byte offset where the error was detected.
    pub offset: usize,
}

impl VPackError {
    /// Construct a new error.
    #[inline]
    #[must_use]
    pub const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }

    /// Returns the error class.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns true iff this error came from full-document validation.
    #[inline]
    #[must_use]
    pub const fn is_validation(self) -> bool {
        matches!(self.code.kind(), ErrorKind::Validate)
    }
}

impl fmt::Display for VPackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.code {
            ErrorCode::MalformedHeader => "malformed or reserved head byte",
            ErrorCode::TypeMismatch => "unexpected value type",
            ErrorCode::IndexOutOfBounds => "index out of bounds",
            ErrorCode::NumericOverflow => "number does not fit the requested type",
            ErrorCode::BuilderMisuse => "builder used out of order",
            ErrorCode::BufferExhausted => "read past end of buffer",

            ErrorCode::LengthOverflow => "length overflow",
            ErrorCode::AllocationFailed => "allocation failed",
            ErrorCode::InconsistentLength => "declared length disagrees with contents",
            ErrorCode::TrailingBytes => "trailing bytes after top-level value",
            ErrorCode::DepthLimitExceeded => "nesting depth limit exceeded",
            ErrorCode::InputTooLarge => "input exceeds decode limits",
            ErrorCode::Utf8Invalid => "string must be valid UTF-8",
            ErrorCode::DuplicateAttribute => "duplicate attribute name",
            ErrorCode::SerdeError => "serde conversion failed",
        };

        match self.kind() {
            ErrorKind::Encode => write!(f, "vpack encode failed at {}: {msg}", self.offset),
            ErrorKind::Decode => write!(f, "vpack decode failed at {}: {msg}", self.offset),
            ErrorKind::Validate => {
                write!(f, "vpack validation failed at {}: {msg}", self.offset)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VPackError {}
