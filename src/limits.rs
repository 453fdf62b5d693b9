use crate::{ErrorCode, VPackError};

/// Containers nested deeper than this are rejected by default.
///
/// Also bounds the recursive readers that work on unvalidated slices: [`crate::compare`],
/// JSON rendering, `Json` conversion and serde deserialization.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default cap on the members of one array or object.
pub const DEFAULT_MAX_CONTAINER_LEN: usize = 1 << 20;

/// Decode-time resource limits applied by [`crate::validate`].
///
/// `Slice` accessors always bounds-check against the buffer they were created on. The limits
/// here add the checks that only make sense for a full walk of untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum total input length in bytes.
    pub max_input_bytes: usize,
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Maximum number of members in a single array or object.
    pub max_container_len: usize,
    /// Maximum string/binary length in bytes.
    pub max_string_len: usize,
    /// Reject strings that are not valid UTF-8.
    pub check_utf8: bool,
    /// Accept objects that contain the same attribute name more than once.
    pub allow_duplicate_attributes: bool,
}

impl DecodeLimits {
    /// Limits for documents of at most `max_len` bytes.
    ///
    /// Strings may span the whole input, containers are capped at
    /// [`DEFAULT_MAX_CONTAINER_LEN`] members, UTF-8 is checked and duplicate attribute names are
    /// tolerated.
    #[must_use]
    pub fn for_bytes(max_len: usize) -> Self {
        Self {
            max_input_bytes: max_len,
            max_depth: DEFAULT_MAX_DEPTH,
            max_container_len: max_len.min(DEFAULT_MAX_CONTAINER_LEN),
            max_string_len: max_len,
            check_utf8: true,
            allow_duplicate_attributes: true,
        }
    }

    /// Same limits with duplicate attribute names rejected.
    #[must_use]
    pub const fn strict(self) -> Self {
        Self {
            allow_duplicate_attributes: false,
            ..self
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self::for_bytes(usize::MAX)
    }
}

/// Enters one more container below `depth` open ones.
#[inline]
pub(crate) const fn nest(depth: usize, offset: usize) -> Result<usize, VPackError> {
    if depth >= DEFAULT_MAX_DEPTH {
        return Err(VPackError::new(ErrorCode::DepthLimitExceeded, offset));
    }
    Ok(depth + 1)
}
