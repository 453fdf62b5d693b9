use alloc::vec::Vec;
use core::fmt;

use crate::alloc_util::try_copy;
use crate::{DecodeLimits, Slice, VPackError};

/// An owned, finished encoding of exactly one value.
///
/// Produced by [`crate::Builder::finish`], or from foreign bytes via [`Buffer::from_vec`], which
/// validates them first. [`Buffer::slice`] gives the root [`Slice`]; the borrow checker ties
/// every `Slice` to the buffer it reads.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    #[inline]
    pub(crate) const fn new_unchecked(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Validate `bytes` and take ownership of them.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` are not exactly one well-formed value within `limits`.
    pub fn from_vec(bytes: Vec<u8>, limits: DecodeLimits) -> Result<Self, VPackError> {
        crate::validate(&bytes, limits)?;
        Ok(Self { bytes })
    }

    /// Copy the encoded bytes of `slice` into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if `slice` is malformed or allocation fails.
    pub fn from_slice(slice: Slice<'_>) -> Result<Self, VPackError> {
        let bytes = slice.as_bytes()?;
        Ok(Self {
            bytes: try_copy(bytes, slice.offset())?,
        })
    }

    /// The root value.
    #[inline]
    #[must_use]
    pub fn slice(&self) -> Slice<'_> {
        Slice::new(&self.bytes)
    }

    /// Borrow the encoded bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the encoded bytes.
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Encoded size in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the buffer holds no bytes (never the case for a finished value).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Compute the SHA-256 digest of the encoded bytes.
    #[cfg(feature = "sha2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "sha2")))]
    #[must_use]
    pub fn sha256(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};
        let mut h = Sha256::new();
        h.update(&self.bytes);
        let out = h.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(out.as_slice());
        digest
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer").field(&self.bytes).finish()
    }
}

/// Renders the value as JSON text.
impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.slice(), f)
    }
}
