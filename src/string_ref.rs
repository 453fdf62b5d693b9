//! Byte-exact, non-owning string views.

use core::cmp::Ordering;
use core::fmt;

use crate::slice::Slice;
use crate::{ErrorCode, VPackError};

/// A read-only view over string bytes.
///
/// The view never owns its bytes: it borrows either the encoded string inside a [`Slice`]'s
/// buffer or caller-owned memory. Lengths are explicit, so embedded zero bytes are ordinary
/// content. None of the operations allocate.
#[derive(Clone, Copy, Default, Eq, Hash)]
pub struct StringRef<'a> {
    data: &'a [u8],
}

impl<'a> StringRef<'a> {
    /// Sentinel `count` for [`StringRef::substr`]: take everything up to the end.
    pub const NPOS: usize = usize::MAX;

    /// Creates a view over raw bytes.
    #[inline]
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Re-points this view at the string stored in `slice` without copying bytes.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if `slice` is not a string, or a decode error if it is malformed.
    pub fn assign(&mut self, slice: Slice<'a>) -> Result<(), VPackError> {
        *self = slice.get_string_ref()?;
        Ok(())
    }

    /// The viewed bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(self) -> &'a [u8] {
        self.data
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the view is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.data.is_empty()
    }

    /// Returns the sub-view `[pos, pos + count)`, clamping `count` to the remaining length.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` if `pos > len()`.
    pub fn substr(self, pos: usize, count: usize) -> Result<Self, VPackError> {
        if pos > self.data.len() {
            return Err(VPackError::new(ErrorCode::IndexOutOfBounds, pos));
        }
        let remaining = self.data.len() - pos;
        let count = if count == Self::NPOS || pos.saturating_add(count) >= self.data.len() {
            remaining
        } else {
            count
        };
        Ok(Self::new(&self.data[pos..pos + count]))
    }

    /// Returns the byte at `index`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` if `index >= len()`.
    pub fn at(self, index: usize) -> Result<u8, VPackError> {
        self.data
            .get(index)
            .copied()
            .ok_or_else(|| VPackError::new(ErrorCode::IndexOutOfBounds, index))
    }

    /// Position of the first `byte` at or after `offset`.
    ///
    /// An `offset` past the end is clamped to the length, which finds nothing.
    #[must_use]
    pub fn find(self, byte: u8, offset: usize) -> Option<usize> {
        let offset = offset.min(self.data.len());
        self.data[offset..]
            .iter()
            .position(|&b| b == byte)
            .map(|p| p + offset)
    }

    /// Position of the last `byte` at or before `offset`.
    ///
    /// The scan covers `[0, min(offset, len - 1)]`; an `offset` past the end searches the whole
    /// view instead of failing.
    #[must_use]
    pub fn rfind(self, byte: u8, offset: usize) -> Option<usize> {
        let len = if offset >= self.data.len() {
            self.data.len()
        } else {
            offset + 1
        };
        self.data[..len].iter().rposition(|&b| b == byte)
    }

    /// Byte-wise lexicographic comparison; on a common prefix the shorter view sorts first.
    #[must_use]
    pub fn compare(self, other: Self) -> Ordering {
        let n = self.data.len().min(other.data.len());
        match self.data[..n].cmp(&other.data[..n]) {
            Ordering::Equal => self.data.len().cmp(&other.data.len()),
            ord => ord,
        }
    }

    /// Returns `true` iff both views hold the same bytes.
    #[must_use]
    pub fn equals(self, other: Self) -> bool {
        self.data.len() == other.data.len() && self.data == other.data
    }

    /// Returns the view as `&str`.
    ///
    /// # Errors
    ///
    /// Returns `Utf8Invalid` if the bytes are not valid UTF-8.
    pub fn to_str(self) -> Result<&'a str, VPackError> {
        #[cfg(feature = "simdutf8")]
        let res = simdutf8::basic::from_utf8(self.data).map_err(|_| ());
        #[cfg(not(feature = "simdutf8"))]
        let res = core::str::from_utf8(self.data).map_err(|_| ());
        res.map_err(|()| VPackError::new(ErrorCode::Utf8Invalid, 0))
    }
}

impl PartialEq for StringRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(*other)
    }
}

impl PartialEq<str> for StringRef<'_> {
    fn eq(&self, other: &str) -> bool {
        self.data == other.as_bytes()
    }
}

impl PartialEq<&str> for StringRef<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.data == other.as_bytes()
    }
}

impl PartialOrd for StringRef<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StringRef<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(*other)
    }
}

impl<'a> From<&'a str> for StringRef<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for StringRef<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::new(b)
    }
}

impl<'a> TryFrom<Slice<'a>> for StringRef<'a> {
    type Error = VPackError;

    fn try_from(slice: Slice<'a>) -> Result<Self, Self::Error> {
        slice.get_string_ref()
    }
}

impl AsRef<[u8]> for StringRef<'_> {
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}

impl fmt::Debug for StringRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(self.data) {
            Ok(s) => write!(f, "StringRef({s:?})"),
            Err(_) => write!(f, "StringRef({:?})", self.data),
        }
    }
}

/// Writes the bytes, replacing invalid UTF-8 sequences.
impl fmt::Display for StringRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.data.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{fffd}")?;
            }
        }
        Ok(())
    }
}
