//! Borrowed, typed views over encoded values.

use core::fmt;

use crate::container::{Addressing, Layout};
use crate::format::{Head, ValueType};
use crate::number::{FromNumber, Number};
use crate::string_ref::StringRef;
use crate::wire::{byte_at, bytes_at, int_at, len_to_usize, uint_at, Reader};
use crate::{ErrorCode, VPackError};

/// A path element for navigating inside nested values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathElem<'p> {
    /// Select an attribute of an object.
    Key(&'p str),
    /// Select a position of an array.
    Index(usize),
}

impl<'p> From<&'p str> for PathElem<'p> {
    fn from(key: &'p str) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathElem<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A read-only view of one encoded value.
///
/// A `Slice` is a borrowed byte slice plus the offset of the value's head byte. It never owns or
/// copies data; nested values returned from lookups borrow the same buffer, truncated to the end
/// of their enclosing container. Every read is bounds-checked against that buffer, so truncated
/// or hostile input produces an error rather than an out-of-range read.
///
/// Use [`crate::validate`] once on untrusted bytes to get structural guarantees for the whole
/// document up front.
///
/// `==` compares encoded bytes, so the same value stored in two buffers is equal but two
/// encodings of one value (say, indexed and compact) are not. Use [`crate::equals`] to compare
/// values.
#[derive(Clone, Copy)]
pub struct Slice<'a> {
    data: &'a [u8],
    start: usize,
}

impl PartialEq for Slice<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_bytes(), other.as_bytes()) {
            (Ok(a), Ok(b)) => a == b,
            // Malformed values: fall back to everything from the head byte on.
            _ => self.data.get(self.start..) == other.data.get(other.start..),
        }
    }
}

impl Eq for Slice<'_> {}

impl<'a> Slice<'a> {
    /// A view of the value starting at the first byte of `data`.
    #[inline]
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, start: 0 }
    }

    /// A view of the value whose head byte is at `start`.
    #[inline]
    #[must_use]
    pub const fn with_offset(data: &'a [u8], start: usize) -> Self {
        Self { data, start }
    }

    /// Offset of the head byte within the underlying buffer.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.start
    }

    #[inline]
    pub(crate) const fn buffer(self) -> &'a [u8] {
        self.data
    }

    /// The raw head byte.
    ///
    /// # Errors
    ///
    /// Returns `BufferExhausted` if the view is empty.
    #[inline]
    pub fn head(self) -> Result<u8, VPackError> {
        byte_at(self.data, self.start)
    }

    pub(crate) fn decoded_head(self) -> Result<Head, VPackError> {
        let b = self.head()?;
        Head::decode(b).map_err(|code| VPackError::new(code, self.start))
    }

    /// The type announced by the head byte.
    ///
    /// # Errors
    ///
    /// Returns `MalformedHeader` for reserved head bytes.
    pub fn value_type(self) -> Result<ValueType, VPackError> {
        Ok(self.decoded_head()?.value_type())
    }

    fn is_type(self, ty: ValueType) -> bool {
        self.value_type().map_or(false, |t| t == ty)
    }

    /// Returns `true` for the `none` marker (`0x00`).
    #[must_use]
    pub fn is_none(self) -> bool {
        self.is_type(ValueType::None)
    }

    /// Returns `true` for `null`.
    #[must_use]
    pub fn is_null(self) -> bool {
        self.is_type(ValueType::Null)
    }

    /// Returns `true` for `true` or `false`.
    #[must_use]
    pub fn is_bool(self) -> bool {
        self.is_type(ValueType::Bool)
    }

    /// Returns `true` for any numeric type.
    #[must_use]
    pub fn is_number(self) -> bool {
        self.value_type().map_or(false, ValueType::is_number)
    }

    /// Returns `true` for strings.
    #[must_use]
    pub fn is_string(self) -> bool {
        self.is_type(ValueType::String)
    }

    /// Returns `true` for binary blobs.
    #[must_use]
    pub fn is_binary(self) -> bool {
        self.is_type(ValueType::Binary)
    }

    /// Returns `true` for arrays.
    #[must_use]
    pub fn is_array(self) -> bool {
        self.is_type(ValueType::Array)
    }

    /// Returns `true` for objects.
    #[must_use]
    pub fn is_object(self) -> bool {
        self.is_type(ValueType::Object)
    }

    /// Size of the encoded value in bytes, including its head byte.
    ///
    /// # Errors
    ///
    /// Returns `MalformedHeader` for reserved head bytes and `BufferExhausted` if the value
    /// extends past the end of the buffer.
    pub fn byte_size(self) -> Result<usize, VPackError> {
        let size = self.declared_size()?;
        let end = self
            .start
            .checked_add(size)
            .ok_or_else(|| VPackError::new(ErrorCode::LengthOverflow, self.start))?;
        if end > self.data.len() {
            return Err(VPackError::new(ErrorCode::BufferExhausted, self.start));
        }
        Ok(size)
    }

    fn declared_size(self) -> Result<usize, VPackError> {
        let head = self.decoded_head()?;
        if let Some(size) = head.fixed_size() {
            return Ok(size);
        }
        let off = self.start;
        let (size, min) = match head {
            Head::LongString => (uint_at(self.data, off + 1, 8)?.checked_add(9), 9),
            Head::Binary(w) => (uint_at(self.data, off + 1, w)?.checked_add(1 + w as u64), 1 + w),
            Head::UniformArray(w) | Head::IndexedArray(w) | Head::IndexedObject { width: w, .. } => {
                (Some(uint_at(self.data, off + 1, w)?), 1 + w)
            }
            Head::CompactArray | Head::CompactObject => {
                (Some(Reader::new(self.data, off + 1).read_varint()?), 3)
            }
            _ => return Err(VPackError::new(ErrorCode::MalformedHeader, off)),
        };
        let size = size.ok_or_else(|| VPackError::new(ErrorCode::LengthOverflow, off))?;
        let size = len_to_usize(size, off)?;
        if size < min {
            return Err(VPackError::new(ErrorCode::InconsistentLength, off));
        }
        Ok(size)
    }

    /// The encoded bytes of this value.
    ///
    /// # Errors
    ///
    /// Same as [`Slice::byte_size`].
    pub fn as_bytes(self) -> Result<&'a [u8], VPackError> {
        let size = self.byte_size()?;
        Ok(&self.data[self.start..self.start + size])
    }

    /// SHA-256 digest of the encoded bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Slice::byte_size`].
    #[cfg(feature = "sha2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "sha2")))]
    pub fn sha256(self) -> Result<[u8; 32], VPackError> {
        use sha2::{Digest, Sha256};
        let mut h = Sha256::new();
        h.update(self.as_bytes()?);
        let out = h.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(out.as_slice());
        Ok(digest)
    }

    fn mismatch(self) -> VPackError {
        VPackError::new(ErrorCode::TypeMismatch, self.start)
    }

    /// Decodes a boolean.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value is not a boolean.
    pub fn get_bool(self) -> Result<bool, VPackError> {
        match self.decoded_head()? {
            Head::Bool(b) => Ok(b),
            _ => Err(self.mismatch()),
        }
    }

    /// Decodes any numeric value in its stored representation.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value is not a number.
    pub fn number(self) -> Result<Number, VPackError> {
        let off = self.start + 1;
        match self.decoded_head()? {
            Head::SmallInt(v) => Ok(Number::Int(v)),
            Head::Int(w) => Ok(Number::Int(int_at(self.data, off, w)?)),
            Head::UInt(w) => Ok(Number::UInt(uint_at(self.data, off, w)?)),
            Head::Double => Ok(Number::Double(f64::from_bits(uint_at(self.data, off, 8)?))),
            _ => Err(self.mismatch()),
        }
    }

    /// Decodes a number into `T`, converting between representations.
    ///
    /// Integral targets accept doubles only when they hold an exact integer in range.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the value is not a number and `NumericOverflow` if `T` cannot
    /// hold it exactly.
    pub fn get_number<T: FromNumber>(self) -> Result<T, VPackError> {
        let n = self.number()?;
        T::from_number(n).map_err(|code| VPackError::new(code, self.start))
    }

    /// Decodes an integer (signed, unsigned or small) as `i64`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for doubles and non-numbers, `NumericOverflow` for unsigned
    /// values above `i64::MAX`.
    pub fn get_int(self) -> Result<i64, VPackError> {
        match self.number()? {
            Number::Double(_) => Err(self.mismatch()),
            n => self.get_number_from(n),
        }
    }

    /// Decodes an integer (signed, unsigned or small) as `u64`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for doubles and non-numbers, `NumericOverflow` for negative values.
    pub fn get_uint(self) -> Result<u64, VPackError> {
        match self.number()? {
            Number::Double(_) => Err(self.mismatch()),
            n => self.get_number_from(n),
        }
    }

    fn get_number_from<T: FromNumber>(self, n: Number) -> Result<T, VPackError> {
        T::from_number(n).map_err(|code| VPackError::new(code, self.start))
    }

    /// Decodes a double.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless the value is stored as a double.
    pub fn get_double(self) -> Result<f64, VPackError> {
        match self.number()? {
            Number::Double(d) => Ok(d),
            _ => Err(self.mismatch()),
        }
    }

    /// A view of the string bytes, without copying.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless the value is a string.
    pub fn get_string_ref(self) -> Result<StringRef<'a>, VPackError> {
        let off = self.start;
        let bytes = match self.decoded_head()? {
            Head::ShortString(len) => bytes_at(self.data, off + 1, len)?,
            Head::LongString => {
                let len = len_to_usize(uint_at(self.data, off + 1, 8)?, off)?;
                bytes_at(self.data, off + 9, len)?
            }
            _ => return Err(self.mismatch()),
        };
        Ok(StringRef::new(bytes))
    }

    /// The string as `&str`.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless the value is a string and `Utf8Invalid` if its bytes are
    /// not UTF-8.
    pub fn as_str(self) -> Result<&'a str, VPackError> {
        self.get_string_ref()?
            .to_str()
            .map_err(|_| VPackError::new(ErrorCode::Utf8Invalid, self.start))
    }

    /// The payload of a binary blob.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` unless the value is binary.
    pub fn get_binary(self) -> Result<&'a [u8], VPackError> {
        let off = self.start;
        match self.decoded_head()? {
            Head::Binary(w) => {
                let len = len_to_usize(uint_at(self.data, off + 1, w)?, off)?;
                bytes_at(self.data, off + 1 + w, len)
            }
            _ => Err(self.mismatch()),
        }
    }

    pub(crate) fn layout(self) -> Result<Layout<'a>, VPackError> {
        Layout::read(self)
    }

    /// Number of members of an array or entries of an object.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-containers.
    pub fn length(self) -> Result<usize, VPackError> {
        Ok(self.layout()?.len)
    }

    /// Returns `true` if this is an object whose index table is sorted by key.
    #[must_use]
    pub fn is_sorted(self) -> bool {
        matches!(
            self.decoded_head(),
            Ok(Head::IndexedObject { sorted: true, .. })
        )
    }

    /// The `index`-th array member, or the value of the `index`-th object entry.
    ///
    /// Sorted objects are addressed in key order; all other containers in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-containers and `IndexOutOfBounds` if
    /// `index >= length()`.
    pub fn at(self, index: usize) -> Result<Self, VPackError> {
        let layout = self.layout()?;
        let pos = layout.member_offset(index)?;
        if layout.is_object {
            Ok(layout.entry(pos)?.1)
        } else {
            layout.value(pos)
        }
    }

    fn entry_at(self, index: usize) -> Result<(Self, Self), VPackError> {
        let layout = self.layout()?;
        if !layout.is_object {
            return Err(self.mismatch());
        }
        layout.entry(layout.member_offset(index)?)
    }

    /// The key of the `index`-th object entry.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-objects and `IndexOutOfBounds` if `index >= length()`.
    pub fn key_at(self, index: usize) -> Result<Self, VPackError> {
        Ok(self.entry_at(index)?.0)
    }

    /// The value of the `index`-th object entry.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for non-objects and `IndexOutOfBounds` if `index >= length()`.
    pub fn value_at(self, index: usize) -> Result<Self, VPackError> {
        Ok(self.entry_at(index)?.1)
    }

    /// Looks up an attribute of an object.
    ///
    /// Objects with a sorted index table are binary searched; all others are scanned in
    /// insertion order. With duplicate keys the first entry in index-table order wins.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if this is not an object or a key is not a string.
    pub fn get<'k>(self, name: impl Into<StringRef<'k>>) -> Result<Option<Self>, VPackError> {
        let name = name.into();
        let layout = self.layout()?;
        if !layout.is_object {
            return Err(self.mismatch());
        }
        match layout.addressing {
            Addressing::Empty => Ok(None),
            Addressing::Indexed { sorted: true, .. } => binary_search(&layout, name),
            _ => {
                let mut cursor = Cursor::new(layout);
                while let Some(pos) = cursor.next_pos() {
                    let (key, value) = layout.entry(pos?)?;
                    if key.get_string_ref()?.equals(name) {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }
        }
    }

    /// Returns `true` if the object has an attribute `name`.
    ///
    /// # Errors
    ///
    /// Same as [`Slice::get`].
    pub fn has_key<'k>(self, name: impl Into<StringRef<'k>>) -> Result<bool, VPackError> {
        Ok(self.get(name)?.is_some())
    }

    /// Follows a path of keys and indices.
    ///
    /// Returns `Ok(None)` if a key is missing or an index is out of range.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if a step meets a value of the wrong kind.
    pub fn get_path(self, path: &[PathElem<'_>]) -> Result<Option<Self>, VPackError> {
        let mut cur = self;
        for elem in path {
            match *elem {
                PathElem::Key(k) => match cur.get(k)? {
                    Some(v) => cur = v,
                    None => return Ok(None),
                },
                PathElem::Index(i) => {
                    let layout = cur.layout()?;
                    if layout.is_object {
                        return Err(cur.mismatch());
                    }
                    if i >= layout.len {
                        return Ok(None);
                    }
                    cur = layout.value(layout.member_offset(i)?)?;
                }
            }
        }
        Ok(Some(cur))
    }

    /// Iterates the members of an array.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if this is not an array.
    pub fn array_iter(self) -> Result<ArrayIter<'a>, VPackError> {
        let layout = self.layout()?;
        if layout.is_object {
            return Err(self.mismatch());
        }
        Ok(ArrayIter {
            cursor: Cursor::new(layout),
        })
    }

    /// Iterates the entries of an object in index-table order.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if this is not an object.
    pub fn object_iter(self) -> Result<ObjectIter<'a>, VPackError> {
        let layout = self.layout()?;
        if !layout.is_object {
            return Err(self.mismatch());
        }
        Ok(ObjectIter {
            cursor: Cursor::new(layout),
        })
    }
}

fn binary_search<'a>(
    layout: &Layout<'a>,
    name: StringRef<'_>,
) -> Result<Option<Slice<'a>>, VPackError> {
    let key_at = |i: usize| -> Result<(StringRef<'a>, Slice<'a>), VPackError> {
        let (key, value) = layout.entry(layout.member_offset(i)?)?;
        Ok((key.get_string_ref()?, value))
    };

    let (mut lo, mut hi) = (0, layout.len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let (key, value) = key_at(mid)?;
        match key.compare(name) {
            core::cmp::Ordering::Less => lo = mid + 1,
            core::cmp::Ordering::Greater => hi = mid,
            core::cmp::Ordering::Equal => {
                let mut found = value;
                let mut i = mid;
                while i > lo {
                    let (prev_key, prev_value) = key_at(i - 1)?;
                    if !prev_key.equals(name) {
                        break;
                    }
                    found = prev_value;
                    i -= 1;
                }
                return Ok(Some(found));
            }
        }
    }
    Ok(None)
}

/// Walks member positions: through the index table when there is one, sequentially otherwise.
#[derive(Debug, Clone)]
struct Cursor<'a> {
    layout: Layout<'a>,
    index: usize,
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(layout: Layout<'a>) -> Self {
        Self {
            pos: layout.first,
            layout,
            index: 0,
        }
    }

    fn next_pos(&mut self) -> Option<Result<usize, VPackError>> {
        if self.index >= self.layout.len {
            return None;
        }
        let res = match self.layout.addressing {
            Addressing::Indexed { .. } => self.layout.member_offset(self.index),
            _ => {
                let pos = self.pos;
                self.layout.skip_member(pos).map(|next| {
                    self.pos = next;
                    pos
                })
            }
        };
        self.index = if res.is_ok() {
            self.index + 1
        } else {
            self.layout.len
        };
        Some(res)
    }

    const fn remaining(&self) -> usize {
        self.layout.len - self.index
    }
}

/// Iterator over array members, created by [`Slice::array_iter`].
///
/// Yields an error once and then stops if a member is malformed.
#[derive(Debug, Clone)]
pub struct ArrayIter<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Iterator for ArrayIter<'a> {
    type Item = Result<Slice<'a>, VPackError>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.cursor.next_pos()?;
        Some(pos.and_then(|p| self.cursor.layout.value(p)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.remaining()))
    }
}

/// Iterator over object entries, created by [`Slice::object_iter`].
#[derive(Debug, Clone)]
pub struct ObjectIter<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = Result<(StringRef<'a>, Slice<'a>), VPackError>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.cursor.next_pos()?;
        let layout = self.cursor.layout;
        Some(pos.and_then(|p| {
            let (key, value) = layout.entry(p)?;
            Ok((key.get_string_ref()?, value))
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.remaining()))
    }
}

impl fmt::Debug for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Slice");
        d.field("offset", &self.start);
        match self.value_type() {
            Ok(ty) => d.field("type", &ty.name()),
            Err(e) => d.field("error", &e.code),
        };
        d.finish()
    }
}
