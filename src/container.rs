//! Decoding of array/object headers and index tables.
//!
//! A container's header decides how members are located. [`Layout`] captures that decision
//! once so that `at`, `get` and iteration only branch on [`Addressing`].

use crate::format::{min_data_offset, Head};
use crate::slice::Slice;
use crate::wire::{byte_at, len_to_usize, uint_at, varint_reverse_at, Reader};
use crate::{ErrorCode, VPackError};

/// How members of a container are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// No members (`0x01`, `0x0a`).
    Empty,
    /// Equal-size members at `data_offset + i * stride`.
    Uniform { stride: usize },
    /// Offsets read from an index table of `width`-byte entries starting at `table`.
    Indexed {
        width: usize,
        table: usize,
        sorted: bool,
    },
    /// Members only reachable by walking from the first one.
    Compact,
}

/// Decoded container header.
///
/// All offsets are absolute positions in the buffer the container was read from.
#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
    /// Buffer truncated to the container's declared end.
    pub data: &'a [u8],
    pub base: usize,
    /// First member.
    pub first: usize,
    /// One past the last member byte (start of the index table or trailing count).
    pub members_end: usize,
    pub len: usize,
    pub is_object: bool,
    pub addressing: Addressing,
}

#[inline]
const fn inconsistent(off: usize) -> VPackError {
    VPackError::new(ErrorCode::InconsistentLength, off)
}

/// First non-padding offset of a non-compact container, relative to `base`.
fn data_offset(data: &[u8], base: usize, head: Head, size: usize) -> Result<usize, VPackError> {
    let min = min_data_offset(head);
    for candidate in [2usize, 3, 5] {
        if candidate < min || candidate >= size {
            continue;
        }
        if byte_at(data, base + candidate)? != 0 {
            return Ok(candidate);
        }
    }
    Ok(9)
}

impl<'a> Layout<'a> {
    /// Decode the header of the container `slice` points at.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-containers, `BufferExhausted` when the container extends past the
    /// buffer, and `InconsistentLength` when header, members and index table disagree.
    pub fn read(slice: Slice<'a>) -> Result<Self, VPackError> {
        let head = slice.decoded_head()?;
        let base = slice.offset();
        let is_object = match head.value_type() {
            crate::ValueType::Array => false,
            crate::ValueType::Object => true,
            _ => return Err(VPackError::new(ErrorCode::TypeMismatch, base)),
        };
        let size = slice.byte_size()?;
        let end = base + size;
        let data = &slice.buffer()[..end];

        let mut layout = Self {
            data,
            base,
            first: end,
            members_end: end,
            len: 0,
            is_object,
            addressing: Addressing::Empty,
        };

        match head {
            Head::EmptyArray | Head::EmptyObject => {}
            Head::UniformArray(w) => {
                if size <= 1 + w {
                    return Err(inconsistent(base));
                }
                let off = data_offset(data, base, head, size)?;
                if off >= size {
                    return Err(inconsistent(base));
                }
                let first = base + off;
                let stride = Slice::with_offset(data, first).byte_size()?;
                let body = size - off;
                if body % stride != 0 {
                    return Err(inconsistent(base));
                }
                layout.first = first;
                layout.len = body / stride;
                layout.addressing = Addressing::Uniform { stride };
            }
            Head::IndexedArray(w) | Head::IndexedObject { width: w, .. } => {
                let (count, tail) = if w == 8 {
                    let at = end.checked_sub(8).ok_or_else(|| inconsistent(base))?;
                    (uint_at(data, at, 8)?, 8)
                } else {
                    (uint_at(data, base + 1 + w, w)?, 0)
                };
                let count = len_to_usize(count, base)?;
                if count == 0 {
                    return Err(inconsistent(base));
                }
                let table_len = count.checked_mul(w).ok_or_else(|| inconsistent(base))?;
                let table = size
                    .checked_sub(tail)
                    .and_then(|s| s.checked_sub(table_len))
                    .ok_or_else(|| inconsistent(base))?;
                let off = data_offset(data, base, head, size)?;
                if off > table {
                    return Err(inconsistent(base));
                }
                let sorted = matches!(head, Head::IndexedObject { sorted: true, .. });
                layout.first = base + off;
                layout.members_end = base + table;
                layout.len = count;
                layout.addressing = Addressing::Indexed {
                    width: w,
                    table: base + table,
                    sorted,
                };
            }
            Head::CompactArray | Head::CompactObject => {
                let mut r = Reader::new(data, base + 1);
                r.read_varint()?;
                let first = r.position();
                let (count, nbytes) = varint_reverse_at(data, end - 1)?;
                let members_end = end - nbytes;
                if members_end < first {
                    return Err(inconsistent(base));
                }
                // Every member takes at least one byte.
                let len = len_to_usize(count, base)?;
                if len > members_end - first {
                    return Err(inconsistent(base));
                }
                layout.first = first;
                layout.members_end = members_end;
                layout.len = len;
                layout.addressing = Addressing::Compact;
            }
            _ => return Err(VPackError::new(ErrorCode::TypeMismatch, base)),
        }
        Ok(layout)
    }

    /// Absolute offset of the `index`-th member (for objects: its key).
    ///
    /// # Errors
    ///
    /// `IndexOutOfBounds` if `index >= len`, `InconsistentLength` if the index table points
    /// outside the member area.
    pub fn member_offset(&self, index: usize) -> Result<usize, VPackError> {
        if index >= self.len {
            return Err(VPackError::new(ErrorCode::IndexOutOfBounds, self.base));
        }
        match self.addressing {
            Addressing::Empty => Err(VPackError::new(ErrorCode::IndexOutOfBounds, self.base)),
            Addressing::Uniform { stride } => Ok(self.first + index * stride),
            Addressing::Indexed { width, table, .. } => {
                let rel = uint_at(self.data, table + index * width, width)?;
                let rel = len_to_usize(rel, table)?;
                let abs = self.base.checked_add(rel).ok_or_else(|| inconsistent(table))?;
                if abs < self.first || abs >= self.members_end {
                    return Err(inconsistent(table + index * width));
                }
                Ok(abs)
            }
            Addressing::Compact => {
                let mut pos = self.first;
                for _ in 0..index {
                    pos = self.skip_member(pos)?;
                }
                Ok(pos)
            }
        }
    }

    /// Offset just past the member (key and value, for objects) starting at `pos`.
    pub fn skip_member(&self, pos: usize) -> Result<usize, VPackError> {
        let mut next = self.skip_value(pos)?;
        if self.is_object {
            next = self.skip_value(next)?;
        }
        Ok(next)
    }

    fn skip_value(&self, pos: usize) -> Result<usize, VPackError> {
        if pos >= self.members_end {
            return Err(inconsistent(pos));
        }
        let size = Slice::with_offset(self.data, pos).byte_size()?;
        let next = pos + size;
        if next > self.members_end {
            return Err(inconsistent(pos));
        }
        Ok(next)
    }

    /// The value starting at `pos`, bounded by this container.
    pub fn value(&self, pos: usize) -> Result<Slice<'a>, VPackError> {
        let end = self.skip_value(pos)?;
        Ok(Slice::with_offset(&self.data[..end], pos))
    }

    /// Key and value slices of the object entry starting at `pos`.
    pub fn entry(&self, pos: usize) -> Result<(Slice<'a>, Slice<'a>), VPackError> {
        let key = self.value(pos)?;
        let value_pos = pos + key.byte_size()?;
        Ok((key, self.value(value_pos)?))
    }
}
