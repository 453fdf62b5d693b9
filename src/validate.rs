use alloc::vec::Vec;

use tracing::debug;

use crate::alloc_util::try_reserve;
use crate::container::{Addressing, Layout};
use crate::format::{Head, ValueType};
use crate::{DecodeLimits, ErrorCode, Slice, VPackError};

/// Validate that `bytes` contain exactly one well-formed value and return its root [`Slice`].
///
/// Beyond what the lazy [`Slice`] accessors check, this walks the whole document and verifies
/// that every container's header, members and index table agree, that no bytes follow the
/// value, and that the document stays within `limits`.
///
/// # Errors
///
/// Returns the first problem found: a decode error (`MalformedHeader`, `BufferExhausted`, ...)
/// or a validation error (`InconsistentLength`, `TrailingBytes`, `DepthLimitExceeded`,
/// `InputTooLarge`, `DuplicateAttribute`).
pub fn validate(bytes: &[u8], limits: DecodeLimits) -> Result<Slice<'_>, VPackError> {
    validate_root(bytes, limits).map_err(|e| {
        debug!(code = ?e.code, offset = e.offset, "validation failed");
        e
    })
}

fn validate_root(bytes: &[u8], limits: DecodeLimits) -> Result<Slice<'_>, VPackError> {
    if bytes.len() > limits.max_input_bytes {
        return Err(VPackError::new(ErrorCode::InputTooLarge, 0));
    }
    let root = Slice::new(bytes);
    let walker = Walker { limits };
    walker.check_value(root, 0)?;
    let end = root.byte_size()?;
    if end != bytes.len() {
        return Err(VPackError::new(ErrorCode::TrailingBytes, end));
    }
    Ok(root)
}

#[inline]
const fn inconsistent(off: usize) -> VPackError {
    VPackError::new(ErrorCode::InconsistentLength, off)
}

struct Walker {
    limits: DecodeLimits,
}

impl Walker {
    const fn enforce_len(&self, len: usize, off: usize) -> Result<(), VPackError> {
        if len > self.limits.max_string_len {
            return Err(VPackError::new(ErrorCode::InputTooLarge, off));
        }
        Ok(())
    }

    fn check_value(&self, v: Slice<'_>, depth: usize) -> Result<(), VPackError> {
        let off = v.offset();
        let head = v.decoded_head()?;
        match head {
            Head::None => Err(VPackError::new(ErrorCode::MalformedHeader, off)),
            Head::ShortString(_) | Head::LongString => {
                let s = v.get_string_ref()?;
                self.enforce_len(s.len(), off)?;
                if self.limits.check_utf8 {
                    s.to_str()
                        .map_err(|_| VPackError::new(ErrorCode::Utf8Invalid, off))?;
                }
                Ok(())
            }
            Head::Binary(_) => self.enforce_len(v.get_binary()?.len(), off),
            h if matches!(h.value_type(), ValueType::Array | ValueType::Object) => {
                self.check_container(v, depth + 1)
            }
            _ => v.byte_size().map(|_| ()),
        }
    }

    fn check_container(&self, v: Slice<'_>, depth: usize) -> Result<(), VPackError> {
        let off = v.offset();
        if depth > self.limits.max_depth {
            return Err(VPackError::new(ErrorCode::DepthLimitExceeded, off));
        }
        let layout = v.layout()?;
        if layout.len > self.limits.max_container_len {
            return Err(VPackError::new(ErrorCode::InputTooLarge, off));
        }

        let (sorted, in_order) = match layout.addressing {
            Addressing::Empty => return Ok(()),
            Addressing::Indexed { sorted, .. } => (sorted, !sorted),
            Addressing::Uniform { .. } | Addressing::Compact => (false, false),
        };

        // Sorted tables may point at members in any order; keep member starts to check them.
        let mut starts: Vec<usize> = Vec::new();
        if sorted {
            try_reserve(&mut starts, layout.len, off)?;
        }

        let mut pos = layout.first;
        for i in 0..layout.len {
            if in_order && layout.member_offset(i)? != pos {
                return Err(inconsistent(pos));
            }
            if sorted {
                starts.push(pos);
            }
            if layout.is_object {
                let (key, value) = layout.entry(pos)?;
                if !key.is_string() {
                    return Err(VPackError::new(ErrorCode::TypeMismatch, pos));
                }
                self.check_value(key, depth)?;
                self.check_value(value, depth)?;
            } else {
                let member = layout.value(pos)?;
                if let Addressing::Uniform { stride } = layout.addressing {
                    if member.byte_size()? != stride {
                        return Err(inconsistent(pos));
                    }
                }
                self.check_value(member, depth)?;
            }
            pos = layout.skip_member(pos)?;
        }
        if pos != layout.members_end {
            return Err(inconsistent(pos));
        }

        if sorted {
            check_sorted_table(&layout, &starts)?;
        }
        if layout.is_object && !self.limits.allow_duplicate_attributes {
            check_unique_keys(&layout)?;
        }
        Ok(())
    }
}

/// Every table entry must point at a member start, in non-decreasing key order.
fn check_sorted_table(layout: &Layout<'_>, starts: &[usize]) -> Result<(), VPackError> {
    let mut prev: Option<(&[u8], usize)> = None;
    for i in 0..layout.len {
        let at = layout.member_offset(i)?;
        if starts.binary_search(&at).is_err() {
            return Err(inconsistent(at));
        }
        let key = layout.value(at)?.get_string_ref()?.as_bytes();
        if let Some((prev_key, prev_at)) = prev {
            let ordered = match prev_key.cmp(key) {
                core::cmp::Ordering::Less => true,
                core::cmp::Ordering::Equal => prev_at < at,
                core::cmp::Ordering::Greater => false,
            };
            if !ordered {
                return Err(inconsistent(at));
            }
        }
        prev = Some((key, at));
    }
    Ok(())
}

fn check_unique_keys(layout: &Layout<'_>) -> Result<(), VPackError> {
    let mut keys: Vec<(&[u8], usize)> = Vec::new();
    try_reserve(&mut keys, layout.len, layout.base)?;
    let mut pos = layout.first;
    for _ in 0..layout.len {
        keys.push((layout.value(pos)?.get_string_ref()?.as_bytes(), pos));
        pos = layout.skip_member(pos)?;
    }
    keys.sort_unstable();
    for pair in keys.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(VPackError::new(ErrorCode::DuplicateAttribute, pair[1].1));
        }
    }
    Ok(())
}
