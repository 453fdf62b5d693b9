//! Fallible growth for the buffers the crate owns.
//!
//! Every allocation on a decode or build path goes through here so that hostile lengths and
//! out-of-memory conditions surface as errors carrying the offending offset.

use alloc::vec::Vec;
use core::alloc::Layout;

use crate::{ErrorCode, VPackError};

/// Make room for `additional` more elements.
///
/// `LengthOverflow` if the total would not fit a valid allocation, `AllocationFailed` if the
/// allocator refuses.
#[inline]
pub fn try_reserve<T>(v: &mut Vec<T>, additional: usize, offset: usize) -> Result<(), VPackError> {
    if v.capacity() - v.len() >= additional {
        return Ok(());
    }
    let representable = v
        .len()
        .checked_add(additional)
        .is_some_and(|total| Layout::array::<T>(total).is_ok());
    if !representable {
        return Err(VPackError::new(ErrorCode::LengthOverflow, offset));
    }
    v.try_reserve(additional)
        .map_err(|_| VPackError::new(ErrorCode::AllocationFailed, offset))
}

/// Owned copy of `bytes`.
#[inline]
pub fn try_copy(bytes: &[u8], offset: usize) -> Result<Vec<u8>, VPackError> {
    let mut v = Vec::new();
    try_reserve(&mut v, bytes.len(), offset)?;
    v.extend_from_slice(bytes);
    Ok(v)
}
