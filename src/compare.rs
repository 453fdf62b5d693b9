//! Total order over encoded values.

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::alloc_util::try_reserve;
use crate::format::ValueType;
use crate::limits::nest;
use crate::{Slice, StringRef, VPackError};

const fn rank(ty: ValueType) -> u8 {
    match ty {
        ValueType::None => 0,
        ValueType::Null => 1,
        ValueType::Bool => 2,
        ValueType::Double | ValueType::Int | ValueType::UInt | ValueType::SmallInt => 3,
        ValueType::String => 4,
        ValueType::Binary => 5,
        ValueType::Array => 6,
        ValueType::Object => 7,
    }
}

/// Compares two values without decoding them into a tree.
///
/// Values of different types order as `none < null < bool < number < string < binary < array
/// < object`. Numbers compare by value across integer and double encodings (NaN above all other
/// numbers), strings and binaries byte-wise, arrays member by member and then by length.
/// Objects compare their entries sorted by key (key first, then value), then by length, so
/// two objects with the same attributes are equal regardless of insertion order or layout.
///
/// # Errors
///
/// Returns a decode error if either value is malformed, and `DepthLimitExceeded` when
/// containers nest deeper than [`crate::DEFAULT_MAX_DEPTH`].
pub fn compare(a: Slice<'_>, b: Slice<'_>) -> Result<Ordering, VPackError> {
    compare_at(a, b, 0)
}

fn compare_at(a: Slice<'_>, b: Slice<'_>, depth: usize) -> Result<Ordering, VPackError> {
    let (ta, tb) = (a.value_type()?, b.value_type()?);
    let by_rank = rank(ta).cmp(&rank(tb));
    if by_rank != Ordering::Equal {
        return Ok(by_rank);
    }
    match ta {
        ValueType::None | ValueType::Null => Ok(Ordering::Equal),
        ValueType::Bool => Ok(a.get_bool()?.cmp(&b.get_bool()?)),
        ValueType::Double | ValueType::Int | ValueType::UInt | ValueType::SmallInt => {
            Ok(a.number()?.total_cmp(b.number()?))
        }
        ValueType::String => Ok(a.get_string_ref()?.compare(b.get_string_ref()?)),
        ValueType::Binary => Ok(a.get_binary()?.cmp(b.get_binary()?)),
        ValueType::Array => compare_arrays(a, b, nest(depth, a.offset())?),
        ValueType::Object => compare_objects(a, b, nest(depth, a.offset())?),
    }
}

/// Returns `true` iff [`compare`] reports `Equal`.
///
/// # Errors
///
/// Returns a decode error if either value is malformed.
pub fn equals(a: Slice<'_>, b: Slice<'_>) -> Result<bool, VPackError> {
    Ok(compare(a, b)? == Ordering::Equal)
}

fn compare_arrays(a: Slice<'_>, b: Slice<'_>, depth: usize) -> Result<Ordering, VPackError> {
    let mut ia = a.array_iter()?;
    let mut ib = b.array_iter()?;
    loop {
        match (ia.next(), ib.next()) {
            (Some(x), Some(y)) => {
                let ord = compare_at(x?, y?, depth)?;
                if ord != Ordering::Equal {
                    return Ok(ord);
                }
            }
            (Some(x), None) => {
                x?;
                return Ok(Ordering::Greater);
            }
            (None, Some(y)) => {
                y?;
                return Ok(Ordering::Less);
            }
            (None, None) => return Ok(Ordering::Equal),
        }
    }
}

fn sorted_entries(obj: Slice<'_>) -> Result<Vec<(StringRef<'_>, Slice<'_>)>, VPackError> {
    let mut entries = Vec::new();
    try_reserve(&mut entries, obj.length()?, obj.offset())?;
    for entry in obj.object_iter()? {
        entries.push(entry?);
    }
    if !obj.is_sorted() {
        entries.sort_by(|x, y| x.0.compare(y.0));
    }
    Ok(entries)
}

fn compare_objects(a: Slice<'_>, b: Slice<'_>, depth: usize) -> Result<Ordering, VPackError> {
    let ea = sorted_entries(a)?;
    let eb = sorted_entries(b)?;
    for ((ka, va), (kb, vb)) in ea.iter().zip(eb.iter()) {
        let ord = ka.compare(*kb);
        if ord != Ordering::Equal {
            return Ok(ord);
        }
        let ord = compare_at(*va, *vb, depth)?;
        if ord != Ordering::Equal {
            return Ok(ord);
        }
    }
    Ok(ea.len().cmp(&eb.len()))
}
