//! Head-byte table for the binary document format.
//!
//! Every encoded value starts with one head byte. The head byte alone decides the value's type
//! and how its length is stored:
//!
//! - fixed-width scalars (`null`, booleans, small integers, doubles) carry no length field;
//! - integers store 1..8 little-endian payload bytes, the count encoded in the head;
//! - short strings encode their length (0..126) in the head, long strings use an 8-byte field;
//! - containers store their total byte length in a 1/2/4/8-byte field (or a varint for the
//!   compact forms) followed by a member count, the members and an optional index table.
//!
//! Reserved head bytes are rejected with [`ErrorCode::MalformedHeader`].

use crate::ErrorCode;

pub const NONE: u8 = 0x00;
pub const EMPTY_ARRAY: u8 = 0x01;
pub const ARRAY_UNIFORM_BASE: u8 = 0x02;
pub const ARRAY_INDEXED_BASE: u8 = 0x06;
pub const EMPTY_OBJECT: u8 = 0x0a;
pub const OBJECT_SORTED_BASE: u8 = 0x0b;
pub const OBJECT_UNSORTED_BASE: u8 = 0x0f;
pub const COMPACT_ARRAY: u8 = 0x13;
pub const COMPACT_OBJECT: u8 = 0x14;
pub const NULL: u8 = 0x18;
pub const FALSE: u8 = 0x19;
pub const TRUE: u8 = 0x1a;
pub const DOUBLE: u8 = 0x1b;
pub const INT_BASE: u8 = 0x20;
pub const UINT_BASE: u8 = 0x28;
pub const SMALL_INT_POS_BASE: u8 = 0x30;
pub const SMALL_INT_NEG_BASE: u8 = 0x3a;
pub const SHORT_STRING_BASE: u8 = 0x40;
pub const LONG_STRING: u8 = 0xbf;
pub const BINARY_BASE: u8 = 0xc0;

/// Longest string whose length fits into the head byte.
pub const MAX_SHORT_STRING: usize = 126;

/// Smallest and largest integers with a single-byte encoding.
pub const SMALL_INT_MIN: i64 = -6;
pub const SMALL_INT_MAX: i64 = 9;

/// Bytes the builder reserves for the header (head byte included) of every open container.
///
/// This is the largest header any indexed or equal-size container needs.
pub const RESERVED_HEADER: usize = 9;

/// The value types exposed by the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Head `0x00`: absent/invalid marker.
    None,
    /// Head `0x18`.
    Null,
    /// Heads `0x19`/`0x1a`.
    Bool,
    /// Head `0x1b`: IEEE-754 double.
    Double,
    /// Heads `0x20..=0x27`: signed integer.
    Int,
    /// Heads `0x28..=0x2f`: unsigned integer.
    UInt,
    /// Heads `0x30..=0x3f`: integer in `-6..=9`.
    SmallInt,
    /// Heads `0x40..=0xbf`.
    String,
    /// Heads `0xc0..=0xc7`: opaque bytes.
    Binary,
    /// Heads `0x01..=0x09` and `0x13`.
    Array,
    /// Heads `0x0a..=0x12` and `0x14`.
    Object,
}

impl ValueType {
    /// Returns `true` for `Double`, `Int`, `UInt` and `SmallInt`.
    #[must_use]
    pub const fn is_number(self) -> bool {
        matches!(self, Self::Double | Self::Int | Self::UInt | Self::SmallInt)
    }

    /// Human readable type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Double => "double",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::SmallInt => "smallint",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// A decoded head byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
    None,
    Null,
    Bool(bool),
    Double,
    Int(usize),
    UInt(usize),
    SmallInt(i64),
    ShortString(usize),
    LongString,
    Binary(usize),
    EmptyArray,
    EmptyObject,
    UniformArray(usize),
    IndexedArray(usize),
    IndexedObject { width: usize, sorted: bool },
    CompactArray,
    CompactObject,
}

/// Width in bytes of the length field selected by `head - base` (0..=3).
#[inline]
const fn width_of(step: u8) -> usize {
    1usize << step
}

impl Head {
    /// Decode a head byte; reserved values yield `MalformedHeader`.
    pub const fn decode(b: u8) -> Result<Self, ErrorCode> {
        let head = match b {
            NONE => Self::None,
            EMPTY_ARRAY => Self::EmptyArray,
            0x02..=0x05 => Self::UniformArray(width_of(b - ARRAY_UNIFORM_BASE)),
            0x06..=0x09 => Self::IndexedArray(width_of(b - ARRAY_INDEXED_BASE)),
            EMPTY_OBJECT => Self::EmptyObject,
            0x0b..=0x0e => Self::IndexedObject {
                width: width_of(b - OBJECT_SORTED_BASE),
                sorted: true,
            },
            0x0f..=0x12 => Self::IndexedObject {
                width: width_of(b - OBJECT_UNSORTED_BASE),
                sorted: false,
            },
            COMPACT_ARRAY => Self::CompactArray,
            COMPACT_OBJECT => Self::CompactObject,
            NULL => Self::Null,
            FALSE => Self::Bool(false),
            TRUE => Self::Bool(true),
            DOUBLE => Self::Double,
            0x20..=0x27 => Self::Int((b - INT_BASE) as usize + 1),
            0x28..=0x2f => Self::UInt((b - UINT_BASE) as usize + 1),
            0x30..=0x39 => Self::SmallInt((b - SMALL_INT_POS_BASE) as i64),
            0x3a..=0x3f => Self::SmallInt(b as i64 - 0x40),
            0x40..=0xbe => Self::ShortString((b - SHORT_STRING_BASE) as usize),
            LONG_STRING => Self::LongString,
            0xc0..=0xc7 => Self::Binary((b - BINARY_BASE) as usize + 1),
            _ => return Err(ErrorCode::MalformedHeader),
        };
        Ok(head)
    }

    /// The value type this head byte announces.
    pub const fn value_type(self) -> ValueType {
        match self {
            Self::None => ValueType::None,
            Self::Null => ValueType::Null,
            Self::Bool(_) => ValueType::Bool,
            Self::Double => ValueType::Double,
            Self::Int(_) => ValueType::Int,
            Self::UInt(_) => ValueType::UInt,
            Self::SmallInt(_) => ValueType::SmallInt,
            Self::ShortString(_) | Self::LongString => ValueType::String,
            Self::Binary(_) => ValueType::Binary,
            Self::EmptyArray
            | Self::UniformArray(_)
            | Self::IndexedArray(_)
            | Self::CompactArray => ValueType::Array,
            Self::EmptyObject | Self::IndexedObject { .. } | Self::CompactObject => {
                ValueType::Object
            }
        }
    }

    /// Byte size of values whose size is decided by the head byte alone.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::None
            | Self::Null
            | Self::Bool(_)
            | Self::SmallInt(_)
            | Self::EmptyArray
            | Self::EmptyObject => Some(1),
            Self::Double => Some(9),
            Self::Int(n) | Self::UInt(n) => Some(1 + n),
            Self::ShortString(len) => Some(1 + len),
            _ => None,
        }
    }
}

/// Smallest offset at which the first member of a non-compact container may start.
///
/// Builders may pad the header with zero bytes; readers skip those by probing offsets
/// 2, 3, 5 and 9 in order, never below this minimum.
pub const fn min_data_offset(head: Head) -> usize {
    match head {
        Head::UniformArray(1) => 2,
        Head::UniformArray(2) | Head::IndexedArray(1) | Head::IndexedObject { width: 1, .. } => 3,
        Head::UniformArray(4) | Head::IndexedArray(2) | Head::IndexedObject { width: 2, .. } => 5,
        _ => 9,
    }
}

/// Number of bytes needed to store `v` as an unsigned little-endian integer (1..=8).
pub const fn uint_len(v: u64) -> usize {
    let bits = 64 - v.leading_zeros() as usize;
    if bits == 0 {
        1
    } else {
        (bits + 7) / 8
    }
}

/// Number of bytes needed to store `v` as a two's complement little-endian integer (1..=8).
pub const fn int_len(v: i64) -> usize {
    let mut n = 1;
    while n < 8 {
        let shift = n * 8 - 1;
        let lo = -(1i64 << shift);
        let hi = (1i64 << shift) - 1;
        if v >= lo && v <= hi {
            return n;
        }
        n += 1;
    }
    8
}

/// Number of bytes a 7-bit varint needs for `v`.
pub const fn varint_len(mut v: u64) -> usize {
    let mut n = 1;
    while v >= 0x80 {
        v >>= 7;
        n += 1;
    }
    n
}

/// Smallest of 1/2/4/8 bytes able to hold `v`.
pub const fn width_for(v: u64) -> usize {
    if v <= 0xff {
        1
    } else if v <= 0xffff {
        2
    } else if v <= 0xffff_ffff {
        4
    } else {
        8
    }
}

/// Index 0..=3 of a 1/2/4/8 byte width, added to a head base.
pub const fn width_step(width: usize) -> u8 {
    match width {
        1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    }
}
