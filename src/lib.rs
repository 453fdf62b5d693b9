//! # vpack
//!
//! A compact, self-describing binary document format for JSON-like values, read in place
//! without parsing.
//!
//! ## Design principles
//!
//! - **Zero-copy reads.**
//!   A [`Slice`] is a borrowed view over encoded bytes. Member lookup, string access and
//!   comparison read the buffer directly; nothing is materialized.
//! - **Lookup strategy comes from the data.**
//!   Containers carry an index table (or equal-size members) so [`Slice::at`] is O(1) and
//!   [`Slice::get`] is a binary search when object keys are sorted. Small containers use a
//!   compact form that is scanned linearly.
//! - **Encoding is incremental.**
//!   [`Builder`] appends values in document order and picks the smallest header and index
//!   width when each container is closed.
//!
//! ## Format
//!
//! Every value starts with a head byte that fixes its type and how its length is stored:
//! `null`, booleans, small integers `-6..=9`, signed/unsigned integers of 1..8 bytes, doubles,
//! strings, binary blobs, arrays and objects. Container lengths and index-table entries are
//! 1, 2, 4 or 8 bytes wide, chosen per container. Reserved head bytes are rejected with
//! [`ErrorCode::MalformedHeader`].
//!
//! ```
//! use vpack::Builder;
//!
//! let mut b = Builder::new();
//! b.open_array()?;
//! for i in 0..1000 {
//!     b.add(i)?;
//! }
//! b.close()?;
//! let buf = b.finish()?;
//!
//! let root = buf.slice();
//! assert_eq!(root.length()?, 1000);
//! assert_eq!(root.at(500)?.get_int()?, 500);
//! # Ok::<(), vpack::VPackError>(())
//! ```
//!
//! ## Untrusted input
//!
//! [`Slice`] accessors bounds-check every read, so malformed bytes produce errors rather than
//! out-of-range reads. Use [`validate`] with [`DecodeLimits`] to check a whole document
//! (consistent lengths, no trailing bytes, depth and size limits) before handing it on.
//!
//! ## Feature flags
//!
//! - `std` *(default)*: implements `std::error::Error` for [`VPackError`].
//! - `sha2` *(default)*: enables SHA-256 fingerprints of encoded bytes.
//! - `serde`: `Serialize` for [`Slice`]/[`Buffer`], plus [`to_buffer`] and [`from_slice`].
//! - `simdutf8`: enables SIMD-accelerated UTF-8 validation where supported.
//!
//! ## `no_std`
//!
//! The crate is `no_std` compatible and needs an allocator for [`Builder`] and [`Buffer`].
//! Logging goes through `tracing` macros; no subscriber is installed.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

extern crate alloc;

mod alloc_util;
mod buffer;
mod builder;
mod compare;
mod container;
mod dump;
mod error;
mod format;
pub mod harness;
mod json;
mod limits;
mod macros;
mod number;
mod options;
#[cfg(feature = "serde")]
mod serde_impl;
mod slice;
mod string_ref;
mod validate;
mod wire;

pub use crate::buffer::Buffer;
pub use crate::builder::{Builder, Value};
pub use crate::compare::{compare, equals};
pub use crate::dump::to_json_string;
pub use crate::error::{ErrorCode, ErrorKind, VPackError};
pub use crate::format::ValueType;
pub use crate::json::Json;
pub use crate::limits::{DecodeLimits, DEFAULT_MAX_CONTAINER_LEN, DEFAULT_MAX_DEPTH};
pub use crate::number::{FromNumber, Number};
pub use crate::options::{BuilderOptions, DEFAULT_COMPACT_THRESHOLD};
pub use crate::slice::{ArrayIter, ObjectIter, PathElem, Slice};
pub use crate::string_ref::StringRef;
pub use crate::validate::validate;

#[cfg(feature = "serde")]
pub use crate::serde_impl::{from_bytes, from_slice, to_buffer, to_buffer_with};

/// Construct a path slice for [`Slice::get_path`].
///
/// ```
/// # use vpack::{path, vpack};
/// let buf = vpack!({ a: [10, { b: "x" }] })?;
/// let hit = buf.slice().get_path(path!("a", 1usize, "b"))?;
/// assert_eq!(hit.map(|s| s.as_str()).transpose()?, Some("x"));
/// # Ok::<(), vpack::VPackError>(())
/// ```
#[macro_export]
macro_rules! path {
    ($($seg:expr),* $(,)?) => {
        &[$($crate::__path_elem!($seg)),*]
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __path_elem {
    ($seg:expr) => {
        $crate::PathElem::from($seg)
    };
}
