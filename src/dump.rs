//! JSON text rendering of encoded values.

use alloc::string::String;
use core::fmt::{self, Write};

use crate::format::ValueType;
use crate::limits::nest;
use crate::number::Number;
use crate::{ErrorCode, Slice, StringRef, VPackError};

enum Fault {
    Fmt,
    Decode(VPackError),
}

impl From<fmt::Error> for Fault {
    fn from(_: fmt::Error) -> Self {
        Self::Fmt
    }
}

impl From<VPackError> for Fault {
    fn from(e: VPackError) -> Self {
        Self::Decode(e)
    }
}

/// Render `slice` as compact JSON text.
///
/// Binary values become lowercase hex strings, non-finite doubles become `null`, and invalid
/// UTF-8 inside strings is replaced with U+FFFD.
///
/// # Errors
///
/// Returns a decode error if the value is malformed, `TypeMismatch` for the `none` marker and
/// `DepthLimitExceeded` past [`crate::DEFAULT_MAX_DEPTH`] nested containers.
pub fn to_json_string(slice: Slice<'_>) -> Result<String, VPackError> {
    let mut out = String::new();
    match write_value(&mut out, slice, 0) {
        Ok(()) => Ok(out),
        Err(Fault::Decode(e)) => Err(e),
        Err(Fault::Fmt) => Err(VPackError::new(ErrorCode::AllocationFailed, slice.offset())),
    }
}

/// Writes JSON text; a malformed value surfaces as `fmt::Error`.
impl fmt::Display for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, *self, 0).map_err(|_| fmt::Error)
    }
}

fn write_value<W: Write>(out: &mut W, v: Slice<'_>, depth: usize) -> Result<(), Fault> {
    match v.value_type()? {
        ValueType::None => {
            return Err(Fault::Decode(VPackError::new(
                ErrorCode::TypeMismatch,
                v.offset(),
            )))
        }
        ValueType::Null => out.write_str("null")?,
        ValueType::Bool => out.write_str(if v.get_bool()? { "true" } else { "false" })?,
        ValueType::Double | ValueType::Int | ValueType::UInt | ValueType::SmallInt => {
            write_number(out, v.number()?)?;
        }
        ValueType::String => write_escaped(out, v.get_string_ref()?)?,
        ValueType::Binary => {
            out.write_char('"')?;
            for b in v.get_binary()? {
                write!(out, "{b:02x}")?;
            }
            out.write_char('"')?;
        }
        ValueType::Array => {
            let depth = nest(depth, v.offset())?;
            out.write_char('[')?;
            for (i, member) in v.array_iter()?.enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_value(out, member?, depth)?;
            }
            out.write_char(']')?;
        }
        ValueType::Object => {
            let depth = nest(depth, v.offset())?;
            out.write_char('{')?;
            for (i, entry) in v.object_iter()?.enumerate() {
                let (key, value) = entry?;
                if i > 0 {
                    out.write_char(',')?;
                }
                write_escaped(out, key)?;
                out.write_char(':')?;
                write_value(out, value, depth)?;
            }
            out.write_char('}')?;
        }
    }
    Ok(())
}

fn write_number<W: Write>(out: &mut W, n: Number) -> fmt::Result {
    match n {
        Number::Int(i) => write!(out, "{i}"),
        Number::UInt(u) => write!(out, "{u}"),
        Number::Double(d) if !d.is_finite() => out.write_str("null"),
        Number::Double(d) => write!(out, "{d}"),
    }
}

fn write_escaped<W: Write>(out: &mut W, s: StringRef<'_>) -> fmt::Result {
    out.write_char('"')?;
    for chunk in s.as_bytes().utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '"' => out.write_str("\\\"")?,
                '\\' => out.write_str("\\\\")?,
                '\n' => out.write_str("\\n")?,
                '\r' => out.write_str("\\r")?,
                '\t' => out.write_str("\\t")?,
                '\u{08}' => out.write_str("\\b")?,
                '\u{0c}' => out.write_str("\\f")?,
                c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
                c => out.write_char(c)?,
            }
        }
        if !chunk.invalid().is_empty() {
            out.write_char('\u{fffd}')?;
        }
    }
    out.write_char('"')
}
