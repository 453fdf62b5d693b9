use crate::{ErrorCode, VPackError};

#[inline]
const fn exhausted(off: usize) -> VPackError {
    VPackError::new(ErrorCode::BufferExhausted, off)
}

/// Bounds-checked little-endian reads at absolute offsets.
#[derive(Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub const fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8, VPackError> {
        let b = byte_at(self.data, self.pos)?;
        self.pos += 1;
        Ok(b)
    }

    /// Reads a forward 7-bit varint.
    pub fn read_varint(&mut self) -> Result<u64, VPackError> {
        let off = self.pos;
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let b = self.read_u8()?;
            if shift >= 64 || (shift == 63 && (b & 0x7f) > 1) {
                return Err(VPackError::new(ErrorCode::LengthOverflow, off));
            }
            value |= u64::from(b & 0x7f) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }
}

#[inline]
pub fn byte_at(data: &[u8], off: usize) -> Result<u8, VPackError> {
    data.get(off).copied().ok_or_else(|| exhausted(off))
}

#[inline]
pub fn bytes_at(data: &[u8], off: usize, n: usize) -> Result<&[u8], VPackError> {
    let end = off
        .checked_add(n)
        .ok_or_else(|| VPackError::new(ErrorCode::LengthOverflow, off))?;
    data.get(off..end).ok_or_else(|| exhausted(off))
}

/// Reads a `width`-byte (1..=8) little-endian unsigned integer at `off`.
pub fn uint_at(data: &[u8], off: usize, width: usize) -> Result<u64, VPackError> {
    debug_assert!((1..=8).contains(&width));
    let s = bytes_at(data, off, width)?;
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(s);
    Ok(u64::from_le_bytes(buf))
}

/// Reads a `width`-byte (1..=8) little-endian two's complement integer at `off`.
pub fn int_at(data: &[u8], off: usize, width: usize) -> Result<i64, VPackError> {
    let raw = uint_at(data, off, width)?;
    let shift = 64 - 8 * width as u32;
    #[allow(clippy::cast_possible_wrap)]
    let v = ((raw << shift) as i64) >> shift;
    Ok(v)
}

/// Reads a varint stored backwards, ending at byte `last` (inclusive).
///
/// Returns the value and the number of bytes it occupied.
pub fn varint_reverse_at(data: &[u8], last: usize) -> Result<(u64, usize), VPackError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut pos = last;
    loop {
        let b = byte_at(data, pos)?;
        if shift >= 64 || (shift == 63 && (b & 0x7f) > 1) {
            return Err(VPackError::new(ErrorCode::LengthOverflow, last));
        }
        value |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            return Ok((value, last - pos + 1));
        }
        shift += 7;
        pos = pos.checked_sub(1).ok_or_else(|| exhausted(last))?;
    }
}

pub fn len_to_usize(len: u64, off: usize) -> Result<usize, VPackError> {
    usize::try_from(len).map_err(|_| VPackError::new(ErrorCode::LengthOverflow, off))
}

/// Appends a forward 7-bit varint.
pub fn push_varint(out: &mut alloc::vec::Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        out.push((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    #[allow(clippy::cast_possible_truncation)]
    out.push(v as u8);
}

/// Appends a varint meant to be read backwards from its last byte.
pub fn push_varint_reverse(out: &mut alloc::vec::Vec<u8>, v: u64) {
    let start = out.len();
    push_varint(out, v);
    out[start..].reverse();
}

/// Appends the low `width` bytes of `v`, little endian.
pub fn push_uint(out: &mut alloc::vec::Vec<u8>, v: u64, width: usize) {
    out.extend_from_slice(&v.to_le_bytes()[..width]);
}

/// Overwrites `width` bytes at `off` with `v`, little endian.
pub fn store_uint(out: &mut [u8], off: usize, v: u64, width: usize) {
    out[off..off + width].copy_from_slice(&v.to_le_bytes()[..width]);
}

/// Overwrites bytes at `off` with a forward 7-bit varint, returning its length.
pub fn store_varint(out: &mut [u8], off: usize, mut v: u64) -> usize {
    let mut pos = off;
    while v >= 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        {
            out[pos] = (v as u8 & 0x7f) | 0x80;
        }
        v >>= 7;
        pos += 1;
    }
    #[allow(clippy::cast_possible_truncation)]
    {
        out[pos] = v as u8;
    }
    pos + 1 - off
}
