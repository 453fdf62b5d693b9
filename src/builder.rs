use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::alloc_util::try_reserve;
use crate::buffer::Buffer;
use crate::format::{
    int_len, uint_len, varint_len, width_for, width_step, ARRAY_INDEXED_BASE, ARRAY_UNIFORM_BASE,
    BINARY_BASE, COMPACT_ARRAY, COMPACT_OBJECT, DOUBLE, EMPTY_ARRAY, EMPTY_OBJECT, FALSE,
    INT_BASE, LONG_STRING, MAX_SHORT_STRING, NONE, NULL, OBJECT_SORTED_BASE,
    OBJECT_UNSORTED_BASE, RESERVED_HEADER, SHORT_STRING_BASE, SMALL_INT_MAX, SMALL_INT_MIN,
    SMALL_INT_NEG_BASE, SMALL_INT_POS_BASE, TRUE, UINT_BASE,
};
use crate::options::BuilderOptions;
use crate::slice::Slice;
use crate::wire::{push_uint, push_varint_reverse, store_uint, store_varint};
use crate::{ErrorCode, VPackError};

/// A scalar (or pre-encoded) value accepted by [`Builder::add`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Signed integer; `-6..=9` is written as a small int.
    Int(i64),
    /// Unsigned integer; `0..=9` is written as a small int.
    UInt(u64),
    /// IEEE-754 double.
    Double(f64),
    /// UTF-8 string.
    String(&'a str),
    /// Opaque bytes.
    Binary(&'a [u8]),
    /// An already encoded value, copied verbatim.
    Slice(Slice<'a>),
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<()> for Value<'_> {
    fn from((): ()) -> Self {
        Self::Null
    }
}

macro_rules! impl_value_from {
    ($variant:ident: $target:ty => $($t:ty),*) => {$(
        impl From<$t> for Value<'_> {
            fn from(v: $t) -> Self {
                Self::$variant(<$target>::from(v))
            }
        }
    )*};
}

impl_value_from!(Int: i64 => i8, i16, i32, i64);
impl_value_from!(UInt: u64 => u8, u16, u32, u64);
impl_value_from!(Double: f64 => f32, f64);

impl From<isize> for Value<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn from(v: isize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<usize> for Value<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn from(v: usize) -> Self {
        Self::UInt(v as u64)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Self::String(v)
    }
}

impl<'a> From<&'a alloc::string::String> for Value<'a> {
    fn from(v: &'a alloc::string::String) -> Self {
        Self::String(v.as_str())
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(v: &'a [u8]) -> Self {
        Self::Binary(v)
    }
}

impl<'a> From<Slice<'a>> for Value<'a> {
    fn from(v: Slice<'a>) -> Self {
        Self::Slice(v)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Array,
    Object,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    start: usize,
    /// Member offsets relative to `start`; for objects these point at keys.
    members: Vec<usize>,
    key_pending: bool,
}

/// Incremental encoder producing a single top-level value.
///
/// Containers are opened and closed explicitly; scalars are appended with [`Builder::add`].
/// Every open container reserves space for the largest possible header. On
/// [`Builder::close`] the builder picks the smallest layout for the members it has seen and
/// moves the member bytes down so the header fits without padding.
///
/// All misuse (unbalanced close, a value without a key inside an object, a second top-level
/// value, ...) is reported as `BuilderMisuse` and leaves the builder unchanged.
///
/// ```
/// use vpack::Builder;
///
/// let mut b = Builder::new();
/// b.open_object()?;
/// b.add_entry("a", 1)?;
/// b.add_entry("b", "hello")?;
/// b.close()?;
/// let buf = b.finish()?;
///
/// let root = buf.slice();
/// assert_eq!(root.get("b")?.map(|s| s.as_str()).transpose()?, Some("hello"));
/// # Ok::<(), vpack::VPackError>(())
/// ```
#[derive(Debug)]
pub struct Builder {
    buf: Vec<u8>,
    stack: Vec<Frame>,
    options: BuilderOptions,
    root_done: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// A builder with default [`BuilderOptions`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(BuilderOptions::default())
    }

    /// A builder with the given layout options.
    #[must_use]
    pub const fn with_options(options: BuilderOptions) -> Self {
        Self {
            buf: Vec::new(),
            stack: Vec::new(),
            options,
            root_done: false,
        }
    }

    /// A builder with room for `capacity` output bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// The options this builder was created with.
    #[must_use]
    pub const fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns `true` if the innermost open container is an array.
    #[must_use]
    pub fn is_open_array(&self) -> bool {
        matches!(self.stack.last(), Some(f) if f.kind == FrameKind::Array)
    }

    /// Returns `true` if the innermost open container is an object.
    #[must_use]
    pub fn is_open_object(&self) -> bool {
        matches!(self.stack.last(), Some(f) if f.kind == FrameKind::Object)
    }

    /// Returns `true` once a complete top-level value has been written.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.root_done
    }

    /// Discards everything written so far, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.stack.clear();
        self.root_done = false;
    }

    fn misuse(&self, reason: &'static str) -> VPackError {
        debug!(offset = self.buf.len(), reason, "builder misuse");
        VPackError::new(ErrorCode::BuilderMisuse, self.buf.len())
    }

    #[inline]
    fn reserve(&mut self, additional: usize) -> Result<(), VPackError> {
        let offset = self.buf.len();
        try_reserve(&mut self.buf, additional, offset)
    }

    /// Checks that a value may start here and records it as a member of the open container.
    fn begin_value(&mut self) -> Result<(), VPackError> {
        let pos = self.buf.len();
        let (kind, key_pending) = match self.stack.last() {
            None if self.root_done => return Err(self.misuse("second top-level value")),
            None => return Ok(()),
            Some(frame) => (frame.kind, frame.key_pending),
        };
        if kind == FrameKind::Object && !key_pending {
            return Err(self.misuse("object value without key"));
        }
        if let Some(frame) = self.stack.last_mut() {
            match kind {
                FrameKind::Array => frame.members.push(pos - frame.start),
                FrameKind::Object => frame.key_pending = false,
            }
        }
        Ok(())
    }

    fn end_value(&mut self) {
        if self.stack.is_empty() {
            self.root_done = true;
        }
    }

    /// Undo `begin_value` after a failed write.
    fn abort_value(&mut self, pos: usize) {
        self.buf.truncate(pos);
        if let Some(frame) = self.stack.last_mut() {
            match frame.kind {
                FrameKind::Array => {
                    frame.members.pop();
                }
                FrameKind::Object => frame.key_pending = true,
            }
        }
    }

    /// Appends a scalar or pre-encoded value.
    ///
    /// # Errors
    ///
    /// Returns `BuilderMisuse` if a value is not allowed here (object without pending key,
    /// second top-level value, a `none` slice) and `AllocationFailed` if the buffer cannot grow.
    pub fn add<'v>(&mut self, value: impl Into<Value<'v>>) -> Result<(), VPackError> {
        let value = value.into();
        if let Value::Slice(s) = value {
            if s.head()? == NONE {
                return Err(self.misuse("none value"));
            }
        }
        let pos = self.buf.len();
        self.begin_value()?;
        match self.write_value(value) {
            Ok(()) => {
                self.end_value();
                Ok(())
            }
            Err(e) => {
                self.abort_value(pos);
                Err(e)
            }
        }
    }

    /// Appends an already encoded value, copying its bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Builder::add`]; also fails if `slice` is malformed.
    pub fn add_slice(&mut self, slice: Slice<'_>) -> Result<(), VPackError> {
        self.add(Value::Slice(slice))
    }

    /// Writes an attribute name into the open object.
    ///
    /// # Errors
    ///
    /// Returns `BuilderMisuse` outside an object or when a key is already pending.
    pub fn add_key(&mut self, name: &str) -> Result<(), VPackError> {
        let pos = self.buf.len();
        match self.stack.last() {
            Some(f) if f.kind == FrameKind::Object && !f.key_pending => {}
            Some(f) if f.kind == FrameKind::Object => return Err(self.misuse("key already pending")),
            _ => return Err(self.misuse("key outside object")),
        }
        self.write_string(name)?;
        if let Some(frame) = self.stack.last_mut() {
            frame.members.push(pos - frame.start);
            frame.key_pending = true;
        }
        Ok(())
    }

    /// Writes `name` and `value` into the open object.
    ///
    /// # Errors
    ///
    /// See [`Builder::add_key`] and [`Builder::add`].
    pub fn add_entry<'v>(
        &mut self,
        name: &str,
        value: impl Into<Value<'v>>,
    ) -> Result<(), VPackError> {
        let pos = self.buf.len();
        self.add_key(name)?;
        if let Err(e) = self.add(value) {
            self.buf.truncate(pos);
            if let Some(frame) = self.stack.last_mut() {
                frame.members.pop();
                frame.key_pending = false;
            }
            return Err(e);
        }
        Ok(())
    }

    fn open(&mut self, kind: FrameKind) -> Result<(), VPackError> {
        let start = self.buf.len();
        self.begin_value()?;
        if let Err(e) = self.reserve(RESERVED_HEADER) {
            self.abort_value(start);
            return Err(e);
        }
        let head = match kind {
            FrameKind::Array => ARRAY_INDEXED_BASE,
            FrameKind::Object => OBJECT_UNSORTED_BASE,
        };
        self.buf.push(head);
        self.buf.resize(start + RESERVED_HEADER, 0);
        self.stack.push(Frame {
            kind,
            start,
            members: Vec::new(),
            key_pending: false,
        });
        Ok(())
    }

    /// Opens an array; inside an object a key must be pending.
    ///
    /// # Errors
    ///
    /// Returns `BuilderMisuse` if a value is not allowed here.
    pub fn open_array(&mut self) -> Result<(), VPackError> {
        self.open(FrameKind::Array)
    }

    /// Opens an object; inside an object a key must be pending.
    ///
    /// # Errors
    ///
    /// Returns `BuilderMisuse` if a value is not allowed here.
    pub fn open_object(&mut self) -> Result<(), VPackError> {
        self.open(FrameKind::Object)
    }

    /// Closes the innermost open container and writes its final header.
    ///
    /// # Errors
    ///
    /// Returns `BuilderMisuse` if nothing is open or an object key has no value,
    /// `DuplicateAttribute` if uniqueness checking is enabled and an object repeats a key.
    pub fn close(&mut self) -> Result<(), VPackError> {
        let (kind, start, count) = match self.stack.last() {
            None => return Err(self.misuse("close without open container")),
            Some(f) if f.key_pending => return Err(self.misuse("close with pending key")),
            Some(f) => (f.kind, f.start, f.members.len()),
        };

        let order = if kind == FrameKind::Object
            && count > 0
            && (self.options.sort_attribute_names || self.options.check_attribute_uniqueness)
        {
            Some(self.sorted_keys()?)
        } else {
            None
        };

        let Some(frame) = self.stack.pop() else {
            return Err(self.misuse("close without open container"));
        };

        if count == 0 {
            self.buf.truncate(start);
            self.buf.push(match kind {
                FrameKind::Array => EMPTY_ARRAY,
                FrameKind::Object => EMPTY_OBJECT,
            });
            trace!(start, "closed empty container");
            self.end_value();
            return Ok(());
        }

        let unindexed = match kind {
            FrameKind::Array => self.options.build_unindexed_arrays,
            FrameKind::Object => self.options.build_unindexed_objects,
        };
        let res = if unindexed || count <= self.options.compact_threshold {
            self.close_compact(&frame)
        } else if kind == FrameKind::Array && self.has_equal_members(&frame) {
            self.close_uniform(&frame)
        } else {
            let sorted = self.options.sort_attribute_names && kind == FrameKind::Object;
            let order = if sorted { order.as_deref() } else { None };
            self.close_indexed(&frame, order)
        };
        if let Err(e) = res {
            self.stack.push(frame);
            return Err(e);
        }
        self.end_value();
        Ok(())
    }

    /// Member indices of the open object in key order; checks uniqueness if configured.
    fn sorted_keys(&self) -> Result<Vec<usize>, VPackError> {
        let Some(frame) = self.stack.last() else {
            return Ok(Vec::new());
        };
        let mut keys: Vec<(&[u8], usize)> = Vec::new();
        try_reserve(&mut keys, frame.members.len(), self.buf.len())?;
        for (i, &member) in frame.members.iter().enumerate() {
            let key = Slice::with_offset(&self.buf, frame.start + member).get_string_ref()?;
            keys.push((key.as_bytes(), i));
        }
        keys.sort_unstable();

        if self.options.check_attribute_uniqueness {
            if let Some(pair) = keys.windows(2).find(|pair| pair[0].0 == pair[1].0) {
                let offset = frame.start + frame.members[pair[1].1];
                debug!(offset, "duplicate attribute name");
                return Err(VPackError::new(ErrorCode::DuplicateAttribute, offset));
            }
        }
        let mut order = Vec::new();
        try_reserve(&mut order, keys.len(), self.buf.len())?;
        order.extend(keys.iter().map(|&(_, i)| i));
        Ok(order)
    }

    fn has_equal_members(&self, frame: &Frame) -> bool {
        let end = self.buf.len() - frame.start;
        let first = frame.members.get(1).copied().unwrap_or(end) - frame.members[0];
        frame
            .members
            .iter()
            .zip(frame.members.iter().skip(1).copied().chain(core::iter::once(end)))
            .all(|(&a, b)| b - a == first)
    }

    /// Moves the member bytes so they start right behind a header of `header_len` bytes.
    fn shift_body(&mut self, start: usize, header_len: usize) {
        let body = start + RESERVED_HEADER;
        let end = self.buf.len();
        if header_len < RESERVED_HEADER {
            self.buf.copy_within(body..end, start + header_len);
            self.buf.truncate(end - (RESERVED_HEADER - header_len));
        }
    }

    fn close_compact(&mut self, frame: &Frame) -> Result<(), VPackError> {
        let count = frame.members.len() as u64;
        let body = (self.buf.len() - frame.start - RESERVED_HEADER) as u64;
        let fixed = 1 + body + varint_len(count) as u64;
        let mut len_bytes = varint_len(fixed + 1);
        while varint_len(fixed + len_bytes as u64) != len_bytes {
            len_bytes += 1;
        }
        if 1 + len_bytes > RESERVED_HEADER {
            return Err(VPackError::new(ErrorCode::LengthOverflow, frame.start));
        }
        self.reserve(varint_len(count))?;
        let total = fixed + len_bytes as u64;

        self.shift_body(frame.start, 1 + len_bytes);
        self.buf[frame.start] = match frame.kind {
            FrameKind::Array => COMPACT_ARRAY,
            FrameKind::Object => COMPACT_OBJECT,
        };
        store_varint(&mut self.buf, frame.start + 1, total);
        push_varint_reverse(&mut self.buf, count);
        trace!(start = frame.start, count, total, "closed compact container");
        Ok(())
    }

    fn close_uniform(&mut self, frame: &Frame) -> Result<(), VPackError> {
        let body = (self.buf.len() - frame.start - RESERVED_HEADER) as u64;
        let width = fitting_width(|w| 1 + w as u64 + body);
        let total = 1 + width as u64 + body;

        self.shift_body(frame.start, 1 + width);
        self.buf[frame.start] = ARRAY_UNIFORM_BASE + width_step(width);
        store_uint(&mut self.buf, frame.start + 1, total, width);
        trace!(start = frame.start, width, total, "closed equal-size array");
        Ok(())
    }

    fn close_indexed(&mut self, frame: &Frame, order: Option<&[usize]>) -> Result<(), VPackError> {
        let count = frame.members.len() as u64;
        let body = (self.buf.len() - frame.start - RESERVED_HEADER) as u64;
        let size_for = |w: usize| {
            let w = w as u64;
            let header = if w == 8 { 1 + w } else { 1 + 2 * w };
            let tail = if w == 8 { 8 } else { 0 };
            header + body + count * w + tail
        };
        let width = fitting_width(|w| size_for(w).max(count));
        let header_len = if width == 8 { 1 + width } else { 1 + 2 * width };
        let total = size_for(width);
        let table_len = frame.members.len() * width + if width == 8 { 8 } else { 0 };
        self.reserve(table_len)?;

        self.shift_body(frame.start, header_len);
        self.buf[frame.start] = match (frame.kind, order.is_some()) {
            (FrameKind::Array, _) => ARRAY_INDEXED_BASE,
            (FrameKind::Object, true) => OBJECT_SORTED_BASE,
            (FrameKind::Object, false) => OBJECT_UNSORTED_BASE,
        } + width_step(width);
        store_uint(&mut self.buf, frame.start + 1, total, width);
        if width < 8 {
            store_uint(&mut self.buf, frame.start + 1 + width, count, width);
        }

        let rebase = |off: usize| (off - RESERVED_HEADER + header_len) as u64;
        match order {
            Some(order) => {
                for &i in order {
                    push_uint(&mut self.buf, rebase(frame.members[i]), width);
                }
            }
            None => {
                for &off in &frame.members {
                    push_uint(&mut self.buf, rebase(off), width);
                }
            }
        }
        if width == 8 {
            push_uint(&mut self.buf, count, 8);
        }
        trace!(start = frame.start, count, width, total, "closed indexed container");
        Ok(())
    }

    /// Takes the finished value out of the builder, leaving it empty.
    ///
    /// # Errors
    ///
    /// Returns `BuilderMisuse` unless exactly one complete top-level value has been written.
    pub fn finish(&mut self) -> Result<Buffer, VPackError> {
        if !self.stack.is_empty() {
            return Err(self.misuse("finish with open container"));
        }
        if !self.root_done {
            return Err(self.misuse("finish without value"));
        }
        self.root_done = false;
        Ok(Buffer::new_unchecked(core::mem::take(&mut self.buf)))
    }

    fn write_value(&mut self, value: Value<'_>) -> Result<(), VPackError> {
        match value {
            Value::Null => self.write_bytes(&[NULL]),
            Value::Bool(b) => self.write_bytes(&[if b { TRUE } else { FALSE }]),
            Value::Int(v) => self.write_int(v),
            Value::UInt(v) => self.write_uint(v),
            Value::Double(d) => {
                let mut out = [0u8; 9];
                out[0] = DOUBLE;
                out[1..].copy_from_slice(&d.to_bits().to_le_bytes());
                self.write_bytes(&out)
            }
            Value::String(s) => self.write_string(s),
            Value::Binary(b) => {
                let w = uint_len(b.len() as u64);
                self.reserve(1 + w + b.len())?;
                #[allow(clippy::cast_possible_truncation)]
                self.buf.push(BINARY_BASE + (w as u8 - 1));
                push_uint(&mut self.buf, b.len() as u64, w);
                self.buf.extend_from_slice(b);
                Ok(())
            }
            Value::Slice(s) => {
                let bytes = s.as_bytes()?;
                self.write_bytes(bytes)
            }
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), VPackError> {
        self.reserve(bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn write_int(&mut self, v: i64) -> Result<(), VPackError> {
        if (0..=SMALL_INT_MAX).contains(&v) {
            return self.write_bytes(&[SMALL_INT_POS_BASE + v as u8]);
        }
        if (SMALL_INT_MIN..0).contains(&v) {
            return self.write_bytes(&[SMALL_INT_NEG_BASE + (v + 6) as u8]);
        }
        let w = int_len(v);
        self.reserve(1 + w)?;
        self.buf.push(INT_BASE + (w as u8 - 1));
        push_uint(&mut self.buf, v as u64, w);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write_uint(&mut self, v: u64) -> Result<(), VPackError> {
        if v <= SMALL_INT_MAX as u64 {
            return self.write_bytes(&[SMALL_INT_POS_BASE + v as u8]);
        }
        let w = uint_len(v);
        self.reserve(1 + w)?;
        self.buf.push(UINT_BASE + (w as u8 - 1));
        push_uint(&mut self.buf, v, w);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write_string(&mut self, s: &str) -> Result<(), VPackError> {
        let b = s.as_bytes();
        if b.len() <= MAX_SHORT_STRING {
            self.reserve(1 + b.len())?;
            self.buf.push(SHORT_STRING_BASE + b.len() as u8);
        } else {
            self.reserve(9 + b.len())?;
            self.buf.push(LONG_STRING);
            push_uint(&mut self.buf, b.len() as u64, 8);
        }
        self.buf.extend_from_slice(b);
        Ok(())
    }
}

/// Smallest of 1/2/4/8 whose maximum value holds `size(width)`.
fn fitting_width(size: impl Fn(usize) -> u64) -> usize {
    for w in [1usize, 2, 4] {
        if width_for(size(w)) <= w {
            return w;
        }
    }
    8
}
