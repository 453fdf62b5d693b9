//! Conversions to and from a plain owned JSON tree.

use alloc::string::String;
use alloc::vec::Vec;

use crate::alloc_util::try_reserve;
use crate::format::ValueType;
use crate::limits::nest;
use crate::{Buffer, Builder, BuilderOptions, ErrorCode, Slice, VPackError};

/// An owned JSON document tree.
///
/// Numbers are always `f64`: integers read from a [`Slice`] are widened (and may round above
/// 2^53), and numbers written through [`Builder::add_json`] are stored as doubles. Object
/// members keep their order and may repeat keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Json {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Any number.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered list of values.
    Array(Vec<Json>),
    /// Ordered `(key, value)` members.
    Object(Vec<(String, Json)>),
}

impl Json {
    /// Encode this tree with default [`BuilderOptions`].
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the output cannot be allocated.
    pub fn to_buffer(&self) -> Result<Buffer, VPackError> {
        self.to_buffer_with(BuilderOptions::default())
    }

    /// Encode this tree with the given options.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the output cannot be allocated, or `DuplicateAttribute`
    /// if uniqueness checking is enabled and an object repeats a key.
    pub fn to_buffer_with(&self, options: BuilderOptions) -> Result<Buffer, VPackError> {
        let mut b = Builder::with_options(options);
        b.add_json(self)?;
        b.finish()
    }

    /// Returns the member `key` of an object (first match), or `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Json {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Json {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Json {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for Json {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl TryFrom<Slice<'_>> for Json {
    type Error = VPackError;

    /// Decode a value into an owned tree.
    ///
    /// Binary values and the `none` marker have no JSON counterpart and yield `TypeMismatch`.
    /// Nesting past [`crate::DEFAULT_MAX_DEPTH`] containers yields `DepthLimitExceeded`.
    fn try_from(v: Slice<'_>) -> Result<Self, Self::Error> {
        decode(v, 0)
    }
}

fn decode(v: Slice<'_>, depth: usize) -> Result<Json, VPackError> {
    let json = match v.value_type()? {
        ValueType::None | ValueType::Binary => {
            return Err(VPackError::new(ErrorCode::TypeMismatch, v.offset()))
        }
        ValueType::Null => Json::Null,
        ValueType::Bool => Json::Bool(v.get_bool()?),
        ValueType::Double | ValueType::Int | ValueType::UInt | ValueType::SmallInt => {
            Json::Number(v.number()?.to_f64())
        }
        ValueType::String => Json::String(v.as_str()?.into()),
        ValueType::Array => {
            let depth = nest(depth, v.offset())?;
            let mut items = Vec::new();
            try_reserve(&mut items, v.length()?, v.offset())?;
            for member in v.array_iter()? {
                items.push(decode(member?, depth)?);
            }
            Json::Array(items)
        }
        ValueType::Object => {
            let depth = nest(depth, v.offset())?;
            let mut members = Vec::new();
            try_reserve(&mut members, v.length()?, v.offset())?;
            for entry in v.object_iter()? {
                let (key, value) = entry?;
                let key = key
                    .to_str()
                    .map_err(|_| VPackError::new(ErrorCode::Utf8Invalid, v.offset()))?;
                members.push((key.into(), decode(value, depth)?));
            }
            Json::Object(members)
        }
    };
    Ok(json)
}

impl Builder {
    /// Appends a JSON tree as one value.
    ///
    /// # Errors
    ///
    /// Same as [`Builder::add`]; on error the builder may contain the part of the tree written
    /// so far.
    pub fn add_json(&mut self, json: &Json) -> Result<(), VPackError> {
        match json {
            Json::Null => self.add(()),
            Json::Bool(b) => self.add(*b),
            Json::Number(n) => self.add(*n),
            Json::String(s) => self.add(s.as_str()),
            Json::Array(items) => {
                self.open_array()?;
                for item in items {
                    self.add_json(item)?;
                }
                self.close()
            }
            Json::Object(members) => {
                self.open_object()?;
                for (key, value) in members {
                    self.add_key(key)?;
                    self.add_json(value)?;
                }
                self.close()
            }
        }
    }
}
