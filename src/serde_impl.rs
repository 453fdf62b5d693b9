use alloc::string::ToString;
use core::fmt;

use serde::de::{IntoDeserializer, Visitor};
use serde::ser::{Impossible, SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use crate::format::ValueType;
use crate::limits::nest;
use crate::number::Number;
use crate::slice::{ArrayIter, ObjectIter};
use crate::{Buffer, Builder, BuilderOptions, DecodeLimits, ErrorCode, Slice, VPackError};

impl Serialize for Slice<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Nested {
            slice: *self,
            depth: 0,
        }
        .serialize(serializer)
    }
}

/// A value below `depth` open containers.
struct Nested<'a> {
    slice: Slice<'a>,
    depth: usize,
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error;
        let fail = |e: VPackError| S::Error::custom(e);
        let v = self.slice;
        match v.value_type().map_err(fail)? {
            ValueType::None => Err(S::Error::custom("cannot serialize the none marker")),
            ValueType::Null => serializer.serialize_unit(),
            ValueType::Bool => serializer.serialize_bool(v.get_bool().map_err(fail)?),
            ValueType::Double | ValueType::Int | ValueType::UInt | ValueType::SmallInt => {
                match v.number().map_err(fail)? {
                    Number::Int(v) => serializer.serialize_i64(v),
                    Number::UInt(v) => serializer.serialize_u64(v),
                    Number::Double(v) => serializer.serialize_f64(v),
                }
            }
            ValueType::String => serializer.serialize_str(v.as_str().map_err(fail)?),
            ValueType::Binary => serializer.serialize_bytes(v.get_binary().map_err(fail)?),
            ValueType::Array => {
                let depth = nest(self.depth, v.offset()).map_err(fail)?;
                let mut seq = serializer.serialize_seq(Some(v.length().map_err(fail)?))?;
                for member in v.array_iter().map_err(fail)? {
                    seq.serialize_element(&Nested {
                        slice: member.map_err(fail)?,
                        depth,
                    })?;
                }
                seq.end()
            }
            ValueType::Object => {
                let depth = nest(self.depth, v.offset()).map_err(fail)?;
                let mut m = serializer.serialize_map(Some(v.length().map_err(fail)?))?;
                for entry in v.object_iter().map_err(fail)? {
                    let (key, value) = entry.map_err(fail)?;
                    let key = key.to_str().map_err(fail)?;
                    m.serialize_entry(key, &Nested { slice: value, depth })?;
                }
                m.end()
            }
        }
    }
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slice().serialize(serializer)
    }
}

/// Serialize a Rust value into a [`Buffer`] with default [`BuilderOptions`].
///
/// Structs and maps become objects (map keys must serialize as strings, integers, chars or
/// booleans), sequences and tuples become arrays, and enum variants follow the externally
/// tagged representation: `"Unit"`, `{"Newtype": value}`, `{"Tuple": [..]}`,
/// `{"Struct": {..}}`.
///
/// # Errors
///
/// Returns `SerdeError` if the value cannot be represented, or a builder error.
pub fn to_buffer<T: Serialize + ?Sized>(value: &T) -> Result<Buffer, VPackError> {
    to_buffer_with(value, BuilderOptions::default())
}

/// Serialize a Rust value into a [`Buffer`] with the given options.
///
/// # Errors
///
/// See [`to_buffer`].
pub fn to_buffer_with<T: Serialize + ?Sized>(
    value: &T,
    options: BuilderOptions,
) -> Result<Buffer, VPackError> {
    let mut builder = Builder::with_options(options);
    value
        .serialize(ValueSerializer {
            builder: &mut builder,
        })
        .map_err(SerdeError::into_error)?;
    builder.finish()
}

/// Deserialize a Rust value from an encoded value, borrowing strings and bytes from it.
///
/// # Errors
///
/// Returns a decode error if the value is malformed, or `SerdeError` if it does not match `T`.
pub fn from_slice<'de, T: Deserialize<'de>>(slice: Slice<'de>) -> Result<T, VPackError> {
    T::deserialize(SliceDeserializer { slice, depth: 0 }).map_err(SerdeError::into_error)
}

/// Validate untrusted bytes, then deserialize them.
///
/// # Errors
///
/// Returns a validation error for malformed input, or `SerdeError` if it does not match `T`.
pub fn from_bytes<'de, T: Deserialize<'de>>(
    bytes: &'de [u8],
    limits: DecodeLimits,
) -> Result<T, VPackError> {
    let root = crate::validate(bytes, limits)?;
    from_slice(root)
}

#[derive(Debug, Clone, Copy)]
struct SerdeError {
    code: ErrorCode,
    offset: usize,
}

impl SerdeError {
    const fn with_code(code: ErrorCode) -> Self {
        Self { code, offset: 0 }
    }

    const fn into_error(self) -> VPackError {
        VPackError::new(self.code, self.offset)
    }
}

impl From<VPackError> for SerdeError {
    fn from(e: VPackError) -> Self {
        Self {
            code: e.code,
            offset: e.offset,
        }
    }
}

impl fmt::Display for SerdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.into_error(), f)
    }
}

impl std::error::Error for SerdeError {}

impl serde::ser::Error for SerdeError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Self::with_code(ErrorCode::SerdeError)
    }
}

impl serde::de::Error for SerdeError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Self::with_code(ErrorCode::SerdeError)
    }
}

struct ValueSerializer<'b> {
    builder: &'b mut Builder,
}

fn int_from_i128(v: i128) -> Result<i64, SerdeError> {
    i64::try_from(v).map_err(|_| SerdeError::with_code(ErrorCode::NumericOverflow))
}

impl<'b> Serializer for ValueSerializer<'b> {
    type Ok = ();
    type Error = SerdeError;

    type SerializeSeq = Compound<'b>;
    type SerializeTuple = Compound<'b>;
    type SerializeTupleStruct = Compound<'b>;
    type SerializeTupleVariant = Compound<'b>;
    type SerializeMap = Compound<'b>;
    type SerializeStruct = Compound<'b>;
    type SerializeStructVariant = Compound<'b>;

    fn serialize_bool(self, v: bool) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_i8(self, v: i8) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_i16(self, v: i16) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_i32(self, v: i32) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_i64(self, v: i64) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_i128(self, v: i128) -> Result<(), SerdeError> {
        if v > 0 {
            let u = u64::try_from(v).map_err(|_| SerdeError::with_code(ErrorCode::NumericOverflow))?;
            return Ok(self.builder.add(u)?);
        }
        Ok(self.builder.add(int_from_i128(v)?)?)
    }

    fn serialize_u8(self, v: u8) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_u16(self, v: u16) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_u32(self, v: u32) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_u64(self, v: u64) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_u128(self, v: u128) -> Result<(), SerdeError> {
        let u = u64::try_from(v).map_err(|_| SerdeError::with_code(ErrorCode::NumericOverflow))?;
        Ok(self.builder.add(u)?)
    }

    fn serialize_f32(self, v: f32) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_f64(self, v: f64) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_char(self, v: char) -> Result<(), SerdeError> {
        let mut buf = [0u8; 4];
        Ok(self.builder.add(&*v.encode_utf8(&mut buf))?)
    }

    fn serialize_str(self, v: &str) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), SerdeError> {
        Ok(self.builder.add(v)?)
    }

    fn serialize_none(self) -> Result<(), SerdeError> {
        Ok(self.builder.add(())?)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), SerdeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), SerdeError> {
        Ok(self.builder.add(())?)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), SerdeError> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), SerdeError> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        self.builder.open_object()?;
        self.builder.add_key(variant)?;
        value.serialize(ValueSerializer {
            builder: &mut *self.builder,
        })?;
        Ok(self.builder.close()?)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound<'b>, SerdeError> {
        self.builder.open_array()?;
        Ok(Compound::new(self.builder, 1))
    }

    fn serialize_tuple(self, len: usize) -> Result<Compound<'b>, SerdeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Compound<'b>, SerdeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'b>, SerdeError> {
        self.builder.open_object()?;
        self.builder.add_key(variant)?;
        self.builder.open_array()?;
        Ok(Compound::new(self.builder, 2))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Compound<'b>, SerdeError> {
        self.builder.open_object()?;
        Ok(Compound::new(self.builder, 1))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Compound<'b>, SerdeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'b>, SerdeError> {
        self.builder.open_object()?;
        self.builder.add_key(variant)?;
        self.builder.open_object()?;
        Ok(Compound::new(self.builder, 2))
    }
}

/// An open array or object; `end` closes `depth` containers (two for enum variants).
struct Compound<'b> {
    builder: &'b mut Builder,
    depth: usize,
}

impl<'b> Compound<'b> {
    fn new(builder: &'b mut Builder, depth: usize) -> Self {
        Self { builder, depth }
    }

    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        value.serialize(ValueSerializer {
            builder: &mut *self.builder,
        })
    }

    fn finish(self) -> Result<(), SerdeError> {
        for _ in 0..self.depth {
            self.builder.close()?;
        }
        Ok(())
    }
}

impl SerializeSeq for Compound<'_> {
    type Ok = ();
    type Error = SerdeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SerdeError> {
        self.finish()
    }
}

impl serde::ser::SerializeTuple for Compound<'_> {
    type Ok = ();
    type Error = SerdeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SerdeError> {
        self.finish()
    }
}

impl serde::ser::SerializeTupleStruct for Compound<'_> {
    type Ok = ();
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SerdeError> {
        self.finish()
    }
}

impl serde::ser::SerializeTupleVariant for Compound<'_> {
    type Ok = ();
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SerdeError> {
        self.finish()
    }
}

impl SerializeMap for Compound<'_> {
    type Ok = ();
    type Error = SerdeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), SerdeError> {
        key.serialize(KeySerializer {
            builder: &mut *self.builder,
        })
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.element(value)
    }

    fn end(self) -> Result<(), SerdeError> {
        self.finish()
    }
}

impl serde::ser::SerializeStruct for Compound<'_> {
    type Ok = ();
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        self.builder.add_key(key)?;
        self.element(value)
    }

    fn end(self) -> Result<(), SerdeError> {
        self.finish()
    }
}

impl serde::ser::SerializeStructVariant for Compound<'_> {
    type Ok = ();
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        self.builder.add_key(key)?;
        self.element(value)
    }

    fn end(self) -> Result<(), SerdeError> {
        self.finish()
    }
}

/// Writes map keys; scalar keys are stringified.
struct KeySerializer<'b> {
    builder: &'b mut Builder,
}

impl KeySerializer<'_> {
    fn key(self, name: &str) -> Result<(), SerdeError> {
        Ok(self.builder.add_key(name)?)
    }

    fn display(self, v: impl fmt::Display) -> Result<(), SerdeError> {
        self.key(&v.to_string())
    }
}

fn key_must_be_string() -> SerdeError {
    SerdeError::with_code(ErrorCode::SerdeError)
}

impl Serializer for KeySerializer<'_> {
    type Ok = ();
    type Error = SerdeError;

    type SerializeSeq = Impossible<(), SerdeError>;
    type SerializeTuple = Impossible<(), SerdeError>;
    type SerializeTupleStruct = Impossible<(), SerdeError>;
    type SerializeTupleVariant = Impossible<(), SerdeError>;
    type SerializeMap = Impossible<(), SerdeError>;
    type SerializeStruct = Impossible<(), SerdeError>;
    type SerializeStructVariant = Impossible<(), SerdeError>;

    fn serialize_bool(self, v: bool) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_i8(self, v: i8) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_i16(self, v: i16) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_i32(self, v: i32) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_i64(self, v: i64) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_i128(self, v: i128) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_u8(self, v: u8) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_u16(self, v: u16) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_u32(self, v: u32) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_u64(self, v: u64) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_u128(self, v: u128) -> Result<(), SerdeError> {
        self.display(v)
    }

    fn serialize_f32(self, _v: f32) -> Result<(), SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_f64(self, _v: f64) -> Result<(), SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_char(self, v: char) -> Result<(), SerdeError> {
        let mut buf = [0u8; 4];
        self.key(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<(), SerdeError> {
        self.key(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_none(self) -> Result<(), SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<(), SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_unit(self) -> Result<(), SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), SerdeError> {
        self.key(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), SerdeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, SerdeError> {
        Err(key_must_be_string())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, SerdeError> {
        Err(key_must_be_string())
    }
}

struct SliceDeserializer<'de> {
    slice: Slice<'de>,
    /// Containers already entered above `slice`.
    depth: usize,
}

impl<'de> serde::de::Deserializer<'de> for SliceDeserializer<'de> {
    type Error = SerdeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let v = self.slice;
        match v.value_type()? {
            ValueType::None => Err(VPackError::new(ErrorCode::TypeMismatch, v.offset()).into()),
            ValueType::Null => visitor.visit_unit(),
            ValueType::Bool => visitor.visit_bool(v.get_bool()?),
            ValueType::Double | ValueType::Int | ValueType::UInt | ValueType::SmallInt => {
                match v.number()? {
                    Number::Int(i) => visitor.visit_i64(i),
                    Number::UInt(u) => visitor.visit_u64(u),
                    Number::Double(d) => visitor.visit_f64(d),
                }
            }
            ValueType::String => visitor.visit_borrowed_str(v.as_str()?),
            ValueType::Binary => visitor.visit_borrowed_bytes(v.get_binary()?),
            ValueType::Array => visitor.visit_seq(SeqAccess {
                depth: nest(self.depth, v.offset())?,
                iter: v.array_iter()?,
            }),
            ValueType::Object => visitor.visit_map(MapAccess {
                depth: nest(self.depth, v.offset())?,
                iter: v.object_iter()?,
                pending: None,
            }),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.slice.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let v = self.slice;
        if v.is_string() {
            return visitor.visit_enum(EnumAccess {
                variant: v.as_str()?,
                value: None,
                depth: self.depth,
            });
        }
        if v.is_object() && v.length()? == 1 {
            let key = v.key_at(0)?.as_str()?;
            return visitor.visit_enum(EnumAccess {
                variant: key,
                value: Some(v.value_at(0)?),
                depth: nest(self.depth, v.offset())?,
            });
        }
        Err(SerdeError::with_code(ErrorCode::SerdeError))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqAccess<'de> {
    iter: ArrayIter<'de>,
    depth: usize,
}

impl<'de> serde::de::SeqAccess<'de> for SeqAccess<'de> {
    type Error = SerdeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            None => Ok(None),
            Some(member) => seed
                .deserialize(SliceDeserializer {
                    slice: member?,
                    depth: self.depth,
                })
                .map(Some),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

struct MapAccess<'de> {
    iter: ObjectIter<'de>,
    pending: Option<Slice<'de>>,
    depth: usize,
}

impl<'de> serde::de::MapAccess<'de> for MapAccess<'de> {
    type Error = SerdeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: serde::de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            None => Ok(None),
            Some(entry) => {
                let (key, value) = entry?;
                self.pending = Some(value);
                let key = key
                    .to_str()
                    .map_err(|_| SerdeError::with_code(ErrorCode::Utf8Invalid))?;
                seed.deserialize(BorrowedStr(key)).map(Some)
            }
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let value = self
            .pending
            .take()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::SerdeError))?;
        seed.deserialize(SliceDeserializer {
            slice: value,
            depth: self.depth,
        })
    }
}

/// Hands out object keys without copying.
struct BorrowedStr<'de>(&'de str);

impl<'de> serde::de::Deserializer<'de> for BorrowedStr<'de> {
    type Error = SerdeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.0)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct EnumAccess<'de> {
    variant: &'de str,
    value: Option<Slice<'de>>,
    depth: usize,
}

impl<'de> serde::de::EnumAccess<'de> for EnumAccess<'de> {
    type Error = SerdeError;
    type Variant = VariantAccess<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let name: serde::de::value::StrDeserializer<'_, SerdeError> =
            self.variant.into_deserializer();
        let val = seed.deserialize(name)?;
        Ok((
            val,
            VariantAccess {
                value: self.value,
                depth: self.depth,
            },
        ))
    }
}

struct VariantAccess<'de> {
    value: Option<Slice<'de>>,
    depth: usize,
}

impl<'de> VariantAccess<'de> {
    fn payload(self) -> Result<SliceDeserializer<'de>, SerdeError> {
        let depth = self.depth;
        self.value
            .map(|slice| SliceDeserializer { slice, depth })
            .ok_or_else(|| SerdeError::with_code(ErrorCode::SerdeError))
    }
}

impl<'de> serde::de::VariantAccess<'de> for VariantAccess<'de> {
    type Error = SerdeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            None => Ok(()),
            Some(v) if v.is_null() => Ok(()),
            _ => Err(SerdeError::with_code(ErrorCode::SerdeError)),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        seed.deserialize(self.payload()?)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        serde::de::Deserializer::deserialize_seq(self.payload()?, visitor)
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        serde::de::Deserializer::deserialize_map(self.payload()?, visitor)
    }
}
