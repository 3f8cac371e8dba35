//! Typed key-value pairs and their exact two-pass wire encoding
//!
//! A key-value pair is wrapped in a length-delimited submessage, so its byte
//! size must be known before the first byte is written. [`wire_size`] computes
//! that size exactly; [`write`] then emits exactly that many bytes. The size
//! is returned to the caller and threaded into the write pass instead of being
//! stashed in scratch fields on the pair itself, so stale sizes from an
//! earlier pass cannot leak into a later write.

use crate::buffer::BufferManager;
use crate::error::Result;
use crate::field::{self, kv_tags, TAG_WIRE_LEN};
use crate::varint;

/// A typed scalar value, borrowed for the duration of one encode call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// UTF-8 string, written as raw bytes without validation
    Str(&'a str),
    /// 32-bit signed integer, zig-zag varint on the wire
    I32(i32),
    /// 64-bit signed integer, zig-zag varint on the wire
    ///
    /// Requires the `int64` feature; encoding fails with
    /// [`Error::InvalidKeyValueType`](crate::Error::InvalidKeyValueType) otherwise.
    I64(i64),
    /// 32-bit float, fixed-width on the wire
    ///
    /// Requires the `floating` feature.
    F32(f32),
    /// 64-bit double, fixed-width on the wire
    ///
    /// Requires the `floating` feature.
    F64(f64),
}

/// One named, typed scalar destined for a default-set or an event
///
/// Constructed by the caller per field and consumed synchronously; the
/// encoder never stores it beyond the current write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyValue<'a> {
    /// Field name
    pub name: &'a str,
    /// Field value
    pub value: Value<'a>,
}

impl<'a> KeyValue<'a> {
    /// Create a key-value pair from a name and any value
    #[inline]
    pub fn new(name: &'a str, value: Value<'a>) -> Self {
        Self { name, value }
    }

    /// String-valued pair
    #[inline]
    pub fn string(name: &'a str, value: &'a str) -> Self {
        Self::new(name, Value::Str(value))
    }

    /// 32-bit integer pair
    #[inline]
    pub fn int32(name: &'a str, value: i32) -> Self {
        Self::new(name, Value::I32(value))
    }

    /// 64-bit integer pair
    #[inline]
    pub fn int64(name: &'a str, value: i64) -> Self {
        Self::new(name, Value::I64(value))
    }

    /// Float pair
    #[inline]
    pub fn float(name: &'a str, value: f32) -> Self {
        Self::new(name, Value::F32(value))
    }

    /// Double pair
    #[inline]
    pub fn double(name: &'a str, value: f64) -> Self {
        Self::new(name, Value::F64(value))
    }
}

/// Exact wire size of one key-value submessage body, excluding its own
/// length prefix
///
/// Fails with [`Error::InvalidKeyValueType`](crate::Error::InvalidKeyValueType)
/// when the value variant's wire
/// support is compiled out, rather than silently dropping the field.
pub(crate) fn wire_size(kv: &KeyValue<'_>) -> Result<usize> {
    let name_len = kv.name.len();
    let mut size = field::bytes_field_len(name_len);

    size += TAG_WIRE_LEN
        + match kv.value {
            Value::Str(s) => varint::len_u32(s.len() as u32) + s.len(),
            Value::I32(v) => varint::len_u32(varint::zigzag32(v)),
            #[cfg(feature = "int64")]
            Value::I64(v) => varint::len_u64(varint::zigzag64(v)),
            #[cfg(feature = "floating")]
            Value::F32(_) => 4,
            #[cfg(feature = "floating")]
            Value::F64(_) => 8,
            #[cfg(not(feature = "int64"))]
            Value::I64(_) => return Err(crate::error::Error::InvalidKeyValueType),
            #[cfg(not(feature = "floating"))]
            Value::F32(_) | Value::F64(_) => return Err(crate::error::Error::InvalidKeyValueType),
        };

    Ok(size)
}

/// Write one key-value submessage body: name field, then exactly one value
/// field selected by the variant
///
/// Space must have been assured for the size reported by [`wire_size`].
pub(crate) fn write<M: BufferManager>(mgr: &mut M, kv: &KeyValue<'_>) -> Result<()> {
    field::write_bytes_field(mgr, kv_tags::NAME, kv.name.as_bytes());

    match kv.value {
        Value::Str(s) => {
            field::write_bytes_field(mgr, kv_tags::STRING_VALUE, s.as_bytes());
        }
        Value::I32(v) => {
            field::write_uint32(mgr, kv_tags::INT32_VALUE);
            field::write_sint32(mgr, v);
        }
        #[cfg(feature = "int64")]
        Value::I64(v) => {
            field::write_uint32(mgr, kv_tags::INT64_VALUE);
            field::write_sint64(mgr, v);
        }
        #[cfg(feature = "floating")]
        Value::F32(v) => {
            field::write_uint32(mgr, kv_tags::FLOAT_VALUE);
            field::write_fixed32(mgr, v);
        }
        #[cfg(feature = "floating")]
        Value::F64(v) => {
            field::write_uint32(mgr, kv_tags::DOUBLE_VALUE);
            field::write_fixed64(mgr, v);
        }
        #[cfg(not(feature = "int64"))]
        Value::I64(_) => return Err(crate::error::Error::InvalidKeyValueType),
        #[cfg(not(feature = "floating"))]
        Value::F32(_) | Value::F64(_) => return Err(crate::error::Error::InvalidKeyValueType),
    }

    Ok(())
}
