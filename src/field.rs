//! Tagged-field writer and the fixed field-number tables of the update schema
//!
//! Every field on the wire is a varint tag `(field_number << 3) | wire_type`
//! followed by a varint payload, a length-prefixed byte run, or a fixed-width
//! payload. The tag tables below are part of the format and not configurable.
//!
//! All writers here assume the active [`BufferManager`] has already assured
//! space for the bytes they emit; the encoders in [`crate::update`] reserve
//! space once per operation before writing anything.

use crate::buffer::BufferManager;
use crate::varint;

/// Protobuf wire types used by the update format
pub mod wire_type {
    /// Varint payload
    pub const VARINT: u32 = 0;
    /// 64-bit fixed-width payload
    pub const FIXED64: u32 = 1;
    /// Length-prefixed payload
    pub const LENGTH_DELIMITED: u32 = 2;
    /// 32-bit fixed-width payload
    pub const FIXED32: u32 = 5;
}

/// Compute a field tag from field number and wire type
#[inline]
pub const fn tag(field_number: u32, wire_type: u32) -> u32 {
    (field_number << 3) | wire_type
}

/// Field tags of the top-level update message
pub mod update_tags {
    use super::{tag, wire_type::*};

    /// Protocol version (field 1)
    pub const VERSION: u32 = tag(1, VARINT);
    /// Manufacturer id (field 2)
    pub const MANUFACTURER_ID: u32 = tag(2, VARINT);
    /// Model string (field 3)
    pub const MODEL: u32 = tag(3, LENGTH_DELIMITED);
    /// Device id string (field 4)
    pub const DEVICE_ID: u32 = tag(4, LENGTH_DELIMITED);
    /// Model version string (field 5)
    pub const MODEL_VERSION: u32 = tag(5, LENGTH_DELIMITED);
    /// Default key-value submessage (field 7, repeated)
    pub const DEFAULT_KV: u32 = tag(7, LENGTH_DELIMITED);
    /// Event submessage (field 8, repeated)
    pub const EVENT: u32 = tag(8, LENGTH_DELIMITED);
    /// Update timestamp (field 15)
    pub const TIMESTAMP: u32 = tag(15, VARINT);
}

/// Field tags of the event submessage
pub mod event_tags {
    use super::{tag, wire_type::*};

    /// Event name (field 1)
    pub const NAME: u32 = tag(1, LENGTH_DELIMITED);
    /// Event timestamp (field 2)
    pub const TIMESTAMP: u32 = tag(2, VARINT);
    /// Event sequence number (field 4)
    pub const SEQUENCE: u32 = tag(4, VARINT);
    /// Key-value submessage (field 15, repeated)
    pub const KV: u32 = tag(15, LENGTH_DELIMITED);
}

/// Field tags of the key-value submessage
pub mod kv_tags {
    use super::{tag, wire_type::*};

    /// Key name (field 1)
    pub const NAME: u32 = tag(1, LENGTH_DELIMITED);
    /// String value (field 2)
    pub const STRING_VALUE: u32 = tag(2, LENGTH_DELIMITED);
    /// 32-bit integer value, zig-zag (field 3)
    pub const INT32_VALUE: u32 = tag(3, VARINT);
    /// Float value (field 4)
    pub const FLOAT_VALUE: u32 = tag(4, FIXED32);
    /// Double value (field 5)
    pub const DOUBLE_VALUE: u32 = tag(5, FIXED64);
    /// 64-bit integer value, zig-zag (field 6)
    pub const INT64_VALUE: u32 = tag(6, VARINT);
}

/// Every tag in the schema fits in a single varint byte
pub const TAG_WIRE_LEN: usize = 1;

/// Write a u32 as a varint
#[inline]
pub fn write_uint32<M: BufferManager>(mgr: &mut M, value: u32) {
    let mut value = value;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        mgr.write_byte(byte);
        if value == 0 {
            return;
        }
    }
}

/// Write a u64 as a varint
#[inline]
pub fn write_uint64<M: BufferManager>(mgr: &mut M, value: u64) {
    let mut value = value;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        mgr.write_byte(byte);
        if value == 0 {
            return;
        }
    }
}

/// Write an i32 as a plain (two's complement) varint
#[inline]
pub fn write_int32<M: BufferManager>(mgr: &mut M, value: i32) {
    write_uint32(mgr, value as u32);
}

/// Write an i32 zig-zag transformed, so small negatives stay short
#[inline]
pub fn write_sint32<M: BufferManager>(mgr: &mut M, value: i32) {
    write_uint32(mgr, varint::zigzag32(value));
}

/// Write an i64 zig-zag transformed
#[cfg(feature = "int64")]
#[inline]
pub fn write_sint64<M: BufferManager>(mgr: &mut M, value: i64) {
    write_uint64(mgr, varint::zigzag64(value));
}

/// Write a length-delimited field: tag, varint length, raw bytes
#[inline]
pub fn write_bytes_field<M: BufferManager>(mgr: &mut M, field_tag: u32, bytes: &[u8]) {
    write_uint32(mgr, field_tag);
    write_uint32(mgr, bytes.len() as u32);
    mgr.write_bytes(bytes);
}

/// Exact wire length of a length-delimited field with a one-byte tag
#[inline]
pub fn bytes_field_len(payload_len: usize) -> usize {
    TAG_WIRE_LEN + varint::len_u32(payload_len as u32) + payload_len
}

/// Write a fixed32 payload, byte order per build configuration
#[cfg(feature = "floating")]
#[inline]
pub fn write_fixed32<M: BufferManager>(mgr: &mut M, value: f32) {
    #[cfg(feature = "big-endian")]
    mgr.write_bytes(&value.to_be_bytes());
    #[cfg(not(feature = "big-endian"))]
    mgr.write_bytes(&value.to_le_bytes());
}

/// Write a fixed64 payload, byte order per build configuration
#[cfg(feature = "floating")]
#[inline]
pub fn write_fixed64<M: BufferManager>(mgr: &mut M, value: f64) {
    #[cfg(feature = "big-endian")]
    mgr.write_bytes(&value.to_be_bytes());
    #[cfg(not(feature = "big-endian"))]
    mgr.write_bytes(&value.to_le_bytes());
}
