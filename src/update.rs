//! Incremental encoder for the top-level update message
//!
//! An [`UpdateEncoder`] is bound to one buffer strategy at construction and
//! appends header fields, default key-values, and event submessages in call
//! order. Batch operations precalculate their exact nested wire size, reserve
//! it in a single `assure_space` call, and only then write — so a failed
//! reservation leaves the buffer byte-for-byte as it was, and every prefix of
//! the buffer is a well-formed message at all times.

use crate::buffer::BufferManager;
use crate::error::Result;
use crate::field::{self, event_tags, update_tags, TAG_WIRE_LEN};
use crate::kv::{self, KeyValue};
use crate::varint;
use crate::{Timestamp, PROTOCOL_VERSION};

/// Reservation slack for the header written at construction, on top of the
/// model string: version + manufacturer id + tags and length prefixes
const INIT_SLACK: usize = 40;

/// Reservation slack for a single optional string header field: tag plus a
/// maximal length prefix
const STRING_FIELD_SLACK: usize = 7;

/// Reservation for an update timestamp field: tag plus a maximal varint
const TIMESTAMP_RESERVE: usize = 11;

/// Reservation slack for an event on top of its exact nested size: the event
/// tag and length prefix
const EVENT_SLACK: usize = 12;

#[inline]
fn timestamp_wire_len(ts: Timestamp) -> usize {
    #[cfg(feature = "timestamp64")]
    {
        varint::len_u64(ts)
    }
    #[cfg(not(feature = "timestamp64"))]
    {
        varint::len_u32(ts)
    }
}

#[inline]
fn write_timestamp<M: BufferManager>(mgr: &mut M, ts: Timestamp) {
    #[cfg(feature = "timestamp64")]
    field::write_uint64(mgr, ts);
    #[cfg(not(feature = "timestamp64"))]
    field::write_uint32(mgr, ts);
}

/// Streaming encoder for one update message
///
/// Bound to a [`BufferManager`] for its whole life; there is no terminal
/// state, the buffer stays appendable until the encoder is dropped or
/// consumed with [`into_buffer`](Self::into_buffer).
pub struct UpdateEncoder<M: BufferManager> {
    mgr: M,
}

impl<M: BufferManager> UpdateEncoder<M> {
    /// Create an encoder and write the update header: protocol version,
    /// manufacturer id, and model
    ///
    /// Fails with [`Error::Allocation`](crate::Error::Allocation) if the
    /// initial reservation cannot be satisfied; nothing is written then.
    pub fn new(mut mgr: M, manufacturer_id: i32, model: &str) -> Result<Self> {
        mgr.assure_space(model.len() + INIT_SLACK)?;

        field::write_uint32(&mut mgr, update_tags::VERSION);
        field::write_int32(&mut mgr, PROTOCOL_VERSION);

        field::write_uint32(&mut mgr, update_tags::MANUFACTURER_ID);
        field::write_int32(&mut mgr, manufacturer_id);

        field::write_bytes_field(&mut mgr, update_tags::MODEL, model.as_bytes());

        Ok(Self { mgr })
    }

    /// Append a device id header field
    ///
    /// Repeat calls append duplicate fields rather than overwrite; avoiding
    /// wire duplication is the caller's responsibility.
    pub fn set_device_id(&mut self, device_id: &str) -> Result<()> {
        self.write_string_field(update_tags::DEVICE_ID, device_id)
    }

    /// Append a model version header field
    pub fn set_model_version(&mut self, model_version: &str) -> Result<()> {
        self.write_string_field(update_tags::MODEL_VERSION, model_version)
    }

    /// Append an update-level timestamp field
    pub fn set_timestamp(&mut self, timestamp: Timestamp) -> Result<()> {
        self.mgr.assure_space(TIMESTAMP_RESERVE)?;
        field::write_uint32(&mut self.mgr, update_tags::TIMESTAMP);
        write_timestamp(&mut self.mgr, timestamp);
        Ok(())
    }

    /// Append key-values that apply to all events of this update
    ///
    /// All-or-nothing: one reservation sized to the exact sum of every
    /// pair's wire size; if it fails, no partial defaults are written.
    pub fn add_defaults(&mut self, kvs: &[KeyValue<'_>]) -> Result<()> {
        let mut len = 0;
        for kv in kvs {
            let size = kv::wire_size(kv)?;
            len += TAG_WIRE_LEN + varint::len_u32(size as u32) + size;
        }

        self.mgr.assure_space(len)?;

        for kv in kvs {
            let size = kv::wire_size(kv)?;
            field::write_uint32(&mut self.mgr, update_tags::DEFAULT_KV);
            field::write_uint32(&mut self.mgr, size as u32);
            kv::write(&mut self.mgr, kv)?;
        }

        Ok(())
    }

    /// Append one event: name, optional timestamp, optional sequence number,
    /// and its key-values, as a single length-delimited submessage
    ///
    /// A zero timestamp or sequence is omitted from the wire entirely.
    /// All-or-nothing: the full nested size is precalculated and reserved
    /// before the first byte of the event is written.
    pub fn add_event(
        &mut self,
        name: &str,
        timestamp: Timestamp,
        sequence: u32,
        kvs: &[KeyValue<'_>],
    ) -> Result<()> {
        let mut event_len = 0;
        for kv in kvs {
            let size = kv::wire_size(kv)?;
            event_len += TAG_WIRE_LEN + varint::len_u32(size as u32) + size;
        }

        event_len += field::bytes_field_len(name.len());

        if timestamp != 0 {
            event_len += TAG_WIRE_LEN + timestamp_wire_len(timestamp);
        }

        if sequence != 0 {
            event_len += TAG_WIRE_LEN + varint::len_u32(sequence);
        }

        self.mgr.assure_space(event_len + EVENT_SLACK)?;

        field::write_uint32(&mut self.mgr, update_tags::EVENT);
        field::write_uint32(&mut self.mgr, event_len as u32);

        field::write_bytes_field(&mut self.mgr, event_tags::NAME, name.as_bytes());

        if timestamp != 0 {
            field::write_uint32(&mut self.mgr, event_tags::TIMESTAMP);
            write_timestamp(&mut self.mgr, timestamp);
        }

        if sequence != 0 {
            field::write_uint32(&mut self.mgr, event_tags::SEQUENCE);
            field::write_uint32(&mut self.mgr, sequence);
        }

        for kv in kvs {
            let size = kv::wire_size(kv)?;
            field::write_uint32(&mut self.mgr, event_tags::KV);
            field::write_uint32(&mut self.mgr, size as u32);
            kv::write(&mut self.mgr, kv)?;
        }

        Ok(())
    }

    /// The encoded bytes written so far
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.mgr.as_slice()
    }

    /// Number of valid bytes written so far
    #[inline]
    pub fn used(&self) -> usize {
        self.mgr.used()
    }

    /// Current capacity of the backing storage
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mgr.capacity()
    }

    /// Consume the encoder and hand back the buffer strategy
    ///
    /// The caller must finish copying the bytes out before reusing or
    /// dropping the returned storage.
    #[inline]
    pub fn into_buffer(self) -> M {
        self.mgr
    }

    fn write_string_field(&mut self, field_tag: u32, value: &str) -> Result<()> {
        self.mgr.assure_space(value.len() + STRING_FIELD_SLACK)?;
        field::write_bytes_field(&mut self.mgr, field_tag, value.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{FixedBuffer, GrowableBuffer};
    use crate::error::Error;

    fn growable(manufacturer_id: i32, model: &str) -> UpdateEncoder<GrowableBuffer> {
        UpdateEncoder::new(GrowableBuffer::new(), manufacturer_id, model).unwrap()
    }

    #[test]
    fn test_header_known_bytes() {
        let update = growable(1, "m");
        // version=1, mfg_id=1, model="m"
        assert_eq!(update.as_slice(), &[0x08, 0x01, 0x10, 0x01, 0x1A, 0x01, b'm']);
    }

    #[test]
    fn test_header_multibyte_manufacturer_id() {
        let update = growable(1337, "bass-o-matic");
        let mut expected = alloc::vec![0x08, 0x01, 0x10, 0xB9, 0x0A, 0x1A, 0x0C];
        expected.extend_from_slice(b"bass-o-matic");
        assert_eq!(update.as_slice(), expected);
    }

    #[test]
    fn test_optional_header_fields_append_in_call_order() {
        let mut update = growable(1, "m");
        let header_len = update.used();

        update.set_device_id("dev-1").unwrap();
        update.set_model_version("2.0").unwrap();

        let mut expected = alloc::vec![0x22, 0x05];
        expected.extend_from_slice(b"dev-1");
        expected.extend_from_slice(&[0x2A, 0x03]);
        expected.extend_from_slice(b"2.0");
        assert_eq!(&update.as_slice()[header_len..], expected);
    }

    #[test]
    fn test_repeated_setter_appends_duplicate_field() {
        let mut update = growable(1, "m");
        update.set_device_id("x").unwrap();
        let after_first = update.used();
        update.set_device_id("x").unwrap();
        assert_eq!(update.used(), after_first * 2 - 7); // header + two 3-byte fields
        assert_eq!(&update.as_slice()[after_first..], &[0x22, 0x01, b'x']);
    }

    #[test]
    fn test_set_timestamp_known_bytes() {
        let mut update = growable(1, "m");
        let header_len = update.used();
        update.set_timestamp(5).unwrap();
        assert_eq!(&update.as_slice()[header_len..], &[0x78, 0x05]);
    }

    #[test]
    fn test_add_defaults_known_bytes() {
        let mut update = growable(1, "m");
        let header_len = update.used();

        update.add_defaults(&[KeyValue::int32("a", -1)]).unwrap();

        // default tag, length 5, kv body {name "a", i32 -1}
        assert_eq!(
            &update.as_slice()[header_len..],
            &[0x3A, 0x05, 0x0A, 0x01, b'a', 0x18, 0x01]
        );
    }

    #[test]
    fn test_add_event_omits_zero_timestamp_and_sequence() {
        let mut update = growable(1, "m");
        let header_len = update.used();

        update
            .add_event("e", 0, 0, &[KeyValue::int32("a", -1)])
            .unwrap();

        assert_eq!(
            &update.as_slice()[header_len..],
            &[
                0x42, 0x0A, // event, 10 bytes
                0x0A, 0x01, b'e', // name
                0x7A, 0x05, 0x0A, 0x01, b'a', 0x18, 0x01, // kv
            ]
        );
    }

    #[test]
    fn test_add_event_with_timestamp_and_sequence() {
        let mut update = growable(1, "m");
        let header_len = update.used();

        update
            .add_event("e", 5, 7, &[KeyValue::int32("a", -1)])
            .unwrap();

        assert_eq!(
            &update.as_slice()[header_len..],
            &[
                0x42, 0x0E, // event, 14 bytes
                0x0A, 0x01, b'e', // name
                0x10, 0x05, // timestamp
                0x20, 0x07, // sequence
                0x7A, 0x05, 0x0A, 0x01, b'a', 0x18, 0x01, // kv
            ]
        );
    }

    #[test]
    fn test_event_length_prefix_is_exact() {
        let mut update = growable(1, "m");
        let header_len = update.used();

        update
            .add_event(
                "mixed",
                42,
                3,
                &[
                    KeyValue::string("description", "shiny"),
                    KeyValue::int32("temperature", 98),
                ],
            )
            .unwrap();

        let body = &update.as_slice()[header_len..];
        assert_eq!(body[0], 0x42);
        let (event_len, prefix) = crate::varint::decode_u32(&body[1..]).unwrap();
        assert_eq!(body.len(), 1 + prefix + event_len as usize);
    }

    #[test]
    fn test_init_fails_cleanly_on_tiny_fixed_buffer() {
        let mut storage = [0u8; 8];
        let result = UpdateEncoder::new(FixedBuffer::new(&mut storage), 1, "m");
        assert!(matches!(result, Err(Error::Allocation)));
    }

    #[test]
    fn test_add_event_is_all_or_nothing_on_exhaustion() {
        // Construction reserves model.len() + 40, so 41 bytes admits the
        // 7-byte header and leaves 34. The event below reserves 44.
        let mut storage = [0u8; 41];
        let mut update = UpdateEncoder::new(FixedBuffer::new(&mut storage), 1, "m").unwrap();
        assert_eq!(update.used(), 7);

        let err = update.add_event(
            "e",
            0,
            0,
            &[KeyValue::string("payload", "0123456789abcdef")],
        );
        assert_eq!(err, Err(Error::Allocation));
        assert_eq!(update.used(), 7);
    }

    #[test]
    fn test_add_defaults_is_all_or_nothing_on_exhaustion() {
        // 34 bytes remain after the header; this pair frames to 45.
        let mut storage = [0u8; 41];
        let mut update = UpdateEncoder::new(FixedBuffer::new(&mut storage), 1, "m").unwrap();

        let err = update.add_defaults(&[KeyValue::string(
            "payload",
            "0123456789abcdefghijklmnopqrstuv",
        )]);
        assert_eq!(err, Err(Error::Allocation));
        assert_eq!(update.used(), 7);
        assert_eq!(update.as_slice(), &[0x08, 0x01, 0x10, 0x01, 0x1A, 0x01, b'm']);
    }

    #[test]
    fn test_add_defaults_succeeds_with_exact_capacity() {
        // The defaults reservation is exact; this pair frames to the 34
        // bytes remaining after the header.
        let mut storage = [0u8; 41];
        let mut update = UpdateEncoder::new(FixedBuffer::new(&mut storage), 1, "m").unwrap();
        update
            .add_defaults(&[KeyValue::string("key", "0123456789012345678901234")])
            .unwrap();
        assert_eq!(update.used(), 41);
    }

    #[test]
    fn test_used_never_exceeds_capacity() {
        let mut update = growable(1337, "bass-o-matic");
        for i in 0u32..200 {
            update
                .add_event("tick", Timestamp::from(i + 1), i, &[KeyValue::int32("n", i as i32)])
                .unwrap();
            assert!(update.used() <= update.capacity());
        }
    }
}
