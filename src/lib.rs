//! teclient: compact, protobuf-compatible update encoder for constrained devices
//!
//! This crate incrementally encodes a hierarchical telemetry "update" message
//! (device/manufacturer metadata, default key-values, and a stream of timed
//! events with typed key-value payloads) directly into a caller-supplied or
//! dynamically growing byte buffer. The output is a plain protobuf wire-format
//! message, so any generic protobuf tooling can read it — but no protobuf
//! runtime is needed on the device.
//!
//! # Wire Format
//!
//! ```text
//! update:   version=1 varint | mfg_id=2 varint | model=3 bytes
//!           | device_id=4 bytes | model_version=5 bytes | timestamp=15 varint
//!           | default=7 submsg* | event=8 submsg*
//! event:    name=1 bytes | timestamp=2 varint | sequence=4 varint
//!           | kv=15 submsg*
//! kv:       name=1 bytes | sval=2 bytes | i32=3 zigzag | float=4 fixed32
//!           | double=5 fixed64 | i64=6 zigzag
//! ```
//!
//! # Features
//!
//! - Encode-only: no parser, no schema runtime, no allocation on the fixed path
//! - Pluggable buffer strategy: fixed caller-owned slice or growing `Vec`
//! - All-or-nothing batch writes: a failed reservation leaves the buffer intact
//! - Optional 64-bit integer and floating-point values behind Cargo features
//! - `no_std` support (the growable strategy uses `alloc`)
//!
//! # Example
//!
//! ```rust
//! use teclient::{GrowableBuffer, KeyValue, UpdateEncoder};
//!
//! let mut update = UpdateEncoder::new(GrowableBuffer::new(), 1337, "bass-o-matic")?;
//! update.add_defaults(&[KeyValue::string("modelVer", "102")])?;
//! update.add_event(
//!     "powerOn",
//!     0, // timestamp unknown: omitted from the wire
//!     0, // no sequence number
//!     &[
//!         KeyValue::string("description", "shiny"),
//!         KeyValue::int32("temperature", 98),
//!     ],
//! )?;
//!
//! // Deliver update.as_slice() however you like; the bytes are already
//! // a complete, well-formed message prefix at every point.
//! assert!(!update.as_slice().is_empty());
//! # Ok::<(), teclient::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod buffer;
pub mod error;
pub mod field;
pub mod kv;
pub mod update;
pub mod varint;

// Re-export main types
pub use buffer::{BufferManager, FixedBuffer, GrowableBuffer};
pub use error::{Error, Result};
pub use kv::{KeyValue, Value};
pub use update::UpdateEncoder;

/// Current protocol version, written as the first field of every update
pub const PROTOCOL_VERSION: i32 = 1;

/// Timestamp type: 64-bit milliseconds since the epoch
#[cfg(feature = "timestamp64")]
pub type Timestamp = u64;

/// Timestamp type: 32-bit seconds since the epoch
#[cfg(not(feature = "timestamp64"))]
pub type Timestamp = u32;
