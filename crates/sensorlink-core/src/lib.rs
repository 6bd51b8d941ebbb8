//! # sensorlink-core
//!
//! Shared library for sensorlink containing the `SensorState` message type and
//! the length-delimited frame codec used on the TCP stream.
//!
//! It has zero dependencies on sockets, async runtimes, or UI frameworks, so the
//! codec can be exercised with plain byte slices.
//!
//! # Architecture overview (for beginners)
//!
//! The sensorlink client talks to a vehicle sensor server over one TCP stream.
//! Both directions carry the same record, [`SensorState`], which holds the
//! tire pressure, the tire-pressure-monitor value, the cabin temperature, the
//! lights state and the fuel level.
//!
//! TCP delivers a stream of bytes, not messages, so each record is wrapped in
//! a *frame*: a varint byte count followed by exactly that many bytes of
//! protobuf-encoded body.  This is the "length-delimited" convention used by
//! protobuf's `writeDelimitedTo` / `parseDelimitedFrom`, which lets this
//! crate interoperate with peers written against the same `.proto` schema.
//!
//! - **`protocol::messages`** – the `SensorState` type and its protobuf field
//!   layout.
//! - **`protocol::codec`** – `encode_frame` / `decode_frame` and the
//!   [`FramingError`] taxonomy.

pub mod protocol;

pub use protocol::codec::{
    check_frame_len, decode_body, decode_frame, decode_frame_with_limit, decode_length_prefix,
    encode_frame, FramingError, MAX_FRAME_LEN, MAX_VARINT_LEN,
};
pub use protocol::messages::{SensorState, FUEL_LEVEL_RANGE};
