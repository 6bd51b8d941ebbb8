//! Protocol module containing the message type and the frame codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_frame, decode_length_prefix, encode_frame, FramingError};
pub use messages::SensorState;
