//! Application layer: the collaborator interfaces and use cases of the client.
//!
//! - **`event_sink`** – the consumer interface.  The network layer reports
//!   every inbound record and every failure to a `SensorEventSink`; the UI
//!   owns the implementation.  `ChannelSink` forwards events to a UI loop.
//!
//! - **`submit_state`** – the producer interface.  `SubmitStateUseCase`
//!   triggers one send per submitted record through a `StateSender`
//!   implemented by the infrastructure layer.
//!
//! - **`edit_state`** – `SensorDraft`, the model behind the sensor
//!   configuration screen: seeded from the last received record, edited field
//!   by field, validated before it becomes a `SensorState`.

pub mod edit_state;
pub mod event_sink;
pub mod submit_state;

pub use edit_state::{DraftError, SensorDraft, SensorField};
pub use event_sink::{ChannelSink, ErrorKind, SensorEvent, SensorEventSink};
pub use submit_state::{SendError, StateSender, SubmitStateUseCase};
