//! sensorlink-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! The client keeps one TCP session with a vehicle sensor server.  Records
//! typed by the user are sent as length-delimited `SensorState` frames;
//! records pushed by the server are decoded in a background receive loop and
//! handed to a [`SensorEventSink`](application::SensorEventSink) in the order
//! they arrived.

/// Application layer: producer and consumer interfaces, use cases.
pub mod application;

/// Infrastructure layer: network session, config storage, console parsing.
pub mod infrastructure;
