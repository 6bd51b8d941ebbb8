//! Infrastructure layer for the client application.
//!
//! Contains the OS-facing adapters: the TCP network session, file-system
//! configuration storage, and the terminal command parser.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `sensorlink_core`, but MUST NOT be imported by the `application` layer.

pub mod console;
pub mod network;
pub mod storage;
