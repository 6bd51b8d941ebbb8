//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML client configuration, supplies
//! defaults when the file does not exist yet, and converts the result into
//! the network layer's [`ConnectionConfig`](crate::infrastructure::network::ConnectionConfig).

pub mod config;
