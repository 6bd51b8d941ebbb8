//! The `SensorState` record exchanged in both directions on the stream.
//!
//! # Field layout
//!
//! `SensorState` is a protobuf (proto3) message.  The equivalent schema is:
//!
//! ```text
//! message SensorData {
//!   float pressure    = 1;   // psi
//!   float tpms        = 2;   // tire-pressure-monitor raw value
//!   float temperature = 3;   // degrees Celsius
//!   bool  lightsOn    = 4;
//!   int32 fuelLevel   = 5;   // percent, 0-100 by convention
//! }
//! ```
//!
//! The tag numbers matter: a peer compiled from the schema above decodes our
//! frames, and we decode theirs.
//!
//! # Immutability
//!
//! The fields are private.  A `SensorState` is built once with
//! [`SensorState::new`] and "changed" with the consuming `with_*` methods,
//! which return a new value.  Because the type is `Copy`, a record passed to
//! a send is always a snapshot the producer cannot alter while it is in
//! flight.

use std::fmt;
use std::ops::RangeInclusive;

use prost::Message;

/// Fuel level range the producing UI keeps values in.
///
/// The wire format does not enforce this; see [`SensorState::fuel_level_in_range`].
pub const FUEL_LEVEL_RANGE: RangeInclusive<i32> = 0..=100;

/// Snapshot of the vehicle sensor values.
///
/// `prost` derives `Default` (all zeros, lights off) and `Debug` for this type.
#[derive(Clone, Copy, PartialEq, Message)]
pub struct SensorState {
    /// Tire pressure in psi.
    #[prost(float, tag = "1")]
    pressure: f32,

    /// Tire-pressure-monitor raw value.
    #[prost(float, tag = "2")]
    tpms: f32,

    /// Temperature in degrees Celsius.
    #[prost(float, tag = "3")]
    temperature: f32,

    /// Whether the lights are on.
    #[prost(bool, tag = "4")]
    lights_on: bool,

    /// Fuel level in percent.
    #[prost(int32, tag = "5")]
    fuel_level: i32,
}

impl SensorState {
    /// Creates a record from all five sensor values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sensorlink_core::SensorState;
    ///
    /// let state = SensorState::new(32.5, 1.0, 21.0, true, 75);
    /// assert_eq!(state.fuel_level(), 75);
    /// assert!(state.lights_on());
    /// ```
    pub fn new(
        pressure: f32,
        tpms: f32,
        temperature: f32,
        lights_on: bool,
        fuel_level: i32,
    ) -> Self {
        Self {
            pressure,
            tpms,
            temperature,
            lights_on,
            fuel_level,
        }
    }

    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    pub fn tpms(&self) -> f32 {
        self.tpms
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn lights_on(&self) -> bool {
        self.lights_on
    }

    pub fn fuel_level(&self) -> i32 {
        self.fuel_level
    }

    #[must_use]
    pub fn with_pressure(self, pressure: f32) -> Self {
        Self { pressure, ..self }
    }

    #[must_use]
    pub fn with_tpms(self, tpms: f32) -> Self {
        Self { tpms, ..self }
    }

    #[must_use]
    pub fn with_temperature(self, temperature: f32) -> Self {
        Self { temperature, ..self }
    }

    #[must_use]
    pub fn with_lights_on(self, lights_on: bool) -> Self {
        Self { lights_on, ..self }
    }

    #[must_use]
    pub fn with_fuel_level(self, fuel_level: i32) -> Self {
        Self { fuel_level, ..self }
    }

    /// Returns `true` when `fuel_level` lies in [`FUEL_LEVEL_RANGE`].
    ///
    /// Producers use this to reject out-of-range input; the codec accepts any
    /// `i32`.
    pub fn fuel_level_in_range(&self) -> bool {
        FUEL_LEVEL_RANGE.contains(&self.fuel_level)
    }
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TPMS:{}, Pressure:{}, Lights:{}, Temperature:{}, Fuel Level:{}",
            self.tpms, self.pressure, self.lights_on, self.temperature, self.fuel_level
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
