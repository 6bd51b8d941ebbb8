//! SensorDraft: producer-side editor for the next outbound record.
//!
//! The configuration screen opens pre-filled with the most recent record
//! received from the server, lets the user change individual fields as text,
//! and submits the result.  `SensorDraft` is that screen's model without the
//! widgets: it parses each edit, keeps fuel within 0-100, and hands out an
//! immutable [`SensorState`] snapshot on demand.

use std::fmt;
use std::str::FromStr;

use sensorlink_core::{SensorState, FUEL_LEVEL_RANGE};
use thiserror::Error;

/// Fuel level shown when no record has been received yet.
pub const DEFAULT_FUEL_LEVEL: i32 = 50;

/// Error returned when an edit cannot be applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("unknown field '{0}' (expected pressure, tpms, temperature, lights or fuel)")]
    UnknownField(String),
    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: SensorField, value: String },
    #[error("fuel level {0} is outside 0-100")]
    FuelOutOfRange(i32),
}

/// One editable field of a [`SensorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorField {
    Pressure,
    Tpms,
    Temperature,
    Lights,
    Fuel,
}

impl fmt::Display for SensorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorField::Pressure => "pressure",
            SensorField::Tpms => "tpms",
            SensorField::Temperature => "temperature",
            SensorField::Lights => "lights",
            SensorField::Fuel => "fuel",
        };
        f.write_str(name)
    }
}

impl FromStr for SensorField {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pressure" => Ok(SensorField::Pressure),
            "tpms" => Ok(SensorField::Tpms),
            "temperature" | "temp" => Ok(SensorField::Temperature),
            "lights" | "lights_on" => Ok(SensorField::Lights),
            "fuel" | "fuel_level" => Ok(SensorField::Fuel),
            other => Err(DraftError::UnknownField(other.to_string())),
        }
    }
}

/// Editable copy of the next record to send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorDraft {
    state: SensorState,
}

impl Default for SensorDraft {
    fn default() -> Self {
        Self::seeded(None)
    }
}

impl SensorDraft {
    /// Starts a draft from the latest received record, or from zeros with
    /// fuel at [`DEFAULT_FUEL_LEVEL`] when nothing has arrived yet.
    pub fn seeded(latest: Option<SensorState>) -> Self {
        let state =
            latest.unwrap_or_else(|| SensorState::default().with_fuel_level(DEFAULT_FUEL_LEVEL));
        Self { state }
    }

    /// The record the draft currently describes.
    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Applies one textual edit.
    ///
    /// Lights accept `on`/`off`, `true`/`false` and `1`/`0`.
    ///
    /// # Errors
    ///
    /// [`DraftError::InvalidValue`] if `value` does not parse for `field`,
    /// [`DraftError::FuelOutOfRange`] for fuel outside 0-100.  The draft is
    /// unchanged on error.
    pub fn apply(&mut self, field: SensorField, value: &str) -> Result<(), DraftError> {
        let value = value.trim();
        let invalid = || DraftError::InvalidValue {
            field,
            value: value.to_string(),
        };

        self.state = match field {
            SensorField::Pressure => {
                self.state.with_pressure(parse_finite(value).ok_or_else(invalid)?)
            }
            SensorField::Tpms => self.state.with_tpms(parse_finite(value).ok_or_else(invalid)?),
            SensorField::Temperature => {
                self.state.with_temperature(parse_finite(value).ok_or_else(invalid)?)
            }
            SensorField::Lights => {
                self.state.with_lights_on(parse_switch(value).ok_or_else(invalid)?)
            }
            SensorField::Fuel => {
                let fuel: i32 = value.parse().map_err(|_| invalid())?;
                if !FUEL_LEVEL_RANGE.contains(&fuel) {
                    return Err(DraftError::FuelOutOfRange(fuel));
                }
                self.state.with_fuel_level(fuel)
            }
        };
        Ok(())
    }
}

fn parse_finite(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
