// vsense_core/src/messages.rs

use crate::models::AirframeClass;
use crate::types::{Timestamp, VehicleHandle};
use nalgebra::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

// =========================================================================
// == "What Changed" Flag Set ==
// =========================================================================

/// Every field group a downstream consumer can be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorField {
    Accel,
    Gyro,
    Baro,
    GpsPosition,
    GpsVelocity,
    Mag,
    Airspeed,
    AttitudeSimulated,
    AttitudeOverride,
}

impl SensorField {
    pub const ALL: [SensorField; 9] = [
        SensorField::Accel,
        SensorField::Gyro,
        SensorField::Baro,
        SensorField::GpsPosition,
        SensorField::GpsVelocity,
        SensorField::Mag,
        SensorField::Airspeed,
        SensorField::AttitudeSimulated,
        SensorField::AttitudeOverride,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// A typed set of [`SensorField`]s. The backing bits are private.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UpdatedFields(u16);

impl UpdatedFields {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, field: SensorField) {
        self.0 |= field.bit();
    }

    pub fn remove(&mut self, field: SensorField) {
        self.0 &= !field.bit();
    }

    pub fn contains(&self, field: SensorField) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = SensorField> + '_ {
        SensorField::ALL
            .into_iter()
            .filter(move |field| self.contains(*field))
    }
}

impl From<SensorField> for UpdatedFields {
    fn from(field: SensorField) -> Self {
        Self(field.bit())
    }
}

impl FromIterator<SensorField> for UpdatedFields {
    fn from_iter<I: IntoIterator<Item = SensorField>>(iter: I) -> Self {
        let mut set = Self::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

impl BitOr for UpdatedFields {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<SensorField> for UpdatedFields {
    type Output = Self;

    fn bitor(mut self, rhs: SensorField) -> Self {
        self.insert(rhs);
        self
    }
}

impl BitOr for SensorField {
    type Output = UpdatedFields;

    fn bitor(self, rhs: Self) -> UpdatedFields {
        UpdatedFields::from(self) | rhs
    }
}

impl BitOrAssign for UpdatedFields {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for UpdatedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// =========================================================================
// == Bus Inputs ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightStatus {
    pub armed: bool,
}

/// Mixer input. Throttle in [0, 1], roll/pitch/yaw in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorDesired {
    pub throttle: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Commanded body rates in deg/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateDesired {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// The attitude estimate published by the estimation stack. Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeActual {
    pub q: Quaternion<f64>,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Default for AttitudeActual {
    fn default() -> Self {
        Self {
            q: Quaternion::identity(),
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

/// System configuration as it sits on the bus. The airframe type is kept raw
/// because the bus may hold values this build does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemSettings {
    pub airframe_type: u8,
}

/// Home location. Latitude/longitude in degrees * 1e7, altitude in meters,
/// `be` is the local magnetic field in the NED frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeLocation {
    pub latitude_e7: i32,
    pub longitude_e7: i32,
    pub altitude: f64,
    pub be: Vector3<f64>,
}

impl Default for HomeLocation {
    fn default() -> Self {
        Self {
            latitude_e7: 0,
            longitude_e7: 0,
            altitude: 0.0,
            be: Vector3::new(26000.0, 400.0, 40000.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GyrosBias {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GyrosBias {
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

// =========================================================================
// == Bus Outputs ==
// =========================================================================

/// Specific force in m/s^2, body frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accels {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub temperature: f64,
}

impl Accels {
    pub fn from_vector(v: Vector3<f64>, temperature: f64) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
            temperature,
        }
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Body rates in deg/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gyros {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Gyros {
    pub fn from_vector(v: Vector3<f64>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaroAltitude {
    pub altitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GpsFixStatus {
    NoGps,
    NoFix,
    Fix2D,
    #[default]
    Fix3D,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsPosition {
    pub latitude_e7: i32,
    pub longitude_e7: i32,
    pub altitude: f64,
    pub groundspeed: f64,
    /// Course over ground in degrees, (-180, 180].
    pub heading: f64,
    pub satellites: u8,
    pub pdop: f64,
    pub status: GpsFixStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsVelocity {
    pub north: f64,
    pub east: f64,
    pub down: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Magnetometer {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Magnetometer {
    pub fn from_vector(v: Vector3<f64>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AirspeedSensor {
    pub connected: bool,
    /// Indicated airspeed in m/s.
    pub calibrated_airspeed: f64,
}

/// Ground truth of a dynamic model, published for comparison against the estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeSimulated {
    pub q: Quaternion<f64>,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

// =========================================================================
// == Tick Summary ==
// =========================================================================

/// What one engine tick did. The Bevy adapter wraps this in an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorPacket {
    pub vehicle: VehicleHandle,
    pub timestamp: Timestamp,
    pub class: AirframeClass,
    pub updated: UpdatedFields,
}
