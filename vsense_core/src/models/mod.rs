// vsense_core/src/models/mod.rs

use crate::bus::StateBus;
use crate::config::EngineConfig;
use crate::estimation::mag_bias::MagBiasEstimator;
use crate::messages::{
    Accels, AirspeedSensor, AttitudeActual, AttitudeSimulated, BaroAltitude, GpsPosition,
    GpsVelocity, Gyros, Magnetometer, SensorField, UpdatedFields,
};
use crate::random::RandomSource;
use crate::types::{Clock, Timestamp};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod agnostic;
pub mod airplane;
pub mod constant;
pub mod drift;
pub mod gnss;
pub mod outputs;
pub mod quadcopter;
pub mod rigid_body;
pub mod scheduling;

pub use agnostic::ModelAgnostic;
pub use airplane::AirplaneModel;
pub use constant::ConstantModel;
pub use quadcopter::QuadcopterModel;

// =========================================================================
// == Airframe Types & Classes ==
// =========================================================================

/// The airframe setting as the flight stack enumerates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AirframeType {
    FixedWing = 0,
    FixedWingElevon = 1,
    FixedWingVtail = 2,
    Vtol = 3,
    HeliCp = 4,
    QuadX = 5,
    QuadP = 6,
    Hexa = 7,
    Octo = 8,
    Custom = 9,
    HexaX = 10,
    OctoV = 11,
    OctoCoaxP = 12,
    OctoCoaxX = 13,
    HexaCoax = 14,
    Tri = 15,
    GroundVehicleCar = 16,
    GroundVehicleDifferential = 17,
    GroundVehicleMotorcycle = 18,
}

impl AirframeType {
    pub const ALL: [AirframeType; 19] = [
        AirframeType::FixedWing,
        AirframeType::FixedWingElevon,
        AirframeType::FixedWingVtail,
        AirframeType::Vtol,
        AirframeType::HeliCp,
        AirframeType::QuadX,
        AirframeType::QuadP,
        AirframeType::Hexa,
        AirframeType::Octo,
        AirframeType::Custom,
        AirframeType::HexaX,
        AirframeType::OctoV,
        AirframeType::OctoCoaxP,
        AirframeType::OctoCoaxX,
        AirframeType::HexaCoax,
        AirframeType::Tri,
        AirframeType::GroundVehicleCar,
        AirframeType::GroundVehicleDifferential,
        AirframeType::GroundVehicleMotorcycle,
    ];
}

impl TryFrom<u8> for AirframeType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        AirframeType::ALL.get(raw as usize).copied().ok_or(raw)
    }
}

/// Which model variant runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AirframeClass {
    Constant,
    ModelAgnostic,
    Quadcopter,
    Airplane,
}

impl AirframeClass {
    pub fn from_airframe(airframe: AirframeType) -> Self {
        match airframe {
            AirframeType::FixedWing | AirframeType::FixedWingElevon | AirframeType::FixedWingVtail => {
                AirframeClass::Airplane
            }
            AirframeType::QuadX
            | AirframeType::QuadP
            | AirframeType::Vtol
            | AirframeType::Hexa
            | AirframeType::Octo => AirframeClass::Quadcopter,
            _ => AirframeClass::ModelAgnostic,
        }
    }

    /// Unknown raw values fall back to the model-agnostic variant.
    pub fn from_raw(raw: u8) -> Self {
        AirframeType::try_from(raw)
            .map(Self::from_airframe)
            .unwrap_or(AirframeClass::ModelAgnostic)
    }
}

// =========================================================================
// == Model Trait & Tick Context ==
// =========================================================================

/// Everything a variant may touch during one tick.
pub struct TickContext<'a> {
    pub bus: &'a mut dyn StateBus,
    pub clock: &'a dyn Clock,
    pub noise: &'a mut dyn RandomSource,
    pub mag_bias: &'a mut dyn MagBiasEstimator,
    pub config: &'a EngineConfig,
    /// Fixed per-instance accelerometer bias.
    pub accel_bias: Vector3<f64>,
    published: UpdatedFields,
}

impl<'a> TickContext<'a> {
    pub fn new(
        bus: &'a mut dyn StateBus,
        clock: &'a dyn Clock,
        noise: &'a mut dyn RandomSource,
        mag_bias: &'a mut dyn MagBiasEstimator,
        config: &'a EngineConfig,
        accel_bias: Vector3<f64>,
    ) -> Self {
        Self {
            bus,
            clock,
            noise,
            mag_bias,
            config,
            accel_bias,
            published: UpdatedFields::empty(),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// One Gaussian variate per axis.
    pub fn gaussian3(&mut self) -> Vector3<f64> {
        Vector3::new(
            self.noise.gaussian(),
            self.noise.gaussian(),
            self.noise.gaussian(),
        )
    }

    pub fn published(&self) -> UpdatedFields {
        self.published
    }

    pub fn publish_accels(&mut self, accels: Accels) {
        self.bus.set_accels(accels);
        self.published.insert(SensorField::Accel);
    }

    pub fn publish_gyros(&mut self, gyros: Gyros) {
        self.bus.set_gyros(gyros);
        self.published.insert(SensorField::Gyro);
    }

    pub fn publish_baro(&mut self, altitude: f64) {
        self.bus.set_baro_altitude(BaroAltitude { altitude });
        self.published.insert(SensorField::Baro);
    }

    pub fn publish_gps_position(&mut self, position: GpsPosition) {
        self.bus.set_gps_position(position);
        self.published.insert(SensorField::GpsPosition);
    }

    pub fn publish_gps_velocity(&mut self, velocity: GpsVelocity) {
        self.bus.set_gps_velocity(velocity);
        self.published.insert(SensorField::GpsVelocity);
    }

    /// Runs the bias estimator over a raw reading and publishes the result.
    pub fn publish_mag_raw(&mut self, raw: Vector3<f64>) {
        let attitude = self.bus.attitude_actual();
        let home = self.bus.home_location();
        let corrected = self.mag_bias.correct(raw, &attitude, &home);
        self.publish_mag(Magnetometer::from_vector(corrected));
    }

    /// Publishes a reading as-is, without bias estimation.
    pub fn publish_mag(&mut self, mag: Magnetometer) {
        self.bus.set_magnetometer(mag);
        self.published.insert(SensorField::Mag);
    }

    pub fn publish_airspeed(&mut self, airspeed: AirspeedSensor) {
        self.bus.set_airspeed(airspeed);
        self.published.insert(SensorField::Airspeed);
    }

    pub fn publish_truth(&mut self, truth: AttitudeSimulated) {
        self.bus.set_attitude_simulated(truth);
        self.published.insert(SensorField::AttitudeSimulated);
    }

    pub fn override_attitude(&mut self, attitude: AttitudeActual) {
        self.bus.set_attitude_actual(attitude);
        self.published.insert(SensorField::AttitudeOverride);
    }
}

// --- AIRFRAME MODEL TRAIT ---
/// One way of turning the bus inputs into synthetic sensor readings.
pub trait AirframeModel: Debug + Send + Sync {
    fn class(&self) -> AirframeClass;

    /// Advances the model by one tick and publishes whatever is due.
    fn simulate(&mut self, ctx: &mut TickContext<'_>);
}

// =========================================================================
// == Selector ==
// =========================================================================

/// Owns every variant so that switching airframes never resets the ones
/// not currently selected.
#[derive(Debug)]
pub struct AirframeModels {
    pub constant: ConstantModel,
    pub agnostic: ModelAgnostic,
    pub quadcopter: QuadcopterModel,
    pub airplane: AirplaneModel,
    last_unknown: Option<u8>,
    last_class: Option<AirframeClass>,
}

impl AirframeModels {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            constant: ConstantModel,
            agnostic: ModelAgnostic,
            quadcopter: QuadcopterModel::new(config),
            airplane: AirplaneModel::new(config),
            last_unknown: None,
            last_class: None,
        }
    }

    /// Decides this tick's class from the raw airframe setting.
    pub fn select(&mut self, raw_airframe: u8, forced: Option<AirframeClass>) -> AirframeClass {
        let class = match forced {
            Some(class) => class,
            None => match AirframeType::try_from(raw_airframe) {
                Ok(airframe) => {
                    self.last_unknown = None;
                    AirframeClass::from_airframe(airframe)
                }
                Err(raw) => {
                    if self.last_unknown != Some(raw) {
                        log::warn!(
                            "Unknown airframe type {}; falling back to the model-agnostic variant",
                            raw
                        );
                        self.last_unknown = Some(raw);
                    }
                    AirframeClass::ModelAgnostic
                }
            },
        };

        if self.last_class != Some(class) {
            log::debug!("Airframe model switched to {:?}", class);
            self.last_class = Some(class);
        }
        class
    }

    pub fn get_mut(&mut self, class: AirframeClass) -> &mut dyn AirframeModel {
        match class {
            AirframeClass::Constant => &mut self.constant,
            AirframeClass::ModelAgnostic => &mut self.agnostic,
            AirframeClass::Quadcopter => &mut self.quadcopter,
            AirframeClass::Airplane => &mut self.airplane,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airframe_families_map_to_classes() {
        assert_eq!(
            AirframeClass::from_airframe(AirframeType::FixedWingVtail),
            AirframeClass::Airplane
        );
        assert_eq!(
            AirframeClass::from_airframe(AirframeType::Octo),
            AirframeClass::Quadcopter
        );
        assert_eq!(
            AirframeClass::from_airframe(AirframeType::Tri),
            AirframeClass::ModelAgnostic
        );
        assert_eq!(
            AirframeClass::from_airframe(AirframeType::GroundVehicleCar),
            AirframeClass::ModelAgnostic
        );
    }

    #[test]
    fn raw_values_round_trip_through_repr() {
        for airframe in AirframeType::ALL {
            assert_eq!(AirframeType::try_from(airframe as u8), Ok(airframe));
        }
        assert_eq!(AirframeType::try_from(200), Err(200));
    }

    #[test]
    fn unknown_airframe_falls_back_to_agnostic() {
        assert_eq!(AirframeClass::from_raw(250), AirframeClass::ModelAgnostic);

        let mut models = AirframeModels::new(&EngineConfig::default());
        assert_eq!(models.select(250, None), AirframeClass::ModelAgnostic);
        assert_eq!(
            models.select(AirframeType::QuadX as u8, None),
            AirframeClass::Quadcopter
        );
    }

    #[test]
    fn forced_class_wins_over_airframe() {
        let mut models = AirframeModels::new(&EngineConfig::default());
        let class = models.select(AirframeType::FixedWing as u8, Some(AirframeClass::Constant));
        assert_eq!(class, AirframeClass::Constant);
        assert_eq!(models.get_mut(class).class(), AirframeClass::Constant);
    }
}
