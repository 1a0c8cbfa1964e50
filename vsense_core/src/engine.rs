// vsense_core/src/engine.rs

use crate::bus::StateBus;
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::estimation::mag_bias::{self, MagBiasEstimator};
use crate::messages::SensorPacket;
use crate::models::rigid_body::VehicleState;
use crate::models::{AirframeClass, AirframeModels, TickContext};
use crate::random::RandomSource;
use crate::types::{Clock, VehicleHandle};
use nalgebra::Vector3;

/// One virtual sensor suite. Owns every airframe variant, the noise source
/// and the magnetometer bias estimate of a single vehicle.
#[derive(Debug)]
pub struct SensorEngine {
    vehicle: VehicleHandle,
    config: EngineConfig,
    models: AirframeModels,
    noise: Box<dyn RandomSource>,
    mag_bias: Box<dyn MagBiasEstimator>,
    accel_bias: Vector3<f64>,
    active: Option<AirframeClass>,
}

impl SensorEngine {
    pub fn new(config: EngineConfig, source: impl RandomSource + 'static) -> Result<Self, ConfigError> {
        Self::from_parts(config, Box::new(source))
    }

    /// Builds its own deterministic generator with the configured sampler.
    pub fn seeded(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        let source = config.sampler.seeded(seed);
        Self::from_parts(config, source)
    }

    fn from_parts(config: EngineConfig, mut noise: Box<dyn RandomSource>) -> Result<Self, ConfigError> {
        config.validate()?;

        let stddev = config.accel_bias_stddev;
        let accel_bias = Vector3::new(noise.gaussian(), noise.gaussian(), noise.gaussian()) * stddev;

        Ok(Self {
            vehicle: VehicleHandle::default(),
            models: AirframeModels::new(&config),
            mag_bias: mag_bias::from_config(&config.mag_bias),
            noise,
            accel_bias,
            active: None,
            config,
        })
    }

    pub fn with_vehicle(mut self, vehicle: VehicleHandle) -> Self {
        self.vehicle = vehicle;
        self
    }

    /// Runs the variant the bus's airframe setting selects and reports what
    /// it published.
    pub fn step(&mut self, bus: &mut dyn StateBus, clock: &dyn Clock) -> SensorPacket {
        let raw_airframe = bus.system_settings().airframe_type;
        let class = self.models.select(raw_airframe, self.config.forced_class);
        self.active = Some(class);

        let timestamp = clock.now();
        let mut ctx = TickContext::new(
            bus,
            clock,
            &mut *self.noise,
            &mut *self.mag_bias,
            &self.config,
            self.accel_bias,
        );
        self.models.get_mut(class).simulate(&mut ctx);

        SensorPacket {
            vehicle: self.vehicle,
            timestamp,
            class,
            updated: ctx.published(),
        }
    }

    /// The class of the most recent step, if any.
    pub fn active_class(&self) -> Option<AirframeClass> {
        self.active
    }

    pub fn mag_bias(&self) -> Vector3<f64> {
        self.mag_bias.bias()
    }

    pub fn accel_bias(&self) -> Vector3<f64> {
        self.accel_bias
    }

    /// Integrated state of a dynamic variant. The static variants have none.
    pub fn vehicle_state(&self, class: AirframeClass) -> Option<&VehicleState> {
        match class {
            AirframeClass::Quadcopter => Some(&self.models.quadcopter.state),
            AirframeClass::Airplane => Some(&self.models.airplane.state),
            AirframeClass::Constant | AirframeClass::ModelAgnostic => None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn vehicle(&self) -> VehicleHandle {
        self.vehicle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InMemoryBus;
    use crate::messages::{HomeLocation, SensorField};
    use crate::models::AirframeType;
    use crate::random::{ScriptedSource, ZeroNoise};
    use crate::types::{ManualClock, Timestamp};

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            tick_period_s: 0.0,
            ..Default::default()
        };
        let err = SensorEngine::new(config, ZeroNoise).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidPeriod {
                name: "tick_period_s",
                value: 0.0
            }
        );
    }

    #[test]
    fn accel_bias_is_drawn_once_from_the_source() {
        // (0.75, 0.5) is a single accepted polar draw.
        let engine = SensorEngine::new(
            EngineConfig::default(),
            ScriptedSource::new(vec![0.75, 0.5]),
        )
        .unwrap();
        let g = 0.5 * (-2.0 * 0.25_f64.ln() / 0.25).sqrt();
        assert_eq!(engine.accel_bias(), Vector3::repeat(g * 0.1));
    }

    #[test]
    fn step_reports_class_and_fields() {
        let mut engine = SensorEngine::new(EngineConfig::default(), ZeroNoise)
            .unwrap()
            .with_vehicle(VehicleHandle(3));
        let mut bus = InMemoryBus::new(HomeLocation::default());
        bus.system_settings.airframe_type = AirframeType::QuadX as u8;
        let clock = ManualClock::at(Timestamp(2_000));

        assert_eq!(engine.active_class(), None);
        let packet = engine.step(&mut bus, &clock);
        assert_eq!(packet.vehicle, VehicleHandle(3));
        assert_eq!(packet.class, AirframeClass::Quadcopter);
        assert_eq!(packet.timestamp, Timestamp(2_000));
        assert!(packet.updated.contains(SensorField::Accel));
        assert!(packet.updated.contains(SensorField::AttitudeSimulated));
        assert_eq!(packet.updated, bus.take_updated());
        assert_eq!(engine.active_class(), Some(AirframeClass::Quadcopter));
        assert!(engine.vehicle_state(AirframeClass::Constant).is_none());
    }

    #[test]
    fn seeded_engines_agree() {
        let a = SensorEngine::seeded(EngineConfig::default(), 11).unwrap();
        let b = SensorEngine::seeded(EngineConfig::default(), 11).unwrap();
        let c = SensorEngine::seeded(EngineConfig::default(), 12).unwrap();
        assert_eq!(a.accel_bias(), b.accel_bias());
        assert_ne!(a.accel_bias(), c.accel_bias());
    }
}
