// vsense_core/tests/engine_properties.rs

use approx::assert_abs_diff_eq;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::time::Duration;
use vsense_core::estimation::mag_bias::{HomeFieldNulling, MagBiasEstimator};
use vsense_core::messages::{
    ActuatorDesired, AttitudeActual, FlightStatus, HomeLocation, RateDesired,
};
use vsense_core::prelude::*;

const TICK: Duration = Duration::from_millis(2);

/// Bus, clock and engine for one vehicle.
struct Harness {
    bus: InMemoryBus,
    clock: ManualClock,
    engine: SensorEngine,
}

impl Harness {
    fn new(engine: SensorEngine, airframe: AirframeType) -> Self {
        let mut bus = InMemoryBus::new(HomeLocation::default());
        bus.system_settings.airframe_type = airframe as u8;
        Self {
            bus,
            clock: ManualClock::at(Timestamp(0)),
            engine,
        }
    }

    fn seeded(airframe: AirframeType, seed: u64) -> Self {
        let engine = SensorEngine::seeded(EngineConfig::default(), seed).unwrap();
        Self::new(engine, airframe)
    }

    fn step(&mut self) -> SensorPacket {
        self.clock.advance(TICK);
        self.engine.step(&mut self.bus, &self.clock)
    }

    fn state(&self, class: AirframeClass) -> vsense_core::models::rigid_body::VehicleState {
        *self.engine.vehicle_state(class).unwrap()
    }
}

/// Hands out a fixed list of Gaussian values, then nothing but zeros.
#[derive(Debug)]
struct PrimedNoise {
    pending: Vec<f64>,
}

impl RandomSource for PrimedNoise {
    fn uniform(&mut self) -> f64 {
        0.5
    }

    fn gaussian(&mut self) -> f64 {
        if self.pending.is_empty() {
            0.0
        } else {
            self.pending.remove(0)
        }
    }
}

#[test]
fn attitude_quaternion_stays_normalized() {
    let mut h = Harness::seeded(AirframeType::FixedWing, 1);
    h.bus.flight_status = FlightStatus { armed: true };
    h.bus.rate_desired = RateDesired {
        roll: 45.0,
        pitch: -30.0,
        yaw: 120.0,
    };
    h.bus.attitude_actual = AttitudeActual {
        roll: 15.0,
        ..Default::default()
    };
    for _ in 0..5_000 {
        h.step();
        let q = h.state(AirframeClass::Airplane).orientation;
        assert_abs_diff_eq!(q.norm(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn vehicle_never_sinks_below_ground() {
    let mut h = Harness::seeded(AirframeType::QuadX, 2);
    h.bus.flight_status = FlightStatus { armed: true };
    h.bus.actuator_desired = ActuatorDesired {
        throttle: 0.8,
        ..Default::default()
    };

    let mut airborne = false;
    let mut landed = false;
    for tick in 0..3_000 {
        if tick == 500 {
            h.bus.flight_status = FlightStatus { armed: false };
        }
        h.step();
        let state = h.state(AirframeClass::Quadcopter);
        assert!(state.position.z <= 0.0);
        if state.position.z < 0.0 {
            airborne = true;
        } else if airborne {
            landed = true;
            assert_eq!(state.velocity.z, 0.0);
        }
    }
    assert!(airborne && landed);
}

fn emission_times(h: &mut Harness, ticks: usize) -> HashMap<SensorField, Vec<Timestamp>> {
    let mut times: HashMap<SensorField, Vec<Timestamp>> = HashMap::new();
    for _ in 0..ticks {
        let packet = h.step();
        for field in packet.updated.iter() {
            times.entry(field).or_default().push(packet.timestamp);
        }
    }
    times
}

fn assert_intervals(times: &[Timestamp], period: Duration) {
    assert!(times.len() > 2);
    for pair in times.windows(2) {
        let interval = pair[1].elapsed_since(pair[0]);
        assert!(interval >= period, "{interval:?} shorter than {period:?}");
        assert!(interval < period + TICK, "{interval:?} longer than {period:?} plus a tick");
    }
}

#[test]
fn channels_respect_their_periods() {
    let mut h = Harness::seeded(AirframeType::FixedWing, 3);
    let times = emission_times(&mut h, 2_500);

    let channels = EngineConfig::default().channels;
    assert_intervals(&times[&SensorField::GpsPosition], Duration::from_secs_f64(channels.gps_s));
    assert_intervals(&times[&SensorField::GpsVelocity], Duration::from_secs_f64(channels.gps_s));
    assert_intervals(&times[&SensorField::Mag], Duration::from_secs_f64(channels.mag_s));
    assert_intervals(&times[&SensorField::Baro], Duration::from_secs_f64(channels.baro_s));
    assert_intervals(&times[&SensorField::Airspeed], Duration::from_secs_f64(channels.airspeed_s));

    // Unscheduled outputs go out every tick.
    assert_eq!(times[&SensorField::Accel].len(), 2_500);
    assert_eq!(times[&SensorField::AttitudeSimulated].len(), 2_500);

    // Position and velocity fixes never share a tick.
    let velocity = &times[&SensorField::GpsVelocity];
    assert!(times[&SensorField::GpsPosition]
        .iter()
        .all(|t| !velocity.contains(t)));
}

#[test]
fn channels_survive_clock_rollover() {
    let mut h = Harness::seeded(AirframeType::QuadX, 4);
    h.clock.set(Timestamp(u32::MAX - 1_000_000));
    let times = emission_times(&mut h, 1_500);

    let channels = EngineConfig::default().channels;
    assert_intervals(&times[&SensorField::GpsPosition], Duration::from_secs_f64(channels.gps_s));
    assert_intervals(&times[&SensorField::Mag], Duration::from_secs_f64(channels.mag_s));
    assert_intervals(&times[&SensorField::Baro], Duration::from_secs_f64(channels.baro_s));
}

#[test]
fn ias_to_tas_factor_is_increasing() {
    use vsense_core::estimation::filters::air::ias_to_tas_factor;

    assert_eq!(ias_to_tas_factor(0.0), 1.0);
    let altitudes: Vec<f64> = (0..100).map(|i| i as f64 * 50.0).collect();
    assert!(altitudes
        .windows(2)
        .all(|w| ias_to_tas_factor(w[1]) > ias_to_tas_factor(w[0])));
}

#[test]
fn resting_quadcopter_reads_gravity_plus_bias() {
    let engine = SensorEngine::new(
        EngineConfig::default(),
        PrimedNoise {
            pending: vec![0.4, -1.2, 0.7],
        },
    )
    .unwrap();
    let expected_bias = Vector3::new(0.4, -1.2, 0.7) * 0.1;
    assert_abs_diff_eq!(engine.accel_bias(), expected_bias, epsilon = 1e-12);

    let mut h = Harness::new(engine, AirframeType::QuadX);
    for _ in 0..1_000 {
        h.step();
        let accels = h.bus.accels.unwrap().as_vector();
        assert_abs_diff_eq!(
            accels,
            Vector3::new(0.0, 0.0, -9.81) + expected_bias,
            epsilon = 1e-12
        );
        assert_eq!(h.bus.gyros.unwrap().as_vector(), Vector3::zeros());
    }
}

#[test]
fn throttle_sweep_crosses_hover() {
    let mut climb_rates = Vec::new();
    for throttle in [0.3, 0.4, 0.5, 0.6, 0.7, 0.8] {
        let engine = SensorEngine::new(EngineConfig::default(), ZeroNoise).unwrap();
        let mut h = Harness::new(engine, AirframeType::QuadX);
        h.bus.flight_status = FlightStatus { armed: true };
        h.bus.actuator_desired = ActuatorDesired {
            throttle,
            ..Default::default()
        };

        let mut first_accel = None;
        for _ in 0..500 {
            h.step();
            first_accel.get_or_insert(h.state(AirframeClass::Quadcopter).ned_accel.z);
        }
        let state = h.state(AirframeClass::Quadcopter);

        if throttle <= 0.5 {
            // At or below hover the vehicle stays put.
            assert_eq!(state.position.z, 0.0);
            assert_eq!(state.velocity.z, 0.0);
        } else {
            assert!(state.velocity.z < 0.0);
            // Drag pulls the net acceleration back toward zero.
            let first = first_accel.unwrap();
            assert!(first < 0.0);
            assert!(state.ned_accel.z.abs() < first.abs());
        }
        climb_rates.push(-state.velocity.z);
    }
    assert!(climb_rates.windows(2).all(|w| w[1] >= w[0]));
    assert!(climb_rates[5] > climb_rates[3]);
}

#[test]
fn mag_bias_converges_toward_injected_offset() {
    let home = HomeLocation::default();
    // Offset along the horizontal home field plus a vertical part, both of
    // which a level vehicle can observe.
    let horizontal = home.be.xy().normalize() * 120.0;
    let offset = Vector3::new(horizontal.x, horizontal.y, -250.0);
    let raw = home.be + offset;

    let mut estimator = HomeFieldNulling::new(0.01);
    let attitude = AttitudeActual::default();
    let mut last_error = (estimator.bias() - offset).norm();
    for _ in 0..1_000 {
        estimator.correct(raw, &attitude, &home);
        let error = (estimator.bias() - offset).norm();
        assert!(error <= last_error);
        last_error = error;
    }
    assert!(last_error < 0.1);
}

#[test]
fn engine_nulls_airplane_hard_iron_vertically() {
    let engine = SensorEngine::new(EngineConfig::default(), ZeroNoise).unwrap();
    let mut h = Harness::new(engine, AirframeType::FixedWing);
    // 1/75 s at 2 ms ticks yields an emission every 7 ticks.
    for _ in 0..14_000 {
        h.step();
    }
    assert_abs_diff_eq!(h.engine.mag_bias().z, 100.0, epsilon = 1.0);
}

#[test]
fn unknown_airframe_falls_back_to_agnostic() {
    let mut h = Harness::seeded(AirframeType::QuadX, 5);
    h.bus.system_settings.airframe_type = 77;
    let packet = h.step();
    assert_eq!(packet.class, AirframeClass::ModelAgnostic);
    assert!(packet.updated.contains(SensorField::Accel));
    assert!(!packet.updated.contains(SensorField::AttitudeSimulated));
}

#[test]
fn switching_airframes_keeps_model_state() {
    let mut h = Harness::seeded(AirframeType::QuadX, 6);
    h.bus.flight_status = FlightStatus { armed: true };
    h.bus.actuator_desired = ActuatorDesired {
        throttle: 0.9,
        ..Default::default()
    };
    for _ in 0..250 {
        h.step();
    }
    let before = h.state(AirframeClass::Quadcopter);
    assert!(before.position.z < 0.0);

    h.bus.system_settings.airframe_type = AirframeType::Tri as u8;
    for _ in 0..50 {
        assert_eq!(h.step().class, AirframeClass::ModelAgnostic);
    }
    assert_eq!(h.state(AirframeClass::Quadcopter), before);

    h.bus.system_settings.airframe_type = AirframeType::QuadX as u8;
    assert_eq!(h.step().class, AirframeClass::Quadcopter);
    let after = h.state(AirframeClass::Quadcopter);
    // The first step back integrates over the whole time away.
    assert!(after.position.z < before.position.z);
}
