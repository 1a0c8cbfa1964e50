// vsense_core/src/models/outputs.rs

//! Drift processes and rate-gated channels shared by the dynamic variants.

use super::drift::DriftState;
use super::gnss;
use super::rigid_body::VehicleState;
use super::scheduling::{Channel, ChannelSchedule};
use super::TickContext;
use crate::config::EngineConfig;
use crate::messages::AttitudeSimulated;
use nalgebra::{Matrix3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicOutputs {
    pub drift: DriftState,
    pub schedule: ChannelSchedule,
}

impl DynamicOutputs {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            drift: DriftState::new(&config.drift),
            schedule: ChannelSchedule::new(&config.channels),
        }
    }

    /// Advances the per-tick drift and publishes barometer, GNSS and
    /// magnetometer when their channels are due. `mag_offset` is added to
    /// every magnetometer axis ahead of bias estimation.
    pub fn emit(
        &mut self,
        ctx: &mut TickContext<'_>,
        state: &VehicleState,
        earth_to_body: &Matrix3<f64>,
        mag_offset: f64,
    ) {
        let now = ctx.now();

        let baro_offset = self.drift.baro_offset.update(&mut *ctx.noise);
        if self.schedule.poll(Channel::Barometer, now) {
            ctx.publish_baro(-state.position.z + baro_offset);
        }

        let home = ctx.bus.home_location();
        let velocity_drift = self.drift.gps_velocity.update(&mut *ctx.noise);

        if self.schedule.poll(Channel::GpsPosition, now) {
            let position_drift = self.drift.gps_position.update(&mut *ctx.noise);
            let report = gnss::position_report(
                &home,
                &state.position,
                &state.velocity,
                &position_drift,
                &velocity_drift,
                &ctx.config.receiver,
            );
            ctx.publish_gps_position(report);
        }

        if self.schedule.poll(Channel::GpsVelocity, now) {
            ctx.publish_gps_velocity(gnss::velocity_report(&state.velocity, &velocity_drift));
        }

        if self.schedule.poll(Channel::Magnetometer, now) {
            let raw = earth_to_body * home.be + Vector3::repeat(mag_offset);
            ctx.publish_mag_raw(raw);
        }
    }
}

/// Ground-truth record of a dynamic variant.
pub fn publish_ground_truth(ctx: &mut TickContext<'_>, state: &VehicleState) {
    let rpy = state.rpy_degrees();
    ctx.publish_truth(AttitudeSimulated {
        q: state.orientation,
        roll: rpy.x,
        pitch: rpy.y,
        yaw: rpy.z,
        position: state.position,
        velocity: state.velocity,
    });
}

/// Replaces the estimator's quaternion with the simulated one. The estimated
/// Euler angles are left as they are.
pub fn override_estimate(ctx: &mut TickContext<'_>, state: &VehicleState) {
    let mut attitude = ctx.bus.attitude_actual();
    attitude.q = state.orientation;
    ctx.override_attitude(attitude);
}
