// vsense_core/src/models/quadcopter.rs

use super::outputs::{override_estimate, publish_ground_truth, DynamicOutputs};
use super::rigid_body::{
    commanded_thrust, earth_to_body, integrate_attitude, low_pass, ElapsedTimer, VehicleState,
};
use super::{AirframeClass, AirframeModel, TickContext};
use crate::config::{EngineConfig, QuadcopterParams};
use crate::messages::{Accels, Gyros};
use nalgebra::Vector3;

/// Multirotor: thrust along the body axis, rates driven straight from the
/// mixer input, linear drag against a drifting wind.
#[derive(Debug, Clone)]
pub struct QuadcopterModel {
    pub state: VehicleState,
    pub outputs: DynamicOutputs,
    timer: ElapsedTimer,
    params: QuadcopterParams,
}

impl QuadcopterModel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: VehicleState::default(),
            outputs: DynamicOutputs::new(config),
            timer: ElapsedTimer::default(),
            params: config.quadcopter.clone(),
        }
    }
}

impl AirframeModel for QuadcopterModel {
    fn class(&self) -> AirframeClass {
        AirframeClass::Quadcopter
    }

    fn simulate(&mut self, ctx: &mut TickContext<'_>) {
        let p = &self.params;
        let gravity = ctx.config.gravity;
        let dt = self
            .timer
            .tick(ctx.now(), ctx.config.min_dt_s, ctx.config.tick_period_s);

        // --- Actuation ---
        let armed = ctx.bus.flight_status().armed;
        let actuator = ctx.bus.actuator_desired();
        let thrust = commanded_thrust(armed, actuator.throttle, p.max_thrust);

        let gain = if armed { p.actuator_rate_scale } else { 0.0 };
        let target = Vector3::new(actuator.roll, actuator.pitch, actuator.yaw) * gain;
        self.state.rates = low_pass(&self.state.rates, &target, p.actuator_alpha);

        let gyro_noise = ctx.gaussian3();
        ctx.publish_gyros(Gyros::from_vector(self.state.rates + gyro_noise));

        // --- Attitude ---
        self.state.orientation = integrate_attitude(&self.state.orientation, &self.state.rates, dt);
        if ctx.config.override_attitude {
            override_estimate(ctx, &self.state);
        }

        // --- Translation ---
        let wind = self.outputs.drift.wind.update(&mut *ctx.noise);
        let rbe = earth_to_body(&self.state.orientation);
        let body_down: Vector3<f64> = rbe.row(2).transpose();

        let mut accel = -thrust * body_down;
        accel.z += gravity;
        accel -= (self.state.velocity - wind) * p.friction;
        self.state.ned_accel = accel;

        self.state.integrate_translation(dt);
        self.state.apply_ground_contact();

        let specific_force = self.state.specific_force(&rbe, gravity, &ctx.accel_bias);
        ctx.publish_accels(Accels::from_vector(specific_force, 30.0));

        // --- Rate-gated channels ---
        self.outputs.emit(ctx, &self.state, &rbe, 0.0);
        publish_ground_truth(ctx, &self.state);
    }
}
