// vsense_core/src/models/airplane.rs

use super::outputs::{override_estimate, publish_ground_truth, DynamicOutputs};
use super::rigid_body::{
    commanded_thrust, earth_to_body, integrate_attitude, low_pass, ElapsedTimer, VehicleState,
};
use super::scheduling::Channel;
use super::{AirframeClass, AirframeModel, TickContext};
use crate::config::{AirplaneParams, EngineConfig};
use crate::messages::{Accels, AirspeedSensor, Gyros};
use nalgebra::Vector3;

/// Fixed wing: rates follow the rate controller's setpoint, forces come from
/// body-frame airspeed with a crude lift term.
#[derive(Debug, Clone)]
pub struct AirplaneModel {
    pub state: VehicleState,
    pub outputs: DynamicOutputs,
    timer: ElapsedTimer,
    params: AirplaneParams,
}

impl AirplaneModel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: VehicleState::default(),
            outputs: DynamicOutputs::new(config),
            timer: ElapsedTimer::default(),
            params: config.airplane.clone(),
        }
    }

    /// Body-frame forces per unit mass for a given body airspeed.
    /// `pitch_deg` is the estimated pitch.
    fn body_forces(&self, thrust: f64, pitch_deg: f64, airspeed: &Vector3<f64>, gravity: f64) -> Vector3<f64> {
        let p = &self.params;
        let k = p.friction;
        Vector3::new(
            thrust - pitch_deg * p.pitch_thrust_coupling - airspeed.x * k,
            -airspeed.y * k * p.cross_flow_damping,
            gravity * (airspeed.x - p.lift_speed) + airspeed.z * k * p.cross_flow_damping,
        )
    }
}

impl AirframeModel for AirplaneModel {
    fn class(&self) -> AirframeClass {
        AirframeClass::Airplane
    }

    fn simulate(&mut self, ctx: &mut TickContext<'_>) {
        let gravity = ctx.config.gravity;
        let dt = self
            .timer
            .tick(ctx.now(), ctx.config.min_dt_s, ctx.config.tick_period_s);

        // --- Actuation ---
        let armed = ctx.bus.flight_status().armed;
        let throttle = ctx.bus.actuator_desired().throttle;
        let thrust = commanded_thrust(armed, throttle, self.params.max_thrust);

        let desired = ctx.bus.rate_desired();
        let estimate = ctx.bus.attitude_actual();
        let gain = if armed { 1.0 } else { 0.0 };
        let target = Vector3::new(desired.roll, desired.pitch, desired.yaw) * gain;

        let mut rates = low_pass(&self.state.rates, &target, self.params.actuator_alpha);
        // Banking turns the nose.
        rates.z += estimate.roll * self.params.roll_heading_coupling;
        self.state.rates = rates;

        let gyro_noise = ctx.gaussian3();
        ctx.publish_gyros(Gyros::from_vector(rates + gyro_noise));

        // --- Attitude ---
        self.state.orientation = integrate_attitude(&self.state.orientation, &rates, dt);
        if ctx.config.override_attitude {
            override_estimate(ctx, &self.state);
        }

        // --- Translation ---
        let drifted_wind = self.outputs.drift.wind.update(&mut *ctx.noise);
        let wind = if self.params.simulate_wind {
            drifted_wind
        } else {
            Vector3::zeros()
        };

        let rbe = earth_to_body(&self.state.orientation);
        let relative = self.state.velocity - wind;
        let airspeed = rbe * relative;
        let forces = self.body_forces(thrust, estimate.pitch, &airspeed, gravity);

        let mut accel = rbe.transpose() * Vector3::new(forces.x, forces.y, -forces.z);
        accel.z += gravity;
        accel -= relative * self.params.friction;
        self.state.ned_accel = accel;

        self.state.integrate_translation(dt);
        self.state.apply_ground_contact();

        let specific_force = self.state.specific_force(&rbe, gravity, &ctx.accel_bias);
        ctx.publish_accels(Accels::from_vector(specific_force, 30.0));

        // --- Rate-gated channels ---
        self.outputs
            .emit(ctx, &self.state, &rbe, self.params.mag_hard_iron);

        if self.outputs.schedule.poll(Channel::Airspeed, ctx.now()) {
            ctx.publish_airspeed(AirspeedSensor {
                connected: true,
                calibrated_airspeed: airspeed.x,
            });
        }

        publish_ground_truth(ctx, &self.state);
    }
}
