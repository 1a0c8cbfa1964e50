// vsense_core/src/models/constant.rs

use super::{gnss, AirframeClass, AirframeModel, TickContext};
use crate::messages::{Accels, Gyros, Magnetometer};
use nalgebra::Vector3;

/// Bench-test variant: a level vehicle at rest on the home location.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantModel;

impl AirframeModel for ConstantModel {
    fn class(&self) -> AirframeClass {
        AirframeClass::Constant
    }

    fn simulate(&mut self, ctx: &mut TickContext<'_>) {
        let gravity = ctx.config.gravity;
        ctx.publish_accels(Accels::from_vector(Vector3::new(0.0, 0.0, -gravity), 0.0));

        let bias = ctx.bus.gyros_bias().as_vector();
        ctx.publish_gyros(Gyros::from_vector(bias));

        publish_static_readings(ctx);
    }
}

/// Barometer, GNSS fix and magnetometer of the variants without dynamics.
pub(crate) fn publish_static_readings(ctx: &mut TickContext<'_>) {
    ctx.publish_baro(ctx.config.constant.baro_altitude);

    let home = ctx.bus.home_location();
    ctx.publish_gps_position(gnss::home_report(&home, &ctx.config.receiver));

    // A fixed field, so yaw gyro bias averages out weakly.
    ctx.publish_mag(Magnetometer::from_vector(ctx.config.constant.mag));
}
