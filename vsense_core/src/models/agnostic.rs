// vsense_core/src/models/agnostic.rs

use super::constant::publish_static_readings;
use super::rigid_body::earth_to_body;
use super::{AirframeClass, AirframeModel, TickContext};
use crate::messages::{Accels, Gyros};
use nalgebra::Vector3;

/// Follows the attitude estimate and the rate commands without integrating
/// any dynamics. Chosen for every airframe without a dedicated model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelAgnostic;

impl AirframeModel for ModelAgnostic {
    fn class(&self) -> AirframeClass {
        AirframeClass::ModelAgnostic
    }

    fn simulate(&mut self, ctx: &mut TickContext<'_>) {
        let attitude = ctx.bus.attitude_actual();
        let rbe = earth_to_body(&attitude.q);
        let felt = rbe * Vector3::new(0.0, 0.0, -ctx.config.gravity);
        ctx.publish_accels(Accels::from_vector(felt, 30.0));

        let desired = ctx.bus.rate_desired();
        let commanded = Vector3::new(desired.roll, desired.pitch, desired.yaw);
        let noise = ctx.gaussian3();
        let bias = ctx.bus.gyros_bias().as_vector();
        ctx.publish_gyros(Gyros::from_vector(commanded + noise + bias));

        publish_static_readings(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::InMemoryBus;
    use crate::config::EngineConfig;
    use crate::estimation::mag_bias::HomeFieldNulling;
    use crate::messages::{AttitudeActual, HomeLocation, RateDesired};
    use crate::random::ScriptedSource;
    use crate::types::{ManualClock, Timestamp};
    use approx::assert_abs_diff_eq;
    use nalgebra::UnitQuaternion;

    #[test]
    fn gravity_follows_estimated_attitude() {
        let mut bus = InMemoryBus::new(HomeLocation::default());
        // 90 degrees of roll: gravity lands on the body y axis.
        let q = UnitQuaternion::from_euler_angles(std::f64::consts::FRAC_PI_2, 0.0, 0.0);
        bus.attitude_actual = AttitudeActual {
            q: *q.quaternion(),
            roll: 90.0,
            ..Default::default()
        };
        bus.rate_desired = RateDesired { roll: 10.0, pitch: 0.0, yaw: -5.0 };

        let clock = ManualClock::at(Timestamp(0));
        // Uniform 0.5 everywhere maps to v1 = v2 = 0, a zero Gaussian.
        let mut noise = ScriptedSource::new(vec![0.5]);
        let config = EngineConfig::default();
        let mut mag_bias = HomeFieldNulling::new(config.mag_bias.rate);
        let mut ctx = TickContext::new(
            &mut bus,
            &clock,
            &mut noise,
            &mut mag_bias,
            &config,
            Vector3::zeros(),
        );
        ModelAgnostic.simulate(&mut ctx);

        let accels = bus.accels.expect("accels published");
        assert_abs_diff_eq!(accels.as_vector(), Vector3::new(0.0, -9.81, 0.0), epsilon = 1e-9);
        assert_eq!(accels.temperature, 30.0);

        let gyros = bus.gyros.expect("gyros published");
        assert_abs_diff_eq!(gyros.as_vector(), Vector3::new(10.0, 0.0, -5.0), epsilon = 1e-12);
    }
}
