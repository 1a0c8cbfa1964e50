// vsense_core/src/models/rigid_body.rs

use crate::types::Timestamp;
use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

/// Translational and rotational state of one simulated airframe, NED frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    /// Body-to-earth orientation, unit norm after every step.
    pub orientation: Quaternion<f64>,
    /// Low-pass filtered actuator response, deg/s.
    pub rates: Vector3<f64>,
    /// Net coordinate acceleration of the last step.
    pub ned_accel: Vector3<f64>,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            orientation: Quaternion::identity(),
            rates: Vector3::zeros(),
            ned_accel: Vector3::zeros(),
        }
    }
}

impl VehicleState {
    /// Explicit Euler: velocity first, then position with the new velocity.
    pub fn integrate_translation(&mut self, dt: f64) {
        self.velocity += self.ned_accel * dt;
        self.position += self.velocity * dt;
    }

    /// One-sided inelastic ground stop. Returns true on contact.
    pub fn apply_ground_contact(&mut self) -> bool {
        if self.position.z > 0.0 {
            self.position.z = 0.0;
            self.velocity.z = 0.0;
            self.ned_accel.z = 0.0;
            true
        } else {
            false
        }
    }

    /// Accelerometer output: what the sensor feels is the coordinate
    /// acceleration minus gravity, seen in the body frame.
    pub fn specific_force(
        &self,
        earth_to_body: &Matrix3<f64>,
        gravity: f64,
        bias: &Vector3<f64>,
    ) -> Vector3<f64> {
        let felt = self.ned_accel - Vector3::new(0.0, 0.0, gravity);
        earth_to_body * felt + bias
    }

    pub fn rpy_degrees(&self) -> Vector3<f64> {
        quaternion_to_rpy(&self.orientation)
    }
}

// --- Attitude Kinematics ---

/// Advances `q` by one Euler step of `q_dot = 0.5 * q ⊗ (0, ω)` and renormalizes.
/// Rates are in deg/s.
pub fn integrate_attitude(q: &Quaternion<f64>, rates_deg: &Vector3<f64>, dt: f64) -> Quaternion<f64> {
    let omega = Quaternion::from_imag(rates_deg.map(f64::to_radians));
    let q_dot = (*q * omega) * 0.5;
    let stepped = *q + q_dot * dt;

    let norm = stepped.norm();
    if norm.is_finite() && norm > f64::EPSILON {
        stepped / norm
    } else {
        Quaternion::identity()
    }
}

/// Rotation taking earth-frame vectors into the body frame.
pub fn earth_to_body(q: &Quaternion<f64>) -> Matrix3<f64> {
    let body_to_earth = UnitQuaternion::from_quaternion(*q);
    body_to_earth.to_rotation_matrix().matrix().transpose()
}

/// Roll, pitch, yaw in degrees.
pub fn quaternion_to_rpy(q: &Quaternion<f64>) -> Vector3<f64> {
    let (roll, pitch, yaw) = UnitQuaternion::from_quaternion(*q).euler_angles();
    Vector3::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
}

// --- Actuation ---

/// Throttle to thrust. Zero when disarmed, negative or non-finite.
pub fn commanded_thrust(armed: bool, throttle: f64, max_thrust: f64) -> f64 {
    if !armed {
        return 0.0;
    }
    let thrust = throttle * max_thrust;
    if thrust.is_finite() && thrust > 0.0 {
        thrust
    } else {
        0.0
    }
}

/// First-order actuator lag.
pub fn low_pass(previous: &Vector3<f64>, target: &Vector3<f64>, alpha: f64) -> Vector3<f64> {
    target * (1.0 - alpha) + previous * alpha
}

// --- Step Timing ---

/// Time since the previous call of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElapsedTimer {
    last: Option<Timestamp>,
}

impl ElapsedTimer {
    /// Seconds since the previous call. The first call, and any gap shorter
    /// than `min_dt`, yields `nominal_dt` instead.
    pub fn tick(&mut self, now: Timestamp, min_dt: f64, nominal_dt: f64) -> f64 {
        let dt = match self.last {
            Some(last) => now.elapsed_since(last).as_secs_f64(),
            None => nominal_dt,
        };
        self.last = Some(now);

        if dt < min_dt {
            nominal_dt
        } else {
            if dt > 50.0 * nominal_dt {
                log::debug!("Integrating a long step of {:.3} s", dt);
            }
            dt
        }
    }

    pub fn last(&self) -> Option<Timestamp> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn attitude_stays_unit_norm() {
        let mut q = Quaternion::identity();
        let rates = Vector3::new(120.0, -45.0, 300.0);
        for _ in 0..10_000 {
            q = integrate_attitude(&q, &rates, 0.002);
            assert_abs_diff_eq!(q.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_yaw_rate_integrates_heading() {
        let mut q = Quaternion::identity();
        let rates = Vector3::new(0.0, 0.0, 90.0);
        for _ in 0..500 {
            q = integrate_attitude(&q, &rates, 0.002);
        }
        // One second at 90 deg/s; Euler drift is small at this step size.
        let rpy = quaternion_to_rpy(&q);
        assert_abs_diff_eq!(rpy.z, 90.0, epsilon = 0.1);
        assert_abs_diff_eq!(rpy.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn earth_to_body_of_level_attitude_is_identity() {
        let r = earth_to_body(&Quaternion::identity());
        assert_abs_diff_eq!(r, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn earth_to_body_rotates_north_into_body_for_yawed_vehicle() {
        // Nose pointing east: north appears on the body's left (negative y).
        let q = *UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2).quaternion();
        let north_in_body = earth_to_body(&q) * Vector3::x();
        assert_abs_diff_eq!(north_in_body, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn ground_contact_stops_descent() {
        let mut state = VehicleState {
            position: Vector3::new(1.0, 2.0, 0.3),
            velocity: Vector3::new(0.5, 0.0, 2.0),
            ned_accel: Vector3::new(0.1, 0.0, 9.0),
            ..Default::default()
        };
        assert!(state.apply_ground_contact());
        assert_eq!(state.position.z, 0.0);
        assert_eq!(state.velocity.z, 0.0);
        assert_eq!(state.ned_accel.z, 0.0);
        // Lateral motion is untouched.
        assert_eq!(state.velocity.x, 0.5);

        state.position.z = -5.0;
        assert!(!state.apply_ground_contact());
    }

    #[test]
    fn resting_vehicle_feels_gravity_upward() {
        let state = VehicleState::default();
        let f = state.specific_force(&Matrix3::identity(), 9.81, &Vector3::zeros());
        assert_abs_diff_eq!(f, Vector3::new(0.0, 0.0, -9.81), epsilon = 1e-12);
    }

    #[test]
    fn thrust_is_clamped() {
        assert_eq!(commanded_thrust(false, 0.5, 19.62), 0.0);
        assert_eq!(commanded_thrust(true, -0.2, 19.62), 0.0);
        assert_eq!(commanded_thrust(true, f64::NAN, 19.62), 0.0);
        assert_eq!(commanded_thrust(true, f64::INFINITY, 19.62), 0.0);
        assert_abs_diff_eq!(commanded_thrust(true, 0.5, 19.62), 9.81, epsilon = 1e-12);
    }

    #[test]
    fn elapsed_timer_floors_short_steps() {
        let mut timer = ElapsedTimer::default();
        assert_eq!(timer.tick(Timestamp(5_000_000), 1e-3, 2e-3), 2e-3);
        assert_eq!(timer.tick(Timestamp(5_000_500), 1e-3, 2e-3), 2e-3);
        assert_abs_diff_eq!(timer.tick(Timestamp(5_004_500), 1e-3, 2e-3), 4e-3, epsilon = 1e-12);
    }
}
