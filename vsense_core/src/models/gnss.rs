// vsense_core/src/models/gnss.rs

//! Local NED offsets to geodetic receiver output on a spherical earth.

use crate::config::ReceiverParams;
use crate::messages::{GpsPosition, GpsVelocity, HomeLocation};
use nalgebra::Vector3;

pub const EARTH_RADIUS_M: f64 = 6.378137e6;

/// Meters per degree of latitude and of longitude at the home location.
pub fn meters_per_degree(home: &HomeLocation) -> (f64, f64) {
    let radius = home.altitude + EARTH_RADIUS_M;
    let per_lat = radius * std::f64::consts::PI / 180.0;
    let home_lat = (home.latitude_e7 as f64 / 1e7).to_radians();
    (per_lat, home_lat.cos() * per_lat)
}

/// Receiver position report for a vehicle at `position` (NED, meters from home).
/// `position_drift` is added to the position before conversion and
/// `velocity_drift` to the velocity before groundspeed and heading.
pub fn position_report(
    home: &HomeLocation,
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    position_drift: &Vector3<f64>,
    velocity_drift: &Vector3<f64>,
    receiver: &ReceiverParams,
) -> GpsPosition {
    let (per_lat, per_lon) = meters_per_degree(home);
    let ned = position + position_drift;
    let vel = velocity + velocity_drift;

    GpsPosition {
        latitude_e7: offset_e7(home.latitude_e7, ned.x / per_lat),
        longitude_e7: offset_e7(home.longitude_e7, ned.y / per_lon),
        altitude: home.altitude - ned.z,
        groundspeed: vel.x.hypot(vel.y),
        heading: vel.y.atan2(vel.x).to_degrees(),
        satellites: receiver.satellites,
        pdop: receiver.pdop,
        status: receiver.status,
    }
}

/// Receiver report pinned to the home location, for variants without dynamics.
pub fn home_report(home: &HomeLocation, receiver: &ReceiverParams) -> GpsPosition {
    GpsPosition {
        latitude_e7: home.latitude_e7,
        longitude_e7: home.longitude_e7,
        altitude: home.altitude,
        groundspeed: 0.0,
        heading: 0.0,
        satellites: receiver.satellites,
        pdop: receiver.pdop,
        status: receiver.status,
    }
}

pub fn velocity_report(velocity: &Vector3<f64>, drift: &Vector3<f64>) -> GpsVelocity {
    let v = velocity + drift;
    GpsVelocity {
        north: v.x,
        east: v.y,
        down: v.z,
    }
}

fn offset_e7(base_e7: i32, degrees: f64) -> i32 {
    let value = (base_e7 as f64 + degrees * 1e7).round();
    // Out-of-range offsets saturate.
    value as i32
}
