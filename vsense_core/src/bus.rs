// vsense_core/src/bus.rs

//! The contract between the engine and the flight stack's shared state bus.

use crate::messages::{
    Accels, ActuatorDesired, AirspeedSensor, AttitudeActual, AttitudeSimulated, BaroAltitude,
    FlightStatus, GpsPosition, GpsVelocity, Gyros, GyrosBias, HomeLocation, Magnetometer,
    RateDesired, SensorField, SystemSettings, UpdatedFields,
};

// --- STATE BUS TRAIT ---
/// Get/set access to the flight stack's shared objects. Each call reads or
/// writes one whole field group.
pub trait StateBus {
    // --- Inputs ---
    fn flight_status(&self) -> FlightStatus;
    fn actuator_desired(&self) -> ActuatorDesired;
    fn rate_desired(&self) -> RateDesired;
    fn attitude_actual(&self) -> AttitudeActual;
    fn system_settings(&self) -> SystemSettings;
    fn home_location(&self) -> HomeLocation;
    fn gyros_bias(&self) -> GyrosBias;

    // --- Outputs ---
    fn set_accels(&mut self, accels: Accels);
    fn set_gyros(&mut self, gyros: Gyros);
    fn set_baro_altitude(&mut self, baro: BaroAltitude);
    fn set_gps_position(&mut self, position: GpsPosition);
    fn set_gps_velocity(&mut self, velocity: GpsVelocity);
    fn set_magnetometer(&mut self, mag: Magnetometer);
    fn set_airspeed(&mut self, airspeed: AirspeedSensor);
    fn set_attitude_simulated(&mut self, truth: AttitudeSimulated);

    /// Override mode: replaces the estimator's attitude with the simulated one.
    fn set_attitude_actual(&mut self, attitude: AttitudeActual);
}

/// A self-contained bus: inputs are plain public fields, outputs keep their
/// most recent value, and every write is recorded in `updated`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBus {
    pub flight_status: FlightStatus,
    pub actuator_desired: ActuatorDesired,
    pub rate_desired: RateDesired,
    pub attitude_actual: AttitudeActual,
    pub system_settings: SystemSettings,
    pub home_location: HomeLocation,
    pub gyros_bias: GyrosBias,

    pub accels: Option<Accels>,
    pub gyros: Option<Gyros>,
    pub baro_altitude: Option<BaroAltitude>,
    pub gps_position: Option<GpsPosition>,
    pub gps_velocity: Option<GpsVelocity>,
    pub magnetometer: Option<Magnetometer>,
    pub airspeed: Option<AirspeedSensor>,
    pub attitude_simulated: Option<AttitudeSimulated>,

    updated: UpdatedFields,
}

impl InMemoryBus {
    pub fn new(home_location: HomeLocation) -> Self {
        Self {
            home_location,
            ..Default::default()
        }
    }

    /// Fields written since the last call.
    pub fn take_updated(&mut self) -> UpdatedFields {
        std::mem::take(&mut self.updated)
    }

    pub fn updated(&self) -> UpdatedFields {
        self.updated
    }
}

impl StateBus for InMemoryBus {
    fn flight_status(&self) -> FlightStatus {
        self.flight_status
    }

    fn actuator_desired(&self) -> ActuatorDesired {
        self.actuator_desired
    }

    fn rate_desired(&self) -> RateDesired {
        self.rate_desired
    }

    fn attitude_actual(&self) -> AttitudeActual {
        self.attitude_actual
    }

    fn system_settings(&self) -> SystemSettings {
        self.system_settings
    }

    fn home_location(&self) -> HomeLocation {
        self.home_location
    }

    fn gyros_bias(&self) -> GyrosBias {
        self.gyros_bias
    }

    fn set_accels(&mut self, accels: Accels) {
        self.accels = Some(accels);
        self.updated.insert(SensorField::Accel);
    }

    fn set_gyros(&mut self, gyros: Gyros) {
        self.gyros = Some(gyros);
        self.updated.insert(SensorField::Gyro);
    }

    fn set_baro_altitude(&mut self, baro: BaroAltitude) {
        self.baro_altitude = Some(baro);
        self.updated.insert(SensorField::Baro);
    }

    fn set_gps_position(&mut self, position: GpsPosition) {
        self.gps_position = Some(position);
        self.updated.insert(SensorField::GpsPosition);
    }

    fn set_gps_velocity(&mut self, velocity: GpsVelocity) {
        self.gps_velocity = Some(velocity);
        self.updated.insert(SensorField::GpsVelocity);
    }

    fn set_magnetometer(&mut self, mag: Magnetometer) {
        self.magnetometer = Some(mag);
        self.updated.insert(SensorField::Mag);
    }

    fn set_airspeed(&mut self, airspeed: AirspeedSensor) {
        self.airspeed = Some(airspeed);
        self.updated.insert(SensorField::Airspeed);
    }

    fn set_attitude_simulated(&mut self, truth: AttitudeSimulated) {
        self.attitude_simulated = Some(truth);
        self.updated.insert(SensorField::AttitudeSimulated);
    }

    fn set_attitude_actual(&mut self, attitude: AttitudeActual) {
        self.attitude_actual = attitude;
        self.updated.insert(SensorField::AttitudeOverride);
    }
}
