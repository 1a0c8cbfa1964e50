// vsense_core/src/models/scheduling.rs

use crate::config::ChannelPeriods;
use crate::types::Timestamp;
use std::time::Duration;

/// The rate-gated output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    GpsPosition,
    GpsVelocity,
    Magnetometer,
    Barometer,
    Airspeed,
}

/// Last emission time and fixed period of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelTimer {
    pub period: Duration,
    pub last: Timestamp,
    /// Extra delay before the first emission only. Cleared once the channel fires.
    pub offset: Duration,
}

impl ChannelTimer {
    pub fn new(period: Duration, last: Timestamp) -> Self {
        Self {
            period,
            last,
            offset: Duration::ZERO,
        }
    }

    /// A timer whose first emission comes `offset` after the first period.
    pub fn staggered(period: Duration, last: Timestamp, offset: Duration) -> Self {
        Self {
            period,
            last,
            offset,
        }
    }

    /// True when the channel is due. A due channel restarts its period at `now`.
    pub fn poll(&mut self, now: Timestamp) -> bool {
        if now.elapsed_since(self.last) >= self.period + self.offset {
            self.last = now;
            self.offset = Duration::ZERO;
            true
        } else {
            false
        }
    }
}

/// One independent timer per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSchedule {
    pub gps_position: ChannelTimer,
    pub gps_velocity: ChannelTimer,
    pub magnetometer: ChannelTimer,
    pub barometer: ChannelTimer,
    pub airspeed: ChannelTimer,
}

impl ChannelSchedule {
    pub fn new(periods: &ChannelPeriods) -> Self {
        let start = Timestamp::ZERO;
        let stagger = Duration::from_secs_f64(periods.gps_velocity_stagger_s);
        Self {
            gps_position: ChannelTimer::new(Duration::from_secs_f64(periods.gps_s), start),
            gps_velocity: ChannelTimer::staggered(
                Duration::from_secs_f64(periods.gps_s),
                start,
                stagger,
            ),
            magnetometer: ChannelTimer::new(Duration::from_secs_f64(periods.mag_s), start),
            barometer: ChannelTimer::new(Duration::from_secs_f64(periods.baro_s), start),
            airspeed: ChannelTimer::new(Duration::from_secs_f64(periods.airspeed_s), start),
        }
    }

    pub fn timer_mut(&mut self, channel: Channel) -> &mut ChannelTimer {
        match channel {
            Channel::GpsPosition => &mut self.gps_position,
            Channel::GpsVelocity => &mut self.gps_velocity,
            Channel::Magnetometer => &mut self.magnetometer,
            Channel::Barometer => &mut self.barometer,
            Channel::Airspeed => &mut self.airspeed,
        }
    }

    pub fn poll(&mut self, channel: Channel, now: Timestamp) -> bool {
        self.timer_mut(channel).poll(now)
    }
}
