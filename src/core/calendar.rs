//! Day/night clock
//!
//! Tracks in-game hour and day count from accumulated simulation seconds.
//! Zombies move faster at night, the spawner scales difficulty with it and
//! the decision layer observes it.

use serde::{Deserialize, Serialize};

use crate::core::config::ClockConfig;

/// Coarse period of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    Dawn,  // dawn_hour..day_hour
    Day,   // day_hour..dusk_hour
    Dusk,  // dusk_hour..night_hour
    Night, // night_hour..dawn_hour
}

/// Persisted clock state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub current_day: u32,
    /// Seconds since midnight
    pub current_time: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayNightClock {
    config: ClockConfig,
    /// Seconds elapsed since midnight of the current day
    current_time: f32,
    current_day: u32,
    time_multiplier: f32,
}

impl DayNightClock {
    pub fn new(config: ClockConfig) -> Self {
        let mut clock = Self {
            current_time: 0.0,
            current_day: config.starting_day,
            time_multiplier: config.time_multiplier.max(0.0),
            config,
        };
        clock.set_hour(clock.config.starting_hour);
        clock
    }

    /// Advance by `dt` real seconds. Returns the number of day rollovers.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.current_time += dt * self.time_multiplier;
        self.wrap_days()
    }

    /// Jump forward by a number of in-game hours
    pub fn advance_hours(&mut self, hours: f32) -> u32 {
        self.current_time += hours * self.config.day_length_secs / 24.0;
        self.wrap_days()
    }

    fn wrap_days(&mut self) -> u32 {
        let mut rollovers = 0;
        while self.current_time >= self.config.day_length_secs {
            self.current_time -= self.config.day_length_secs;
            self.current_day += 1;
            rollovers += 1;
        }
        if rollovers > 0 {
            tracing::debug!("Day {} has begun", self.current_day);
        }
        rollovers
    }

    pub fn set_hour(&mut self, hour: f32) {
        let hour = hour.rem_euclid(24.0);
        self.current_time = hour * self.config.day_length_secs / 24.0;
    }

    pub fn set_day(&mut self, day: u32) {
        self.current_day = day.max(1);
    }

    pub fn time_multiplier(&self) -> f32 {
        self.time_multiplier
    }

    pub fn set_time_multiplier(&mut self, multiplier: f32) {
        self.time_multiplier = multiplier.max(0.0);
    }

    pub fn current_hour(&self) -> f32 {
        self.current_time * 24.0 / self.config.day_length_secs
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    /// 0 = midnight, 0.5 = noon
    pub fn normalized_time_of_day(&self) -> f32 {
        self.current_time / self.config.day_length_secs
    }

    pub fn is_daytime(&self) -> bool {
        let hour = self.current_hour();
        hour >= self.config.day_hour && hour < self.config.dusk_hour
    }

    pub fn is_night(&self) -> bool {
        !self.is_daytime()
    }

    pub fn time_period(&self) -> TimePeriod {
        let hour = self.current_hour();
        let c = &self.config;
        if hour >= c.dawn_hour && hour < c.day_hour {
            TimePeriod::Dawn
        } else if hour >= c.day_hour && hour < c.dusk_hour {
            TimePeriod::Day
        } else if hour >= c.dusk_hour && hour < c.night_hour {
            TimePeriod::Dusk
        } else {
            TimePeriod::Night
        }
    }

    /// Visibility factor: full night 0.5, dawn/dusk 0.75, day 1.0
    pub fn visibility_factor(&self) -> f32 {
        match self.time_period() {
            TimePeriod::Night => 0.5,
            TimePeriod::Dawn | TimePeriod::Dusk => 0.75,
            TimePeriod::Day => 1.0,
        }
    }

    /// More zombies spawn at night
    pub fn spawn_multiplier(&self) -> f32 {
        if self.is_night() {
            2.0
        } else {
            1.0
        }
    }

    /// "HH:MM"
    pub fn time_string(&self) -> String {
        let hour = self.current_hour();
        let whole = hour.floor() as u32;
        let minutes = ((hour - whole as f32) * 60.0).floor() as u32;
        format!("{:02}:{:02}", whole, minutes)
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            current_day: self.current_day,
            current_time: self.current_time,
        }
    }

    pub fn restore(&mut self, snapshot: ClockSnapshot) {
        self.current_day = snapshot.current_day.max(1);
        self.current_time = snapshot.current_time.clamp(0.0, self.config.day_length_secs);
        self.wrap_days();
    }

    pub fn reset(&mut self) {
        self.current_day = self.config.starting_day;
        self.set_hour(self.config.starting_hour);
    }
}

impl Default for DayNightClock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_configured_hour() {
        let clock = DayNightClock::default();
        assert!((clock.current_hour() - 8.0).abs() < 1e-3);
        assert_eq!(clock.current_day(), 1);
        assert!(clock.is_daytime());
        assert_eq!(clock.time_string(), "08:00");
    }

    #[test]
    fn test_day_rollover() {
        let mut clock = DayNightClock::default();
        // 16 hours at 60 real seconds per hour
        let rollovers = clock.advance(16.0 * 60.0);
        assert_eq!(rollovers, 1);
        assert_eq!(clock.current_day(), 2);
        assert!((clock.current_hour() - 0.0).abs() < 1e-3);
    }

    #[test]
    fn test_periods_and_visibility() {
        let mut clock = DayNightClock::default();

        clock.set_hour(6.5);
        assert_eq!(clock.time_period(), TimePeriod::Dawn);
        assert_eq!(clock.visibility_factor(), 0.75);
        assert!(clock.is_night());

        clock.set_hour(12.0);
        assert_eq!(clock.time_period(), TimePeriod::Day);
        assert_eq!(clock.spawn_multiplier(), 1.0);

        clock.set_hour(18.5);
        assert_eq!(clock.time_period(), TimePeriod::Dusk);

        clock.set_hour(23.0);
        assert_eq!(clock.time_period(), TimePeriod::Night);
        assert_eq!(clock.visibility_factor(), 0.5);
        assert_eq!(clock.spawn_multiplier(), 2.0);
    }

    #[test]
    fn test_time_multiplier_scales_advance() {
        let mut clock = DayNightClock::default();
        clock.set_time_multiplier(2.0);
        clock.advance(60.0);
        assert!((clock.current_hour() - 10.0).abs() < 1e-3);

        clock.set_time_multiplier(-5.0);
        assert_eq!(clock.time_multiplier(), 0.0);
        clock.advance(60.0);
        assert!((clock.current_hour() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut clock = DayNightClock::default();
        clock.advance_hours(30.0);
        let snap = clock.snapshot();

        let mut other = DayNightClock::default();
        other.restore(snap);
        assert_eq!(other.current_day(), clock.current_day());
        assert_eq!(other.snapshot(), snap);
    }
}
