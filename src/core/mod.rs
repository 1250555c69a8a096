pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::{ClockSnapshot, DayNightClock, TimePeriod};
pub use config::SimulationConfig;
pub use error::{Result, ShamblerError};
pub use types::{EntityHandle, Layer, LayerMask, SimTime, Vec2};
