//! Shambler - adaptive zombie AI and player behavior profiling
//!
//! A headless simulation core: zombies sense, remember and chase survivors,
//! a profiler learns how the player behaves, and an optional decision layer
//! turns that profile into observations, actions and shaped rewards.

pub mod core;
pub mod decision;
pub mod profiler;
pub mod simulation;
pub mod sound;
pub mod spatial;
pub mod zombie;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::{Result, ShamblerError};
pub use crate::simulation::{SaveGame, SimEvent, Simulation};
