//! Player action records kept in the profiler's bounded histories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::types::{SimTime, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatStyle {
    #[default]
    Melee,
    Ranged,
}

impl CombatStyle {
    pub fn name(self) -> &'static str {
        match self {
            CombatStyle::Melee => "Melee",
            CombatStyle::Ranged => "Ranged",
        }
    }
}

impl fmt::Display for CombatStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Health,
    Hunger,
    Thirst,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Health, ResourceKind::Hunger, ResourceKind::Thirst];

    /// Threshold assumed before enough samples exist
    pub fn default_threshold(self) -> f32 {
        match self {
            ResourceKind::Health => 50.0,
            ResourceKind::Hunger => 60.0,
            ResourceKind::Thirst => 70.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Health => "Health",
            ResourceKind::Hunger => "Hunger",
            ResourceKind::Thirst => "Thirst",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL.into_iter().find(|k| k.name() == s).ok_or(())
    }
}

/// One periodic observation of the tracked subject
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementSample {
    pub timestamp: SimTime,
    pub position: Vec2,
    pub velocity: Vec2,
    pub sprinting: bool,
    pub crouching: bool,
    pub moving: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub timestamp: SimTime,
    pub style: CombatStyle,
    pub distance: f32,
    pub successful: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceEvent {
    pub timestamp: SimTime,
    pub kind: ResourceKind,
    pub value_before: f32,
    pub value_after: f32,
}

/// What the profiler sees of its subject on a tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubjectSample {
    pub position: Vec2,
    pub moving: bool,
    pub sprinting: bool,
    pub crouching: bool,
}
