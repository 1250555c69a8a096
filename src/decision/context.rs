//! Per-step inputs to the decision layer

use crate::core::config::DecisionConfig;
use crate::core::types::Vec2;
use crate::profiler::{BehaviorProfiler, CombatStyle, Pattern};
use crate::spatial::SpatialQuery;
use crate::zombie::ZombieAgent;

/// What the layer knows about the player being hunted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub position: Vec2,
    pub health: f32,
    pub speed_modifier: f32,
    pub panic: f32,
    pub aiming: bool,
    pub ranged: bool,
    /// Loaded rounds over magazine size
    pub ammo_fraction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentInfo {
    pub hour: f32,
    pub is_daytime: bool,
    pub day: u32,
}

/// Profiler outputs the layer consumes, cached per episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSignals {
    pub combat_style: CombatStyle,
    pub risk_tolerance: f32,
    pub prefers_day: bool,
    pub prefers_stealth: bool,
    pub health_threshold: f32,
    pub combat_distance: f32,
    pub success_rate: f32,
    pub aggressive_confidence: f32,
}

impl Default for ProfileSignals {
    /// Neutral values used when no profiler is available
    fn default() -> Self {
        Self {
            combat_style: CombatStyle::Melee,
            risk_tolerance: 0.5,
            prefers_day: true,
            prefers_stealth: false,
            health_threshold: 50.0,
            combat_distance: 5.0,
            success_rate: 0.5,
            aggressive_confidence: 0.5,
        }
    }
}

impl ProfileSignals {
    pub fn read(profiler: Option<&BehaviorProfiler>) -> Self {
        let Some(p) = profiler else {
            return Self::default();
        };
        Self {
            combat_style: p.preferred_combat_style(),
            risk_tolerance: p.risk_tolerance(),
            prefers_day: p.prefers_day_activity(),
            prefers_stealth: p.prefers_stealth(),
            health_threshold: p.average_health_threshold(),
            combat_distance: p.average_combat_distance(),
            success_rate: p.combat_success_rate(),
            aggressive_confidence: p.pattern_confidence(Pattern::AggressiveCombat),
        }
    }
}

/// Ephemeral bundle handed to observation building and policies
pub struct DecisionContext<'a> {
    pub world: &'a dyn SpatialQuery,
    pub agent: &'a ZombieAgent,
    pub config: &'a DecisionConfig,
    pub profile: &'a ProfileSignals,
    pub target: Option<TargetInfo>,
    pub environment: Option<EnvironmentInfo>,
}

impl<'a> DecisionContext<'a> {
    pub fn target_distance(&self) -> Option<f32> {
        self.target.map(|t| t.position.distance(self.agent.position))
    }
}
