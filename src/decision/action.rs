//! Action contract and policies

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::DecisionConfig;
use crate::core::types::Vec2;
use crate::decision::context::{DecisionContext, ProfileSignals};
use crate::decision::observation::Observation;

/// One decision: continuous movement and turn, discrete attack intent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentAction {
    /// Normalized before use; zero means stand still
    pub movement: Vec2,
    pub turn_rate: f32,
    pub attack: bool,
}

impl AgentAction {
    /// Decode a flat `[move_x, move_y, turn]` + `[attack]` buffer pair
    pub fn from_buffers(continuous: &[f32], discrete: &[i32]) -> Self {
        let movement = match continuous {
            [x, y, ..] => Vec2::new(*x, *y),
            _ => Vec2::ZERO,
        };
        Self {
            movement: movement.normalize_or_zero(),
            turn_rate: continuous.get(2).copied().unwrap_or(0.0),
            attack: discrete.first().map(|a| *a == 1).unwrap_or(false),
        }
    }
}

/// Profile-driven speed bias
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionBias {
    pub speed_multiplier: f32,
}

impl ActionBias {
    /// Stealthy players get slower, quieter hunters; risk takers get faster ones
    pub fn from_profile(profile: &ProfileSignals, config: &DecisionConfig) -> Self {
        let speed_multiplier = if profile.prefers_stealth {
            config.stealth_speed_multiplier
        } else if profile.risk_tolerance > config.aggressive_risk_threshold {
            config.aggressive_speed_multiplier
        } else {
            1.0
        };
        Self { speed_multiplier }
    }
}

impl Default for ActionBias {
    fn default() -> Self {
        Self { speed_multiplier: 1.0 }
    }
}

/// Maps an observation to an action. External learners implement this too.
pub trait Policy {
    fn decide(&mut self, observation: &Observation, ctx: &DecisionContext<'_>) -> AgentAction;

    fn name(&self) -> &str {
        "policy"
    }
}

/// Move toward the target and attack near it; drift randomly without one
#[derive(Debug, Clone)]
pub struct HeuristicPolicy {
    rng: ChaCha8Rng,
}

impl HeuristicPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for HeuristicPolicy {
    fn decide(&mut self, observation: &Observation, ctx: &DecisionContext<'_>) -> AgentAction {
        match ctx.target_distance() {
            Some(distance) => AgentAction {
                movement: observation.target_direction(),
                turn_rate: 0.0,
                attack: distance <= ctx.agent.stats.attack_range * ctx.config.attack_intent_range_factor,
            },
            None => AgentAction {
                movement: Vec2::new(self.rng.gen_range(-1.0..=1.0), self.rng.gen_range(-1.0..=1.0))
                    .normalize_or_zero(),
                turn_rate: 0.0,
                attack: false,
            },
        }
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bias_priority() {
        let config = DecisionConfig::default();
        let neutral = ProfileSignals::default();
        assert_eq!(ActionBias::from_profile(&neutral, &config).speed_multiplier, 1.0);

        let bold = ProfileSignals { risk_tolerance: 0.9, ..neutral };
        assert_eq!(ActionBias::from_profile(&bold, &config).speed_multiplier, 1.2);

        // Stealth wins over risk
        let sneaky_bold = ProfileSignals { prefers_stealth: true, ..bold };
        assert_eq!(ActionBias::from_profile(&sneaky_bold, &config).speed_multiplier, 0.8);
    }

    #[test]
    fn test_decode_buffers() {
        let action = AgentAction::from_buffers(&[3.0, 4.0, 0.5], &[1]);
        assert!((action.movement - Vec2::new(0.6, 0.8)).length() < 1e-6);
        assert_eq!(action.turn_rate, 0.5);
        assert!(action.attack);

        let empty = AgentAction::from_buffers(&[], &[]);
        assert_eq!(empty, AgentAction::default());
    }
}
