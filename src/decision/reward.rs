//! Reward shaping

use crate::core::config::RewardConfig;
use crate::decision::context::ProfileSignals;
use crate::profiler::CombatStyle;
use crate::zombie::ZombieState;

/// Everything one step's reward depends on
#[derive(Debug, Clone, Copy)]
pub struct RewardInputs {
    pub previous_distance: Option<f32>,
    pub current_distance: Option<f32>,
    /// Health lost since the previous step
    pub health_lost: f32,
    pub max_health: f32,
    /// Damage dealt to the target since the previous step
    pub damage_dealt: f32,
    pub attack_success: bool,
    pub speed: f32,
    pub move_speed: f32,
    /// `None` without a clock
    pub is_daytime: Option<bool>,
    pub state: ZombieState,
    pub died: bool,
    pub budget_exhausted: bool,
    pub time_alive: f32,
    pub max_steps: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardBreakdown {
    pub survival: f32,
    pub approach: f32,
    pub damage_taken: f32,
    pub damage_dealt: f32,
    pub attack: f32,
    pub style: f32,
    pub time_of_day: f32,
    pub stealth: f32,
    pub terminal: f32,
}

impl RewardBreakdown {
    pub fn total(&self) -> f32 {
        self.survival
            + self.approach
            + self.damage_taken
            + self.damage_dealt
            + self.attack
            + self.style
            + self.time_of_day
            + self.stealth
            + self.terminal
    }
}

pub fn shape_reward(inputs: &RewardInputs, profile: &ProfileSignals, weights: &RewardConfig) -> RewardBreakdown {
    let mut r = RewardBreakdown {
        survival: weights.survival,
        ..RewardBreakdown::default()
    };

    if let (Some(before), Some(now)) = (inputs.previous_distance, inputs.current_distance) {
        let closed = before - now;
        r.approach = if closed > 0.0 {
            closed * weights.approach
        } else {
            closed * weights.approach * weights.retreat_factor
        };
    }

    if inputs.health_lost > 0.0 && inputs.max_health > 0.0 {
        r.damage_taken = weights.damage_taken * (inputs.health_lost / inputs.max_health);
    }
    if inputs.damage_dealt > 0.0 {
        r.damage_dealt = weights.damage_dealt * (inputs.damage_dealt / 100.0);
    }
    if inputs.attack_success {
        r.attack = weights.attack_success;
    }

    r.style = match profile.combat_style {
        CombatStyle::Melee => match inputs.current_distance {
            Some(d) if d < weights.melee_proximity_distance => weights.melee_proximity,
            _ => 0.0,
        },
        CombatStyle::Ranged if inputs.speed > inputs.move_speed * weights.evasion_speed_fraction => {
            weights.ranged_evasion
        }
        CombatStyle::Ranged => 0.0,
    };

    r.time_of_day = match inputs.is_daytime {
        Some(true) if profile.prefers_day => weights.day_alignment,
        Some(false) if !profile.prefers_day => weights.night_alignment,
        _ => 0.0,
    };

    if profile.prefers_stealth && matches!(inputs.state, ZombieState::Investigate | ZombieState::Idle) {
        r.stealth = weights.stealth_stance;
    }

    if inputs.died {
        r.terminal = weights.death;
    } else if inputs.budget_exhausted && inputs.max_steps > 0 {
        r.terminal = (inputs.time_alive / inputs.max_steps as f32) * weights.survival_bonus_scale;
    }

    r
}
