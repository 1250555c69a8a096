//! Survivor: the player stand-in zombies hunt
//!
//! Vitals live here rather than in the zombie core; zombies reach them only
//! through [`DamageSink`].

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityHandle, Vec2};
use crate::decision::TargetInfo;
use crate::profiler::{CombatStyle, SubjectSample};
use crate::zombie::{DamageSink, StatusEffect};

/// Panic gained per point of damage taken
const PANIC_PER_DAMAGE: f32 = 0.5;
/// Panic recovered per second
const PANIC_DECAY: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub effect: StatusEffect,
    /// Seconds left; `None` lasts until cured
    pub remaining: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct Survivor {
    pub body: EntityHandle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// 0..=100
    pub panic: f32,
    pub speed_modifier: f32,
    pub aiming: bool,
    pub combat_mode: CombatStyle,
    pub ammo: u32,
    pub magazine_size: u32,
    pub sprinting: bool,
    pub crouching: bool,
    effects: Vec<ActiveEffect>,
    damage_taken: f32,
    last_damage_source: Option<String>,
}

impl Survivor {
    pub fn new(body: EntityHandle, position: Vec2) -> Self {
        Self {
            body,
            position,
            velocity: Vec2::ZERO,
            health: 100.0,
            max_health: 100.0,
            panic: 0.0,
            speed_modifier: 1.0,
            aiming: false,
            combat_mode: CombatStyle::Melee,
            ammo: 12,
            magazine_size: 12,
            sprinting: false,
            crouching: false,
            effects: Vec::new(),
            damage_taken: 0.0,
            last_damage_source: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_moving(&self) -> bool {
        self.velocity.length_squared() > 1e-4
    }

    pub fn ammo_fraction(&self) -> f32 {
        if self.magazine_size == 0 {
            0.0
        } else {
            self.ammo as f32 / self.magazine_size as f32
        }
    }

    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.effect.name() == name)
    }

    pub fn damage_taken(&self) -> f32 {
        self.damage_taken
    }

    pub fn last_damage_source(&self) -> Option<&str> {
        self.last_damage_source.as_deref()
    }

    /// Integrate movement and tick down timed effects
    pub fn update(&mut self, dt: f32) {
        if !self.is_alive() {
            self.velocity = Vec2::ZERO;
            return;
        }
        self.position += self.velocity * self.speed_modifier * dt;
        self.panic = (self.panic - PANIC_DECAY * dt).max(0.0);

        for active in self.effects.iter_mut() {
            if let Some(remaining) = active.remaining.as_mut() {
                *remaining -= dt;
            }
        }
        self.effects.retain(|e| e.remaining.map(|r| r > 0.0).unwrap_or(true));
    }

    pub fn subject_sample(&self) -> SubjectSample {
        SubjectSample {
            position: self.position,
            moving: self.is_moving(),
            sprinting: self.sprinting,
            crouching: self.crouching,
        }
    }

    pub fn target_info(&self) -> TargetInfo {
        TargetInfo {
            position: self.position,
            health: self.health,
            speed_modifier: self.speed_modifier,
            panic: self.panic,
            aiming: self.aiming,
            ranged: self.combat_mode == CombatStyle::Ranged,
            ammo_fraction: self.ammo_fraction(),
        }
    }
}

impl DamageSink for Survivor {
    fn take_damage(&mut self, amount: f32, source: &str) {
        if !self.is_alive() {
            return;
        }
        let amount = amount.max(0.0);
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.damage_taken += amount;
        self.panic = (self.panic + amount * PANIC_PER_DAMAGE).min(100.0);
        self.last_damage_source = Some(source.to_string());
        if !self.is_alive() {
            tracing::info!("Survivor {} was killed by {}", self.body, source);
        }
    }

    fn apply_status_effect(&mut self, effect: StatusEffect) {
        let remaining = match effect {
            StatusEffect::Bleeding { duration } => Some(duration),
            StatusEffect::Infected => None,
        };
        // Reapplying refreshes rather than stacks
        self.effects.retain(|e| e.effect.name() != effect.name());
        self.effects.push(ActiveEffect { effect, remaining });
        tracing::debug!("Survivor {} is now {}", self.body, effect.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_and_panics() {
        let mut s = Survivor::new(EntityHandle::new(0, 0), Vec2::ZERO);
        s.take_damage(30.0, "zombie");
        assert_eq!(s.health, 70.0);
        assert_eq!(s.panic, 15.0);
        s.take_damage(500.0, "zombie");
        assert_eq!(s.health, 0.0);
        assert!(!s.is_alive());
        assert_eq!(s.last_damage_source(), Some("zombie"));
    }

    #[test]
    fn test_bleeding_expires_infection_persists() {
        let mut s = Survivor::new(EntityHandle::new(0, 0), Vec2::ZERO);
        s.apply_status_effect(StatusEffect::Bleeding { duration: 1.0 });
        s.apply_status_effect(StatusEffect::Bleeding { duration: 1.0 });
        s.apply_status_effect(StatusEffect::Infected);
        assert_eq!(s.effects().len(), 2);

        s.update(1.5);
        assert!(!s.has_effect("bleeding"));
        assert!(s.has_effect("infected"));
    }
}
