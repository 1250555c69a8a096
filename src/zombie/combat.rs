//! Zombie strikes against the player's vitals

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityHandle, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatusEffect {
    Bleeding { duration: f32 },
    Infected,
}

impl StatusEffect {
    pub fn name(&self) -> &'static str {
        match self {
            StatusEffect::Bleeding { .. } => "bleeding",
            StatusEffect::Infected => "infected",
        }
    }
}

/// Player vitals owned outside the zombie core
pub trait DamageSink {
    fn take_damage(&mut self, amount: f32, source: &str);

    fn apply_status_effect(&mut self, effect: StatusEffect);
}

/// A resolved zombie attack, ready to apply to the target's vitals
#[derive(Debug, Clone, PartialEq)]
pub struct Strike {
    /// Attacker's body, if it has one
    pub attacker: Option<EntityHandle>,
    pub target: EntityHandle,
    pub damage: f32,
    pub origin: Vec2,
    pub effects: Vec<StatusEffect>,
}

impl Strike {
    pub fn apply(&self, sink: &mut dyn DamageSink) {
        sink.take_damage(self.damage, "zombie");
        for effect in &self.effects {
            sink.apply_status_effect(*effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ledger {
        damage: f32,
        effects: Vec<&'static str>,
    }

    impl DamageSink for Ledger {
        fn take_damage(&mut self, amount: f32, _source: &str) {
            self.damage += amount;
        }

        fn apply_status_effect(&mut self, effect: StatusEffect) {
            self.effects.push(effect.name());
        }
    }

    #[test]
    fn test_strike_applies_damage_and_effects() {
        let strike = Strike {
            attacker: Some(EntityHandle::new(1, 0)),
            target: EntityHandle::new(0, 0),
            damage: 12.0,
            origin: Vec2::ZERO,
            effects: vec![StatusEffect::Bleeding { duration: 10.0 }, StatusEffect::Infected],
        };
        let mut ledger = Ledger::default();
        strike.apply(&mut ledger);

        assert_eq!(ledger.damage, 12.0);
        assert_eq!(ledger.effects, vec!["bleeding", "infected"]);
    }
}
