//! Zombie variants and their stat multipliers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::{SenseConfig, ZombieConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ZombieKind {
    #[default]
    Walker,
    Runner,
    Brute,
    Crawler,
    Spitter,
    Bloater,
    Screamer,
}

/// Multipliers over the Walker base stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindModifiers {
    pub speed: f32,
    pub health: f32,
    pub damage: f32,
    pub attack_range: f32,
    pub vision: f32,
    pub hearing: f32,
    pub smell: f32,
}

impl KindModifiers {
    const BASE: KindModifiers = KindModifiers {
        speed: 1.0,
        health: 1.0,
        damage: 1.0,
        attack_range: 1.0,
        vision: 1.0,
        hearing: 1.0,
        smell: 1.0,
    };
}

impl ZombieKind {
    pub const ALL: [ZombieKind; 7] = [
        ZombieKind::Walker,
        ZombieKind::Runner,
        ZombieKind::Brute,
        ZombieKind::Crawler,
        ZombieKind::Spitter,
        ZombieKind::Bloater,
        ZombieKind::Screamer,
    ];

    pub fn modifiers(self) -> KindModifiers {
        let base = KindModifiers::BASE;
        match self {
            ZombieKind::Walker => base,
            ZombieKind::Runner => KindModifiers { speed: 2.0, health: 0.7, damage: 0.8, vision: 1.2, ..base },
            ZombieKind::Brute => KindModifiers { speed: 0.7, health: 2.0, damage: 1.5, attack_range: 1.3, ..base },
            ZombieKind::Crawler => KindModifiers {
                speed: 0.5,
                health: 0.6,
                damage: 1.2,
                vision: 0.7,
                hearing: 1.5,
                ..base
            },
            ZombieKind::Spitter => KindModifiers {
                speed: 0.8,
                health: 0.8,
                attack_range: 3.0,
                vision: 1.3,
                ..base
            },
            ZombieKind::Bloater => KindModifiers {
                speed: 0.5,
                health: 1.5,
                damage: 2.0,
                attack_range: 2.0,
                smell: 1.5,
                ..base
            },
            ZombieKind::Screamer => KindModifiers {
                speed: 0.9,
                health: 0.7,
                damage: 0.5,
                vision: 1.5,
                hearing: 2.0,
                ..base
            },
        }
    }

    /// Only Brutes rage at low health
    pub fn can_rage(self) -> bool {
        matches!(self, ZombieKind::Brute)
    }

    /// Position in `ALL`, used for the observation's type slot
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ZombieKind::Walker => "Walker",
            ZombieKind::Runner => "Runner",
            ZombieKind::Brute => "Brute",
            ZombieKind::Crawler => "Crawler",
            ZombieKind::Spitter => "Spitter",
            ZombieKind::Bloater => "Bloater",
            ZombieKind::Screamer => "Screamer",
        }
    }
}

impl fmt::Display for ZombieKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved per-agent stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZombieStats {
    pub max_health: f32,
    pub move_speed: f32,
    pub attack_damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub vision_range: f32,
    pub vision_angle: f32,
    pub hearing_range: f32,
    pub smell_range: f32,
    pub memory_duration: f32,
}

impl ZombieStats {
    /// Base stats with the kind's multipliers applied
    pub fn for_kind(kind: ZombieKind, zombie: &ZombieConfig, senses: &SenseConfig) -> Self {
        let m = kind.modifiers();
        Self {
            max_health: zombie.max_health * m.health,
            move_speed: zombie.move_speed * m.speed,
            attack_damage: zombie.attack_damage * m.damage,
            attack_range: zombie.attack_range * m.attack_range,
            attack_cooldown: zombie.attack_cooldown,
            vision_range: senses.vision_range * m.vision,
            vision_angle: senses.vision_angle,
            hearing_range: senses.hearing_range * m.hearing,
            smell_range: senses.smell_range * m.smell,
            memory_duration: senses.memory_duration,
        }
    }

    /// Difficulty scaling: health by sqrt(d), damage by d^0.3, speed by d^0.2
    pub fn scaled_for_difficulty(mut self, difficulty: f32) -> Self {
        let d = difficulty.max(0.0);
        if (d - 1.0).abs() > f32::EPSILON {
            self.max_health *= d.sqrt();
            self.attack_damage *= d.powf(0.3);
            self.move_speed *= d.powf(0.2);
        }
        self
    }
}
