//! Named sound presets

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::Vec2;
use crate::sound::propagation::SoundEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    Footstep,
    MeleeHit,
    Gunshot,
    Door,
    ZombieGroan,
}

impl SoundKind {
    pub fn base_intensity(self) -> f32 {
        match self {
            SoundKind::Footstep => 0.3,
            SoundKind::MeleeHit => 0.3,
            SoundKind::Gunshot => 1.0,
            SoundKind::Door => 0.5,
            SoundKind::ZombieGroan => 0.7,
        }
    }

    /// Explicit range, or 0 to use the propagation default
    pub fn range(self) -> f32 {
        match self {
            SoundKind::Footstep => 5.0,
            SoundKind::MeleeHit => 10.0,
            SoundKind::Gunshot => 50.0,
            SoundKind::Door | SoundKind::ZombieGroan => 0.0,
        }
    }

    pub fn event(self, position: Vec2) -> SoundEvent {
        SoundEvent {
            position,
            base_intensity: self.base_intensity(),
            max_range: self.range(),
        }
    }

    /// Footsteps while crouched make no sound
    pub fn event_for_stance(self, position: Vec2, crouching: bool) -> Option<SoundEvent> {
        if crouching && self == SoundKind::Footstep {
            None
        } else {
            Some(self.event(position))
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundKind::Footstep => "footstep",
            SoundKind::MeleeHit => "melee_hit",
            SoundKind::Gunshot => "gunshot",
            SoundKind::Door => "door",
            SoundKind::ZombieGroan => "zombie_groan",
        }
    }
}

impl fmt::Display for SoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
