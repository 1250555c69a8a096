//! Linear-falloff sound delivery to listeners

use serde::{Deserialize, Serialize};

use crate::core::config::SoundConfig;
use crate::core::types::Vec2;

/// One emission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundEvent {
    pub position: Vec2,
    pub base_intensity: f32,
    /// Non-positive means `max_sound_range * base_intensity`
    pub max_range: f32,
}

/// Anything that can receive a propagated sound
pub trait SoundListener {
    fn listener_position(&self) -> Vec2;

    /// Dead or disabled listeners are skipped
    fn is_listening(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct SoundPropagation {
    max_sound_range: f32,
}

impl SoundPropagation {
    pub fn new(config: &SoundConfig) -> Self {
        Self {
            max_sound_range: config.max_sound_range,
        }
    }

    pub fn effective_range(&self, event: &SoundEvent) -> f32 {
        if event.max_range > 0.0 {
            event.max_range
        } else {
            self.max_sound_range * event.base_intensity
        }
    }

    /// `clamp01(1 - d / range) * base_intensity`
    pub fn intensity_at(base_intensity: f32, range: f32, distance: f32) -> f32 {
        if range <= 0.0 {
            return 0.0;
        }
        (1.0 - distance / range).clamp(0.0, 1.0) * base_intensity
    }

    /// Deliver `event` to every listening listener within range.
    ///
    /// `deliver` receives the listener and the attenuated intensity and
    /// returns whether the sound was accepted. Returns the accepted count.
    pub fn emit<L, F>(&self, event: SoundEvent, listeners: &mut [L], mut deliver: F) -> usize
    where
        L: SoundListener,
        F: FnMut(&mut L, f32) -> bool,
    {
        let range = self.effective_range(&event);
        let mut accepted = 0;
        for listener in listeners.iter_mut().filter(|l| l.is_listening()) {
            let distance = listener.listener_position().distance(event.position);
            if distance > range {
                continue;
            }
            let intensity = Self::intensity_at(event.base_intensity, range, distance);
            if deliver(listener, intensity) {
                accepted += 1;
            }
        }
        tracing::debug!(
            "Sound at ({:.1}, {:.1}) intensity {:.2} range {:.1} reached {} listeners",
            event.position.x,
            event.position.y,
            event.base_intensity,
            range,
            accepted
        );
        accepted
    }
}

impl Default for SoundPropagation {
    fn default() -> Self {
        Self::new(&SoundConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ear {
        position: Vec2,
        alive: bool,
        heard: Vec<f32>,
    }

    impl SoundListener for Ear {
        fn listener_position(&self) -> Vec2 {
            self.position
        }

        fn is_listening(&self) -> bool {
            self.alive
        }
    }

    fn ear(x: f32, alive: bool) -> Ear {
        Ear {
            position: Vec2::new(x, 0.0),
            alive,
            heard: Vec::new(),
        }
    }

    #[test]
    fn test_linear_falloff() {
        assert_eq!(SoundPropagation::intensity_at(1.0, 10.0, 0.0), 1.0);
        assert!((SoundPropagation::intensity_at(0.8, 10.0, 5.0) - 0.4).abs() < 1e-6);
        assert_eq!(SoundPropagation::intensity_at(1.0, 10.0, 12.0), 0.0);
    }

    #[test]
    fn test_default_range() {
        let sounds = SoundPropagation::default();
        let door = SoundEvent { position: Vec2::ZERO, base_intensity: 0.5, max_range: 0.0 };
        assert_eq!(sounds.effective_range(&door), 25.0);
    }

    #[test]
    fn test_emit_skips_dead_and_distant() {
        let sounds = SoundPropagation::default();
        let mut ears = vec![ear(2.0, true), ear(3.0, false), ear(20.0, true)];
        let event = SoundEvent { position: Vec2::ZERO, base_intensity: 1.0, max_range: 10.0 };

        let accepted = sounds.emit(event, &mut ears, |e, intensity| {
            e.heard.push(intensity);
            true
        });
        assert_eq!(accepted, 1);
        assert!((ears[0].heard[0] - 0.8).abs() < 1e-6);
        assert!(ears[1].heard.is_empty());
        assert!(ears[2].heard.is_empty());
    }
}
