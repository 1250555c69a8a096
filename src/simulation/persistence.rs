//! Save/load of the minimal persisted state
//!
//! A save holds the clock, the behavior profile snapshot and each living
//! zombie's kind, position, health and resolved stats. Behavior state,
//! histories and episodes are rebuilt fresh on load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::calendar::ClockSnapshot;
use crate::core::error::{Result, ShamblerError};
use crate::core::types::{Layer, Vec2};
use crate::profiler::BehaviorSnapshot;
use crate::simulation::{SimEvent, Simulation};
use crate::zombie::{ZombieKind, ZombieStats};

pub const SAVE_FORMAT_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub kind: ZombieKind,
    pub position: Vec2,
    pub health: f32,
    /// Stats as spawned, difficulty scaling included
    pub stats: ZombieStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    pub clock: ClockSnapshot,
    pub profile: BehaviorSnapshot,
    pub zombies: Vec<AgentRecord>,
}

impl SaveGame {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let save: SaveGame = serde_json::from_str(content)?;
        if save.version != SAVE_FORMAT_VERSION {
            return Err(ShamblerError::UnsupportedSaveVersion {
                found: save.version,
                expected: SAVE_FORMAT_VERSION,
            });
        }
        Ok(save)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        tracing::info!("Saved {} zombies to {}", self.zombies.len(), path.as_ref().display());
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

impl Simulation {
    /// Capture the persisted state. Corpses are not saved.
    pub fn save_game(&self) -> SaveGame {
        SaveGame {
            version: SAVE_FORMAT_VERSION,
            clock: self.clock.snapshot(),
            profile: self.profiler.snapshot(),
            zombies: self
                .zombies
                .iter()
                .filter(|z| !z.is_dead())
                .map(|z| AgentRecord {
                    kind: z.kind,
                    position: z.position,
                    health: z.health(),
                    stats: z.stats,
                })
                .collect(),
        }
    }

    /// Replace the clock, profile and zombie roster with a save's contents
    pub fn load_game(&mut self, save: &SaveGame) -> Result<()> {
        if save.version != SAVE_FORMAT_VERSION {
            return Err(ShamblerError::UnsupportedSaveVersion {
                found: save.version,
                expected: SAVE_FORMAT_VERSION,
            });
        }

        self.clock.restore(save.clock);
        self.profiler.restore(&save.profile);

        for mut agent in std::mem::take(&mut self.zombies) {
            if let Some(body) = agent.body() {
                self.world.remove(body);
            }
            if let Some(layer) = self.adaptive.as_mut() {
                layer.forget(agent.id);
            }
            agent.set_body(None);
            self.pool.release(agent);
        }

        for record in save.zombies.iter().filter(|r| r.health > 0.0) {
            let mut agent = self
                .pool
                .acquire(record.kind, record.stats, record.position, &self.config.senses, &mut self.rng);
            agent.restore_vitals(record.position, record.health);
            let body = self
                .world
                .add_circle(record.position, self.config.senses.body_radius, Layer::Zombie);
            agent.set_body(Some(body));
            self.events.push(SimEvent::Spawned {
                zombie: agent.id,
                kind: record.kind,
                position: record.position,
            });
            self.zombies.push(agent);
        }

        tracing::info!(
            "Loaded day {} with {} zombies",
            self.clock.current_day(),
            self.zombies.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::profiler::CombatStyle;

    fn quiet() -> Simulation {
        let mut config = SimulationConfig::default();
        config.spawner.enabled = false;
        Simulation::new(config).unwrap()
    }

    #[test]
    fn test_save_round_trip_through_file() {
        let mut sim = quiet();
        sim.add_survivor(Vec2::new(30.0, 30.0));
        let hurt = sim.spawn_zombie(ZombieKind::Brute, Vec2::new(1.0, 2.0));
        sim.spawn_zombie(ZombieKind::Runner, Vec2::new(-4.0, 0.0));
        sim.player_attack(CombatStyle::Melee, hurt, 20.0);
        sim.clock_mut().advance_hours(5.0);

        let save = sim.save_game();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        save.save_to_path(&path).unwrap();
        let loaded = SaveGame::load_from_path(&path).unwrap();
        assert_eq!(loaded, save);

        let mut other = quiet();
        other.load_game(&loaded).unwrap();
        assert_eq!(other.zombies().len(), 2);
        assert_eq!(other.clock().snapshot(), sim.clock().snapshot());
        assert_eq!(other.profiler().snapshot(), sim.profiler().snapshot());

        let brute = other.zombies().iter().find(|z| z.kind == ZombieKind::Brute).unwrap();
        assert_eq!(brute.position, Vec2::new(1.0, 2.0));
        assert!((brute.health() - save.zombies[0].health).abs() < 1e-5);
        assert!(brute.body().is_some());
    }

    #[test]
    fn test_night_spawn_keeps_scaled_stats_through_save() {
        let mut sim = quiet();
        sim.clock_mut().set_hour(23.0);
        let id = sim.spawn_zombie(ZombieKind::Walker, Vec2::new(3.0, 0.0));
        sim.player_attack(CombatStyle::Ranged, id, 5.0);
        let spawned = *sim.zombie(id).map(|z| &z.stats).unwrap();
        let health = sim.zombie(id).unwrap().health();
        assert!((spawned.max_health - 50.0 * 1.5f32.sqrt()).abs() < 1e-3);
        assert!(health > 50.0);

        let json = sim.save_game().to_json().unwrap();
        let mut other = quiet();
        other.load_game(&SaveGame::from_json(&json).unwrap()).unwrap();

        let restored = &other.zombies()[0];
        assert_eq!(restored.stats, spawned);
        assert!((restored.health() - health).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let sim = quiet();
        let mut save = sim.save_game();
        save.version = SAVE_FORMAT_VERSION + 1;
        let json = serde_json::to_string(&save).unwrap();
        let err = SaveGame::from_json(&json).unwrap_err();
        assert!(matches!(
            err,
            ShamblerError::UnsupportedSaveVersion { found, expected }
                if found == SAVE_FORMAT_VERSION + 1 && expected == SAVE_FORMAT_VERSION
        ));

        let mut target = quiet();
        assert!(target.load_game(&save).is_err());
    }

    #[test]
    fn test_load_replaces_roster() {
        let mut sim = quiet();
        sim.spawn_zombie(ZombieKind::Walker, Vec2::ZERO);
        sim.spawn_zombie(ZombieKind::Walker, Vec2::ONE);
        let save = SaveGame {
            version: SAVE_FORMAT_VERSION,
            clock: sim.clock().snapshot(),
            profile: sim.profiler().snapshot(),
            zombies: vec![AgentRecord {
                kind: ZombieKind::Crawler,
                position: Vec2::new(7.0, 7.0),
                health: 5.0,
                stats: ZombieStats::for_kind(ZombieKind::Crawler, &sim.config().zombie, &sim.config().senses),
            }],
        };
        sim.load_game(&save).unwrap();
        assert_eq!(sim.zombies().len(), 1);
        assert_eq!(sim.zombies()[0].kind, ZombieKind::Crawler);
        assert_eq!(sim.world().body_count(), 1);
    }
}
