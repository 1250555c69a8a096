//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every section deserializes with
//! defaults so a TOML file only needs the values it overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, ShamblerError};

/// Configuration for the whole simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the simulation RNG. A fixed seed reproduces a run exactly.
    pub seed: u64,
    pub profiler: ProfilerConfig,
    pub zombie: ZombieConfig,
    pub senses: SenseConfig,
    pub decision: DecisionConfig,
    pub spawner: SpawnerConfig,
    pub clock: ClockConfig,
    pub sound: SoundConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            profiler: ProfilerConfig::default(),
            zombie: ZombieConfig::default(),
            senses: SenseConfig::default(),
            decision: DecisionConfig::default(),
            spawner: SpawnerConfig::default(),
            clock: ClockConfig::default(),
            sound: SoundConfig::default(),
        }
    }
}

// === BEHAVIOR PROFILER ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Master switch. When false every ingestion call is a no-op.
    pub enabled: bool,

    /// Seconds between movement samples
    pub sample_rate: f32,

    /// Capacity of every bounded history (movement, combat, resource,
    /// visited locations). Oldest entries are evicted first.
    pub max_history_size: usize,

    /// Pattern analysis runs once every this many movement samples.
    /// Also the window used for the rush/cautious speed average.
    pub pattern_window_size: usize,

    /// Patterns at or above this clamped confidence are "dominant"
    pub min_pattern_confidence: f32,

    /// A visited position is new only if no stored location lies within
    /// this distance.
    pub location_dedup_radius: f32,

    /// Resource thresholds are only recomputed once this many samples of
    /// that resource kind exist.
    pub min_resource_samples: usize,

    /// Number of recent combat events averaged for the aggressive/defensive
    /// pattern.
    pub recent_combat_window: usize,

    /// Mean combat distance below this leans aggressive
    pub aggressive_distance: f32,

    /// Mean speed above this counts as rushing
    pub rush_speed: f32,

    /// Mean speed below this counts as cautious
    pub cautious_speed: f32,

    /// Seconds without resource use after which the player counts as
    /// conservative with supplies.
    pub conservative_gap_secs: f32,

    /// Stealth ratio above which the player prefers stealth
    pub stealth_ratio_threshold: f32,

    /// Accumulator increment per analysis pass
    pub pattern_increment: f32,

    /// Accumulator increment per dangerous encounter (RiskTaker/Cautious)
    pub encounter_increment: f32,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: 1.0,
            max_history_size: 1000,
            pattern_window_size: 10,
            min_pattern_confidence: 0.7,
            location_dedup_radius: 5.0,
            min_resource_samples: 6,
            recent_combat_window: 10,
            aggressive_distance: 5.0,
            rush_speed: 5.0,
            cautious_speed: 2.0,
            conservative_gap_secs: 60.0,
            stealth_ratio_threshold: 0.6,
            pattern_increment: 0.1,
            encounter_increment: 0.2,
        }
    }
}

// === ZOMBIE BEHAVIOR ===

/// Base (Walker) stats and state-machine constants
///
/// Kind-specific multipliers are applied on top of these at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZombieConfig {
    pub max_health: f32,
    pub move_speed: f32,
    pub attack_damage: f32,
    pub attack_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,

    pub wander_speed_multiplier: f32,
    pub chase_speed_multiplier: f32,
    pub investigate_speed_multiplier: f32,
    pub patrol_speed_multiplier: f32,
    /// Movement multiplier applied to every state at night
    pub night_speed_multiplier: f32,

    /// Patrol points are picked within this radius of the spawn point
    pub patrol_radius: f32,
    /// Seconds without seeing the target before a chase is abandoned
    pub give_up_time: f32,
    /// Seconds a lost target is chased blind before investigating instead
    pub lost_target_grace: f32,
    /// Radius of the synchronous chase alert
    pub group_alert_radius: f32,

    pub wander_change_interval: f32,
    /// How far ahead of the agent the wander goal is placed
    pub wander_lookahead: f32,
    /// Idle lasts a random duration in [idle_min_secs, idle_max_secs]
    pub idle_min_secs: f32,
    pub idle_max_secs: f32,
    /// Destinations closer than this count as reached
    pub arrival_distance: f32,
    /// Investigate countdown when seeded from sound memory
    pub investigate_time_sound: f32,
    /// Investigate countdown otherwise
    pub investigate_time_default: f32,

    pub obstacle_probe_distance: f32,
    /// Weight of the perpendicular avoidance vector
    pub avoidance_weight: f32,

    /// Knockback impulse applied away from a damage source
    pub knockback_force: f32,
    /// Fraction of knockback velocity kept per second
    pub knockback_damping: f32,
    /// Players within this radius of a damage source become the target
    pub attacker_search_radius: f32,

    // Brute rage
    pub rage_health_fraction: f32,
    pub rage_duration: f32,
    pub rage_speed_multiplier: f32,
    pub rage_damage_multiplier: f32,
    /// Extra multiplier on each strike while raging
    pub rage_strike_multiplier: f32,

    // Strike side effects
    pub bleed_chance: f32,
    pub bleed_duration: f32,
    pub infection_chance: f32,

    pub loot_chance: f32,
    /// Seconds a corpse lingers before returning to the pool
    pub despawn_delay: f32,
}

impl Default for ZombieConfig {
    fn default() -> Self {
        Self {
            max_health: 50.0,
            move_speed: 2.0,
            attack_damage: 10.0,
            attack_range: 1.5,
            attack_cooldown: 1.5,
            wander_speed_multiplier: 0.3,
            chase_speed_multiplier: 1.5,
            investigate_speed_multiplier: 0.7,
            patrol_speed_multiplier: 0.5,
            night_speed_multiplier: 1.2,
            patrol_radius: 10.0,
            give_up_time: 10.0,
            lost_target_grace: 2.0,
            group_alert_radius: 5.0,
            wander_change_interval: 3.0,
            wander_lookahead: 5.0,
            idle_min_secs: 2.0,
            idle_max_secs: 5.0,
            arrival_distance: 1.0,
            investigate_time_sound: 10.0,
            investigate_time_default: 5.0,
            obstacle_probe_distance: 1.0,
            avoidance_weight: 0.5,
            knockback_force: 3.0,
            knockback_damping: 0.05,
            attacker_search_radius: 5.0,
            rage_health_fraction: 0.3,
            rage_duration: 10.0,
            rage_speed_multiplier: 1.5,
            rage_damage_multiplier: 1.3,
            rage_strike_multiplier: 1.5,
            bleed_chance: 0.2,
            bleed_duration: 10.0,
            infection_chance: 0.1,
            loot_chance: 0.3,
            despawn_delay: 3.0,
        }
    }
}

// === SENSES ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SenseConfig {
    pub vision_range: f32,
    /// Full cone angle in degrees
    pub vision_angle: f32,
    pub hearing_range: f32,
    /// Smell ignores walls
    pub smell_range: f32,
    /// Seconds a heard sound stays in memory
    pub memory_duration: f32,
    /// A held target is dropped once farther than vision_range times this
    pub lose_target_factor: f32,
    /// Maximum remembered sounds; the oldest is dropped first
    pub sound_memory_capacity: usize,
    /// Body radius of a zombie for collision and ray offsets
    pub body_radius: f32,
}

impl Default for SenseConfig {
    fn default() -> Self {
        Self {
            vision_range: 10.0,
            vision_angle: 120.0,
            hearing_range: 15.0,
            smell_range: 8.0,
            memory_duration: 5.0,
            lose_target_factor: 1.5,
            sound_memory_capacity: 16,
            body_radius: 0.4,
        }
    }
}

// === ADAPTIVE DECISION LAYER ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Target distance is normalized by this radius
    pub observation_radius: f32,
    /// Angularly uniform perception rays appended to every observation
    pub ray_count: usize,
    pub ray_distance: f32,
    /// Radius for the nearby-agent density signal
    pub nearby_agent_radius: f32,
    /// Radius for the obstacle-proximity flag
    pub obstacle_check_radius: f32,
    /// Step budget per episode
    pub max_steps: u32,
    /// When true an ended episode resets the agent in place instead of
    /// sending it through the death and pooling pipeline.
    pub training_mode: bool,
    /// Episode resets reposition within this distance of the spawn anchor
    pub respawn_offset: f32,

    /// Speed multiplier when the player prefers stealth
    pub stealth_speed_multiplier: f32,
    /// Speed multiplier when the player is a risk taker
    pub aggressive_speed_multiplier: f32,
    pub aggressive_risk_threshold: f32,
    /// Attack intent only counts as an attempt within attack_range times this
    pub attack_intent_range_factor: f32,

    pub rewards: RewardConfig,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            observation_radius: 20.0,
            ray_count: 16,
            ray_distance: 15.0,
            nearby_agent_radius: 10.0,
            obstacle_check_radius: 5.0,
            max_steps: 5000,
            training_mode: false,
            respawn_offset: 10.0,
            stealth_speed_multiplier: 0.8,
            aggressive_speed_multiplier: 1.2,
            aggressive_risk_threshold: 0.7,
            attack_intent_range_factor: 1.5,
            rewards: RewardConfig::default(),
        }
    }
}

/// Reward shaping weights
///
/// The survival, approach and alignment terms are deliberately small next to
/// the damage and death terms so they steer without dominating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub survival: f32,
    /// Scaled by damage / 100
    pub damage_dealt: f32,
    /// Scaled by damage / max_health (negative)
    pub damage_taken: f32,
    /// Per unit of distance closed
    pub approach: f32,
    /// Fraction of the approach weight applied when distance grows
    pub retreat_factor: f32,
    pub death: f32,
    pub attack_success: f32,
    pub melee_proximity: f32,
    pub melee_proximity_distance: f32,
    pub ranged_evasion: f32,
    /// Fraction of move speed that counts as evasive motion
    pub evasion_speed_fraction: f32,
    pub day_alignment: f32,
    pub night_alignment: f32,
    pub stealth_stance: f32,
    /// Step-budget exhaustion bonus is (time_alive / max_steps) times this
    pub survival_bonus_scale: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            survival: 0.001,
            damage_dealt: 1.0,
            damage_taken: -0.5,
            approach: 0.01,
            retreat_factor: 0.5,
            death: -1.0,
            attack_success: 0.1,
            melee_proximity: 0.01,
            melee_proximity_distance: 5.0,
            ranged_evasion: 0.005,
            evasion_speed_fraction: 0.8,
            day_alignment: 0.002,
            night_alignment: 0.003,
            stealth_stance: 0.001,
            survival_bonus_scale: 0.5,
        }
    }
}

// === SPAWNER ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Automatic spawning (waves or continuous). Manual spawns always work.
    pub enabled: bool,
    pub max_zombies_alive: usize,
    pub min_spawn_distance: f32,
    pub max_spawn_distance: f32,
    /// Seconds between continuous spawns at difficulty 1
    pub base_spawn_interval: f32,
    pub use_waves: bool,
    pub zombies_per_wave: u32,
    pub wave_duration: f32,
    pub time_between_waves: f32,
    pub initial_wave_delay: f32,
    /// Per-wave growth of both wave size and difficulty
    pub wave_multiplier: f32,
    pub difficulty_scaling: bool,
    pub day_difficulty_multiplier: f32,
    pub night_difficulty_multiplier: f32,
    pub player_level_multiplier: f32,
    /// Agents pre-allocated per kind
    pub initial_pool_size: usize,
    pub kind_weights: KindWeights,
    /// Fixed spawn points; when empty, spawns ring the player
    pub spawn_points: Vec<[f32; 2]>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_zombies_alive: 50,
            min_spawn_distance: 20.0,
            max_spawn_distance: 40.0,
            base_spawn_interval: 5.0,
            use_waves: true,
            zombies_per_wave: 10,
            wave_duration: 120.0,
            time_between_waves: 60.0,
            initial_wave_delay: 5.0,
            wave_multiplier: 1.2,
            difficulty_scaling: true,
            day_difficulty_multiplier: 1.1,
            night_difficulty_multiplier: 1.5,
            player_level_multiplier: 1.05,
            initial_pool_size: 10,
            kind_weights: KindWeights::default(),
            spawn_points: Vec::new(),
        }
    }
}

/// Relative spawn weights per zombie kind (normalized at selection time)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KindWeights {
    pub walker: f32,
    pub runner: f32,
    pub brute: f32,
    pub crawler: f32,
    pub spitter: f32,
    pub bloater: f32,
    pub screamer: f32,
}

impl Default for KindWeights {
    fn default() -> Self {
        Self {
            walker: 0.5,
            runner: 0.2,
            brute: 0.1,
            crawler: 0.1,
            spitter: 0.05,
            bloater: 0.03,
            screamer: 0.02,
        }
    }
}

// === DAY/NIGHT CLOCK ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Real seconds per in-game day (1440 = one game minute per second)
    pub day_length_secs: f32,
    pub starting_hour: f32,
    pub starting_day: u32,
    pub dawn_hour: f32,
    pub day_hour: f32,
    pub dusk_hour: f32,
    pub night_hour: f32,
    pub time_multiplier: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            day_length_secs: 1440.0,
            starting_hour: 8.0,
            starting_day: 1,
            dawn_hour: 6.0,
            day_hour: 7.0,
            dusk_hour: 18.0,
            night_hour: 19.0,
            time_multiplier: 1.0,
        }
    }
}

// === SOUND ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Range used when an emitter passes no range: max_sound_range * intensity
    pub max_sound_range: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            max_sound_range: 50.0,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ShamblerError::InvalidConfig(msg));

        let p = &self.profiler;
        if p.sample_rate <= 0.0 {
            return invalid(format!("profiler.sample_rate ({}) must be positive", p.sample_rate));
        }
        if p.max_history_size == 0 || p.pattern_window_size == 0 {
            return invalid("profiler history and window sizes must be non-zero".into());
        }
        if p.cautious_speed >= p.rush_speed {
            return invalid(format!(
                "profiler.cautious_speed ({}) should be < rush_speed ({})",
                p.cautious_speed, p.rush_speed
            ));
        }

        let z = &self.zombie;
        if z.max_health <= 0.0 || z.move_speed <= 0.0 || z.attack_range <= 0.0 {
            return invalid("zombie health, speed and attack range must be positive".into());
        }
        if z.idle_min_secs > z.idle_max_secs {
            return invalid(format!(
                "zombie.idle_min_secs ({}) should be <= idle_max_secs ({})",
                z.idle_min_secs, z.idle_max_secs
            ));
        }
        if z.lost_target_grace > z.give_up_time {
            return invalid(format!(
                "zombie.lost_target_grace ({}) should be <= give_up_time ({})",
                z.lost_target_grace, z.give_up_time
            ));
        }

        let s = &self.senses;
        if s.vision_angle <= 0.0 || s.vision_angle > 360.0 {
            return invalid(format!("senses.vision_angle ({}) must be in (0, 360]", s.vision_angle));
        }
        if s.sound_memory_capacity == 0 {
            return invalid("senses.sound_memory_capacity must be non-zero".into());
        }

        if self.decision.ray_count == 0 || self.decision.max_steps == 0 {
            return invalid("decision.ray_count and max_steps must be non-zero".into());
        }

        let sp = &self.spawner;
        if sp.min_spawn_distance > sp.max_spawn_distance {
            return invalid(format!(
                "spawner.min_spawn_distance ({}) should be <= max_spawn_distance ({})",
                sp.min_spawn_distance, sp.max_spawn_distance
            ));
        }
        if sp.base_spawn_interval < 1.0 {
            return invalid("spawner.base_spawn_interval must be at least 1 second".into());
        }
        let w = &sp.kind_weights;
        let weights = [w.walker, w.runner, w.brute, w.crawler, w.spitter, w.bloater, w.screamer];
        if weights.iter().any(|w| *w < 0.0) {
            return invalid("spawner.kind_weights must be non-negative".into());
        }

        let c = &self.clock;
        if c.day_length_secs <= 0.0 {
            return invalid("clock.day_length_secs must be positive".into());
        }
        if !(c.dawn_hour < c.day_hour && c.day_hour < c.dusk_hour && c.dusk_hour < c.night_hour) {
            return invalid("clock hours must satisfy dawn < day < dusk < night".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            seed = 7

            [senses]
            vision_range = 12.0

            [decision.rewards]
            death = -2.0
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.senses.vision_range, 12.0);
        assert_eq!(config.senses.hearing_range, 15.0);
        assert_eq!(config.decision.rewards.death, -2.0);
        assert_eq!(config.decision.rewards.survival, 0.001);
        assert_eq!(config.profiler.max_history_size, 1000);
    }

    #[test]
    fn test_invalid_clock_rejected() {
        let mut config = SimulationConfig::default();
        config.clock.dusk_hour = 5.0;
        assert!(matches!(config.validate(), Err(ShamblerError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_idle_range_rejected() {
        let mut config = SimulationConfig::default();
        config.zombie.idle_min_secs = 9.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = SimulationConfig::from_toml_str("seed = \"not a number\"");
        assert!(matches!(result, Err(ShamblerError::TomlError(_))));
    }
}
